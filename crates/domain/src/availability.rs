// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fleet availability calculation.
//!
//! Availability is soft at booking time: a vehicle is only held once an
//! operator assigns it to a booking. Unassigned bookings of the same class
//! on the same date do not reduce the free count, so two customers may be
//! accepted for the last free vehicle of a class. The operator resolves such
//! over-commit at assignment time.

use crate::types::{Vehicle, VehicleClass};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use time::Date;

/// Free and total counts for one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAvailability {
    /// The class.
    pub class: VehicleClass,
    /// Registered vehicles of the class.
    pub total: u32,
    /// Vehicles of the class free on the date.
    pub available: u32,
}

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    /// Whether at least one matching vehicle is free.
    pub available: bool,
    /// Free vehicles in scope, or `-1` when the fleet is not configured.
    pub available_count: i64,
    /// Registered vehicles in scope.
    pub total_count: i64,
    /// Counts for every class, in display order.
    pub per_class: Vec<ClassAvailability>,
}

impl AvailabilityResult {
    /// Returns true if the result reports an unconfigured fleet.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.available_count < 0
    }
}

/// Calculates availability on `date`.
///
/// # Arguments
///
/// * `date` - The travel date
/// * `class` - Restrict counts to this class, or `None` for the whole fleet
/// * `vehicles` - The full vehicle registry
/// * `assigned_vehicle_ids` - Vehicles explicitly assigned to non-cancelled
///   bookings on `date`
///
/// # Returns
///
/// An empty registry reports `available = true`, `available_count = -1`
/// and `total_count = 0` so that booking works before the fleet is set up.
#[must_use]
pub fn calculate_availability(
    date: Date,
    class: Option<VehicleClass>,
    vehicles: &[Vehicle],
    assigned_vehicle_ids: &HashSet<i64>,
) -> AvailabilityResult {
    let mut counts: BTreeMap<VehicleClass, (u32, u32)> = VehicleClass::ALL
        .iter()
        .map(|c| (*c, (0_u32, 0_u32)))
        .collect();

    for vehicle in vehicles {
        let is_assigned: bool = vehicle
            .vehicle_id
            .is_some_and(|id| assigned_vehicle_ids.contains(&id));
        let entry = counts.entry(vehicle.class).or_insert((0, 0));
        entry.0 += 1;
        if vehicle.is_available_on(date) && !is_assigned {
            entry.1 += 1;
        }
    }

    let per_class: Vec<ClassAvailability> = counts
        .into_iter()
        .map(|(class, (total, available))| ClassAvailability {
            class,
            total,
            available,
        })
        .collect();

    if vehicles.is_empty() {
        return AvailabilityResult {
            available: true,
            available_count: -1,
            total_count: 0,
            per_class,
        };
    }

    let (total_count, available_count): (i64, i64) = per_class
        .iter()
        .filter(|c| class.is_none_or(|wanted| wanted == c.class))
        .fold((0, 0), |(total, free), c| {
            (total + i64::from(c.total), free + i64::from(c.available))
        });

    AvailabilityResult {
        available: available_count > 0,
        available_count,
        total_count,
        per_class,
    }
}
