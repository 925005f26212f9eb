// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fleet registry mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ride_booking_domain::{Vehicle, VehicleBlock};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::encode_date;
use crate::diesel_schema::{vehicle_blocked_dates, vehicles};
use crate::error::{PersistenceError, is_unique_violation};

fn map_registration_error(err: diesel::result::Error, registration: &str) -> PersistenceError {
    if is_unique_violation(&err) {
        PersistenceError::DuplicateRegistration(registration.to_string())
    } else {
        PersistenceError::from(err)
    }
}

fn insert_blocks(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    blocks: &[VehicleBlock],
) -> Result<(), PersistenceError> {
    for block in blocks {
        diesel::insert_into(vehicle_blocked_dates::table)
            .values((
                vehicle_blocked_dates::vehicle_id.eq(vehicle_id),
                vehicle_blocked_dates::start_date.eq(encode_date(block.range.start)),
                vehicle_blocked_dates::end_date.eq(encode_date(block.range.end)),
                vehicle_blocked_dates::reason.eq(&block.reason),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Registers a vehicle and its blocked dates.
///
/// Any `vehicle_id` already on the value is ignored; the database assigns one.
///
/// # Errors
///
/// Returns `DuplicateRegistration` if the registration is already in the fleet.
pub fn create_vehicle(
    conn: &mut SqliteConnection,
    vehicle: &Vehicle,
) -> Result<i64, PersistenceError> {
    conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(vehicles::table)
            .values((
                vehicles::registration.eq(&vehicle.registration),
                vehicles::display_name.eq(&vehicle.display_name),
                vehicles::vehicle_class.eq(vehicle.class.as_str()),
                vehicles::model.eq(vehicle.model.as_deref()),
                vehicles::seats.eq(i32::from(vehicle.seats)),
                vehicles::is_active.eq(i32::from(vehicle.is_active)),
                vehicles::maintenance_mode.eq(i32::from(vehicle.maintenance_mode)),
            ))
            .execute(conn)
            .map_err(|e| map_registration_error(e, &vehicle.registration))?;

        let vehicle_id: i64 = get_last_insert_rowid(conn)?;
        insert_blocks(conn, vehicle_id, &vehicle.blocked_dates)?;

        info!(
            vehicle_id,
            registration = %vehicle.registration,
            class = %vehicle.class,
            "Registered vehicle"
        );
        Ok(vehicle_id)
    })
}

/// Replaces a vehicle's details and its blocked dates.
///
/// # Errors
///
/// Returns `VehicleNotFound` if no vehicle has this ID, or
/// `DuplicateRegistration` if another vehicle carries the registration.
pub fn update_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    vehicle: &Vehicle,
) -> Result<(), PersistenceError> {
    conn.transaction::<(), PersistenceError, _>(|conn| {
        let rows_affected: usize = diesel::update(vehicles::table)
            .filter(vehicles::vehicle_id.eq(vehicle_id))
            .set((
                vehicles::registration.eq(&vehicle.registration),
                vehicles::display_name.eq(&vehicle.display_name),
                vehicles::vehicle_class.eq(vehicle.class.as_str()),
                vehicles::model.eq(vehicle.model.as_deref()),
                vehicles::seats.eq(i32::from(vehicle.seats)),
                vehicles::is_active.eq(i32::from(vehicle.is_active)),
                vehicles::maintenance_mode.eq(i32::from(vehicle.maintenance_mode)),
            ))
            .execute(conn)
            .map_err(|e| map_registration_error(e, &vehicle.registration))?;

        if rows_affected == 0 {
            return Err(PersistenceError::VehicleNotFound(vehicle_id));
        }

        diesel::delete(vehicle_blocked_dates::table)
            .filter(vehicle_blocked_dates::vehicle_id.eq(vehicle_id))
            .execute(conn)?;
        insert_blocks(conn, vehicle_id, &vehicle.blocked_dates)?;

        info!(
            vehicle_id,
            blocked_ranges = vehicle.blocked_dates.len(),
            "Updated vehicle"
        );
        Ok(())
    })
}
