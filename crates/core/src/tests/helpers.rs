// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Booking, BookingRequest, CreationContext, create_booking};
use ride_booking_audit::Author;
use ride_booking_domain::{BookingSettings, Tz, Vehicle, VehicleClass};
use std::collections::HashSet;
use time::macros::{date, datetime, time};
use time::OffsetDateTime;

pub const KOLKATA: Tz = ride_booking_domain::Tz::Asia__Kolkata;

/// 08:00 IST on 3 November 2026.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026 - 11 - 03 02:30 UTC)
}

pub fn create_test_operator() -> Author {
    Author::Operator(String::from("DISPATCH1"))
}

pub fn create_test_vehicle(id: i64, class: VehicleClass) -> Vehicle {
    Vehicle {
        vehicle_id: Some(id),
        registration: format!("KA01AB{id:04}"),
        display_name: format!("Fleet car {id}"),
        class,
        model: None,
        seats: 4,
        is_active: true,
        maintenance_mode: false,
        blocked_dates: Vec::new(),
    }
}

pub fn create_test_request() -> BookingRequest {
    BookingRequest {
        customer_name: String::from("Anita Rao"),
        phone: String::from("+91 98450 12345"),
        email: Some(String::from("anita@example.com")),
        pickup_location: String::from("Indiranagar"),
        drop_location: String::from("Kempegowda International Airport"),
        sub_location: None,
        travel_date: date!(2026 - 11 - 10),
        pickup_time: time!(10:00),
        vehicle_class: VehicleClass::Sedan,
        vehicle_model: None,
        passengers: 3,
        total_amount: 1_200,
        customer_notes: None,
    }
}

pub fn create_with(
    request: BookingRequest,
    settings: &BookingSettings,
    vehicles: &[Vehicle],
) -> Result<Booking, crate::CoreError> {
    let assigned: HashSet<i64> = HashSet::new();
    let context = CreationContext {
        settings,
        vehicles,
        assigned_vehicle_ids: &assigned,
        now: test_now(),
        timezone: KOLKATA,
    };
    create_booking(request, &context, String::from("BK261103-TEST1"))
}

pub fn create_test_booking() -> Booking {
    create_with(
        create_test_request(),
        &BookingSettings::default(),
        &[create_test_vehicle(1, VehicleClass::Sedan)],
    )
    .unwrap()
}
