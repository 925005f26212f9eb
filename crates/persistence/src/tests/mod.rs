// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod booking_tests;

use std::collections::HashSet;

use ride_booking::{Booking, BookingRequest, CreationContext, create_booking};
use ride_booking_domain::{BookingSettings, Tz, Vehicle, VehicleClass};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

use crate::Persistence;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// 08:00 IST on 3 November 2026.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026 - 11 - 03 02:30 UTC)
}

pub fn create_test_vehicle(registration: &str, class: VehicleClass) -> Vehicle {
    Vehicle {
        vehicle_id: None,
        registration: registration.to_string(),
        display_name: format!("Fleet car {registration}"),
        class,
        model: Some(String::from("Dzire")),
        seats: 4,
        is_active: true,
        maintenance_mode: false,
        blocked_dates: Vec::new(),
    }
}

pub fn create_test_request(phone: &str) -> BookingRequest {
    BookingRequest {
        customer_name: String::from("Anita Rao"),
        phone: phone.to_string(),
        email: Some(String::from("anita@example.com")),
        pickup_location: String::from("Indiranagar"),
        drop_location: String::from("Kempegowda International Airport"),
        sub_location: Some(String::from("Terminal 2")),
        travel_date: date!(2026 - 11 - 10),
        pickup_time: time!(10:30),
        vehicle_class: VehicleClass::Sedan,
        vehicle_model: None,
        passengers: 3,
        total_amount: 2_400,
        customer_notes: Some(String::from("Two suitcases")),
    }
}

pub fn create_test_booking(booking_id: &str, phone: &str) -> Booking {
    let settings: BookingSettings = BookingSettings::default();
    let assigned: HashSet<i64> = HashSet::new();
    let context = CreationContext {
        settings: &settings,
        vehicles: &[],
        assigned_vehicle_ids: &assigned,
        now: test_now(),
        timezone: Tz::Asia__Kolkata,
    };
    create_booking(create_test_request(phone), &context, booking_id.to_string()).unwrap()
}
