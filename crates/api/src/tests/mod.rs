// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod auth_tests;
mod notification_tests;

use ride_booking_domain::Tz;
use ride_booking_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AuthenticatedActor, CreateBookingRequest, CreateBookingResponse, Role, VehicleRequest,
    create_booking, create_vehicle,
};

pub const KOLKATA: Tz = Tz::Asia__Kolkata;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// 08:00 IST on 3 November 2026.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026 - 11 - 03 02:30 UTC)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(1, String::from("ADMIN1"), Role::Admin)
}

pub fn create_test_dispatcher() -> AuthenticatedActor {
    AuthenticatedActor::new(2, String::from("DISPATCH1"), Role::Dispatcher)
}

pub fn create_test_vehicle_request(registration: &str, class: &str) -> VehicleRequest {
    VehicleRequest {
        registration: registration.to_string(),
        display_name: format!("Fleet car {registration}"),
        vehicle_class: class.to_string(),
        model: Some(String::from("Dzire")),
        seats: 4,
        is_active: true,
        maintenance_mode: false,
        blocked_dates: Vec::new(),
    }
}

pub fn create_test_booking_request() -> CreateBookingRequest {
    CreateBookingRequest {
        customer_name: String::from("Anita Rao"),
        phone: String::from("+91 98450 12345"),
        email: Some(String::from("anita@example.com")),
        pickup_location: String::from("Indiranagar"),
        drop_location: String::from("Kempegowda International Airport"),
        sub_location: Some(String::from("Terminal 2")),
        travel_date: String::from("2026-11-10"),
        pickup_time: String::from("10:30"),
        vehicle_class: String::from("sedan"),
        vehicle_model: None,
        passengers: 3,
        total_amount: 2_400,
        customer_notes: Some(String::from("Two suitcases")),
    }
}

/// Registers one sedan and returns its ID.
pub fn seed_sedan(persistence: &mut Persistence, registration: &str) -> i64 {
    create_vehicle(
        persistence,
        &create_test_admin(),
        create_test_vehicle_request(registration, "sedan"),
    )
    .unwrap()
    .vehicle
    .vehicle_id
}

/// Registers one sedan and books it, returning the booking ID.
pub fn seed_booking(persistence: &mut Persistence) -> String {
    seed_sedan(persistence, "KA01AB1234");
    let (response, _event): (CreateBookingResponse, _) =
        create_booking(persistence, create_test_booking_request(), test_now(), KOLKATA).unwrap();
    response.booking_id
}
