// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;

use ride_booking::{Booking, Command, TransitionResult, VehicleAssignment, apply};
use ride_booking_audit::{Author, Channel};
use ride_booking_domain::{BookingStatus, PaymentStatus, Vehicle, VehicleClass};
use time::OffsetDateTime;
use time::macros::{date, datetime};

use super::{create_test_booking, create_test_persistence, create_test_vehicle};
use crate::{Persistence, PersistenceError};

fn later() -> OffsetDateTime {
    datetime!(2026 - 11 - 04 06:15 UTC)
}

fn operator() -> Author {
    Author::Operator(String::from("DISPATCH1"))
}

fn assign(persistence: &mut Persistence, booking: &Booking, vehicle_id: i64) -> Booking {
    let vehicle: Vehicle = persistence.get_vehicle(vehicle_id).unwrap().unwrap();
    let result: TransitionResult = apply(
        booking,
        Command::UpdateStatus {
            status: Some(BookingStatus::Confirmed),
            assignment: Some(VehicleAssignment {
                vehicle_id,
                vehicle,
                held_by: None,
            }),
            admin_notes: None,
        },
        &operator(),
        later(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap();
    result.new_booking
}

#[test]
fn test_booking_round_trips() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");

    persistence.insert_booking(&booking).unwrap();
    let stored: Booking = persistence.get_booking("BK261103-AB12C").unwrap().unwrap();

    assert_eq!(stored, booking);
    assert_eq!(stored.communications.len(), 1);
    assert_eq!(stored.trip.sub_location.as_deref(), Some("Terminal 2"));
}

#[test]
fn test_unknown_booking_is_none() {
    let mut persistence = create_test_persistence();
    assert!(persistence.get_booking("BK261103-NOPE0").unwrap().is_none());
}

#[test]
fn test_duplicate_booking_id_is_reported() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");
    persistence.insert_booking(&booking).unwrap();

    let duplicate: Booking = create_test_booking("BK261103-AB12C", "9900112233");
    assert_eq!(
        persistence.insert_booking(&duplicate),
        Err(PersistenceError::DuplicateBookingId(String::from(
            "BK261103-AB12C"
        )))
    );
    assert!(persistence.list_bookings_by_phone("9900112233").unwrap().is_empty());
}

#[test]
fn test_transition_appends_entries_and_updates_fields() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");
    persistence.insert_booking(&booking).unwrap();

    let result: TransitionResult = apply(
        &booking,
        Command::VerifyPayment {
            transaction_id: Some(String::from("UPI-4471023")),
            notes: None,
        },
        &operator(),
        later(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap();

    let stored: Booking = persistence.get_booking("BK261103-AB12C").unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Verified);
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_verified_at, Some(later()));
    assert_eq!(stored.payment_verified_by.as_deref(), Some("DISPATCH1"));
    assert_eq!(stored.communications.len(), booking.communications.len() + 1);
    assert_eq!(stored, result.new_booking);
}

#[test]
fn test_operator_entries_keep_their_author() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");
    persistence.insert_booking(&booking).unwrap();

    let result: TransitionResult = apply(
        &booking,
        Command::AddCommunication {
            channel: Channel::WhatsApp,
            message: String::from("Sent driver details"),
        },
        &operator(),
        later(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap();

    let stored: Booking = persistence.get_booking("BK261103-AB12C").unwrap().unwrap();
    let last = stored.communications.last().unwrap();
    assert_eq!(last.channel, Channel::WhatsApp);
    assert_eq!(last.author, operator());
}

#[test]
fn test_noop_transition_writes_nothing() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");
    persistence.insert_booking(&booking).unwrap();

    let result: TransitionResult = apply(
        &booking,
        Command::UpdateStatus {
            status: Some(BookingStatus::Pending),
            assignment: None,
            admin_notes: None,
        },
        &operator(),
        later(),
    )
    .unwrap();
    assert!(result.is_noop());
    persistence.persist_transition(&result).unwrap();

    let stored: Booking = persistence.get_booking("BK261103-AB12C").unwrap().unwrap();
    assert_eq!(stored.updated_at, booking.updated_at);
}

#[test]
fn test_transition_for_unknown_booking_fails() {
    let mut persistence = create_test_persistence();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");

    let result: TransitionResult = apply(
        &booking,
        Command::RejectPayment { notes: None },
        &operator(),
        later(),
    )
    .unwrap();
    assert_eq!(
        persistence.persist_transition(&result),
        Err(PersistenceError::BookingNotFound(String::from(
            "BK261103-AB12C"
        )))
    );
}

#[test]
fn test_phone_lookup_includes_cancelled_newest_first() {
    let mut persistence = create_test_persistence();
    let first: Booking = create_test_booking("BK261103-AAAAA", "9845012345");
    let second: Booking = create_test_booking("BK261103-BBBBB", "9845012345");
    let other: Booking = create_test_booking("BK261103-CCCCC", "9900112233");
    for booking in [&first, &second, &other] {
        persistence.insert_booking(booking).unwrap();
    }

    let cancelled: TransitionResult = apply(
        &first,
        Command::UpdateStatus {
            status: Some(BookingStatus::Cancelled),
            assignment: None,
            admin_notes: None,
        },
        &operator(),
        later(),
    )
    .unwrap();
    persistence.persist_transition(&cancelled).unwrap();

    let bookings: Vec<Booking> = persistence.list_bookings_by_phone("9845012345").unwrap();
    let ids: Vec<&str> = bookings.iter().map(|b| b.booking_id.as_str()).collect();
    assert_eq!(ids, vec!["BK261103-BBBBB", "BK261103-AAAAA"]);
    assert_eq!(bookings[1].status, BookingStatus::Cancelled);
}

#[test]
fn test_assignments_are_scoped_to_date_and_released_on_cancel() {
    let mut persistence = create_test_persistence();
    let vehicle_id: i64 = persistence
        .create_vehicle(&create_test_vehicle("KA01AB1234", VehicleClass::Sedan))
        .unwrap();
    let booking: Booking = create_test_booking("BK261103-AB12C", "9845012345");
    persistence.insert_booking(&booking).unwrap();

    let assigned: Booking = assign(&mut persistence, &booking, vehicle_id);
    assert_eq!(assigned.assigned_vehicle_id, Some(vehicle_id));

    let on_date: HashSet<i64> = persistence
        .assigned_vehicle_ids_on(date!(2026 - 11 - 10))
        .unwrap();
    assert_eq!(on_date, HashSet::from([vehicle_id]));
    assert!(
        persistence
            .assigned_vehicle_ids_on(date!(2026 - 11 - 11))
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        persistence
            .booking_holding_vehicle(vehicle_id, date!(2026 - 11 - 10))
            .unwrap()
            .as_deref(),
        Some("BK261103-AB12C")
    );

    let cancelled: TransitionResult = apply(
        &assigned,
        Command::UpdateStatus {
            status: Some(BookingStatus::Cancelled),
            assignment: None,
            admin_notes: None,
        },
        &operator(),
        later(),
    )
    .unwrap();
    persistence.persist_transition(&cancelled).unwrap();

    assert!(
        persistence
            .assigned_vehicle_ids_on(date!(2026 - 11 - 10))
            .unwrap()
            .is_empty()
    );
    assert!(
        persistence
            .booking_holding_vehicle(vehicle_id, date!(2026 - 11 - 10))
            .unwrap()
            .is_none()
    );
}
