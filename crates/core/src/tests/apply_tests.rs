// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for payment and status transitions.

use crate::{Booking, Command, CoreError, TransitionResult, VehicleAssignment, apply};
use ride_booking_audit::{Author, Channel};
use ride_booking_domain::{
    BookingStatus, DateRange, DomainError, PaymentStatus, VehicleBlock, VehicleClass,
};
use time::macros::{date, datetime};
use time::OffsetDateTime;

use super::helpers::{create_test_booking, create_test_operator, create_test_vehicle};

fn later() -> OffsetDateTime {
    datetime!(2026 - 11 - 04 06:00 UTC)
}

fn run(booking: &Booking, command: Command) -> Result<TransitionResult, CoreError> {
    apply(booking, command, &create_test_operator(), later())
}

fn verify() -> Command {
    Command::VerifyPayment {
        transaction_id: Some(String::from("UPI-4471023")),
        notes: None,
    }
}

fn set_status(status: BookingStatus) -> Command {
    Command::UpdateStatus {
        status: Some(status),
        assignment: None,
        admin_notes: None,
    }
}

#[test]
fn test_verify_confirms_booking_and_appends_one_entry() {
    let booking: Booking = create_test_booking();
    let before: usize = booking.communications.len();

    let result: TransitionResult = run(&booking, verify()).unwrap();
    let updated: &Booking = &result.new_booking;

    assert_eq!(updated.payment_status, PaymentStatus::Verified);
    assert_eq!(updated.status, BookingStatus::Confirmed);
    assert_eq!(updated.payment_verified_at, Some(later()));
    assert_eq!(updated.payment_verified_by.as_deref(), Some("DISPATCH1"));
    assert_eq!(updated.payment_transaction_id.as_deref(), Some("UPI-4471023"));
    assert_eq!(updated.communications.len(), before + 1);
    assert_eq!(result.new_entries.len(), 1);
    assert_eq!(result.new_entries[0].author, Author::System);
    assert_eq!(updated.updated_at, later());
}

#[test]
fn test_verify_after_claim() {
    let booking: Booking = create_test_booking();
    let claimed: Booking = run(
        &booking,
        Command::ClaimPayment {
            transaction_id: String::from("UTR998877"),
        },
    )
    .unwrap()
    .new_booking;
    assert_eq!(claimed.payment_status, PaymentStatus::ScreenshotUploaded);

    let verified: Booking = run(
        &claimed,
        Command::VerifyPayment {
            transaction_id: None,
            notes: None,
        },
    )
    .unwrap()
    .new_booking;
    assert_eq!(verified.payment_status, PaymentStatus::Verified);
    assert_eq!(verified.payment_transaction_id.as_deref(), Some("UTR998877"));
    assert_eq!(verified.communications.len(), 3);
}

#[test]
fn test_verify_leaves_non_pending_status_alone() {
    let booking: Booking = create_test_booking();
    let confirmed: Booking = run(&booking, set_status(BookingStatus::Confirmed))
        .unwrap()
        .new_booking;
    let in_progress: Booking = run(&confirmed, set_status(BookingStatus::InProgress))
        .unwrap()
        .new_booking;

    let verified: Booking = run(&in_progress, verify()).unwrap().new_booking;
    assert_eq!(verified.status, BookingStatus::InProgress);
    assert_eq!(verified.payment_status, PaymentStatus::Verified);
}

#[test]
fn test_reject_appends_admin_note() {
    let mut booking: Booking = create_test_booking();
    booking.admin_notes = Some(String::from("Regular customer"));

    let result = run(
        &booking,
        Command::RejectPayment {
            notes: Some(String::from("No matching UPI credit")),
        },
    )
    .unwrap();

    assert_eq!(result.new_booking.payment_status, PaymentStatus::Rejected);
    assert_eq!(result.new_booking.status, BookingStatus::Pending);
    assert_eq!(
        result.new_booking.admin_notes.as_deref(),
        Some("Regular customer\nPayment rejected: No matching UPI credit")
    );
    assert_eq!(result.new_entries.len(), 1);
}

#[test]
fn test_rejected_payment_can_be_claimed_again() {
    let booking: Booking = create_test_booking();
    let rejected: Booking = run(&booking, Command::RejectPayment { notes: None })
        .unwrap()
        .new_booking;

    let retried = run(
        &rejected,
        Command::ClaimPayment {
            transaction_id: String::from("UTR112233"),
        },
    )
    .unwrap();
    assert_eq!(
        retried.new_booking.payment_status,
        PaymentStatus::ScreenshotUploaded
    );
}

#[test]
fn test_claim_requires_transaction_id() {
    let booking: Booking = create_test_booking();
    assert_eq!(
        run(
            &booking,
            Command::ClaimPayment {
                transaction_id: String::from("  "),
            },
        ),
        Err(CoreError::MissingTransactionId)
    );
}

#[test]
fn test_refund_only_after_verification() {
    let booking: Booking = create_test_booking();
    assert!(matches!(
        run(&booking, Command::RefundPayment { notes: None }),
        Err(CoreError::DomainViolation(
            DomainError::InvalidPaymentTransition { .. }
        ))
    ));

    let verified: Booking = run(&booking, verify()).unwrap().new_booking;
    let refunded: Booking = run(&verified, Command::RefundPayment { notes: None })
        .unwrap()
        .new_booking;
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
}

#[test]
fn test_refunded_booking_is_terminal() {
    let booking: Booking = create_test_booking();
    let verified: Booking = run(&booking, verify()).unwrap().new_booking;
    let refunded: Booking = run(&verified, Command::RefundPayment { notes: None })
        .unwrap()
        .new_booking;

    assert!(matches!(
        run(&refunded, set_status(BookingStatus::InProgress)),
        Err(CoreError::DomainViolation(DomainError::BookingTerminal { .. }))
    ));
}

#[test]
fn test_cancelled_booking_rejects_payment_transitions() {
    let booking: Booking = create_test_booking();
    let cancelled: Booking = run(&booking, set_status(BookingStatus::Cancelled))
        .unwrap()
        .new_booking;

    for command in [
        verify(),
        Command::RejectPayment { notes: None },
        Command::ClaimPayment {
            transaction_id: String::from("UTR1"),
        },
    ] {
        match run(&cancelled, command) {
            Err(CoreError::DomainViolation(DomainError::BookingTerminal { state, .. })) => {
                assert_eq!(state, "cancelled");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

#[test]
fn test_terminal_booking_still_accepts_communications_and_notes() {
    let booking: Booking = create_test_booking();
    let cancelled: Booking = run(&booking, set_status(BookingStatus::Cancelled))
        .unwrap()
        .new_booking;

    let logged = run(
        &cancelled,
        Command::AddCommunication {
            channel: Channel::Phone,
            message: String::from("Customer asked about a refund"),
        },
    )
    .unwrap();
    assert_eq!(logged.new_entries[0].channel, Channel::Phone);
    assert_eq!(
        logged.new_entries[0].author,
        Author::Operator(String::from("DISPATCH1"))
    );

    let noted = run(
        &cancelled,
        Command::UpdateStatus {
            status: None,
            assignment: None,
            admin_notes: Some(String::from("Refund pending with accounts")),
        },
    )
    .unwrap();
    assert_eq!(noted.new_entries.len(), 1);
}

#[test]
fn test_status_change_rejects_invalid_transition() {
    let booking: Booking = create_test_booking();
    assert!(matches!(
        run(&booking, set_status(BookingStatus::Completed)),
        Err(CoreError::DomainViolation(
            DomainError::InvalidStatusTransition { .. }
        ))
    ));
}

#[test]
fn test_update_appends_entry_per_changed_field() {
    let booking: Booking = create_test_booking();
    let vehicle = create_test_vehicle(4, VehicleClass::Sedan);

    let result = run(
        &booking,
        Command::UpdateStatus {
            status: Some(BookingStatus::Confirmed),
            assignment: Some(VehicleAssignment {
                vehicle_id: 4,
                vehicle,
                held_by: None,
            }),
            admin_notes: Some(String::from("Driver: Suresh")),
        },
    )
    .unwrap();

    assert_eq!(result.new_entries.len(), 3);
    assert_eq!(result.new_booking.status, BookingStatus::Confirmed);
    assert_eq!(result.new_booking.assigned_vehicle_id, Some(4));
    assert_eq!(
        result.new_booking.admin_notes.as_deref(),
        Some("Driver: Suresh")
    );
    assert_eq!(result.new_booking.communications.len(), 4);
}

#[test]
fn test_unchanged_fields_add_no_entries() {
    let booking: Booking = create_test_booking();
    let result = run(&booking, set_status(BookingStatus::Pending)).unwrap();

    assert!(result.is_noop());
    assert_eq!(result.new_booking, booking);
}

#[test]
fn test_assignment_rejects_unavailable_vehicle() {
    let booking: Booking = create_test_booking();
    let mut vehicle = create_test_vehicle(4, VehicleClass::Sedan);
    vehicle.blocked_dates.push(VehicleBlock {
        range: DateRange {
            start: date!(2026 - 11 - 10),
            end: date!(2026 - 11 - 10),
        },
        reason: String::from("Insurance renewal"),
    });

    let result = run(
        &booking,
        Command::UpdateStatus {
            status: None,
            assignment: Some(VehicleAssignment {
                vehicle_id: 4,
                vehicle,
                held_by: None,
            }),
            admin_notes: None,
        },
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::VehicleUnavailable {
            vehicle_id: 4,
            date: date!(2026 - 11 - 10),
        }))
    );
}

#[test]
fn test_assignment_rejects_vehicle_held_by_other_booking() {
    let booking: Booking = create_test_booking();
    let result = run(
        &booking,
        Command::UpdateStatus {
            status: Some(BookingStatus::Confirmed),
            assignment: Some(VehicleAssignment {
                vehicle_id: 4,
                vehicle: create_test_vehicle(4, VehicleClass::Sedan),
                held_by: Some(String::from("BK261101-ZZZZZ")),
            }),
            admin_notes: None,
        },
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::VehicleAlreadyAssigned { vehicle_id: 4, .. }
        ))
    ));
}

#[test]
fn test_reassigning_same_vehicle_is_noop() {
    let mut booking: Booking = create_test_booking();
    booking.assigned_vehicle_id = Some(4);

    let result = run(
        &booking,
        Command::UpdateStatus {
            status: None,
            assignment: Some(VehicleAssignment {
                vehicle_id: 4,
                vehicle: create_test_vehicle(4, VehicleClass::Sedan),
                held_by: Some(booking.booking_id.clone()),
            }),
            admin_notes: None,
        },
    )
    .unwrap();
    assert!(result.is_noop());
}

#[test]
fn test_add_communication_rejects_empty_message() {
    let booking: Booking = create_test_booking();
    assert!(matches!(
        run(
            &booking,
            Command::AddCommunication {
                channel: Channel::Note,
                message: String::new(),
            },
        ),
        Err(CoreError::DomainViolation(
            DomainError::InvalidCommunication(_)
        ))
    ));
}
