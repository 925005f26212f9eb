// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, VehicleAssignment};
use crate::error::CoreError;
use crate::state::{Booking, TransitionResult};
use ride_booking_audit::{Author, CommunicationEntry};
use ride_booking_domain::{
    BookingStatus, DomainError, PaymentStatus, validate_message, validate_text_field,
};
use time::OffsetDateTime;

fn reject_if_terminal(booking: &Booking) -> Result<(), CoreError> {
    if let Some(state) = booking.terminal_state() {
        return Err(CoreError::DomainViolation(DomainError::BookingTerminal {
            booking_id: booking.booking_id.clone(),
            state: state.to_string(),
        }));
    }
    Ok(())
}

fn clean_notes(notes: Option<String>) -> Result<Option<String>, CoreError> {
    match notes {
        Some(n) if !n.trim().is_empty() => Ok(Some(validate_message(&n)?)),
        _ => Ok(None),
    }
}

fn append_admin_note(existing: Option<&str>, note: &str) -> String {
    match existing {
        Some(current) if !current.is_empty() => format!("{current}\n{note}"),
        _ => note.to_string(),
    }
}

fn check_assignment(booking: &Booking, assignment: &VehicleAssignment) -> Result<i64, CoreError> {
    let vehicle_id: i64 = assignment.vehicle_id;

    if !assignment.vehicle.is_available_on(booking.trip.travel_date) {
        return Err(CoreError::DomainViolation(DomainError::VehicleUnavailable {
            vehicle_id,
            date: booking.trip.travel_date,
        }));
    }

    if let Some(other) = assignment
        .held_by
        .as_ref()
        .filter(|other| **other != booking.booking_id)
    {
        return Err(CoreError::DomainViolation(
            DomainError::VehicleAlreadyAssigned {
                vehicle_id,
                booking_id: other.clone(),
            },
        ));
    }

    Ok(vehicle_id)
}

/// Applies a command to a booking, producing the updated booking and the
/// log entries the change generated.
///
/// This function is pure. The caller persists the result.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `command` - The command to apply
/// * `actor` - Who issued the command
/// * `now` - The current instant, stamped on new entries
///
/// # Errors
///
/// Returns an error if:
/// - The booking is terminal and the command changes status or payment
/// - The requested transition is not permitted
/// - An assigned vehicle is unavailable or held by another booking
/// - A message or note is empty or too long
#[allow(clippy::too_many_lines)]
pub fn apply(
    booking: &Booking,
    command: Command,
    actor: &Author,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let mut new_booking: Booking = booking.clone();
    let mut new_entries: Vec<CommunicationEntry> = Vec::new();

    match command {
        Command::VerifyPayment {
            transaction_id,
            notes,
        } => {
            reject_if_terminal(booking)?;
            booking
                .payment_status
                .validate_transition(PaymentStatus::Verified)?;
            let transaction_id: Option<String> = match transaction_id {
                Some(t) if !t.trim().is_empty() => {
                    Some(validate_text_field("transactionId", &t)?)
                }
                _ => None,
            };
            let notes: Option<String> = clean_notes(notes)?;

            new_booking.payment_status = PaymentStatus::Verified;
            new_booking.payment_verified_at = Some(now);
            new_booking.payment_verified_by = Some(actor.as_str().to_string());
            if let Some(t) = &transaction_id {
                new_booking.payment_transaction_id = Some(t.clone());
            }

            let mut message: String = format!(
                "Advance payment of Rs. {} verified by {actor}",
                booking.advance_amount
            );
            if let Some(t) = &new_booking.payment_transaction_id {
                message.push_str(&format!(" (transaction {t})"));
            }
            if booking.status == BookingStatus::Pending {
                new_booking.status = BookingStatus::Confirmed;
                message.push_str(". Booking confirmed");
            }
            if let Some(n) = &notes {
                message.push_str(&format!(". Notes: {n}"));
            }
            new_entries.push(CommunicationEntry::system(now, &message)?);
        }
        Command::RejectPayment { notes } => {
            reject_if_terminal(booking)?;
            booking
                .payment_status
                .validate_transition(PaymentStatus::Rejected)?;
            let notes: Option<String> = clean_notes(notes)?;

            new_booking.payment_status = PaymentStatus::Rejected;
            let mut message: String = format!("Advance payment rejected by {actor}");
            if let Some(n) = &notes {
                new_booking.admin_notes = Some(append_admin_note(
                    booking.admin_notes.as_deref(),
                    &format!("Payment rejected: {n}"),
                ));
                message.push_str(&format!(": {n}"));
            }
            new_entries.push(CommunicationEntry::system(now, &message)?);
        }
        Command::RefundPayment { notes } => {
            reject_if_terminal(booking)?;
            booking
                .payment_status
                .validate_transition(PaymentStatus::Refunded)?;
            let notes: Option<String> = clean_notes(notes)?;

            new_booking.payment_status = PaymentStatus::Refunded;
            let mut message: String = format!(
                "Advance of Rs. {} refunded by {actor}",
                booking.advance_amount
            );
            if let Some(n) = &notes {
                message.push_str(&format!(": {n}"));
            }
            new_entries.push(CommunicationEntry::system(now, &message)?);
        }
        Command::ClaimPayment { transaction_id } => {
            reject_if_terminal(booking)?;
            if transaction_id.trim().is_empty() {
                return Err(CoreError::MissingTransactionId);
            }
            let transaction_id: String = validate_text_field("transactionId", &transaction_id)?;

            // a rejected claim may be resubmitted
            booking
                .payment_status
                .validate_transition(PaymentStatus::ScreenshotUploaded)?;

            new_booking.payment_status = PaymentStatus::ScreenshotUploaded;
            new_booking.payment_transaction_id = Some(transaction_id.clone());
            new_entries.push(CommunicationEntry::system(
                now,
                &format!(
                    "Customer reported advance payment (transaction {transaction_id}); awaiting verification"
                ),
            )?);
        }
        Command::UpdateStatus {
            status,
            assignment,
            admin_notes,
        } => {
            if let Some(new_status) = status.filter(|s| *s != booking.status) {
                reject_if_terminal(booking)?;
                booking.status.validate_transition(new_status)?;
                new_booking.status = new_status;
                new_entries.push(CommunicationEntry::system(
                    now,
                    &format!(
                        "Status changed from {} to {new_status} by {actor}",
                        booking.status
                    ),
                )?);
            }

            if let Some(assignment) = assignment {
                let vehicle_id: i64 = check_assignment(booking, &assignment)?;
                if booking.assigned_vehicle_id != Some(vehicle_id) {
                    reject_if_terminal(booking)?;
                    new_booking.assigned_vehicle_id = Some(vehicle_id);
                    new_entries.push(CommunicationEntry::system(
                        now,
                        &format!(
                            "Vehicle {} ({}) assigned by {actor}",
                            assignment.vehicle.registration, assignment.vehicle.display_name
                        ),
                    )?);
                }
            }

            if let Some(notes) = admin_notes {
                let cleaned: Option<String> = clean_notes(Some(notes))?;
                if cleaned != booking.admin_notes {
                    new_booking.admin_notes = cleaned;
                    new_entries.push(CommunicationEntry::system(
                        now,
                        &format!("Admin notes updated by {actor}"),
                    )?);
                }
            }
        }
        Command::AddCommunication { channel, message } => {
            let entry: CommunicationEntry =
                CommunicationEntry::new(now, channel, &message, actor.clone())?;
            new_entries.push(entry);
        }
    }

    if !new_entries.is_empty() {
        new_booking.updated_at = now;
        new_booking.communications.extend(new_entries.iter().cloned());
    }

    Ok(TransitionResult {
        new_booking,
        new_entries,
    })
}
