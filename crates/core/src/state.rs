// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_booking_audit::CommunicationEntry;
use ride_booking_domain::{BookingStatus, PaymentStatus, PriceTier, VehicleClass};
use time::{Date, OffsetDateTime, Time};

/// Who the booking is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Customer name, trimmed.
    pub name: String,
    /// Normalized 10-digit mobile number.
    pub phone: String,
    /// Optional email, lower-cased.
    pub email: Option<String>,
}

/// Where and when the customer travels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// Pickup point.
    pub pickup_location: String,
    /// Destination.
    pub drop_location: String,
    /// Optional landmark or sub-location.
    pub sub_location: Option<String>,
    /// Local travel date in the operator timezone.
    pub travel_date: Date,
    /// Local pickup time in the operator timezone.
    pub pickup_time: Time,
}

/// A reservation.
///
/// Bookings are never deleted. Cancellation is a status value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Human-readable identifier, immutable once persisted.
    pub booking_id: String,
    /// When the booking was created.
    pub created_at: OffsetDateTime,
    /// Contact details.
    pub customer: Customer,
    /// Route and schedule.
    pub trip: Trip,
    /// Requested class.
    pub vehicle_class: VehicleClass,
    /// Requested model, if any.
    pub vehicle_model: Option<String>,
    /// Number of travellers.
    pub passengers: u32,
    /// Tier resolved from the travel date.
    pub price_tier: PriceTier,
    /// Client-declared total in whole rupees.
    pub total_amount: i64,
    /// Advance owed in whole rupees.
    pub advance_amount: i64,
    /// Vehicle bound by an operator.
    pub assigned_vehicle_id: Option<i64>,
    /// Payment state machine.
    pub payment_status: PaymentStatus,
    /// Trip state machine.
    pub status: BookingStatus,
    /// Transaction reference claimed or verified.
    pub payment_transaction_id: Option<String>,
    /// When the payment was verified.
    pub payment_verified_at: Option<OffsetDateTime>,
    /// Operator who verified the payment.
    pub payment_verified_by: Option<String>,
    /// Notes from the customer.
    pub customer_notes: Option<String>,
    /// Notes from operators.
    pub admin_notes: Option<String>,
    /// Append-only log, oldest first.
    pub communications: Vec<CommunicationEntry>,
    /// When any field last changed.
    pub updated_at: OffsetDateTime,
}

impl Booking {
    /// Returns true if neither status nor payment may change any more.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal() || self.payment_status.is_terminal()
    }

    /// Name of the terminal state reached, if any.
    #[must_use]
    pub const fn terminal_state(&self) -> Option<&'static str> {
        if self.status.is_terminal() {
            Some(self.status.as_str())
        } else if self.payment_status.is_terminal() {
            Some(self.payment_status.as_str())
        } else {
            None
        }
    }
}

/// The result of a successful transition.
///
/// Transitions are atomic: the caller persists `new_booking` together with
/// `new_entries` in one unit of work, or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The booking after the transition, including the new log entries.
    pub new_booking: Booking,
    /// Log entries produced by this transition, in order.
    pub new_entries: Vec<CommunicationEntry>,
}

impl TransitionResult {
    /// Returns true if the transition changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.new_entries.is_empty()
    }
}
