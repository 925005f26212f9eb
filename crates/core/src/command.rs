// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_booking_audit::Channel;
use ride_booking_domain::{BookingStatus, Vehicle};

/// A vehicle an operator wants to bind to a booking, as loaded from the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleAssignment {
    /// Registry identifier of the vehicle.
    pub vehicle_id: i64,
    /// The vehicle record.
    pub vehicle: Vehicle,
    /// Another non-cancelled booking on the same travel date that already
    /// holds this vehicle, if any.
    pub held_by: Option<String>,
}

/// A command represents operator or customer intent as data only.
///
/// Commands are the only way to request booking state changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Confirm receipt of the advance.
    VerifyPayment {
        /// Bank or UPI reference, if supplied.
        transaction_id: Option<String>,
        /// Optional operator remark.
        notes: Option<String>,
    },
    /// Refuse a claimed payment.
    RejectPayment {
        /// Reason, appended to the admin notes.
        notes: Option<String>,
    },
    /// Return a verified advance.
    RefundPayment {
        /// Optional operator remark.
        notes: Option<String>,
    },
    /// Customer reports having paid the advance.
    ClaimPayment {
        /// Bank or UPI reference.
        transaction_id: String,
    },
    /// Change status, vehicle assignment or admin notes.
    UpdateStatus {
        /// New status.
        status: Option<BookingStatus>,
        /// Vehicle to assign.
        assignment: Option<VehicleAssignment>,
        /// Replacement admin notes.
        admin_notes: Option<String>,
    },
    /// Log an operator conversation or note.
    AddCommunication {
        /// How the conversation happened.
        channel: Channel,
        /// What was said.
        message: String,
    },
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VerifyPayment { .. } => "VerifyPayment",
            Self::RejectPayment { .. } => "RejectPayment",
            Self::RefundPayment { .. } => "RefundPayment",
            Self::ClaimPayment { .. } => "ClaimPayment",
            Self::UpdateStatus { .. } => "UpdateStatus",
            Self::AddCommunication { .. } => "AddCommunication",
        }
    }
}
