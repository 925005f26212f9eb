// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and payment status tracking and transition logic.
//!
//! A booking carries two independent state machines. Transitions are
//! operator-initiated (or, for a payment claim, customer-initiated); the
//! system never advances either status based on time alone.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of the trip itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested, awaiting confirmation.
    #[default]
    Pending,
    /// Accepted by the operator.
    Confirmed,
    /// Trip under way.
    InProgress,
    /// Trip finished.
    Completed,
    /// Cancelled before the trip started.
    Cancelled,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further status change is accepted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is
    /// not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid: bool = match self {
            Self::Pending => matches!(new_status, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(new_status, Self::InProgress | Self::Cancelled),
            Self::InProgress => matches!(new_status, Self::Completed),
            Self::Completed | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by booking lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of the advance payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment claimed yet.
    #[default]
    Pending,
    /// Customer claims to have paid and supplied proof.
    ScreenshotUploaded,
    /// Operator confirmed receipt.
    Verified,
    /// Operator could not match the claimed payment.
    Rejected,
    /// Verified advance returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ScreenshotUploaded => "screenshot_uploaded",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Refunded => "refunded",
        }
    }

    /// Returns true if no further payment change is accepted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Refunded)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// A rejected payment may be retried: it returns to `pending`, or moves
    /// straight to `screenshot_uploaded` when the customer resubmits proof.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPaymentTransition` if the transition is
    /// not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        let valid: bool = match self {
            Self::Pending => matches!(
                new_status,
                Self::ScreenshotUploaded | Self::Verified | Self::Rejected
            ),
            Self::ScreenshotUploaded => matches!(new_status, Self::Verified | Self::Rejected),
            Self::Rejected => matches!(new_status, Self::Pending | Self::ScreenshotUploaded),
            Self::Verified => matches!(new_status, Self::Refunded),
            Self::Refunded => false,
        };

        if valid {
            Ok(())
        } else {
            let reason: &str = if self.is_terminal() {
                "cannot transition from terminal state"
            } else {
                "transition not permitted by payment lifecycle rules"
            };
            Err(DomainError::InvalidPaymentTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: reason.to_string(),
            })
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "screenshot_uploaded" => Ok(Self::ScreenshotUploaded),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
