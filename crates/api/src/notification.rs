// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer notifications.
//!
//! Notifications are sent after a mutation has been committed and never
//! influence its outcome. Templates are plain text with `{{key}}`
//! placeholders; only the whitelisted keys are substituted.

use std::collections::HashMap;

use ride_booking::Booking;
use ride_booking_domain::{BookingStatus, format_date, format_pickup_time};
use thiserror::Error;
use tracing::info;

/// Placeholder keys a template may use.
pub const TEMPLATE_KEYS: [&str; 11] = [
    "bookingId",
    "customerName",
    "pickupLocation",
    "dropLocation",
    "travelDate",
    "pickupTime",
    "vehicleClass",
    "totalAmount",
    "advanceAmount",
    "status",
    "paymentStatus",
];

/// A notification could not be delivered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Notification delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Something a customer may want to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A booking was accepted.
    BookingCreated(Booking),
    /// The advance payment was verified.
    PaymentVerified(Booking),
    /// The claimed advance payment was rejected.
    PaymentRejected(Booking),
    /// The booking status changed.
    StatusChanged {
        /// The booking after the change.
        booking: Booking,
        /// The status before the change.
        previous: BookingStatus,
    },
}

impl NotificationEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BookingCreated(_) => "booking_created",
            Self::PaymentVerified(_) => "payment_verified",
            Self::PaymentRejected(_) => "payment_rejected",
            Self::StatusChanged { .. } => "status_changed",
        }
    }

    /// The booking the event is about.
    #[must_use]
    pub const fn booking(&self) -> &Booking {
        match self {
            Self::BookingCreated(booking)
            | Self::PaymentVerified(booking)
            | Self::PaymentRejected(booking)
            | Self::StatusChanged { booking, .. } => booking,
        }
    }

    /// The built-in message template for this event.
    #[must_use]
    pub const fn default_template(&self) -> &'static str {
        match self {
            Self::BookingCreated(_) => {
                "Hi {{customerName}}, booking {{bookingId}} for {{travelDate}} {{pickupTime}} \
                 ({{pickupLocation}} to {{dropLocation}}) is received. \
                 Please pay the advance of Rs. {{advanceAmount}} to confirm."
            }
            Self::PaymentVerified(_) => {
                "Hi {{customerName}}, we received your advance of Rs. {{advanceAmount}}. \
                 Booking {{bookingId}} is {{status}}."
            }
            Self::PaymentRejected(_) => {
                "Hi {{customerName}}, we could not verify the advance for booking \
                 {{bookingId}}. Please check the transaction reference and try again."
            }
            Self::StatusChanged { .. } => {
                "Hi {{customerName}}, booking {{bookingId}} is now {{status}}."
            }
        }
    }

    /// Placeholder values for this event's booking.
    #[must_use]
    pub fn placeholders(&self) -> HashMap<&'static str, String> {
        let booking: &Booking = self.booking();
        HashMap::from([
            ("bookingId", booking.booking_id.clone()),
            ("customerName", booking.customer.name.clone()),
            ("pickupLocation", booking.trip.pickup_location.clone()),
            ("dropLocation", booking.trip.drop_location.clone()),
            ("travelDate", format_date(booking.trip.travel_date)),
            ("pickupTime", format_pickup_time(booking.trip.pickup_time)),
            ("vehicleClass", booking.vehicle_class.to_string()),
            ("totalAmount", booking.total_amount.to_string()),
            ("advanceAmount", booking.advance_amount.to_string()),
            ("status", booking.status.to_string()),
            ("paymentStatus", booking.payment_status.to_string()),
        ])
    }

    /// Renders the default template for this event.
    #[must_use]
    pub fn render(&self) -> String {
        render_template(self.default_template(), &self.placeholders())
    }
}

/// Substitutes whitelisted `{{key}}` placeholders in `template`.
///
/// Unknown keys, and whitelisted keys with no value, are left verbatim.
#[must_use]
pub fn render_template(template: &str, placeholders: &HashMap<&str, String>) -> String {
    let mut out: String = String::with_capacity(template.len());
    let mut rest: &str = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open: &str = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key: &str = after_open[..close].trim();
        let value: Option<&String> = if TEMPLATE_KEYS.contains(&key) {
            placeholders.get(key)
        } else {
            None
        };
        match value {
            Some(v) => out.push_str(v),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Delivers rendered notifications.
pub trait Notifier: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery failed. Callers log and drop it.
    fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError>;
}

/// Writes the rendered message to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let booking: &Booking = event.booking();
        info!(
            event = event.name(),
            booking_id = %booking.booking_id,
            phone = %booking.customer.phone,
            message = %event.render(),
            "Customer notification"
        );
        Ok(())
    }
}
