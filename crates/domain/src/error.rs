// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::VehicleClass;
use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Customer name is empty or too long.
    InvalidCustomerName(String),
    /// Phone number does not normalize to a 10-digit mobile number.
    InvalidPhone(String),
    /// Email address is malformed.
    InvalidEmail(String),
    /// A free-text field is empty or too long.
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Passenger count is outside the accepted range.
    InvalidPassengerCount(u32),
    /// Declared amount is not a positive whole number of rupees.
    InvalidAmount(i64),
    /// Vehicle class string is not one of the fleet classes.
    InvalidVehicleClass(String),
    /// Price tier string is not recognized.
    InvalidPriceTier(String),
    /// Booking status string is not recognized.
    InvalidBookingStatus(String),
    /// Payment status string is not recognized.
    InvalidPaymentStatus(String),
    /// Communication channel string is not recognized.
    InvalidChannel(String),
    /// Communication message is empty or too long.
    InvalidCommunication(String),
    /// Registration plate is empty or malformed.
    InvalidRegistration(String),
    /// Failed to parse a date string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a time-of-day string.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A configured date range ends before it starts.
    InvalidDateRange {
        /// Name of the range.
        name: String,
        /// Configured start.
        start: Date,
        /// Configured end.
        end: Date,
    },
    /// Booking settings violate a structural rule.
    InvalidSettings(String),
    /// Operator timezone name is not a valid IANA zone.
    InvalidTimezone(String),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// The travel date falls inside a blocked range.
    DateBlocked {
        /// Name of the matching blocked range.
        name: String,
        /// Customer-facing message.
        message: String,
        /// Whether phone booking is still offered.
        allow_phone_booking: bool,
    },
    /// Same-day bookings are disabled.
    SameDayNotAllowed,
    /// Pickup is sooner than the configured lead time.
    InsufficientLeadTime {
        /// The configured minimum lead time.
        min_advance_hours: u32,
    },
    /// Travel date is further ahead than the booking window allows.
    OutsideBookingWindow {
        /// The configured maximum booking window.
        max_advance_days: u32,
    },
    /// No vehicle of the requested class is free on the date.
    NoAvailability {
        /// The requested class.
        class: VehicleClass,
        /// The requested date.
        date: Date,
    },
    /// Booking status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// Payment status transition is not permitted.
    InvalidPaymentTransition {
        /// The current payment status.
        from: String,
        /// The requested payment status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The booking has reached a terminal state.
    BookingTerminal {
        /// The booking identifier.
        booking_id: String,
        /// The terminal state name.
        state: String,
    },
    /// Booking does not exist.
    BookingNotFound(String),
    /// Vehicle does not exist.
    VehicleNotFound(i64),
    /// Vehicle cannot be dispatched on the travel date.
    VehicleUnavailable {
        /// The vehicle identifier.
        vehicle_id: i64,
        /// The travel date.
        date: Date,
    },
    /// Vehicle is already bound to another booking on the same date.
    VehicleAlreadyAssigned {
        /// The vehicle identifier.
        vehicle_id: i64,
        /// The booking currently holding the vehicle.
        booking_id: String,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCustomerName(msg) => write!(f, "Invalid customer name: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone number: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email address: {msg}"),
            Self::InvalidField { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidPassengerCount(count) => {
                write!(
                    f,
                    "Invalid passenger count: {count}. Must be between 1 and 20"
                )
            }
            Self::InvalidAmount(amount) => {
                write!(f, "Invalid amount: {amount}. Must be greater than 0")
            }
            Self::InvalidVehicleClass(class) => {
                write!(
                    f,
                    "Invalid vehicle class '{class}'. Must be one of: hatchback, sedan, suv, muv, tempo_traveller"
                )
            }
            Self::InvalidPriceTier(tier) => {
                write!(
                    f,
                    "Invalid price tier '{tier}'. Must be one of: off_peak, standard, peak"
                )
            }
            Self::InvalidBookingStatus(status) => write!(f, "Invalid booking status: {status}"),
            Self::InvalidPaymentStatus(status) => write!(f, "Invalid payment status: {status}"),
            Self::InvalidChannel(channel) => {
                write!(f, "Invalid communication channel: {channel}")
            }
            Self::InvalidCommunication(msg) => write!(f, "Invalid communication: {msg}"),
            Self::InvalidRegistration(msg) => write!(f, "Invalid registration: {msg}"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::InvalidDateRange { name, start, end } => {
                write!(
                    f,
                    "Date range '{name}' is invalid: start {start} is after end {end}"
                )
            }
            Self::InvalidSettings(msg) => write!(f, "Invalid booking settings: {msg}"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateBlocked { message, .. } => write!(f, "{message}"),
            Self::SameDayNotAllowed => {
                write!(f, "Same-day bookings are not accepted online. Please call us to book.")
            }
            Self::InsufficientLeadTime { min_advance_hours } => {
                write!(
                    f,
                    "Bookings must be made at least {min_advance_hours} hours before pickup"
                )
            }
            Self::OutsideBookingWindow { max_advance_days } => {
                write!(
                    f,
                    "Bookings can only be made up to {max_advance_days} days in advance"
                )
            }
            Self::NoAvailability { class, date } => {
                write!(f, "No {class} vehicles are available on {date}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(
                    f,
                    "Cannot change booking status from '{from}' to '{to}': {reason}"
                )
            }
            Self::InvalidPaymentTransition { from, to, reason } => {
                write!(
                    f,
                    "Cannot change payment status from '{from}' to '{to}': {reason}"
                )
            }
            Self::BookingTerminal { booking_id, state } => {
                write!(
                    f,
                    "Booking {booking_id} is {state} and can no longer be changed"
                )
            }
            Self::BookingNotFound(booking_id) => write!(f, "Booking {booking_id} not found"),
            Self::VehicleNotFound(vehicle_id) => write!(f, "Vehicle {vehicle_id} not found"),
            Self::VehicleUnavailable { vehicle_id, date } => {
                write!(f, "Vehicle {vehicle_id} is not available on {date}")
            }
            Self::VehicleAlreadyAssigned {
                vehicle_id,
                booking_id,
            } => {
                write!(
                    f,
                    "Vehicle {vehicle_id} is already assigned to booking {booking_id}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
