// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod booking_status;
mod error;
mod pricing;
mod schedule;
mod season;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityResult, ClassAvailability, calculate_availability};
pub use booking_status::{BookingStatus, PaymentStatus};
pub use pricing::{MIN_ADVANCE_AMOUNT, advance_amount};
pub use schedule::{
    check_schedule, format_date, format_pickup_time, local_today, parse_date, parse_pickup_time,
    parse_timezone, pickup_instant,
};
pub use season::{BlockStatus, is_blocked, resolve_tier};

// Re-export public types
pub use chrono_tz::Tz;
pub use error::DomainError;
pub use types::{
    BlockedRange, BookingSettings, DEFAULT_BLOCKED_MESSAGE, DEFAULT_MAX_ADVANCE_DAYS,
    DEFAULT_MIN_ADVANCE_HOURS, DateRange, PriceTier, SeasonRange, Vehicle, VehicleBlock,
    VehicleClass,
};
pub use validation::{
    MAX_MAX_ADVANCE_DAYS, MAX_MESSAGE_LENGTH, MAX_PASSENGERS, normalize_phone,
    normalize_registration, validate_customer_name, validate_email, validate_text_field,
    validate_message, validate_passenger_count, validate_settings, validate_total_amount,
};
