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

//! Booking lifecycle.
//!
//! Creation and every later transition are pure functions over an explicit
//! booking value, a policy snapshot and an injected clock reading. Storage
//! and transport live in other crates.

mod apply;
mod command;
mod create;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply;
pub use command::{Command, VehicleAssignment};
pub use create::{
    BOOKING_ID_PREFIX, BookingRequest, CreationContext, booking_id_for, create_booking,
    format_booking_id, is_booking_id,
};
pub use error::CoreError;
pub use state::{Booking, Customer, TransitionResult, Trip};
