// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the taxi booking engine.
//!
//! This crate stores the fleet registry, bookings with their append-only
//! communication logs, the booking policy, and operator accounts with
//! their sessions. It is built on Diesel over `SQLite`.
//!
//! ## Storage conventions
//!
//! - Dates are stored as `YYYY-MM-DD` text and pickup times as `HH:MM`.
//! - Timestamps are stored in UTC at second precision.
//! - Enumerated values are stored as their lower-case wire names.
//! - Bookings are never deleted; cancellation is a status.
//!
//! ## Atomicity
//!
//! Every booking write (fields plus new communication entries) and every
//! policy replacement runs in a single transaction.
//!
//! ## Test isolation
//!
//! `Persistence::new_in_memory` gives each caller its own shared-cache
//! in-memory database, named from an atomic counter.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use ride_booking::{Booking, TransitionResult};
use ride_booking_domain::{BookingSettings, Vehicle};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{OperatorData, SessionData};
pub use error::PersistenceError;

/// Persistence adapter owning one `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_booking_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Fleet Registry
    // ========================================================================

    /// Lists every registered vehicle with its blocked dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, PersistenceError> {
        queries::vehicles::list_vehicles(&mut self.conn)
    }

    /// Retrieves a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_vehicle(&mut self, vehicle_id: i64) -> Result<Option<Vehicle>, PersistenceError> {
        queries::vehicles::get_vehicle(&mut self.conn, vehicle_id)
    }

    /// Registers a vehicle and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` if the registration already exists.
    pub fn create_vehicle(&mut self, vehicle: &Vehicle) -> Result<i64, PersistenceError> {
        mutations::vehicles::create_vehicle(&mut self.conn, vehicle)
    }

    /// Replaces a vehicle's details and blocked dates.
    ///
    /// # Errors
    ///
    /// Returns `VehicleNotFound` if the vehicle does not exist.
    pub fn update_vehicle(
        &mut self,
        vehicle_id: i64,
        vehicle: &Vehicle,
    ) -> Result<(), PersistenceError> {
        mutations::vehicles::update_vehicle(&mut self.conn, vehicle_id, vehicle)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Inserts a newly created booking with its initial log.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateBookingId` if the booking ID is already taken.
    pub fn insert_booking(&mut self, booking: &Booking) -> Result<i64, PersistenceError> {
        mutations::bookings::insert_booking(&mut self.conn, booking)
    }

    /// Retrieves a booking with its communication log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_booking(&mut self, booking_id: &str) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::get_booking(&mut self.conn, booking_id)
    }

    /// Lists bookings made with a normalized phone number, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_bookings_by_phone(
        &mut self,
        phone: &str,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_bookings_by_phone(&mut self.conn, phone)
    }

    /// Persists a transition in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking does not exist.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<(), PersistenceError> {
        mutations::bookings::persist_transition(&mut self.conn, result)
    }

    /// Returns vehicles assigned to non-cancelled bookings on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn assigned_vehicle_ids_on(
        &mut self,
        travel_date: Date,
    ) -> Result<HashSet<i64>, PersistenceError> {
        queries::bookings::assigned_vehicle_ids_on(&mut self.conn, travel_date)
    }

    /// Returns the booking that holds a vehicle on a date, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn booking_holding_vehicle(
        &mut self,
        vehicle_id: i64,
        travel_date: Date,
    ) -> Result<Option<String>, PersistenceError> {
        queries::bookings::booking_holding_vehicle(&mut self.conn, vehicle_id, travel_date)
    }

    // ========================================================================
    // Booking Policy
    // ========================================================================

    /// Loads the booking policy, or the defaults when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_settings(&mut self) -> Result<BookingSettings, PersistenceError> {
        queries::settings::get_settings(&mut self.conn)
    }

    /// Replaces the booking policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn replace_settings(&mut self, settings: &BookingSettings) -> Result<(), PersistenceError> {
        mutations::settings::replace_settings(&mut self.conn, settings)
    }

    // ========================================================================
    // Operator Management
    // ========================================================================

    /// Creates a new operator.
    ///
    /// # Arguments
    ///
    /// * `login_name` - The login name (will be normalized)
    /// * `display_name` - The display name
    /// * `password` - The plain-text password (will be hashed)
    /// * `role` - The role (Admin or Dispatcher)
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be created.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
        )
    }

    /// Retrieves an operator by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an operator by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// Lists all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_operators(&mut self) -> Result<Vec<OperatorData>, PersistenceError> {
        queries::operators::list_operators(&mut self.conn)
    }

    /// Counts the total number of operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::operators::count_operators(&mut self.conn)
    }

    /// Counts the number of active admin operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_admin_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::operators::count_active_admin_operators(&mut self.conn)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(
        &mut self,
        operator_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id, now)
    }

    /// Disables an operator and ends their sessions.
    ///
    /// # Errors
    ///
    /// Returns `OperatorNotFound` if the operator does not exist.
    pub fn disable_operator(
        &mut self,
        operator_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::operators::disable_operator(&mut self.conn, operator_id, now)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if password verification fails.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::operators::verify_password(password, password_hash)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a new session for an operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        operator_id: i64,
        now: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(
            &mut self.conn,
            session_token,
            operator_id,
            now,
            expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(
        &mut self,
        session_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id, now)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all sessions that have expired by `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::operators::delete_expired_sessions(&mut self.conn, now)
    }
}
