// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::encode_timestamp;
use crate::diesel_schema::{operators, sessions};
use crate::error::{PersistenceError, is_unique_violation};

/// Creates a new operator.
///
/// The `login_name` is normalized to uppercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (will be normalized)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role (Admin or Dispatcher)
///
/// # Errors
///
/// Returns an error if the operator cannot be created or if the login name
/// already exists.
pub fn create_operator(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();

    info!(
        "Creating operator with login_name: {}, display_name: {}, role: {}",
        normalized_login, display_name, role
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(operators::table)
        .values((
            operators::login_name.eq(&normalized_login),
            operators::display_name.eq(display_name),
            operators::password_hash.eq(&password_hash),
            operators::role.eq(role),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateLoginName(normalized_login.clone())
            } else {
                PersistenceError::from(e)
            }
        })?;

    let operator_id: i64 = get_last_insert_rowid(conn)?;

    info!(operator_id, "Operator created successfully");
    Ok(operator_id)
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    operator_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for operator ID: {}", operator_id);

    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::last_login_at.eq(Some(encode_timestamp(now)?)))
        .execute(conn)?;

    Ok(())
}

/// Disables an operator and ends all of their sessions.
///
/// # Errors
///
/// Returns `OperatorNotFound` if no operator has this ID.
pub fn disable_operator(
    conn: &mut SqliteConnection,
    operator_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    info!("Disabling operator ID: {}", operator_id);
    let disabled_at: String = encode_timestamp(now)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let rows_affected: usize = diesel::update(operators::table)
            .filter(operators::operator_id.eq(operator_id))
            .set((
                operators::is_disabled.eq(1),
                operators::disabled_at.eq(Some(disabled_at.as_str())),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::OperatorNotFound(format!(
                "Operator with ID {operator_id} not found"
            )));
        }

        let sessions_ended: usize = diesel::delete(sessions::table)
            .filter(sessions::operator_id.eq(operator_id))
            .execute(conn)?;
        debug!(operator_id, sessions_ended, "Ended sessions for disabled operator");
        Ok(())
    })
}

/// Creates a new session for an operator.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    operator_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    debug!(
        "Creating session for operator ID: {} with expiration: {}",
        operator_id, expires_at
    );
    let created_at: String = encode_timestamp(now)?;

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::operator_id.eq(operator_id),
            sessions::created_at.eq(&created_at),
            sessions::last_activity_at.eq(&created_at),
            sessions::expires_at.eq(encode_timestamp(expires_at)?),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;

    debug!(session_id, operator_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(encode_timestamp(now)?))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token.
///
/// This is used for logout operations.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.le(encode_timestamp(now)?))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
