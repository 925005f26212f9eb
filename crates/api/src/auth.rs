// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use ride_booking_audit::Author;
use ride_booking_persistence::{OperatorData, Persistence, PersistenceError, SessionData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::error::AuthError;
use crate::token::random_hex_token;

/// Operator roles for authorization.
///
/// Roles apply only to operators, never to customers. Customers act through
/// the public endpoints without an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: owns the fleet registry, the booking policy and operator
    /// accounts, in addition to everything a dispatcher may do.
    Admin,
    /// Dispatcher role: handles bookings day to day.
    ///
    /// Dispatchers may:
    /// - look up bookings
    /// - verify, reject or refund advance payments
    /// - change booking status and assign vehicles
    /// - log customer conversations
    Dispatcher,
}

impl Role {
    /// Returns the stored representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Dispatcher => "Dispatcher",
        }
    }

    /// Parses a stored role name.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "Admin" => Some(Self::Admin),
            "Dispatcher" => Some(Self::Dispatcher),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// Operator database identifier.
    pub operator_id: i64,
    /// Normalized login name, recorded as the author of log entries.
    pub login_name: String,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(operator_id: i64, login_name: String, role: Role) -> Self {
        Self {
            operator_id,
            login_name,
            role,
        }
    }

    /// The communication log author for actions taken by this operator.
    #[must_use]
    pub fn to_author(&self) -> Author {
        Author::Operator(self.login_name.clone())
    }

    fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        let role: Role =
            Role::from_stored(&operator.role).ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", operator.role),
            })?;
        Ok(Self::new(
            operator.operator_id,
            operator.login_name.clone(),
            role,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Dispatcher => {
                warn!(
                    login_name = %actor.login_name,
                    action,
                    "Dispatcher attempted an admin action"
                );
                Err(AuthError::Unauthorized {
                    action: action.to_string(),
                    required_role: String::from("Admin"),
                })
            }
        }
    }

    /// Checks if an actor may work on bookings.
    ///
    /// Both Admin and Dispatcher actors may verify payments, change status,
    /// assign vehicles and log conversations.
    ///
    /// # Errors
    ///
    /// Never fails for an authenticated actor.
    pub const fn authorize_handle_bookings(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Checks if an actor may add or change vehicles.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_fleet(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_fleet")
    }

    /// Checks if an actor may replace the booking policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_settings(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_settings")
    }

    /// Checks if an actor may create, list or disable operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_operators(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_operators")
    }
}

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Opaque bearer token.
    pub session_token: String,
    /// When the session stops being accepted.
    pub expires_at: OffsetDateTime,
    /// The operator the session belongs to.
    pub actor: AuthenticatedActor,
    /// The operator record at login time.
    pub operator: OperatorData,
}

/// Authentication service for bearer-token sessions.
pub struct AuthenticationService;

impl AuthenticationService {
    /// How long a session stays valid: one dispatch shift.
    pub const SESSION_DURATION: Duration = Duration::hours(12);

    /// Authenticates an operator and creates a session.
    ///
    /// Unknown login names and wrong passwords fail with the same reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the operator is
    /// disabled, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<IssuedSession, AuthError> {
        let bad_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!(login_name, "Login attempt for unknown operator");
                bad_credentials()
            })?;

        let password_ok: bool = persistence
            .verify_password(password, &operator.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(login_name = %operator.login_name, "Login attempt with wrong password");
            return Err(bad_credentials());
        }

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;
        let session_token: String = random_hex_token();
        let expires_at: OffsetDateTime = now + Self::SESSION_DURATION;

        persistence
            .create_session(&session_token, operator.operator_id, now, expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(operator.operator_id, now)
            .map_err(Self::map_persistence_error)?;

        info!(login_name = %operator.login_name, role = %actor.role, "Operator logged in");
        Ok(IssuedSession {
            session_token,
            expires_at,
            actor,
            operator,
        })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// An expired session is deleted on first use after expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// operator has been disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if now >= session.expires_at {
            debug!(session_id = session.session_id, "Rejecting expired session");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        persistence
            .update_session_activity(session.session_id, now)
            .map_err(Self::map_persistence_error)?;

        Ok((actor, operator))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;

        Ok(())
    }

    /// Maps persistence errors to internal errors; a broken store is never
    /// reported as bad credentials.
    #[allow(clippy::needless_pass_by_value)]
    pub(crate) fn map_persistence_error(err: PersistenceError) -> AuthError {
        error!(error = %err, "Credential store failure");
        AuthError::Internal {
            message: err.to_string(),
        }
    }
}
