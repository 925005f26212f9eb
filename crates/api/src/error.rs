// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use ride_booking::CoreError;
use ride_booking_domain::DomainError;
use ride_booking_persistence::PersistenceError;

use crate::csrf::CsrfError;
use crate::password_policy::PasswordPolicyError;
use crate::rate_limit::RateLimitExceeded;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The credential store could not be consulted.
    Internal {
        /// A description of the infrastructure failure.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Internal { message } => write!(f, "Credential store error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// The server maps each variant to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The booking policy refused the request.
    ///
    /// The message is customer facing and is shown verbatim.
    PolicyRejection {
        /// The policy rule that refused the request.
        rule: String,
        /// A human-readable description of the refusal.
        message: String,
    },
    /// The requested status, payment or assignment change is not allowed.
    InvalidTransition {
        /// The transition rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The request failed an anti-forgery check.
    Forbidden {
        /// Why the request was refused.
        reason: String,
    },
    /// The client exceeded its request budget.
    RateLimited {
        /// Seconds until the current window resets.
        retry_after_secs: u64,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::PolicyRejection { message, .. } => write!(f, "{message}"),
            Self::InvalidTransition { message, .. } => write!(f, "{message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { reason } => write!(f, "Forbidden: {reason}"),
            Self::RateLimited { retry_after_secs } => {
                write!(
                    f,
                    "Too many requests. Please try again in {retry_after_secs} seconds"
                )
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Returns true if the error was caused by the client's request rather
    /// than by infrastructure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::InvalidInput {
            field: String::from("password"),
            message: err.to_string(),
        }
    }
}

impl From<RateLimitExceeded> for ApiError {
    fn from(err: RateLimitExceeded) -> Self {
        Self::RateLimited {
            retry_after_secs: err.retry_after_secs,
        }
    }
}

impl From<CsrfError> for ApiError {
    fn from(err: CsrfError) -> Self {
        Self::Forbidden {
            reason: err.to_string(),
        }
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn policy_rejection(rule: &str, message: String) -> ApiError {
    ApiError::PolicyRejection {
        rule: rule.to_string(),
        message,
    }
}

fn invalid_transition(rule: &str, message: String) -> ApiError {
    ApiError::InvalidTransition {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidCustomerName(_) => invalid_input("customerName", message),
        DomainError::InvalidPhone(_) => invalid_input("phone", message),
        DomainError::InvalidEmail(_) => invalid_input("email", message),
        DomainError::InvalidField { field, .. } => invalid_input(field, message),
        DomainError::InvalidPassengerCount(_) => invalid_input("passengers", message),
        DomainError::InvalidAmount(_) => invalid_input("totalAmount", message),
        DomainError::InvalidVehicleClass(_) => invalid_input("vehicleClass", message),
        DomainError::InvalidPriceTier(_) => invalid_input("tier", message),
        DomainError::InvalidBookingStatus(_) => invalid_input("status", message),
        DomainError::InvalidPaymentStatus(_) => invalid_input("paymentStatus", message),
        DomainError::InvalidChannel(_) => invalid_input("channel", message),
        DomainError::InvalidCommunication(_) => invalid_input("message", message),
        DomainError::InvalidRegistration(_) => invalid_input("registration", message),
        DomainError::DateParseError { .. } | DomainError::DateArithmeticOverflow { .. } => {
            invalid_input("date", message)
        }
        DomainError::TimeParseError { .. } => invalid_input("pickupTime", message),
        DomainError::InvalidDateRange { .. } | DomainError::InvalidSettings(_) => {
            invalid_input("settings", message)
        }
        DomainError::InvalidTimezone(_) => invalid_input("timezone", message),
        DomainError::DateBlocked { .. } => policy_rejection("blocked_date", message),
        DomainError::SameDayNotAllowed => policy_rejection("same_day", message),
        DomainError::InsufficientLeadTime { .. } => policy_rejection("lead_time", message),
        DomainError::OutsideBookingWindow { .. } => policy_rejection("booking_window", message),
        DomainError::NoAvailability { .. } => policy_rejection("no_availability", message),
        DomainError::InvalidStatusTransition { .. } => {
            invalid_transition("status_transition", message)
        }
        DomainError::InvalidPaymentTransition { .. } => {
            invalid_transition("payment_transition", message)
        }
        DomainError::BookingTerminal { .. } => invalid_transition("terminal_booking", message),
        DomainError::VehicleUnavailable { .. } => {
            invalid_transition("vehicle_unavailable", message)
        }
        DomainError::VehicleAlreadyAssigned { .. } => {
            invalid_transition("vehicle_conflict", message)
        }
        DomainError::BookingNotFound(booking_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        DomainError::VehicleNotFound(vehicle_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Vehicle"),
            message: format!("Vehicle {vehicle_id} does not exist"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::MissingTransactionId => ApiError::InvalidInput {
            field: String::from("transactionId"),
            message: CoreError::MissingTransactionId.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Not-found and uniqueness failures are client errors; everything else is
/// internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::BookingNotFound(booking_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        PersistenceError::VehicleNotFound(vehicle_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Vehicle"),
            message: format!("Vehicle {vehicle_id} does not exist"),
        },
        PersistenceError::OperatorNotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message: msg,
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::DuplicateRegistration(registration) => policy_rejection(
            "unique_registration",
            format!("Vehicle {registration} is already registered"),
        ),
        PersistenceError::DuplicateLoginName(login_name) => policy_rejection(
            "unique_login_name",
            format!("Operator {login_name} already exists"),
        ),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
