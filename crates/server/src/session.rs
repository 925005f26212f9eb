// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for operator endpoints.
//!
//! Operators authenticate with `Authorization: Bearer <token>`; the token
//! is validated against the session table on every request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use ride_booking_api::{ApiError, AuthError, AuthenticatedActor, AuthenticationService};
use ride_booking_persistence::OperatorData;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::AppState;
use crate::http_error::{ErrorResponse, HttpError};

/// Extractor for authenticated operators.
///
/// # Errors
///
/// Rejects with HTTP 401 if:
/// - Authorization header is missing
/// - Authorization header format is invalid
/// - Session token is unknown or expired
/// - Operator is disabled
///
/// Rejects with HTTP 500 if the session store cannot be read.
pub struct SessionOperator {
    /// The operator acting.
    pub actor: AuthenticatedActor,
    /// The operator record.
    pub operator: OperatorData,
    /// The bearer token, for logout.
    pub token: String,
}

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let mut persistence = state.persistence.lock().await;
        let (actor, operator) = AuthenticationService::validate_session(
            &mut persistence,
            token,
            now,
        )
        .map_err(|e| match e {
            AuthError::Internal { .. } => {
                SessionError::Unavailable(HttpError::from_api(ApiError::from(e), state.dev))
            }
            other => {
                warn!(error = %other, "Session validation failed");
                SessionError::InvalidSession(other.to_string())
            }
        })?;
        drop(persistence);

        debug!(
            login_name = %operator.login_name,
            role = %actor.role,
            "Session validated"
        );

        Ok(Self {
            actor,
            operator,
            token: token.to_string(),
        })
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
    /// The session store could not be consulted.
    Unavailable(HttpError),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
            Self::Unavailable(err) => return err.into_response(),
        };

        (
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
