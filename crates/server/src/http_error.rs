// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP error mapping.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use ride_booking_api::ApiError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error message.
    pub message: String,
    /// Seconds for the `Retry-After` header.
    pub retry_after_secs: Option<u64>,
}

impl HttpError {
    /// Maps an API error to its HTTP status.
    ///
    /// Internal failures carry their detail only when `dev` is set.
    #[must_use]
    pub fn from_api(err: ApiError, dev: bool) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. }
            | ApiError::PolicyRejection { .. }
            | ApiError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &err {
            ApiError::InvalidInput { .. } | ApiError::ResourceNotFound { .. } => {
                debug!(%err, %status, "Request rejected");
            }
            ApiError::PolicyRejection { .. } | ApiError::InvalidTransition { .. } => {
                info!(%err, %status, "Request refused");
            }
            ApiError::AuthenticationFailed { .. }
            | ApiError::Unauthorized { .. }
            | ApiError::Forbidden { .. }
            | ApiError::RateLimited { .. } => {
                warn!(%err, %status, "Guard check failed");
            }
            ApiError::Internal { .. } => {
                error!(%err, "Internal error");
            }
        }

        let retry_after_secs: Option<u64> = match &err {
            ApiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let message: String = if !err.is_client_error() && !dev {
            String::from("Internal server error")
        } else {
            err.to_string()
        };

        Self {
            status,
            message,
            retry_after_secs,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            success: false,
            error: self.message,
        });
        let mut response: Response = (self.status, body).into_response();
        if let Some(secs) = self.retry_after_secs {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
