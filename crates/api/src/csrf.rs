// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Double-submit anti-forgery tokens.
//!
//! The token is issued as an http-only cookie and must be echoed back by
//! every mutating request in a header, a form field or a JSON field.

use thiserror::Error;
use tracing::warn;

use crate::token::{constant_time_eq, is_hex_token, random_hex_token};

/// Cookie carrying the issued token.
pub const CSRF_COOKIE_NAME: &str = "csrf_token";

/// Header a client may echo the token in.
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Form field a client may echo the token in.
pub const CSRF_FORM_FIELD: &str = "_csrf";

/// JSON body field a client may echo the token in.
pub const CSRF_JSON_FIELD: &str = "csrfToken";

/// Anti-forgery check failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CsrfError {
    /// No token cookie, or a malformed one.
    #[error("Missing anti-forgery cookie")]
    MissingCookie,
    /// The request did not echo a token.
    #[error("Missing anti-forgery token")]
    MissingToken,
    /// The echoed token differs from the cookie.
    #[error("Invalid anti-forgery token")]
    Mismatch,
}

/// Returns the token to hand out: the existing cookie value when it is
/// well-formed, otherwise a fresh token.
#[must_use]
pub fn issue_token(existing_cookie: Option<&str>) -> String {
    match existing_cookie {
        Some(token) if is_hex_token(token) => token.to_string(),
        _ => random_hex_token(),
    }
}

/// Checks the echoed token against the cookie.
///
/// # Errors
///
/// Returns a `CsrfError` naming the failed check.
pub fn verify_token(cookie: Option<&str>, submitted: Option<&str>) -> Result<(), CsrfError> {
    let cookie: &str = cookie
        .filter(|c| is_hex_token(c))
        .ok_or(CsrfError::MissingCookie)?;
    let submitted: &str = submitted
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CsrfError::MissingToken)?;

    if constant_time_eq(cookie, submitted) {
        Ok(())
    } else {
        warn!("Anti-forgery token mismatch");
        Err(CsrfError::Mismatch)
    }
}

/// Finds the token field in an `application/x-www-form-urlencoded` body.
///
/// Tokens are hex, so no percent-decoding is needed for a valid value.
#[must_use]
pub fn token_from_form(body: &str) -> Option<&str> {
    body.split('&').find_map(|pair| {
        pair.split_once('=')
            .filter(|(key, _)| *key == CSRF_FORM_FIELD)
            .map(|(_, value)| value)
    })
}
