// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request guards: rate limiting, anti-forgery checked bodies and client
//! identity.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Form,
    body::{Body, Bytes},
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, COOKIE},
        request::Parts,
    },
};
use ride_booking_api::{
    ApiError, CSRF_COOKIE_NAME, CSRF_HEADER_NAME, CSRF_JSON_FIELD, resolve_client_id,
    token_from_form, verify_token,
};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::debug;

use crate::AppState;
use crate::http_error::HttpError;

/// Largest request body accepted by guarded endpoints.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Returns the value of the named cookie.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn bad_request(message: String) -> HttpError {
    HttpError {
        status: StatusCode::BAD_REQUEST,
        message,
        retry_after_secs: None,
    }
}

/// A request body that passed the double-submit anti-forgery check.
///
/// Accepts JSON and url-encoded form bodies. The token is read from the
/// `x-csrf-token` header, then the `_csrf` form field, then the
/// `csrfToken` JSON field, and must match the `csrf_token` cookie.
#[derive(Debug)]
pub struct Guarded<T>(pub T);

impl<T> FromRequest<AppState> for Guarded<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| bad_request(format!("Unreadable request body: {e}")))?;

        let is_form: bool = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));
        let cookie: Option<&str> = cookie_value(&parts.headers, CSRF_COOKIE_NAME);
        let header_token: Option<&str> = parts
            .headers
            .get(CSRF_HEADER_NAME)
            .and_then(|v| v.to_str().ok());

        if is_form {
            let text: &str = std::str::from_utf8(&bytes)
                .map_err(|_| bad_request(String::from("Form body is not UTF-8")))?;
            let submitted: Option<&str> = header_token.or_else(|| token_from_form(text));
            verify_token(cookie, submitted)
                .map_err(|e| HttpError::from_api(ApiError::from(e), state.dev))?;

            let rebuilt: Request = Request::from_parts(parts, Body::from(bytes));
            let Form(value) = Form::<T>::from_request(rebuilt, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            debug!("Accepted guarded form body");
            return Ok(Self(value));
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| bad_request(format!("Malformed JSON body: {e}")))?;
        let submitted: Option<&str> =
            header_token.or_else(|| value.get(CSRF_JSON_FIELD).and_then(|v| v.as_str()));
        verify_token(cookie, submitted)
            .map_err(|e| HttpError::from_api(ApiError::from(e), state.dev))?;

        let parsed: T = serde_json::from_value(value)
            .map_err(|e| bad_request(format!("Invalid request body: {e}")))?;
        debug!("Accepted guarded JSON body");
        Ok(Self(parsed))
    }
}

/// Anti-forgery check for mutations without a body; the token must be in
/// the `x-csrf-token` header.
#[derive(Debug, Clone, Copy)]
pub struct CsrfHeader;

impl FromRequestParts<AppState> for CsrfHeader {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let submitted: Option<&str> = parts
            .headers
            .get(CSRF_HEADER_NAME)
            .and_then(|v| v.to_str().ok());
        verify_token(cookie_value(&parts.headers, CSRF_COOKIE_NAME), submitted)
            .map_err(|e| HttpError::from_api(ApiError::from(e), state.dev))?;
        Ok(Self)
    }
}

/// The identity a request is rate limited under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl FromRequestParts<AppState> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer: Option<std::net::IpAddr> = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let headers: &HeaderMap = &parts.headers;
        let client_id: String = resolve_client_id(
            |name: &str| headers.get(name).and_then(|v| v.to_str().ok()),
            peer,
            state.trust_proxy_headers,
        );
        Ok(Self(client_id))
    }
}

/// Counts the request against the booking budget of its client.
///
/// Must precede [`Guarded`] in a handler's extractor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingBudget(pub ClientId);

impl FromRequestParts<AppState> for BookingBudget {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(client) = ClientId::from_request_parts(parts, state).await;
        state
            .rate_limiter
            .check(&state.booking_policy, &client.0, OffsetDateTime::now_utc())
            .map_err(|e| HttpError::from_api(ApiError::from(e), state.dev))?;
        Ok(Self(client))
    }
}
