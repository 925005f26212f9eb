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

//! API boundary layer.
//!
//! Turns wire requests into domain values, enforces operator roles, runs
//! the core lifecycle against persistence, and maps every failure into
//! an [`ApiError`]. Transport-agnostic: the server crate owns HTTP.

mod auth;
mod csrf;
mod error;
mod handlers;
mod notification;
mod password_policy;
mod rate_limit;
mod request_response;
mod token;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, IssuedSession, Role,
};
pub use csrf::{
    CSRF_COOKIE_NAME, CSRF_FORM_FIELD, CSRF_HEADER_NAME, CSRF_JSON_FIELD, CsrfError, issue_token,
    token_from_form, verify_token,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    BOOTSTRAP_ADMIN_DISPLAY_NAME, MAX_BOOKING_ID_ATTEMPTS, add_communication, bootstrap_admin,
    check_availability, create_booking, create_booking_with_entropy, create_operator,
    create_vehicle, disable_operator, get_booking, get_settings, list_bookings_by_phone,
    list_operators, list_vehicles, login, logout, record_payment_claim, sweep_expired_sessions,
    update_settings, update_status, update_vehicle, verify_payment,
};
pub use notification::{
    LogNotifier, NotificationError, NotificationEvent, Notifier, TEMPLATE_KEYS, render_template,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use rate_limit::{
    DEFAULT_BOOKING_LIMIT, DEFAULT_BOOKING_WINDOW_SECS, InMemoryRateLimitStore, RateLimitCount,
    RateLimitExceeded, RateLimitPolicy, RateLimitStore, RateLimiter, UNKNOWN_CLIENT,
    resolve_client_id,
};
pub use request_response::{
    AddCommunicationRequest, AvailabilityResponse, BlockedRangeInfo, BookingInfo, BookingResponse,
    BookingSummary, ClassAvailabilityInfo, CommunicationInfo, CreateBookingRequest,
    CreateBookingResponse, CreateOperatorRequest, CsrfTokenResponse, HealthResponse,
    ListBookingsResponse, ListOperatorsResponse, ListVehiclesResponse, LoginRequest, LoginResponse,
    OperatorInfo, OperatorResponse, PaymentClaimRequest, PaymentClaimResponse, SeasonInfo,
    SettingsResponse, SuccessResponse, UpdateSettingsRequest, UpdateStatusRequest,
    VehicleBlockInfo, VehicleInfo, VehicleRequest, VehicleResponse, VerifyPaymentRequest,
};
