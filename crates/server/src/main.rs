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

mod guard;
mod http_error;
mod session;

#[cfg(test)]
mod tests;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::{ArgAction, Parser};
use ride_booking_api::{
    AddCommunicationRequest, ApiError, AvailabilityResponse, BookingResponse, CSRF_COOKIE_NAME,
    CreateBookingRequest, CreateBookingResponse, CreateOperatorRequest, CsrfTokenResponse,
    DEFAULT_BOOKING_LIMIT, DEFAULT_BOOKING_WINDOW_SECS, HealthResponse, ListBookingsResponse,
    ListOperatorsResponse, ListVehiclesResponse, LogNotifier, LoginRequest, LoginResponse,
    NotificationEvent, Notifier, OperatorResponse, PaymentClaimRequest, PaymentClaimResponse,
    RateLimitPolicy, RateLimiter, SettingsResponse, SuccessResponse, UpdateSettingsRequest,
    UpdateStatusRequest, VehicleRequest, VehicleResponse, VerifyPaymentRequest, issue_token,
};
use ride_booking_domain::{Tz, parse_timezone};
use ride_booking_persistence::Persistence;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::guard::{BookingBudget, CsrfHeader, Guarded, cookie_value};
use crate::http_error::HttpError;
use crate::session::SessionOperator;

/// Interval between sweeps of rate-limit counters and expired sessions.
const SWEEP_INTERVAL_SECS: u64 = 300;

/// Ride Booking Server - HTTP server for the taxi reservation engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "RIDE_BOOKING_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "RIDE_BOOKING_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "RIDE_BOOKING_PORT", default_value_t = 3000)]
    port: u16,

    /// IANA timezone travel dates and lead times are evaluated in
    #[arg(long, env = "RIDE_BOOKING_TIMEZONE", default_value = "Asia/Kolkata")]
    timezone: String,

    /// Development mode: detailed internal errors and a non-Secure cookie
    #[arg(long, env = "RIDE_BOOKING_DEV")]
    dev: bool,

    /// Identify clients by proxy headers such as `x-forwarded-for`; enable
    /// only behind a reverse proxy that overwrites them
    #[arg(
        long,
        env = "RIDE_BOOKING_TRUST_PROXY_HEADERS",
        default_value_t = false,
        action = ArgAction::Set
    )]
    trust_proxy_headers: bool,

    /// Booking requests accepted per client per window
    #[arg(long, env = "RIDE_BOOKING_RATE_LIMIT", default_value_t = DEFAULT_BOOKING_LIMIT)]
    booking_rate_limit: u32,

    /// Length of the booking rate-limit window in seconds
    #[arg(
        long,
        env = "RIDE_BOOKING_RATE_WINDOW_SECS",
        default_value_t = DEFAULT_BOOKING_WINDOW_SECS
    )]
    booking_rate_window_secs: u64,

    /// Login name of the Admin operator created when no operators exist
    #[arg(long, env = "RIDE_BOOKING_BOOTSTRAP_ADMIN_LOGIN")]
    bootstrap_admin_login: Option<String>,

    /// Password of the bootstrap Admin operator
    #[arg(long, env = "RIDE_BOOKING_BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    bootstrap_admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// Persistence is a single `SQLite` connection behind a mutex; every
/// mutation is one unit of work while the lock is held.
#[derive(Clone)]
pub struct AppState {
    /// The persistence layer.
    pub persistence: Arc<Mutex<Persistence>>,
    /// Per-client request counters.
    pub rate_limiter: RateLimiter,
    /// Budget for booking creation and payment claims.
    pub booking_policy: RateLimitPolicy,
    /// Customer notification sink.
    pub notifier: Arc<dyn Notifier>,
    /// Business timezone.
    pub timezone: Tz,
    /// Development mode.
    pub dev: bool,
    /// Whether client identity may come from proxy headers.
    pub trust_proxy_headers: bool,
}

impl AppState {
    fn fail(&self, err: ApiError) -> HttpError {
        HttpError::from_api(err, self.dev)
    }

    /// Hands `event` to the notifier without blocking the response.
    fn dispatch(&self, event: NotificationEvent) {
        let notifier: Arc<dyn Notifier> = Arc::clone(&self.notifier);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = notifier.notify(&event) {
                warn!(event = event.name(), error = %e, "Notification dropped");
            }
        });
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("timezone", &self.timezone)
            .field("dev", &self.dev)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish_non_exhaustive()
    }
}

/// Query for the customer booking lookup.
#[derive(Debug, Clone, Deserialize)]
struct BookingsQuery {
    phone: Option<String>,
}

/// Query for the availability check.
#[derive(Debug, Clone, Deserialize)]
struct AvailabilityQuery {
    date: Option<String>,
    class: Option<String>,
}

/// Builds the `Set-Cookie` value for the anti-forgery token.
fn csrf_cookie(token: &str, secure: bool) -> String {
    let mut cookie: String =
        format!("{CSRF_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// ============================================================================
// Public endpoints
// ============================================================================

#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: String::from("ok"),
    })
}

/// Issues (or reissues) the anti-forgery token.
#[allow(clippy::unused_async)]
async fn handle_csrf_token(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let token: String = issue_token(cookie_value(&headers, CSRF_COOKIE_NAME));
    let cookie: HeaderValue =
        HeaderValue::from_str(&csrf_cookie(&token, !app_state.dev)).map_err(|e| {
            app_state.fail(ApiError::Internal {
                message: format!("Unencodable cookie: {e}"),
            })
        })?;

    let body: Json<CsrfTokenResponse> = Json(CsrfTokenResponse {
        success: true,
        csrf_token: token,
    });
    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    BookingBudget(client): BookingBudget,
    Guarded(req): Guarded<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), HttpError> {
    info!(client_id = %client.0, vehicle_class = %req.vehicle_class, "Handling create_booking");

    let mut persistence = app_state.persistence.lock().await;
    let (response, event) = ride_booking_api::create_booking(
        &mut persistence,
        req,
        OffsetDateTime::now_utc(),
        app_state.timezone,
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);

    app_state.dispatch(event);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let phone: &str = query.phone.as_deref().unwrap_or_default();
    let mut persistence = app_state.persistence.lock().await;
    let response: ListBookingsResponse =
        ride_booking_api::list_bookings_by_phone(&mut persistence, phone)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_payment_claim(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<String>,
    BookingBudget(client): BookingBudget,
    Guarded(req): Guarded<PaymentClaimRequest>,
) -> Result<Json<PaymentClaimResponse>, HttpError> {
    info!(client_id = %client.0, booking_id = %booking_id, "Handling payment_claim");

    let mut persistence = app_state.persistence.lock().await;
    let response: PaymentClaimResponse = ride_booking_api::record_payment_claim(
        &mut persistence,
        &booking_id,
        req,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_check_availability(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AvailabilityResponse = ride_booking_api::check_availability(
        &mut persistence,
        query.date.as_deref(),
        query.class.as_deref(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_settings(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<SettingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: SettingsResponse =
        ride_booking_api::get_settings(&mut persistence).map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Guarded(req): Guarded<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login");
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        ride_booking_api::login(&mut persistence, &req, OffsetDateTime::now_utc())
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> Result<Json<SuccessResponse>, HttpError> {
    info!(login_name = %session.operator.login_name, "Handling logout");
    let mut persistence = app_state.persistence.lock().await;
    ride_booking_api::logout(&mut persistence, &session.token).map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================================
// Operator endpoints
// ============================================================================

async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingResponse>, HttpError> {
    debug!(booking_id = %booking_id, "Handling get_booking");
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse =
        ride_booking_api::get_booking(&mut persistence, &session.actor, &booking_id)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_verify_payment(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<VerifyPaymentRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        login_name = %session.operator.login_name,
        booking_id = %req.booking_id,
        action = %req.action,
        "Handling verify_payment"
    );
    let mut persistence = app_state.persistence.lock().await;
    let (response, event) = ride_booking_api::verify_payment(
        &mut persistence,
        &session.actor,
        req,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);

    if let Some(event) = event {
        app_state.dispatch(event);
    }
    Ok(Json(response))
}

async fn handle_update_status(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        login_name = %session.operator.login_name,
        booking_id = %req.booking_id,
        "Handling update_status"
    );
    let mut persistence = app_state.persistence.lock().await;
    let (response, event) = ride_booking_api::update_status(
        &mut persistence,
        &session.actor,
        req,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);

    if let Some(event) = event {
        app_state.dispatch(event);
    }
    Ok(Json(response))
}

async fn handle_add_communication(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<AddCommunicationRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        login_name = %session.operator.login_name,
        booking_id = %req.booking_id,
        channel = %req.channel,
        "Handling add_communication"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse = ride_booking_api::add_communication(
        &mut persistence,
        &session.actor,
        req,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_vehicles(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> Result<Json<ListVehiclesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListVehiclesResponse =
        ride_booking_api::list_vehicles(&mut persistence, &session.actor)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_create_vehicle(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<VehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), HttpError> {
    info!(
        login_name = %session.operator.login_name,
        registration = %req.registration,
        "Handling create_vehicle"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: VehicleResponse =
        ride_booking_api::create_vehicle(&mut persistence, &session.actor, req)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_update_vehicle(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(vehicle_id): Path<i64>,
    Guarded(req): Guarded<VehicleRequest>,
) -> Result<Json<VehicleResponse>, HttpError> {
    info!(
        login_name = %session.operator.login_name,
        vehicle_id,
        "Handling update_vehicle"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: VehicleResponse =
        ride_booking_api::update_vehicle(&mut persistence, &session.actor, vehicle_id, req)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_settings(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, HttpError> {
    info!(login_name = %session.operator.login_name, "Handling update_settings");
    let mut persistence = app_state.persistence.lock().await;
    let response: SettingsResponse =
        ride_booking_api::update_settings(&mut persistence, &session.actor, req)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_operators(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
) -> Result<Json<ListOperatorsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListOperatorsResponse =
        ride_booking_api::list_operators(&mut persistence, &session.actor)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Guarded(req): Guarded<CreateOperatorRequest>,
) -> Result<(StatusCode, Json<OperatorResponse>), HttpError> {
    info!(
        login_name = %session.operator.login_name,
        new_login_name = %req.login_name,
        "Handling create_operator"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: OperatorResponse =
        ride_booking_api::create_operator(&mut persistence, &session.actor, req)
            .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_disable_operator(
    AxumState(app_state): AxumState<AppState>,
    session: SessionOperator,
    Path(operator_id): Path<i64>,
    _csrf: CsrfHeader,
) -> Result<Json<OperatorResponse>, HttpError> {
    info!(
        login_name = %session.operator.login_name,
        operator_id,
        "Handling disable_operator"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: OperatorResponse = ride_booking_api::disable_operator(
        &mut persistence,
        &session.actor,
        operator_id,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| app_state.fail(e))?;
    drop(persistence);
    Ok(Json(response))
}

/// Builds the application router.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/csrf-token", get(handle_csrf_token))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings", get(handle_list_bookings))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/payment-claim", post(handle_payment_claim))
        .route("/availability", get(handle_check_availability))
        .route("/settings/seasons", get(handle_get_settings))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/admin/bookings/verify-payment", post(handle_verify_payment))
        .route("/admin/bookings/update-status", post(handle_update_status))
        .route("/admin/bookings/communications", post(handle_add_communication))
        .route("/admin/vehicles", get(handle_list_vehicles))
        .route("/admin/vehicles", post(handle_create_vehicle))
        .route("/admin/vehicles/{vehicle_id}", put(handle_update_vehicle))
        .route("/admin/settings", put(handle_update_settings))
        .route("/admin/operators", get(handle_list_operators))
        .route("/admin/operators", post(handle_create_operator))
        .route("/admin/operators/{operator_id}/disable", post(handle_disable_operator))
        .with_state(app_state)
}

/// Periodically drops expired rate-limit counters and sessions.
fn spawn_sweeper(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval: tokio::time::Interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let now: OffsetDateTime = OffsetDateTime::now_utc();
            let counters: usize = app_state.rate_limiter.sweep(now);

            let mut persistence = app_state.persistence.lock().await;
            match ride_booking_api::sweep_expired_sessions(&mut persistence, now) {
                Ok(sessions) => debug!(counters, sessions, "Sweep complete"),
                Err(e) => error!(error = %e, "Session sweep failed"),
            }
            drop(persistence);
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Ride Booking Server");

    let timezone: Tz = parse_timezone(&args.timezone)?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    match (&args.bootstrap_admin_login, &args.bootstrap_admin_password) {
        (Some(login_name), Some(password)) => {
            ride_booking_api::bootstrap_admin(&mut persistence, login_name, password)?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Bootstrap admin needs both a login name and a password; skipping");
        }
        (None, None) => {}
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        rate_limiter: RateLimiter::in_memory(),
        booking_policy: RateLimitPolicy::booking_with(
            args.booking_rate_limit,
            args.booking_rate_window_secs,
        ),
        notifier: Arc::new(LogNotifier),
        timezone,
        dev: args.dev,
        trust_proxy_headers: args.trust_proxy_headers,
    };
    if app_state.dev {
        warn!("Development mode enabled: internal error details are exposed");
    }

    spawn_sweeper(app_state.clone());

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!(%timezone, "Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
