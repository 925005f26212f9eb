// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode as HttpStatusCode, header},
};
use clap::Parser;
use ride_booking_api::{LogNotifier, RateLimitPolicy, RateLimiter};
use ride_booking_domain::parse_timezone;
use ride_booking_persistence::Persistence;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::{AppState, Args, build_router};

const ADMIN_LOGIN: &str = "ADMIN";
const ADMIN_PASSWORD: &str = "Correct-Horse-42";
const CLIENT_IP: &str = "203.0.113.7";

/// Helper to create test app state with in-memory persistence and one admin.
fn create_test_app_state() -> AppState {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    ride_booking_api::bootstrap_admin(&mut persistence, ADMIN_LOGIN, ADMIN_PASSWORD)
        .expect("bootstrap admin");

    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        rate_limiter: RateLimiter::in_memory(),
        booking_policy: RateLimitPolicy::booking(),
        notifier: Arc::new(LogNotifier),
        timezone: parse_timezone("Asia/Kolkata").unwrap(),
        dev: false,
        trust_proxy_headers: true,
    }
}

fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

/// A travel date comfortably inside the booking window.
fn travel_date() -> String {
    (OffsetDateTime::now_utc() + Duration::days(10)).date().to_string()
}

fn create_test_booking_body() -> Value {
    json!({
        "customerName": "Anita Rao",
        "phone": "+91 98450 12345",
        "pickupLocation": "Kempegowda International Airport",
        "dropLocation": "Mysuru Palace",
        "travelDate": travel_date(),
        "pickupTime": "10:30",
        "vehicleClass": "sedan",
        "passengers": 3,
        "totalAmount": 2400
    })
}

async fn send(app: &Router, request: Request<Body>) -> (HttpStatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let headers: HeaderMap = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

/// Fetches a fresh anti-forgery token.
async fn fetch_csrf_token(app: &Router) -> String {
    let request: Request<Body> = Request::builder()
        .uri("/csrf-token")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, HttpStatusCode::OK);
    body["csrfToken"].as_str().unwrap().to_string()
}

fn guarded_request(
    method: &str,
    uri: &str,
    csrf_token: &str,
    session_token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("csrf_token={csrf_token}"))
        .header("x-csrf-token", csrf_token)
        .header("x-forwarded-for", CLIENT_IP);
    if let Some(token) = session_token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authorized_get(uri: &str, session_token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {session_token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login_admin(app: &Router, csrf_token: &str) -> String {
    let body: Value = json!({ "loginName": ADMIN_LOGIN, "password": ADMIN_PASSWORD });
    let (status, _, body) = send(
        app,
        guarded_request("POST", "/auth/login", csrf_token, None, &body),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "login failed: {body}");
    body["sessionToken"].as_str().unwrap().to_string()
}

async fn create_test_booking(app: &Router, csrf_token: &str) -> String {
    let (status, _, body) = send(
        app,
        guarded_request("POST", "/bookings", csrf_token, None, &create_test_booking_body()),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED, "booking refused: {body}");
    body["bookingId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body, json!({ "success": true, "status": "ok" }));
}

#[tokio::test]
async fn test_csrf_token_cookie_attributes_and_reuse() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/csrf-token")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, HttpStatusCode::OK);

    let token: &str = body["csrfToken"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    let cookie: &str = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("csrf_token={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Secure"));

    let again: Request<Body> = Request::builder()
        .uri("/csrf-token")
        .header(header::COOKIE, format!("csrf_token={token}"))
        .body(Body::empty())
        .unwrap();
    let (_, _, reissued) = send(&app, again).await;
    assert_eq!(reissued["csrfToken"], token);
}

#[tokio::test]
async fn test_create_booking() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;

    let (status, _, body) = send(
        &app,
        guarded_request("POST", "/bookings", &csrf_token, None, &create_test_booking_body()),
    )
    .await;

    assert_eq!(status, HttpStatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["bookingId"].as_str().unwrap().starts_with("BK"));
    assert_eq!(body["status"], "pending");
    assert_eq!(body["paymentStatus"], "pending");
    assert_eq!(body["totalAmount"], 2400);
    assert_eq!(body["advanceAmount"], 600);
    assert_eq!(body["priceTier"], "standard");
}

#[tokio::test]
async fn test_create_booking_without_csrf_token_is_forbidden() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(create_test_booking_body().to_string()))
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_mismatched_csrf_token_is_forbidden() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("csrf_token={csrf_token}"))
        .header("x-csrf-token", "0".repeat(64))
        .body(Body::from(create_test_booking_body().to_string()))
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csrf_token_accepted_in_json_body() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let mut body: Value = create_test_booking_body();
    body["csrfToken"] = Value::from(csrf_token.clone());

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("csrf_token={csrf_token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::CREATED);
}

#[tokio::test]
async fn test_csrf_token_accepted_in_form_body() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let form: String = format!(
        "_csrf={csrf_token}&customerName=Anita+Rao&phone=9845012345\
         &pickupLocation=Airport&dropLocation=Mysuru&travelDate={}&pickupTime=10%3A30\
         &vehicleClass=sedan&passengers=3&totalAmount=2400",
        travel_date()
    );

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, format!("csrf_token={csrf_token}"))
        .body(Body::from(form))
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::CREATED, "form booking refused: {body}");
}

#[tokio::test]
async fn test_create_booking_validation_error_is_bad_request() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let mut body: Value = create_test_booking_body();
    body["phone"] = Value::from("12345");

    let (status, _, body) = send(
        &app,
        guarded_request("POST", "/bookings", &csrf_token, None, &body),
    )
    .await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_fourth_booking_in_window_is_rate_limited() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;

    for _ in 0..3 {
        create_test_booking(&app, &csrf_token).await;
    }

    let (status, headers, body) = send(
        &app,
        guarded_request("POST", "/bookings", &csrf_token, None, &create_test_booking_body()),
    )
    .await;
    assert_eq!(status, HttpStatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);

    let retry_after: u64 = headers
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=300).contains(&retry_after));
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    for _ in 0..3 {
        create_test_booking(&app, &csrf_token).await;
    }

    let mut request: Request<Body> =
        guarded_request("POST", "/bookings", &csrf_token, None, &create_test_booking_body());
    request
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.20".parse().unwrap());
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::CREATED);
}

#[tokio::test]
async fn test_rotating_forwarded_for_is_ignored_without_proxy_trust() {
    let mut state: AppState = create_test_app_state();
    state.trust_proxy_headers = false;
    let app: Router = build_router(state);
    let csrf_token: String = fetch_csrf_token(&app).await;
    for _ in 0..3 {
        create_test_booking(&app, &csrf_token).await;
    }

    let mut request: Request<Body> =
        guarded_request("POST", "/bookings", &csrf_token, None, &create_test_booking_body());
    request
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.20".parse().unwrap());
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn test_proxy_headers_are_untrusted_by_default() {
    let args: Args = Args::try_parse_from(["ride-booking-server"]).unwrap();
    assert!(!args.trust_proxy_headers);

    let args: Args =
        Args::try_parse_from(["ride-booking-server", "--trust-proxy-headers", "true"]).unwrap();
    assert!(args.trust_proxy_headers);
}

#[tokio::test]
async fn test_end_to_end_create_then_verify_payment() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let booking_id: String = create_test_booking(&app, &csrf_token).await;

    let claim: Value = json!({ "phone": "9845012345", "transactionId": "UPI-4471" });
    let (status, _, body) = send(
        &app,
        guarded_request(
            "POST",
            &format!("/bookings/{booking_id}/payment-claim"),
            &csrf_token,
            None,
            &claim,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["paymentStatus"], "screenshot_uploaded");

    let session_token: String = login_admin(&app, &csrf_token).await;
    let (_, _, before) = send(
        &app,
        authorized_get(&format!("/bookings/{booking_id}"), &session_token),
    )
    .await;
    let log_before: usize = before["booking"]["communications"].as_array().unwrap().len();

    let verify: Value = json!({ "bookingId": booking_id, "action": "verify" });
    let (status, _, body) = send(
        &app,
        guarded_request(
            "POST",
            "/admin/bookings/verify-payment",
            &csrf_token,
            Some(&session_token),
            &verify,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["booking"]["paymentStatus"], "verified");
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["paymentVerifiedBy"], ADMIN_LOGIN);

    let (_, _, after) = send(
        &app,
        authorized_get(&format!("/bookings/{booking_id}"), &session_token),
    )
    .await;
    let log_after: usize = after["booking"]["communications"].as_array().unwrap().len();
    assert_eq!(log_after, log_before + 1);
}

#[tokio::test]
async fn test_payment_claim_with_wrong_phone_is_not_found() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let booking_id: String = create_test_booking(&app, &csrf_token).await;

    let claim: Value = json!({ "phone": "9000000000", "transactionId": "UPI-4471" });
    let (status, _, _) = send(
        &app,
        guarded_request(
            "POST",
            &format!("/bookings/{booking_id}/payment-claim"),
            &csrf_token,
            None,
            &claim,
        ),
    )
    .await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancelled_booking_still_listed_by_phone() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let booking_id: String = create_test_booking(&app, &csrf_token).await;
    let session_token: String = login_admin(&app, &csrf_token).await;

    let cancel: Value = json!({ "bookingId": booking_id, "status": "cancelled" });
    let (status, _, _) = send(
        &app,
        guarded_request(
            "POST",
            "/admin/bookings/update-status",
            &csrf_token,
            Some(&session_token),
            &cancel,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let request: Request<Body> = Request::builder()
        .uri("/bookings?phone=9845012345")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, HttpStatusCode::OK);

    let bookings: &Vec<Value> = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["bookingId"], booking_id);
    assert_eq!(bookings[0]["status"], "cancelled");
}

#[tokio::test]
async fn test_list_bookings_with_invalid_phone_is_bad_request() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/bookings?phone=12")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_on_empty_fleet_is_unlimited() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri(format!("/availability?date={}&class=sedan", travel_date()))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["availableCount"], -1);
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn test_availability_with_malformed_date_is_bad_request() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/availability?date=10-11-2026")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_defaults() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/settings/seasons")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["defaultTier"], "standard");
    assert_eq!(body["minAdvanceHours"], 2);
    assert_eq!(body["maxAdvanceDays"], 90);
    assert_eq!(body["allowSameDay"], true);
}

#[tokio::test]
async fn test_operator_endpoint_requires_session() {
    let app: Router = create_test_app();
    let request: Request<Body> = Request::builder()
        .uri("/admin/vehicles")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, authorized_get("/admin/vehicles", "not-a-session")).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let body: Value = json!({ "loginName": ADMIN_LOGIN, "password": "wrong-password-1" });

    let (status, _, _) = send(
        &app,
        guarded_request("POST", "/auth/login", &csrf_token, None, &body),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let session_token: String = login_admin(&app, &csrf_token).await;

    let logout: Request<Body> = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {session_token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, logout).await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, _, _) = send(&app, authorized_get("/admin/vehicles", &session_token)).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_fleet_maintenance() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let session_token: String = login_admin(&app, &csrf_token).await;

    let vehicle: Value = json!({
        "registration": "ka 01 ab 1234",
        "displayName": "White Dzire",
        "vehicleClass": "sedan",
        "seats": 4
    });
    let (status, _, body) = send(
        &app,
        guarded_request("POST", "/admin/vehicles", &csrf_token, Some(&session_token), &vehicle),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED, "vehicle refused: {body}");
    assert_eq!(body["vehicle"]["registration"], "KA01AB1234");
    let vehicle_id: i64 = body["vehicle"]["vehicleId"].as_i64().unwrap();

    let maintenance: Value = json!({
        "registration": "KA01AB1234",
        "displayName": "White Dzire",
        "vehicleClass": "sedan",
        "seats": 4,
        "maintenanceMode": true
    });
    let (status, _, body) = send(
        &app,
        guarded_request(
            "PUT",
            &format!("/admin/vehicles/{vehicle_id}"),
            &csrf_token,
            Some(&session_token),
            &maintenance,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["vehicle"]["maintenanceMode"], true);

    let request: Request<Body> = Request::builder()
        .uri(format!("/availability?date={}&class=sedan", travel_date()))
        .body(Body::empty())
        .unwrap();
    let (_, _, availability) = send(&app, request).await;
    assert_eq!(availability["available"], false);
    assert_eq!(availability["totalCount"], 1);

    let (status, _, listed) = send(&app, authorized_get("/admin/vehicles", &session_token)).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(listed["vehicles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dispatcher_cannot_update_settings() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let admin_token: String = login_admin(&app, &csrf_token).await;

    let operator: Value = json!({
        "loginName": "dispatch1",
        "displayName": "Front Desk",
        "password": "Dispatch-Pass-7",
        "passwordConfirmation": "Dispatch-Pass-7",
        "role": "Dispatcher"
    });
    let (status, _, body) = send(
        &app,
        guarded_request("POST", "/admin/operators", &csrf_token, Some(&admin_token), &operator),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED, "operator refused: {body}");

    let login: Value = json!({ "loginName": "dispatch1", "password": "Dispatch-Pass-7" });
    let (status, _, body) = send(
        &app,
        guarded_request("POST", "/auth/login", &csrf_token, None, &login),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    let dispatcher_token: String = body["sessionToken"].as_str().unwrap().to_string();

    let settings: Value = json!({
        "defaultTier": "peak",
        "minAdvanceHours": 2,
        "maxAdvanceDays": 90,
        "allowSameDay": true
    });
    let (status, _, _) = send(
        &app,
        guarded_request(
            "PUT",
            "/admin/settings",
            &csrf_token,
            Some(&dispatcher_token),
            &settings,
        ),
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        guarded_request("PUT", "/admin/settings", &csrf_token, Some(&admin_token), &settings),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["defaultTier"], "peak");
}

#[tokio::test]
async fn test_last_admin_cannot_be_disabled() {
    let app: Router = create_test_app();
    let csrf_token: String = fetch_csrf_token(&app).await;
    let session_token: String = login_admin(&app, &csrf_token).await;

    let (_, _, listed) = send(&app, authorized_get("/admin/operators", &session_token)).await;
    let admin_id: i64 = listed["operators"][0]["operatorId"].as_i64().unwrap();

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri(format!("/admin/operators/{admin_id}/disable"))
        .header(header::AUTHORIZATION, format!("Bearer {session_token}"))
        .header(header::COOKIE, format!("csrf_token={csrf_token}"))
        .header("x-csrf-token", &csrf_token)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}
