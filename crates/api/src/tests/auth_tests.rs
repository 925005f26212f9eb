// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ride_booking_audit::Author;
use time::Duration;

use super::{create_test_admin, create_test_dispatcher, create_test_persistence, test_now};
use crate::{
    ApiError, AuthError, AuthenticationService, AuthorizationService, LoginRequest, Role, login,
    logout, sweep_expired_sessions,
};

const PASSWORD: &str = "monsoon2026";

fn seed_dispatcher(persistence: &mut ride_booking_persistence::Persistence) -> i64 {
    persistence
        .create_operator("dispatch1", "Ravi Kumar", PASSWORD, "Dispatcher")
        .unwrap()
}

fn validate(
    persistence: &mut ride_booking_persistence::Persistence,
    token: &str,
    now: time::OffsetDateTime,
) -> Result<(crate::AuthenticatedActor, ride_booking_persistence::OperatorData), AuthError> {
    AuthenticationService::validate_session(persistence, token, now)
}

fn login_request(login_name: &str, password: &str) -> LoginRequest {
    LoginRequest {
        login_name: login_name.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_login_issues_session() {
    let mut persistence = create_test_persistence();
    seed_dispatcher(&mut persistence);

    let response = login(&mut persistence, &login_request("Dispatch1", PASSWORD), test_now())
        .unwrap();
    assert_eq!(response.login_name, "DISPATCH1");
    assert_eq!(response.display_name, "Ravi Kumar");
    assert_eq!(response.role, "Dispatcher");
    assert_eq!(response.session_token.len(), 64);
    assert_eq!(response.expires_at, "2026-11-03T14:30:00Z");

    let (actor, operator) =
        validate(&mut persistence, &response.session_token, test_now()).unwrap();
    assert_eq!(actor.role, Role::Dispatcher);
    assert_eq!(actor.to_author(), Author::Operator(String::from("DISPATCH1")));
    assert!(operator.last_login_at.is_some());
}

#[test]
fn test_wrong_password_and_unknown_login_look_alike() {
    let mut persistence = create_test_persistence();
    seed_dispatcher(&mut persistence);

    let wrong_password = login(
        &mut persistence,
        &login_request("dispatch1", "not-it-2026"),
        test_now(),
    )
    .unwrap_err();
    let unknown =
        login(&mut persistence, &login_request("nobody", PASSWORD), test_now()).unwrap_err();

    assert_eq!(wrong_password, unknown);
    assert!(matches!(wrong_password, ApiError::AuthenticationFailed { .. }));
}

#[test]
fn test_disabled_operator_cannot_log_in() {
    let mut persistence = create_test_persistence();
    let operator_id: i64 = seed_dispatcher(&mut persistence);
    persistence.disable_operator(operator_id, test_now()).unwrap();

    let err =
        login(&mut persistence, &login_request("dispatch1", PASSWORD), test_now()).unwrap_err();
    assert_eq!(
        err,
        ApiError::AuthenticationFailed {
            reason: String::from("Operator is disabled")
        }
    );
}

#[test]
fn test_session_expires_after_a_shift() {
    let mut persistence = create_test_persistence();
    seed_dispatcher(&mut persistence);
    let response = login(&mut persistence, &login_request("dispatch1", PASSWORD), test_now())
        .unwrap();

    let later = test_now() + AuthenticationService::SESSION_DURATION;
    let err = validate(&mut persistence, &response.session_token, later).unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationFailed {
            reason: String::from("Session expired")
        }
    );

    // the expired session is gone, even for an earlier clock
    let err = validate(
        &mut persistence,
        &response.session_token,
        test_now() + Duration::minutes(1),
    )
    .unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid session token")
        }
    );
}

#[test]
fn test_logout_ends_session() {
    let mut persistence = create_test_persistence();
    seed_dispatcher(&mut persistence);
    let response = login(&mut persistence, &login_request("dispatch1", PASSWORD), test_now())
        .unwrap();

    logout(&mut persistence, &response.session_token).unwrap();
    assert!(validate(&mut persistence, &response.session_token, test_now()).is_err());
}

#[test]
fn test_sweep_removes_only_expired_sessions() {
    let mut persistence = create_test_persistence();
    seed_dispatcher(&mut persistence);
    login(&mut persistence, &login_request("dispatch1", PASSWORD), test_now()).unwrap();
    let fresh = login(
        &mut persistence,
        &login_request("dispatch1", PASSWORD),
        test_now() + Duration::hours(6),
    )
    .unwrap();

    let removed: usize =
        sweep_expired_sessions(&mut persistence, test_now() + Duration::hours(13)).unwrap();
    assert_eq!(removed, 1);
    assert!(
        validate(
            &mut persistence,
            &fresh.session_token,
            test_now() + Duration::hours(13)
        )
        .is_ok()
    );
}

#[test]
fn test_role_checks() {
    assert!(AuthorizationService::authorize_handle_bookings(&create_test_dispatcher()).is_ok());
    assert!(AuthorizationService::authorize_manage_fleet(&create_test_admin()).is_ok());
    assert_eq!(
        AuthorizationService::authorize_manage_operators(&create_test_dispatcher()),
        Err(AuthError::Unauthorized {
            action: String::from("manage_operators"),
            required_role: String::from("Admin"),
        })
    );
    assert_eq!(Role::from_stored("Admin"), Some(Role::Admin));
    assert_eq!(Role::from_stored("admin"), None);
}

#[test]
fn test_store_failure_is_internal_not_bad_credentials() {
    let err: AuthError = AuthenticationService::map_persistence_error(
        ride_booking_persistence::PersistenceError::DatabaseError(String::from("disk I/O error")),
    );
    assert!(matches!(err, AuthError::Internal { .. }));

    let api: ApiError = ApiError::from(err);
    assert!(matches!(api, ApiError::Internal { ref message } if message.contains("disk I/O")));
    assert!(!api.is_client_error());
}
