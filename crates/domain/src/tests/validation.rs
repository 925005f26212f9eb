// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BlockedRange, BookingSettings, DateRange, DomainError, PriceTier, SeasonRange,
    normalize_phone, normalize_registration, validate_customer_name, validate_email,
    validate_text_field, validate_message, validate_passenger_count, validate_settings,
    validate_total_amount,
};
use time::macros::date;

#[test]
fn test_normalize_phone_accepts_plain_mobile() {
    assert_eq!(normalize_phone("9876543210").unwrap(), "9876543210");
}

#[test]
fn test_normalize_phone_strips_country_code_and_separators() {
    assert_eq!(normalize_phone("+91 98765-43210").unwrap(), "9876543210");
    assert_eq!(normalize_phone("91 98765 43210").unwrap(), "9876543210");
    assert_eq!(normalize_phone("(0)98765.43210").unwrap(), "9876543210");
    assert_eq!(normalize_phone("09876543210").unwrap(), "9876543210");
}

#[test]
fn test_normalize_phone_rejects_landline_prefix() {
    let result: Result<String, DomainError> = normalize_phone("0802345678");
    assert!(matches!(result, Err(DomainError::InvalidPhone(_))));

    let result: Result<String, DomainError> = normalize_phone("5876543210");
    assert!(matches!(result, Err(DomainError::InvalidPhone(_))));
}

#[test]
fn test_normalize_phone_rejects_wrong_length_and_letters() {
    assert!(normalize_phone("987654321").is_err());
    assert!(normalize_phone("98765432101").is_err());
    assert!(normalize_phone("98765abcde").is_err());
    assert!(normalize_phone("").is_err());
}

#[test]
fn test_validate_email_accepts_and_lowercases() {
    assert_eq!(
        validate_email("  Priya.K@Example.IN ").unwrap(),
        "priya.k@example.in"
    );
}

#[test]
fn test_validate_email_rejects_malformed() {
    for bad in [
        "priya",
        "@example.com",
        "priya@",
        "priya@example",
        "priya@@example.com",
        "priya@example..com",
        "priya k@example.com",
    ] {
        assert!(
            matches!(validate_email(bad), Err(DomainError::InvalidEmail(_))),
            "accepted {bad}"
        );
    }
}

#[test]
fn test_validate_customer_name() {
    assert_eq!(validate_customer_name("  Ravi Kumar ").unwrap(), "Ravi Kumar");
    assert!(matches!(
        validate_customer_name("   "),
        Err(DomainError::InvalidCustomerName(_))
    ));
    assert!(validate_customer_name(&"a".repeat(101)).is_err());
}

#[test]
fn test_validate_text_field_reports_field() {
    match validate_text_field("pickupLocation", "") {
        Err(DomainError::InvalidField { field, .. }) => assert_eq!(field, "pickupLocation"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(
        validate_text_field("dropLocation", " Kempegowda Airport ").unwrap(),
        "Kempegowda Airport"
    );
}

#[test]
fn test_passenger_count_bounds() {
    assert!(validate_passenger_count(1).is_ok());
    assert!(validate_passenger_count(20).is_ok());
    assert!(matches!(
        validate_passenger_count(0),
        Err(DomainError::InvalidPassengerCount(0))
    ));
    assert!(validate_passenger_count(21).is_err());
}

#[test]
fn test_total_amount_must_be_positive() {
    assert!(validate_total_amount(1200).is_ok());
    assert!(matches!(
        validate_total_amount(0),
        Err(DomainError::InvalidAmount(0))
    ));
    assert!(validate_total_amount(-5).is_err());
}

#[test]
fn test_normalize_registration() {
    assert_eq!(normalize_registration("ka 01 ab-1234").unwrap(), "KA01AB1234");
    assert!(matches!(
        normalize_registration("KA#01"),
        Err(DomainError::InvalidRegistration(_))
    ));
    assert!(normalize_registration("K1").is_err());
}

#[test]
fn test_validate_message() {
    assert_eq!(validate_message(" Called customer ").unwrap(), "Called customer");
    assert!(validate_message("").is_err());
    assert!(validate_message(&"x".repeat(2001)).is_err());
    assert!(validate_message(&"x".repeat(2000)).is_ok());
}

#[test]
fn test_validate_settings_accepts_defaults() {
    assert!(validate_settings(&BookingSettings::default()).is_ok());
}

#[test]
fn test_validate_settings_rejects_nameless_season() {
    let settings = BookingSettings {
        seasons: vec![SeasonRange {
            name: String::from(" "),
            tier: PriceTier::Peak,
            range: DateRange {
                start: date!(2026 - 10 - 01),
                end: date!(2026 - 10 - 05),
            },
        }],
        ..BookingSettings::default()
    };
    assert!(matches!(
        validate_settings(&settings),
        Err(DomainError::InvalidSettings(_))
    ));
}

#[test]
fn test_validate_settings_rejects_inverted_blocked_range() {
    let settings = BookingSettings {
        blocked_ranges: vec![BlockedRange {
            name: String::from("Bandh"),
            range: DateRange {
                start: date!(2026 - 10 - 05),
                end: date!(2026 - 10 - 01),
            },
            message: None,
            allow_phone_booking: true,
        }],
        ..BookingSettings::default()
    };
    assert!(matches!(
        validate_settings(&settings),
        Err(DomainError::InvalidDateRange { .. })
    ));
}

#[test]
fn test_validate_settings_window_limits() {
    let zero_window = BookingSettings {
        max_advance_days: 0,
        ..BookingSettings::default()
    };
    assert!(validate_settings(&zero_window).is_err());

    let long_lead = BookingSettings {
        min_advance_hours: 721,
        ..BookingSettings::default()
    };
    assert!(validate_settings(&long_lead).is_err());

    let max_lead = BookingSettings {
        min_advance_hours: 720,
        ..BookingSettings::default()
    };
    assert!(validate_settings(&max_lead).is_ok());

    let longest_window = BookingSettings {
        max_advance_days: 3650,
        ..BookingSettings::default()
    };
    assert!(validate_settings(&longest_window).is_ok());

    let endless_window = BookingSettings {
        max_advance_days: 3651,
        ..BookingSettings::default()
    };
    assert!(matches!(
        validate_settings(&endless_window),
        Err(DomainError::InvalidSettings(_))
    ));
}
