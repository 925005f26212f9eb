// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::BookingSettings;

/// Longest accepted customer name.
pub const MAX_NAME_LENGTH: usize = 100;
/// Longest accepted free-text field such as a pickup location.
pub const MAX_FIELD_LENGTH: usize = 200;
/// Longest accepted communication or note.
pub const MAX_MESSAGE_LENGTH: usize = 2000;
/// Largest accepted group.
pub const MAX_PASSENGERS: u32 = 20;
/// Upper bound on the configurable lead time (30 days).
pub const MAX_MIN_ADVANCE_HOURS: u32 = 720;
/// Upper bound on the configurable booking window (ten years).
pub const MAX_MAX_ADVANCE_DAYS: u32 = 3650;

/// Normalizes a customer phone number to a 10-digit Indian mobile number.
///
/// Spaces, hyphens, dots and parentheses are removed, then a leading
/// `+91`, `91` or `0` trunk prefix is stripped.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhone` unless the remainder is exactly ten
/// digits starting with 6, 7, 8 or 9.
pub fn normalize_phone(raw: &str) -> Result<String, DomainError> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let digits: &str = if let Some(rest) = compact.strip_prefix("+91") {
        rest
    } else if compact.len() == 12 && compact.starts_with("91") {
        &compact[2..]
    } else if compact.len() == 11 && compact.starts_with('0') {
        &compact[1..]
    } else {
        &compact
    };

    let is_mobile: bool = digits.len() == 10
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.starts_with(['6', '7', '8', '9']);

    if !is_mobile {
        return Err(DomainError::InvalidPhone(String::from(
            "Please enter a valid 10-digit mobile number",
        )));
    }

    Ok(digits.to_string())
}

/// Validates an email address.
///
/// This is a structural check only: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is malformed.
pub fn validate_email(email: &str) -> Result<String, DomainError> {
    let trimmed: &str = email.trim();
    let invalid = || DomainError::InvalidEmail(String::from("Please enter a valid email address"));

    if trimmed.len() > 254 || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(trimmed.to_ascii_lowercase())
}

/// Validates and trims a customer name.
///
/// # Errors
///
/// Returns `DomainError::InvalidCustomerName` if the name is empty or longer
/// than [`MAX_NAME_LENGTH`] characters.
pub fn validate_customer_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidCustomerName(String::from(
            "Name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidCustomerName(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates and trims a required free-text field.
///
/// # Errors
///
/// Returns `DomainError::InvalidField` if the value is empty or longer
/// than [`MAX_FIELD_LENGTH`] characters.
pub fn validate_text_field(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidField {
            field,
            reason: String::from("cannot be empty"),
        });
    }
    if trimmed.chars().count() > MAX_FIELD_LENGTH {
        return Err(DomainError::InvalidField {
            field,
            reason: format!("cannot exceed {MAX_FIELD_LENGTH} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates the number of travellers.
///
/// # Errors
///
/// Returns `DomainError::InvalidPassengerCount` outside `1..=20`.
pub fn validate_passenger_count(count: u32) -> Result<(), DomainError> {
    if !(1..=MAX_PASSENGERS).contains(&count) {
        return Err(DomainError::InvalidPassengerCount(count));
    }
    Ok(())
}

/// Validates the client-declared total.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` unless the amount is positive.
pub const fn validate_total_amount(amount: i64) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::InvalidAmount(amount));
    }
    Ok(())
}

/// Normalizes a registration plate to upper case without separators.
///
/// # Errors
///
/// Returns `DomainError::InvalidRegistration` if the plate is not 4 to 12
/// ASCII letters and digits after normalization.
pub fn normalize_registration(raw: &str) -> Result<String, DomainError> {
    let plate: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(4..=12).contains(&plate.len()) || !plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidRegistration(format!(
            "'{raw}' is not a valid registration"
        )));
    }
    Ok(plate)
}

/// Validates a communication-log message or note.
///
/// # Errors
///
/// Returns `DomainError::InvalidCommunication` if the message is empty or
/// longer than [`MAX_MESSAGE_LENGTH`] characters.
pub fn validate_message(message: &str) -> Result<String, DomainError> {
    let trimmed: &str = message.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidCommunication(String::from(
            "Message cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(DomainError::InvalidCommunication(format!(
            "Message cannot exceed {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates an operator-supplied settings object before it is stored.
///
/// # Errors
///
/// Returns an error if:
/// - A season or blocked range has an empty name
/// - A range starts after it ends
/// - `max_advance_days` is zero or exceeds [`MAX_MAX_ADVANCE_DAYS`]
/// - `min_advance_hours` exceeds [`MAX_MIN_ADVANCE_HOURS`]
pub fn validate_settings(settings: &BookingSettings) -> Result<(), DomainError> {
    for season in &settings.seasons {
        if season.name.trim().is_empty() {
            return Err(DomainError::InvalidSettings(String::from(
                "Season name cannot be empty",
            )));
        }
        if season.range.start > season.range.end {
            return Err(DomainError::InvalidDateRange {
                name: season.name.clone(),
                start: season.range.start,
                end: season.range.end,
            });
        }
    }

    for blocked in &settings.blocked_ranges {
        if blocked.name.trim().is_empty() {
            return Err(DomainError::InvalidSettings(String::from(
                "Blocked range name cannot be empty",
            )));
        }
        if blocked.range.start > blocked.range.end {
            return Err(DomainError::InvalidDateRange {
                name: blocked.name.clone(),
                start: blocked.range.start,
                end: blocked.range.end,
            });
        }
    }

    if settings.max_advance_days < 1 {
        return Err(DomainError::InvalidSettings(String::from(
            "Maximum advance days must be at least 1",
        )));
    }

    if settings.max_advance_days > MAX_MAX_ADVANCE_DAYS {
        return Err(DomainError::InvalidSettings(format!(
            "Maximum advance days cannot exceed {MAX_MAX_ADVANCE_DAYS}"
        )));
    }

    if settings.min_advance_hours > MAX_MIN_ADVANCE_HOURS {
        return Err(DomainError::InvalidSettings(format!(
            "Minimum advance hours cannot exceed {MAX_MIN_ADVANCE_HOURS}"
        )));
    }

    Ok(())
}
