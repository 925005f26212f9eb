// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use ride_booking_domain::{
    DomainError, format_date, format_pickup_time, parse_date, parse_pickup_time,
};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::PersistenceError;

/// Stored operator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// Stored operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: OffsetDateTime,
    pub last_activity_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Timestamps are stored in UTC at second precision so that text ordering
/// matches time ordering.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

pub(crate) fn encode_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))
}

pub(crate) fn decode_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| PersistenceError::CorruptRecord(format!("timestamp '{value}': {e}")))
}

pub(crate) fn decode_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(decode_timestamp).transpose()
}

pub(crate) fn encode_date(value: Date) -> String {
    format_date(value)
}

pub(crate) fn decode_date(value: &str) -> Result<Date, PersistenceError> {
    parse_date(value).map_err(corrupt)
}

pub(crate) fn encode_time(value: Time) -> String {
    format_pickup_time(value)
}

pub(crate) fn decode_time(value: &str) -> Result<Time, PersistenceError> {
    parse_pickup_time(value).map_err(corrupt)
}

/// Parses a stored enum value through its `FromStr` implementation.
pub(crate) fn decode_enum<T>(value: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(value).map_err(corrupt)
}

#[allow(clippy::needless_pass_by_value)]
fn corrupt(err: DomainError) -> PersistenceError {
    PersistenceError::CorruptRecord(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_timestamp_is_stored_in_utc() {
        let local: OffsetDateTime = datetime!(2026-11-03 08:00 +05:30);
        let stored: String = encode_timestamp(local).unwrap();
        assert_eq!(stored, "2026-11-03T02:30:00Z");
        assert_eq!(decode_timestamp(&stored).unwrap(), local);
    }

    #[test]
    fn test_corrupt_timestamp_is_reported() {
        assert!(matches!(
            decode_timestamp("yesterday"),
            Err(PersistenceError::CorruptRecord(_))
        ));
    }
}
