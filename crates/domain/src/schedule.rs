// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pickup scheduling rules.
//!
//! Travel dates and pickup times are wall-clock values in the operator's
//! timezone. They are converted to an absolute instant before comparing
//! against the current time.

use crate::error::DomainError;
use crate::types::BookingSettings;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, Time};

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses a 24-hour `HH:MM` pickup time. A trailing `:SS` is accepted.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if the string is not a valid time.
pub fn parse_pickup_time(value: &str) -> Result<Time, DomainError> {
    let trimmed: &str = value.trim();
    let short = format_description!("[hour]:[minute]");
    let long = format_description!("[hour]:[minute]:[second]");
    Time::parse(trimmed, &short)
        .or_else(|_| Time::parse(trimmed, &long))
        .map_err(|e| DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        })
}

/// Formats a time as `HH:MM`.
#[must_use]
pub fn format_pickup_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parses an IANA timezone name such as `Asia/Kolkata`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Converts a local travel date and pickup time to an absolute instant.
///
/// Ambiguous local times (clock rolled back) resolve to the earlier instant.
///
/// # Errors
///
/// Returns an error if the local time does not exist in `tz` or the
/// resulting instant is out of range.
pub fn pickup_instant(date: Date, time: Time, tz: Tz) -> Result<OffsetDateTime, DomainError> {
    let naive_date: NaiveDate = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .ok_or_else(|| DomainError::DateArithmeticOverflow {
        operation: format!("converting travel date {date}"),
    })?;
    let naive_time: NaiveTime = NaiveTime::from_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )
    .ok_or_else(|| DomainError::TimeParseError {
        time_string: time.to_string(),
        error: String::from("out of range"),
    })?;

    let local = tz
        .from_local_datetime(&naive_date.and_time(naive_time))
        .earliest()
        .ok_or_else(|| DomainError::TimeParseError {
            time_string: format_pickup_time(time),
            error: format!("does not exist on {date} in {}", tz.name()),
        })?;

    OffsetDateTime::from_unix_timestamp(local.timestamp()).map_err(|e| {
        DomainError::DateArithmeticOverflow {
            operation: format!("computing pickup instant: {e}"),
        }
    })
}

/// Returns the calendar date of `now` in the operator timezone.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the instant cannot be
/// represented.
pub fn local_today(now: OffsetDateTime, tz: Tz) -> Result<Date, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: String::from("resolving today's date"),
    };
    let local = tz
        .timestamp_opt(now.unix_timestamp(), 0)
        .single()
        .ok_or_else(overflow)?;
    let naive: NaiveDate = local.date_naive();

    let month: Month = u8::try_from(chrono::Datelike::month(&naive))
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(overflow)?;
    let day: u8 = u8::try_from(chrono::Datelike::day(&naive)).map_err(|_| overflow())?;
    Date::from_calendar_date(chrono::Datelike::year(&naive), month, day).map_err(|_| overflow())
}

/// Applies the same-day, lead-time and booking-window rules.
///
/// Checks run in that order and the first violation is returned. The
/// lead-time boundary is inclusive: a pickup exactly `min_advance_hours`
/// after `now` is accepted.
///
/// # Errors
///
/// * `DomainError::SameDayNotAllowed` if the travel date is today and
///   same-day booking is disabled
/// * `DomainError::InsufficientLeadTime` if pickup is too soon
/// * `DomainError::OutsideBookingWindow` if the travel date is too far ahead
pub fn check_schedule(
    travel_date: Date,
    pickup_time: Time,
    now: OffsetDateTime,
    tz: Tz,
    settings: &BookingSettings,
) -> Result<(), DomainError> {
    let today: Date = local_today(now, tz)?;

    if !settings.allow_same_day && travel_date == today {
        return Err(DomainError::SameDayNotAllowed);
    }

    let pickup: OffsetDateTime = pickup_instant(travel_date, pickup_time, tz)?;
    let earliest: OffsetDateTime = now
        .checked_add(Duration::hours(i64::from(settings.min_advance_hours)))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("adding lead time"),
        })?;
    if earliest > pickup {
        return Err(DomainError::InsufficientLeadTime {
            min_advance_hours: settings.min_advance_hours,
        });
    }

    let last_day: Date = today
        .checked_add(Duration::days(i64::from(settings.max_advance_days)))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: String::from("adding booking window"),
        })?;
    if travel_date > last_day {
        return Err(DomainError::OutsideBookingWindow {
            max_advance_days: settings.max_advance_days,
        });
    }

    Ok(())
}
