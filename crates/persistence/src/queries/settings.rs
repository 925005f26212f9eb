// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking policy queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use ride_booking_domain::{BlockedRange, BookingSettings, DateRange, SeasonRange};
use tracing::debug;

use crate::data_models::{decode_date, decode_enum};
use crate::diesel_schema::{blocked_ranges, booking_policy, season_ranges};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_policy)]
struct PolicyRow {
    default_tier: String,
    min_advance_hours: i32,
    max_advance_days: i32,
    allow_same_day: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = season_ranges)]
struct SeasonRow {
    name: String,
    tier: String,
    start_date: String,
    end_date: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = blocked_ranges)]
struct BlockedRow {
    name: String,
    start_date: String,
    end_date: String,
    message: Option<String>,
    allow_phone_booking: i32,
}

fn decode_range(start: &str, end: &str) -> Result<DateRange, PersistenceError> {
    Ok(DateRange {
        start: decode_date(start)?,
        end: decode_date(end)?,
    })
}

fn to_u32(field: &str, value: i32) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::CorruptRecord(format!("booking policy {field} is {value}"))
    })
}

/// Loads the booking policy.
///
/// An unconfigured database yields the default policy. Season and blocked
/// ranges keep their configured order.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn get_settings(conn: &mut SqliteConnection) -> Result<BookingSettings, PersistenceError> {
    let policy: Option<PolicyRow> = booking_policy::table
        .select(PolicyRow::as_select())
        .first(conn)
        .optional()?;

    let mut settings: BookingSettings = match policy {
        Some(row) => BookingSettings {
            default_tier: decode_enum(&row.default_tier)?,
            min_advance_hours: to_u32("min_advance_hours", row.min_advance_hours)?,
            max_advance_days: to_u32("max_advance_days", row.max_advance_days)?,
            allow_same_day: row.allow_same_day != 0,
            ..BookingSettings::default()
        },
        None => {
            debug!("No booking policy configured, using defaults");
            BookingSettings::default()
        }
    };

    settings.seasons = season_ranges::table
        .select(SeasonRow::as_select())
        .order_by((season_ranges::position.asc(), season_ranges::season_id.asc()))
        .load::<SeasonRow>(conn)?
        .into_iter()
        .map(|row| {
            Ok(SeasonRange {
                tier: decode_enum(&row.tier)?,
                range: decode_range(&row.start_date, &row.end_date)?,
                name: row.name,
            })
        })
        .collect::<Result<_, PersistenceError>>()?;

    settings.blocked_ranges = blocked_ranges::table
        .select(BlockedRow::as_select())
        .order_by((blocked_ranges::position.asc(), blocked_ranges::blocked_id.asc()))
        .load::<BlockedRow>(conn)?
        .into_iter()
        .map(|row| {
            Ok(BlockedRange {
                range: decode_range(&row.start_date, &row.end_date)?,
                name: row.name,
                message: row.message,
                allow_phone_booking: row.allow_phone_booking != 0,
            })
        })
        .collect::<Result<_, PersistenceError>>()?;

    debug!(
        seasons = settings.seasons.len(),
        blocked_ranges = settings.blocked_ranges.len(),
        "Loaded booking policy"
    );
    Ok(settings)
}
