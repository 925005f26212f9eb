// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking policy mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use ride_booking_domain::BookingSettings;
use tracing::info;

use crate::data_models::encode_date;
use crate::diesel_schema::{blocked_ranges, booking_policy, season_ranges};
use crate::error::PersistenceError;

fn to_column<T>(field: &str, value: T) -> Result<i32, PersistenceError>
where
    T: ToPrimitive + std::fmt::Display,
{
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::Other(format!("{field} {value} out of range")))
}

/// Replaces the whole booking policy.
///
/// The caller validates the settings first. Season and blocked ranges are
/// stored in the order given.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is changed in that case.
pub fn replace_settings(
    conn: &mut SqliteConnection,
    settings: &BookingSettings,
) -> Result<(), PersistenceError> {
    let min_advance_hours: i32 = to_column("min_advance_hours", settings.min_advance_hours)?;
    let max_advance_days: i32 = to_column("max_advance_days", settings.max_advance_days)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::replace_into(booking_policy::table)
            .values((
                booking_policy::policy_id.eq(1),
                booking_policy::default_tier.eq(settings.default_tier.as_str()),
                booking_policy::min_advance_hours.eq(min_advance_hours),
                booking_policy::max_advance_days.eq(max_advance_days),
                booking_policy::allow_same_day.eq(i32::from(settings.allow_same_day)),
            ))
            .execute(conn)?;

        diesel::delete(season_ranges::table).execute(conn)?;
        for (index, season) in settings.seasons.iter().enumerate() {
            diesel::insert_into(season_ranges::table)
                .values((
                    season_ranges::position.eq(to_column("position", index)?),
                    season_ranges::name.eq(&season.name),
                    season_ranges::tier.eq(season.tier.as_str()),
                    season_ranges::start_date.eq(encode_date(season.range.start)),
                    season_ranges::end_date.eq(encode_date(season.range.end)),
                ))
                .execute(conn)?;
        }

        diesel::delete(blocked_ranges::table).execute(conn)?;
        for (index, blocked) in settings.blocked_ranges.iter().enumerate() {
            diesel::insert_into(blocked_ranges::table)
                .values((
                    blocked_ranges::position.eq(to_column("position", index)?),
                    blocked_ranges::name.eq(&blocked.name),
                    blocked_ranges::start_date.eq(encode_date(blocked.range.start)),
                    blocked_ranges::end_date.eq(encode_date(blocked.range.end)),
                    blocked_ranges::message.eq(blocked.message.as_deref()),
                    blocked_ranges::allow_phone_booking
                        .eq(i32::from(blocked.allow_phone_booking)),
                ))
                .execute(conn)?;
        }

        info!(
            default_tier = %settings.default_tier,
            seasons = settings.seasons.len(),
            blocked_ranges = settings.blocked_ranges.len(),
            "Replaced booking policy"
        );
        Ok(())
    })
}
