// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Season and blocked-window lookups.
//!
//! Both lookups walk an operator-ordered list and stop at the first range
//! containing the date. Overlapping ranges are therefore resolved by list
//! position, never by range width or tier.

use crate::types::{BookingSettings, DEFAULT_BLOCKED_MESSAGE, PriceTier};
use serde::{Deserialize, Serialize};
use time::Date;

/// Resolves the price tier in effect on `date`.
///
/// Returns the tier of the first configured season containing `date`, or
/// `settings.default_tier` when none does.
#[must_use]
pub fn resolve_tier(date: Date, settings: &BookingSettings) -> PriceTier {
    settings
        .seasons
        .iter()
        .find(|season| season.range.contains(date))
        .map_or(settings.default_tier, |season| season.tier)
}

/// Outcome of checking a date against the blocked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    /// Whether online booking is refused on the date.
    pub blocked: bool,
    /// Name of the matching blocked range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Customer-facing message, configured or default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether phone booking is still offered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_phone_booking: Option<bool>,
}

impl BlockStatus {
    /// A status for a date with no matching blocked range.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            blocked: false,
            reason: None,
            message: None,
            allow_phone_booking: None,
        }
    }
}

/// Checks whether self-service booking is refused on `date`.
#[must_use]
pub fn is_blocked(date: Date, settings: &BookingSettings) -> BlockStatus {
    let Some(range) = settings
        .blocked_ranges
        .iter()
        .find(|blocked| blocked.range.contains(date))
    else {
        return BlockStatus::open();
    };

    let message: String = range
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_BLOCKED_MESSAGE)
        .to_string();

    BlockStatus {
        blocked: true,
        reason: Some(range.name.clone()),
        message: Some(message),
        allow_phone_booking: Some(range.allow_phone_booking),
    }
}
