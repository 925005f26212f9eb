// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// The fixed set of fleet categories a customer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    /// Small four-seater.
    Hatchback,
    /// Standard four-seater with boot space.
    Sedan,
    /// Sport utility vehicle, six or seven seats.
    Suv,
    /// Multi utility vehicle (Innova class), seven or eight seats.
    Muv,
    /// Twelve to seventeen seat van.
    TempoTraveller,
}

impl VehicleClass {
    /// Every class, in display order.
    pub const ALL: [Self; 5] = [
        Self::Hatchback,
        Self::Sedan,
        Self::Suv,
        Self::Muv,
        Self::TempoTraveller,
    ];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hatchback => "hatchback",
            Self::Sedan => "sedan",
            Self::Suv => "suv",
            Self::Muv => "muv",
            Self::TempoTraveller => "tempo_traveller",
        }
    }
}

impl FromStr for VehicleClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hatchback" => Ok(Self::Hatchback),
            "sedan" => Ok(Self::Sedan),
            "suv" => Ok(Self::Suv),
            "muv" => Ok(Self::Muv),
            "tempo_traveller" | "tempo-traveller" => Ok(Self::TempoTraveller),
            _ => Err(DomainError::InvalidVehicleClass(s.to_string())),
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price classification resolved from the travel date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    /// Low season.
    OffPeak,
    /// Regular pricing, used when no season matches.
    #[default]
    Standard,
    /// Festival and holiday season.
    Peak,
}

impl PriceTier {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OffPeak => "off_peak",
            Self::Standard => "standard",
            Self::Peak => "peak",
        }
    }
}

impl FromStr for PriceTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off_peak" | "off-peak" => Ok(Self::OffPeak),
            "standard" => Ok(Self::Standard),
            "peak" => Ok(Self::Peak),
            _ => Err(DomainError::InvalidPriceTier(s.to_string())),
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive calendar date interval. Time of day never participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range.
    pub start: Date,
    /// Last day of the range (inclusive).
    pub end: Date,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `start` is after `end`.
    pub fn new(name: &str, start: Date, end: Date) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidDateRange {
                name: name.to_string(),
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    /// Returns true if `date` falls within `[start, end]`.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Planned unavailability for a single vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleBlock {
    /// The blocked interval.
    pub range: DateRange,
    /// Why the vehicle is off the road (service, permit renewal, ...).
    pub reason: String,
}

/// A fleet unit registered by an operator.
///
/// Vehicles are read-only to the booking engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    /// Database identifier. `None` until persisted.
    pub vehicle_id: Option<i64>,
    /// Registration plate, upper-case without spaces.
    pub registration: String,
    /// Friendly name shown to operators.
    pub display_name: String,
    /// Fleet class.
    pub class: VehicleClass,
    /// Optional model (e.g. "Toyota Innova Crysta").
    pub model: Option<String>,
    /// Passenger seats.
    pub seats: u8,
    /// Whether the vehicle is part of the active fleet.
    pub is_active: bool,
    /// Whether the vehicle is temporarily in the workshop.
    pub maintenance_mode: bool,
    /// Ordered list of planned unavailability windows.
    pub blocked_dates: Vec<VehicleBlock>,
}

impl Vehicle {
    /// Returns true if the vehicle can be dispatched on `date`.
    ///
    /// A vehicle is available iff it is active, not in maintenance, and
    /// `date` does not fall inside any of its blocked ranges.
    #[must_use]
    pub fn is_available_on(&self, date: Date) -> bool {
        self.is_active
            && !self.maintenance_mode
            && !self.blocked_dates.iter().any(|b| b.range.contains(date))
    }
}

/// A named season mapping a date interval to a price tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRange {
    /// Operator-facing name ("Diwali", "Monsoon").
    pub name: String,
    /// Tier applied while the season is in effect.
    pub tier: PriceTier,
    /// The season interval.
    pub range: DateRange,
}

/// A named interval during which self-service booking is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedRange {
    /// Operator-facing name.
    pub name: String,
    /// The blocked interval.
    pub range: DateRange,
    /// Message returned verbatim to the customer. Falls back to
    /// [`DEFAULT_BLOCKED_MESSAGE`] when absent.
    pub message: Option<String>,
    /// Whether the customer may still book by phone.
    pub allow_phone_booking: bool,
}

/// Message returned for blocked dates with no configured message.
pub const DEFAULT_BLOCKED_MESSAGE: &str =
    "Online booking is unavailable for the selected date. Please call us to book.";

/// Default minimum lead time between now and pickup.
pub const DEFAULT_MIN_ADVANCE_HOURS: u32 = 2;

/// Default maximum number of days ahead a booking may be placed.
pub const DEFAULT_MAX_ADVANCE_DAYS: u32 = 90;

/// Operator-configured booking policy.
///
/// This is an immutable snapshot: callers fetch it once per request and
/// never mutate it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSettings {
    /// Tier used when no season matches.
    pub default_tier: PriceTier,
    /// Seasons in priority order. First match wins.
    pub seasons: Vec<SeasonRange>,
    /// Blocked intervals in priority order. First match wins.
    pub blocked_ranges: Vec<BlockedRange>,
    /// Minimum hours between now and the pickup instant.
    pub min_advance_hours: u32,
    /// Maximum days between today and the travel date.
    pub max_advance_days: u32,
    /// Whether bookings for today are accepted at all.
    pub allow_same_day: bool,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            default_tier: PriceTier::Standard,
            seasons: Vec::new(),
            blocked_ranges: Vec::new(),
            min_advance_hours: DEFAULT_MIN_ADVANCE_HOURS,
            max_advance_days: DEFAULT_MAX_ADVANCE_DAYS,
            allow_same_day: true,
        }
    }
}
