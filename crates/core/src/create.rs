// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking creation pipeline.
//!
//! Creation runs every check against a settings snapshot and a fleet
//! snapshot supplied by the caller, then builds the booking in its initial
//! state. Nothing here touches storage or the clock.

use crate::error::CoreError;
use crate::state::{Booking, Customer, Trip};
use ride_booking_audit::CommunicationEntry;
use ride_booking_domain::{
    AvailabilityResult, BookingSettings, BookingStatus, DomainError, PaymentStatus, PriceTier,
    Tz, Vehicle, VehicleClass, advance_amount, calculate_availability, check_schedule, format_date,
    format_pickup_time, is_blocked, local_today, normalize_phone, resolve_tier,
    validate_customer_name, validate_email, validate_message, validate_passenger_count,
    validate_text_field, validate_total_amount,
};
use std::collections::HashSet;
use time::{Date, OffsetDateTime, Time};

/// Prefix of every booking identifier.
pub const BOOKING_ID_PREFIX: &str = "BK";

const SUFFIX_LEN: usize = 5;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Builds a booking identifier: `BK` + `YYMMDD` + `-` + five base-36
/// characters drawn from `entropy`.
#[must_use]
pub fn format_booking_id(created_on: Date, entropy: u64) -> String {
    let mut suffix: [u8; SUFFIX_LEN] = [b'0'; SUFFIX_LEN];
    let mut remaining: u64 = entropy;
    for slot in suffix.iter_mut().rev() {
        // remaining % 36 is always a valid index
        *slot = BASE36[usize::try_from(remaining % 36).unwrap_or(0)];
        remaining /= 36;
    }

    format!(
        "{BOOKING_ID_PREFIX}{:02}{:02}{:02}-{}",
        created_on.year().rem_euclid(100),
        u8::from(created_on.month()),
        created_on.day(),
        String::from_utf8_lossy(&suffix)
    )
}

/// Returns true if `value` has the shape of a booking identifier.
#[must_use]
pub fn is_booking_id(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(BOOKING_ID_PREFIX) else {
        return false;
    };
    let Some((date_part, suffix)) = rest.split_once('-') else {
        return false;
    };
    date_part.len() == 6
        && date_part.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}

/// A customer's booking request, with dates and class already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Customer name.
    pub customer_name: String,
    /// Phone as typed by the customer.
    pub phone: String,
    /// Optional email.
    pub email: Option<String>,
    /// Pickup point.
    pub pickup_location: String,
    /// Destination.
    pub drop_location: String,
    /// Optional landmark.
    pub sub_location: Option<String>,
    /// Travel date.
    pub travel_date: Date,
    /// Pickup time.
    pub pickup_time: Time,
    /// Requested class.
    pub vehicle_class: VehicleClass,
    /// Requested model.
    pub vehicle_model: Option<String>,
    /// Number of travellers.
    pub passengers: u32,
    /// Total declared by the client, whole rupees.
    pub total_amount: i64,
    /// Notes from the customer.
    pub customer_notes: Option<String>,
}

/// Everything creation needs besides the request itself.
#[derive(Debug, Clone, Copy)]
pub struct CreationContext<'a> {
    /// Booking policy snapshot.
    pub settings: &'a BookingSettings,
    /// Vehicle registry snapshot.
    pub vehicles: &'a [Vehicle],
    /// Vehicles already assigned to non-cancelled bookings on the travel date.
    pub assigned_vehicle_ids: &'a HashSet<i64>,
    /// The current instant.
    pub now: OffsetDateTime,
    /// Operator timezone.
    pub timezone: Tz,
}

fn optional_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => validate_text_field(field, &v).map(Some),
        _ => Ok(None),
    }
}

fn optional_notes(value: Option<String>) -> Result<Option<String>, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => validate_message(&v).map(Some),
        _ => Ok(None),
    }
}

/// Validates a booking request against policy and fleet, and builds the
/// booking in its initial state.
///
/// Checks run in order: fields, blocked dates, same-day, lead time, booking
/// window, availability. The first failure is returned.
///
/// # Errors
///
/// Returns `CoreError::DomainViolation` naming the first violated rule.
pub fn create_booking(
    request: BookingRequest,
    context: &CreationContext<'_>,
    booking_id: String,
) -> Result<Booking, CoreError> {
    let name: String = validate_customer_name(&request.customer_name)?;
    let phone: String = normalize_phone(&request.phone)?;
    let email: Option<String> = match request.email {
        Some(e) if !e.trim().is_empty() => Some(validate_email(&e)?),
        _ => None,
    };
    let pickup_location: String = validate_text_field("pickupLocation", &request.pickup_location)?;
    let drop_location: String = validate_text_field("dropLocation", &request.drop_location)?;
    let sub_location: Option<String> = optional_text("subLocation", request.sub_location)?;
    let vehicle_model: Option<String> = optional_text("vehicleModel", request.vehicle_model)?;
    let customer_notes: Option<String> = optional_notes(request.customer_notes)?;
    validate_passenger_count(request.passengers)?;
    validate_total_amount(request.total_amount)?;

    let block = is_blocked(request.travel_date, context.settings);
    if block.blocked {
        return Err(CoreError::DomainViolation(DomainError::DateBlocked {
            name: block.reason.unwrap_or_default(),
            message: block.message.unwrap_or_default(),
            allow_phone_booking: block.allow_phone_booking.unwrap_or(false),
        }));
    }

    check_schedule(
        request.travel_date,
        request.pickup_time,
        context.now,
        context.timezone,
        context.settings,
    )?;

    let availability: AvailabilityResult = calculate_availability(
        request.travel_date,
        Some(request.vehicle_class),
        context.vehicles,
        context.assigned_vehicle_ids,
    );
    if !availability.available {
        return Err(CoreError::DomainViolation(DomainError::NoAvailability {
            class: request.vehicle_class,
            date: request.travel_date,
        }));
    }

    let price_tier: PriceTier = resolve_tier(request.travel_date, context.settings);
    let advance: i64 = advance_amount(request.total_amount);

    let created_entry: CommunicationEntry = CommunicationEntry::system(
        context.now,
        &format!(
            "Booking created for a {} on {} at {} ({} tier). Advance due: Rs. {advance} of Rs. {}.",
            request.vehicle_class,
            format_date(request.travel_date),
            format_pickup_time(request.pickup_time),
            price_tier,
            request.total_amount
        ),
    )?;

    Ok(Booking {
        booking_id,
        created_at: context.now,
        customer: Customer { name, phone, email },
        trip: Trip {
            pickup_location,
            drop_location,
            sub_location,
            travel_date: request.travel_date,
            pickup_time: request.pickup_time,
        },
        vehicle_class: request.vehicle_class,
        vehicle_model,
        passengers: request.passengers,
        price_tier,
        total_amount: request.total_amount,
        advance_amount: advance,
        assigned_vehicle_id: None,
        payment_status: PaymentStatus::Pending,
        status: BookingStatus::Pending,
        payment_transaction_id: None,
        payment_verified_at: None,
        payment_verified_by: None,
        customer_notes,
        admin_notes: None,
        communications: vec![created_entry],
        updated_at: context.now,
    })
}

/// Generates the identifier for a booking created at `now`.
///
/// # Errors
///
/// Returns an error if today's date cannot be resolved in `timezone`.
pub fn booking_id_for(
    now: OffsetDateTime,
    timezone: Tz,
    entropy: u64,
) -> Result<String, CoreError> {
    let today: Date = local_today(now, timezone)?;
    Ok(format_booking_id(today, entropy))
}
