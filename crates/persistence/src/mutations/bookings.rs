// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! Every write here commits the booking row and its new communication
//! entries in a single transaction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use ride_booking::{Booking, TransitionResult};
use ride_booking_audit::CommunicationEntry;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{encode_date, encode_time, encode_timestamp};
use crate::diesel_schema::{booking_communications, bookings};
use crate::error::{PersistenceError, is_unique_violation};
use crate::queries::bookings::get_booking_row_id;

fn passengers_column(booking: &Booking) -> Result<i32, PersistenceError> {
    booking.passengers.to_i32().ok_or_else(|| {
        PersistenceError::Other(format!(
            "Passenger count {} out of range",
            booking.passengers
        ))
    })
}

fn append_entries(
    conn: &mut SqliteConnection,
    booking_row_id: i64,
    entries: &[CommunicationEntry],
) -> Result<(), PersistenceError> {
    for entry in entries {
        diesel::insert_into(booking_communications::table)
            .values((
                booking_communications::booking_row_id.eq(booking_row_id),
                booking_communications::recorded_at.eq(encode_timestamp(entry.timestamp)?),
                booking_communications::channel.eq(entry.channel.as_str()),
                booking_communications::message.eq(&entry.message),
                booking_communications::author.eq(entry.author.as_str()),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts a new booking together with its initial communication log.
///
/// # Errors
///
/// Returns `DuplicateBookingId` if the identifier is already taken; the
/// caller may regenerate it and retry.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<i64, PersistenceError> {
    let passengers: i32 = passengers_column(booking)?;
    let verified_at: Option<String> = booking
        .payment_verified_at
        .map(encode_timestamp)
        .transpose()?;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(bookings::table)
            .values((
                bookings::booking_id.eq(&booking.booking_id),
                bookings::created_at.eq(encode_timestamp(booking.created_at)?),
                bookings::customer_name.eq(&booking.customer.name),
                bookings::customer_phone.eq(&booking.customer.phone),
                bookings::customer_email.eq(booking.customer.email.as_deref()),
                bookings::pickup_location.eq(&booking.trip.pickup_location),
                bookings::drop_location.eq(&booking.trip.drop_location),
                bookings::sub_location.eq(booking.trip.sub_location.as_deref()),
                bookings::travel_date.eq(encode_date(booking.trip.travel_date)),
                bookings::pickup_time.eq(encode_time(booking.trip.pickup_time)),
                bookings::vehicle_class.eq(booking.vehicle_class.as_str()),
                bookings::vehicle_model.eq(booking.vehicle_model.as_deref()),
                bookings::passengers.eq(passengers),
                bookings::price_tier.eq(booking.price_tier.as_str()),
                bookings::total_amount.eq(booking.total_amount),
                bookings::advance_amount.eq(booking.advance_amount),
                bookings::assigned_vehicle_id.eq(booking.assigned_vehicle_id),
                bookings::payment_status.eq(booking.payment_status.as_str()),
                bookings::status.eq(booking.status.as_str()),
                bookings::payment_transaction_id.eq(booking.payment_transaction_id.as_deref()),
                bookings::payment_verified_at.eq(verified_at.as_deref()),
                bookings::payment_verified_by.eq(booking.payment_verified_by.as_deref()),
                bookings::customer_notes.eq(booking.customer_notes.as_deref()),
                bookings::admin_notes.eq(booking.admin_notes.as_deref()),
                bookings::updated_at.eq(encode_timestamp(booking.updated_at)?),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::DuplicateBookingId(booking.booking_id.clone())
                } else {
                    PersistenceError::from(e)
                }
            })?;

        let booking_row_id: i64 = get_last_insert_rowid(conn)?;
        append_entries(conn, booking_row_id, &booking.communications)?;

        info!(
            booking_id = %booking.booking_id,
            booking_row_id,
            entries = booking.communications.len(),
            "Inserted booking"
        );
        Ok(booking_row_id)
    })
}

/// Persists a transition: the booking's mutable fields and the new log entries.
///
/// A no-op transition writes nothing.
///
/// # Errors
///
/// Returns `BookingNotFound` if the booking does not exist.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<(), PersistenceError> {
    let booking: &Booking = &result.new_booking;
    if result.is_noop() {
        debug!(booking_id = %booking.booking_id, "Transition changed nothing");
        return Ok(());
    }

    let verified_at: Option<String> = booking
        .payment_verified_at
        .map(encode_timestamp)
        .transpose()?;
    let updated_at: String = encode_timestamp(booking.updated_at)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let booking_row_id: i64 = get_booking_row_id(conn, &booking.booking_id)?
            .ok_or_else(|| PersistenceError::BookingNotFound(booking.booking_id.clone()))?;

        diesel::update(bookings::table)
            .filter(bookings::booking_row_id.eq(booking_row_id))
            .set((
                bookings::assigned_vehicle_id.eq(booking.assigned_vehicle_id),
                bookings::payment_status.eq(booking.payment_status.as_str()),
                bookings::status.eq(booking.status.as_str()),
                bookings::payment_transaction_id.eq(booking.payment_transaction_id.as_deref()),
                bookings::payment_verified_at.eq(verified_at.as_deref()),
                bookings::payment_verified_by.eq(booking.payment_verified_by.as_deref()),
                bookings::admin_notes.eq(booking.admin_notes.as_deref()),
                bookings::updated_at.eq(&updated_at),
            ))
            .execute(conn)?;

        append_entries(conn, booking_row_id, &result.new_entries)?;

        info!(
            booking_id = %booking.booking_id,
            status = %booking.status,
            payment_status = %booking.payment_status,
            entries = result.new_entries.len(),
            "Persisted transition"
        );
        Ok(())
    })
}
