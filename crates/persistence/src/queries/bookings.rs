// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and communication log queries.

use std::collections::{HashMap, HashSet};

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use ride_booking::{Booking, Customer, Trip};
use ride_booking_audit::{Author, CommunicationEntry};
use ride_booking_domain::BookingStatus;
use time::Date;
use tracing::debug;

use crate::data_models::{
    decode_date, decode_enum, decode_optional_timestamp, decode_time, decode_timestamp,
    encode_date,
};
use crate::diesel_schema::{booking_communications, bookings};
use crate::error::PersistenceError;

/// Diesel Queryable struct for booking rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
struct BookingRow {
    booking_row_id: i64,
    booking_id: String,
    created_at: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    pickup_location: String,
    drop_location: String,
    sub_location: Option<String>,
    travel_date: String,
    pickup_time: String,
    vehicle_class: String,
    vehicle_model: Option<String>,
    passengers: i32,
    price_tier: String,
    total_amount: i64,
    advance_amount: i64,
    assigned_vehicle_id: Option<i64>,
    payment_status: String,
    status: String,
    payment_transaction_id: Option<String>,
    payment_verified_at: Option<String>,
    payment_verified_by: Option<String>,
    customer_notes: Option<String>,
    admin_notes: Option<String>,
    updated_at: String,
}

/// Diesel Queryable struct for communication rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_communications)]
struct CommunicationRow {
    booking_row_id: i64,
    recorded_at: String,
    channel: String,
    message: String,
    author: String,
}

fn entry_from_row(row: CommunicationRow) -> Result<CommunicationEntry, PersistenceError> {
    Ok(CommunicationEntry {
        timestamp: decode_timestamp(&row.recorded_at)?,
        channel: decode_enum(&row.channel)?,
        message: row.message,
        author: Author::from_stored(&row.author),
    })
}

fn booking_from_row(
    row: BookingRow,
    communications: Vec<CommunicationEntry>,
) -> Result<Booking, PersistenceError> {
    let passengers: u32 = row.passengers.to_u32().ok_or_else(|| {
        PersistenceError::CorruptRecord(format!(
            "booking {} has passenger count {}",
            row.booking_id, row.passengers
        ))
    })?;

    Ok(Booking {
        created_at: decode_timestamp(&row.created_at)?,
        customer: Customer {
            name: row.customer_name,
            phone: row.customer_phone,
            email: row.customer_email,
        },
        trip: Trip {
            pickup_location: row.pickup_location,
            drop_location: row.drop_location,
            sub_location: row.sub_location,
            travel_date: decode_date(&row.travel_date)?,
            pickup_time: decode_time(&row.pickup_time)?,
        },
        vehicle_class: decode_enum(&row.vehicle_class)?,
        vehicle_model: row.vehicle_model,
        passengers,
        price_tier: decode_enum(&row.price_tier)?,
        total_amount: row.total_amount,
        advance_amount: row.advance_amount,
        assigned_vehicle_id: row.assigned_vehicle_id,
        payment_status: decode_enum(&row.payment_status)?,
        status: decode_enum(&row.status)?,
        payment_transaction_id: row.payment_transaction_id,
        payment_verified_at: decode_optional_timestamp(row.payment_verified_at.as_deref())?,
        payment_verified_by: row.payment_verified_by,
        customer_notes: row.customer_notes,
        admin_notes: row.admin_notes,
        communications,
        updated_at: decode_timestamp(&row.updated_at)?,
        booking_id: row.booking_id,
    })
}

/// Loads the communication logs for a set of booking rows, oldest entry first.
fn load_communications(
    conn: &mut SqliteConnection,
    row_ids: &[i64],
) -> Result<HashMap<i64, Vec<CommunicationEntry>>, PersistenceError> {
    let rows: Vec<CommunicationRow> = booking_communications::table
        .filter(booking_communications::booking_row_id.eq_any(row_ids))
        .select(CommunicationRow::as_select())
        .order_by(booking_communications::communication_id.asc())
        .load(conn)?;

    let mut by_booking: HashMap<i64, Vec<CommunicationEntry>> = HashMap::new();
    for row in rows {
        let booking_row_id: i64 = row.booking_row_id;
        by_booking
            .entry(booking_row_id)
            .or_default()
            .push(entry_from_row(row)?);
    }
    Ok(by_booking)
}

fn assemble(
    conn: &mut SqliteConnection,
    rows: Vec<BookingRow>,
) -> Result<Vec<Booking>, PersistenceError> {
    let row_ids: Vec<i64> = rows.iter().map(|row| row.booking_row_id).collect();
    let mut logs: HashMap<i64, Vec<CommunicationEntry>> = load_communications(conn, &row_ids)?;

    rows.into_iter()
        .map(|row| {
            let log: Vec<CommunicationEntry> =
                logs.remove(&row.booking_row_id).unwrap_or_default();
            booking_from_row(row, log)
        })
        .collect()
}

/// Returns the internal row ID for a booking.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_booking_row_id(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(bookings::booking_row_id)
        .first(conn)
        .optional()?)
}

/// Retrieves a booking and its full communication log.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
/// Returns `Ok(None)` if the booking is not found.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> Result<Option<Booking>, PersistenceError> {
    debug!(booking_id, "Looking up booking");

    let row: Option<BookingRow> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(assemble(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Lists every booking made with a phone number, newest first.
///
/// Cancelled and completed bookings are included.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `phone` - The normalized 10-digit phone number
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_bookings_by_phone(
    conn: &mut SqliteConnection,
    phone: &str,
) -> Result<Vec<Booking>, PersistenceError> {
    debug!("Listing bookings by phone");

    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::customer_phone.eq(phone))
        .select(BookingRow::as_select())
        .order_by(bookings::booking_row_id.desc())
        .load(conn)?;

    assemble(conn, rows)
}

/// Returns the vehicles explicitly assigned to non-cancelled bookings on a date.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn assigned_vehicle_ids_on(
    conn: &mut SqliteConnection,
    travel_date: Date,
) -> Result<HashSet<i64>, PersistenceError> {
    let ids: Vec<Option<i64>> = bookings::table
        .filter(bookings::travel_date.eq(encode_date(travel_date)))
        .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
        .filter(bookings::assigned_vehicle_id.is_not_null())
        .select(bookings::assigned_vehicle_id)
        .load(conn)?;

    let assigned: HashSet<i64> = ids.into_iter().flatten().collect();
    debug!(%travel_date, assigned = assigned.len(), "Loaded vehicle assignments");
    Ok(assigned)
}

/// Returns the booking holding a vehicle on a date, if any.
///
/// Cancelled bookings release their vehicle.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn booking_holding_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    travel_date: Date,
) -> Result<Option<String>, PersistenceError> {
    Ok(bookings::table
        .filter(bookings::travel_date.eq(encode_date(travel_date)))
        .filter(bookings::status.ne(BookingStatus::Cancelled.as_str()))
        .filter(bookings::assigned_vehicle_id.eq(vehicle_id))
        .select(bookings::booking_id)
        .order_by(bookings::booking_row_id.asc())
        .first(conn)
        .optional()?)
}
