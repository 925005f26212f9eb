// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fleet registry queries.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use ride_booking_domain::{DateRange, Vehicle, VehicleBlock, VehicleClass};
use tracing::debug;

use crate::data_models::{decode_date, decode_enum};
use crate::diesel_schema::{vehicle_blocked_dates, vehicles};
use crate::error::PersistenceError;

/// Diesel Queryable struct for vehicle rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vehicles)]
struct VehicleRow {
    vehicle_id: i64,
    registration: String,
    display_name: String,
    vehicle_class: String,
    model: Option<String>,
    seats: i32,
    is_active: i32,
    maintenance_mode: i32,
}

/// Diesel Queryable struct for vehicle block rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vehicle_blocked_dates)]
struct BlockRow {
    vehicle_id: i64,
    start_date: String,
    end_date: String,
    reason: String,
}

fn block_from_row(row: BlockRow) -> Result<VehicleBlock, PersistenceError> {
    Ok(VehicleBlock {
        range: DateRange {
            start: decode_date(&row.start_date)?,
            end: decode_date(&row.end_date)?,
        },
        reason: row.reason,
    })
}

fn vehicle_from_row(
    row: VehicleRow,
    blocked_dates: Vec<VehicleBlock>,
) -> Result<Vehicle, PersistenceError> {
    let class: VehicleClass = decode_enum(&row.vehicle_class)?;
    let seats: u8 = row.seats.to_u8().ok_or_else(|| {
        PersistenceError::CorruptRecord(format!(
            "vehicle {} has seat count {}",
            row.vehicle_id, row.seats
        ))
    })?;

    Ok(Vehicle {
        vehicle_id: Some(row.vehicle_id),
        registration: row.registration,
        display_name: row.display_name,
        class,
        model: row.model,
        seats,
        is_active: row.is_active != 0,
        maintenance_mode: row.maintenance_mode != 0,
        blocked_dates,
    })
}

/// Lists every registered vehicle with its blocked date ranges.
///
/// Vehicles are returned in registration order; blocks keep the order
/// they were recorded in.
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be decoded.
pub fn list_vehicles(conn: &mut SqliteConnection) -> Result<Vec<Vehicle>, PersistenceError> {
    debug!("Listing vehicles");

    let rows: Vec<VehicleRow> = vehicles::table
        .select(VehicleRow::as_select())
        .order_by(vehicles::vehicle_id.asc())
        .load(conn)?;

    let block_rows: Vec<BlockRow> = vehicle_blocked_dates::table
        .select(BlockRow::as_select())
        .order_by(vehicle_blocked_dates::block_id.asc())
        .load(conn)?;

    let mut blocks_by_vehicle: HashMap<i64, Vec<VehicleBlock>> = HashMap::new();
    for block in block_rows {
        let vehicle_id: i64 = block.vehicle_id;
        blocks_by_vehicle
            .entry(vehicle_id)
            .or_default()
            .push(block_from_row(block)?);
    }

    rows.into_iter()
        .map(|row| {
            let blocks: Vec<VehicleBlock> = blocks_by_vehicle
                .remove(&row.vehicle_id)
                .unwrap_or_default();
            vehicle_from_row(row, blocks)
        })
        .collect()
}

/// Retrieves a vehicle by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the vehicle is not found.
pub fn get_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<Option<Vehicle>, PersistenceError> {
    debug!(vehicle_id, "Looking up vehicle");

    let result: Result<VehicleRow, diesel::result::Error> = vehicles::table
        .filter(vehicles::vehicle_id.eq(vehicle_id))
        .select(VehicleRow::as_select())
        .first(conn);

    let row: VehicleRow = match result {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => return Ok(None),
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let blocks: Vec<VehicleBlock> = vehicle_blocked_dates::table
        .filter(vehicle_blocked_dates::vehicle_id.eq(vehicle_id))
        .select(BlockRow::as_select())
        .order_by(vehicle_blocked_dates::block_id.asc())
        .load::<BlockRow>(conn)?
        .into_iter()
        .map(block_from_row)
        .collect::<Result<_, _>>()?;

    vehicle_from_row(row, blocks).map(Some)
}
