// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Field names are camelCase on the wire. Dates are `YYYY-MM-DD`, pickup
//! times `HH:MM` and timestamps RFC 3339 in UTC.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

// ============================================================================
// Public requests
// ============================================================================

/// API request to create a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Customer name.
    pub customer_name: String,
    /// Customer phone, any common Indian format.
    pub phone: String,
    /// Optional email.
    #[serde(default)]
    pub email: Option<String>,
    /// Pickup point.
    pub pickup_location: String,
    /// Destination.
    pub drop_location: String,
    /// Optional landmark or terminal.
    #[serde(default)]
    pub sub_location: Option<String>,
    /// Travel date, `YYYY-MM-DD`.
    pub travel_date: String,
    /// Pickup time, `HH:MM`.
    pub pickup_time: String,
    /// Requested vehicle class.
    pub vehicle_class: String,
    /// Requested model.
    #[serde(default)]
    pub vehicle_model: Option<String>,
    /// Number of travellers.
    pub passengers: u32,
    /// Quoted total in whole rupees.
    pub total_amount: i64,
    /// Notes for the operator.
    #[serde(default)]
    pub customer_notes: Option<String>,
}

/// API request from a customer reporting an advance payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaimRequest {
    /// Phone the booking was made with.
    pub phone: String,
    /// Bank or UPI reference.
    pub transaction_id: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

// ============================================================================
// Operator requests
// ============================================================================

/// API request to verify, reject or refund an advance payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// The booking.
    pub booking_id: String,
    /// One of `verify`, `reject`, `refund`.
    pub action: String,
    /// Bank or UPI reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Operator remark.
    #[serde(default)]
    pub notes: Option<String>,
}

/// API request to change status, assignment or admin notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// The booking.
    pub booking_id: String,
    /// New status.
    #[serde(default)]
    pub status: Option<String>,
    /// Vehicle to assign.
    #[serde(default)]
    pub assigned_vehicle_id: Option<i64>,
    /// Replacement admin notes.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// API request to log a conversation with the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommunicationRequest {
    /// The booking.
    pub booking_id: String,
    /// One of `phone`, `whatsapp`, `email`, `sms`, `note`.
    pub channel: String,
    /// What was said.
    pub message: String,
}

/// A planned unavailability window for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleBlockInfo {
    /// First blocked day.
    pub start_date: String,
    /// Last blocked day (inclusive).
    pub end_date: String,
    /// Why the vehicle is off the road.
    pub reason: String,
}

/// API request to register or replace a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    /// Registration plate.
    pub registration: String,
    /// Friendly name.
    pub display_name: String,
    /// Fleet class.
    pub vehicle_class: String,
    /// Model.
    #[serde(default)]
    pub model: Option<String>,
    /// Passenger seats.
    pub seats: u8,
    /// Whether the vehicle is in service.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether the vehicle is in the workshop.
    #[serde(default)]
    pub maintenance_mode: bool,
    /// Planned unavailability.
    #[serde(default)]
    pub blocked_dates: Vec<VehicleBlockInfo>,
}

/// A season as configured by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    /// Season name.
    pub name: String,
    /// Tier in effect.
    pub tier: String,
    /// First day.
    pub start_date: String,
    /// Last day (inclusive).
    pub end_date: String,
}

/// A blocked range as configured by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedRangeInfo {
    /// Range name.
    pub name: String,
    /// First day.
    pub start_date: String,
    /// Last day (inclusive).
    pub end_date: String,
    /// Message shown to customers.
    #[serde(default)]
    pub message: Option<String>,
    /// Whether phone booking is still offered.
    #[serde(default)]
    pub allow_phone_booking: bool,
}

/// API request to replace the booking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    /// Tier used outside every season.
    pub default_tier: String,
    /// Seasons, first match wins.
    #[serde(default)]
    pub seasons: Vec<SeasonInfo>,
    /// Blocked ranges, first match wins.
    #[serde(default)]
    pub blocked_dates: Vec<BlockedRangeInfo>,
    /// Minimum hours between booking and pickup.
    pub min_advance_hours: u32,
    /// Maximum days ahead a booking may be placed.
    pub max_advance_days: u32,
    /// Whether bookings for today are accepted.
    pub allow_same_day: bool,
}

/// API request to create an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperatorRequest {
    /// Login name, case-insensitive.
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// Initial password.
    pub password: String,
    /// Password confirmation.
    pub password_confirmation: String,
    /// `Admin` or `Dispatcher`.
    pub role: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Response carrying only the success flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always true.
    pub success: bool,
    /// Always `ok`.
    pub status: String,
}

/// Anti-forgery token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    /// Always true.
    pub success: bool,
    /// Token to echo on mutating requests.
    pub csrf_token: String,
}

/// API response for a created booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    /// Always true.
    pub success: bool,
    /// Generated identifier.
    pub booking_id: String,
    /// Booking status.
    pub status: String,
    /// Payment status.
    pub payment_status: String,
    /// Advance owed in whole rupees.
    pub advance_amount: i64,
    /// Total in whole rupees.
    pub total_amount: i64,
    /// Tier resolved from the travel date.
    pub price_tier: String,
}

/// One communication log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationInfo {
    /// When the entry was written.
    pub timestamp: String,
    /// Channel.
    pub channel: String,
    /// Message body.
    pub message: String,
    /// `system`, `customer` or an operator login.
    pub author: String,
}

/// A booking as seen by operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub booking_id: String,
    pub created_at: String,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub pickup_location: String,
    pub drop_location: String,
    pub sub_location: Option<String>,
    pub travel_date: String,
    pub pickup_time: String,
    pub vehicle_class: String,
    pub vehicle_model: Option<String>,
    pub passengers: u32,
    pub price_tier: String,
    pub total_amount: i64,
    pub advance_amount: i64,
    pub assigned_vehicle_id: Option<i64>,
    pub payment_status: String,
    pub status: String,
    pub payment_transaction_id: Option<String>,
    pub payment_verified_at: Option<String>,
    pub payment_verified_by: Option<String>,
    pub customer_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub communications: Vec<CommunicationInfo>,
    pub updated_at: String,
}

/// API response carrying one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Always true.
    pub success: bool,
    /// The booking.
    pub booking: BookingInfo,
}

/// A booking as seen by the customer who made it.
///
/// Operator notes and verification details are not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub booking_id: String,
    pub created_at: String,
    pub pickup_location: String,
    pub drop_location: String,
    pub travel_date: String,
    pub pickup_time: String,
    pub vehicle_class: String,
    pub passengers: u32,
    pub price_tier: String,
    pub total_amount: i64,
    pub advance_amount: i64,
    pub status: String,
    pub payment_status: String,
}

/// API response for a customer's booking lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    /// Always true.
    pub success: bool,
    /// Newest first.
    pub bookings: Vec<BookingSummary>,
}

/// API response for a recorded payment claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClaimResponse {
    /// Always true.
    pub success: bool,
    /// The booking.
    pub booking_id: String,
    /// Payment status after the claim.
    pub payment_status: String,
}

/// Free and total vehicles of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAvailabilityInfo {
    /// The class.
    pub class: String,
    /// Registered vehicles.
    pub total: u32,
    /// Free vehicles on the date.
    pub available: u32,
}

/// API response for an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Always true.
    pub success: bool,
    /// Whether at least one matching vehicle is free.
    pub available: bool,
    /// Free vehicles in scope, `-1` when the fleet is not configured.
    pub available_count: i64,
    /// Registered vehicles in scope.
    pub total_count: i64,
    /// Every class, in display order.
    pub per_class: Vec<ClassAvailabilityInfo>,
}

/// API response describing the booking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    /// Always true.
    pub success: bool,
    /// Tier used outside every season.
    pub default_tier: String,
    /// Seasons, in priority order.
    pub seasons: Vec<SeasonInfo>,
    /// Blocked ranges, in priority order.
    pub blocked_dates: Vec<BlockedRangeInfo>,
    /// Minimum lead time.
    pub min_advance_hours: u32,
    /// Booking window.
    pub max_advance_days: u32,
    /// Whether same-day booking is accepted.
    pub allow_same_day: bool,
}

/// A registered vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub vehicle_id: i64,
    pub registration: String,
    pub display_name: String,
    pub vehicle_class: String,
    pub model: Option<String>,
    pub seats: u8,
    pub is_active: bool,
    pub maintenance_mode: bool,
    pub blocked_dates: Vec<VehicleBlockInfo>,
}

/// API response carrying one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleResponse {
    /// Always true.
    pub success: bool,
    /// The vehicle.
    pub vehicle: VehicleInfo,
}

/// API response listing the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVehiclesResponse {
    /// Always true.
    pub success: bool,
    /// Vehicles in registration order.
    pub vehicles: Vec<VehicleInfo>,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always true.
    pub success: bool,
    /// The session token (opaque).
    pub session_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The operator's role.
    pub role: String,
    /// Session expiration timestamp.
    pub expires_at: String,
}

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorInfo {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// API response carrying one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorResponse {
    /// Always true.
    pub success: bool,
    /// The operator.
    pub operator: OperatorInfo,
}

/// API response listing operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOperatorsResponse {
    /// Always true.
    pub success: bool,
    /// Operators ordered by login name.
    pub operators: Vec<OperatorInfo>,
}
