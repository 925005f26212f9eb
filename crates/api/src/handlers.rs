// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each handler is one unit of work against persistence: load the policy
//! snapshot and the records it needs, run the pure core function, persist
//! the result. Handlers never see HTTP types.

use std::collections::HashSet;
use std::str::FromStr;

use ride_booking::{
    Booking, BookingRequest, Command, CreationContext, TransitionResult, VehicleAssignment, apply,
    booking_id_for, is_booking_id,
};
use ride_booking_audit::{Author, Channel, CommunicationEntry};
use ride_booking_domain::{
    AvailabilityResult, BlockedRange, BookingSettings, BookingStatus, DateRange, DomainError,
    MAX_PASSENGERS, PriceTier, SeasonRange, Tz, Vehicle, VehicleBlock, VehicleClass,
    calculate_availability, format_date, format_pickup_time, normalize_phone,
    normalize_registration, parse_date, parse_pickup_time, validate_settings, validate_text_field,
};
use ride_booking_persistence::{OperatorData, Persistence, PersistenceError};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, Time, UtcOffset};
use tracing::{debug, info, warn};

use crate::auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, IssuedSession, Role,
};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notification::NotificationEvent;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AddCommunicationRequest, AvailabilityResponse, BlockedRangeInfo, BookingInfo, BookingResponse,
    BookingSummary, ClassAvailabilityInfo, CommunicationInfo, CreateBookingRequest,
    CreateBookingResponse, CreateOperatorRequest, ListBookingsResponse, ListOperatorsResponse,
    ListVehiclesResponse, LoginRequest, LoginResponse, OperatorInfo, OperatorResponse,
    PaymentClaimRequest, PaymentClaimResponse, SeasonInfo, SettingsResponse, UpdateSettingsRequest,
    UpdateStatusRequest, VehicleBlockInfo, VehicleInfo, VehicleRequest, VehicleResponse,
    VerifyPaymentRequest,
};

/// How many identifiers are tried before a booking is given up on.
pub const MAX_BOOKING_ID_ATTEMPTS: u32 = 5;

/// Display name given to the operator created at first start.
pub const BOOTSTRAP_ADMIN_DISPLAY_NAME: &str = "Administrator";

// ============================================================================
// Conversions
// ============================================================================

fn format_timestamp(value: OffsetDateTime) -> Result<String, ApiError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

fn communication_info(entry: &CommunicationEntry) -> Result<CommunicationInfo, ApiError> {
    Ok(CommunicationInfo {
        timestamp: format_timestamp(entry.timestamp)?,
        channel: entry.channel.as_str().to_string(),
        message: entry.message.clone(),
        author: entry.author.as_str().to_string(),
    })
}

fn booking_info(booking: &Booking) -> Result<BookingInfo, ApiError> {
    let communications: Vec<CommunicationInfo> = booking
        .communications
        .iter()
        .map(communication_info)
        .collect::<Result<_, _>>()?;

    Ok(BookingInfo {
        booking_id: booking.booking_id.clone(),
        created_at: format_timestamp(booking.created_at)?,
        customer_name: booking.customer.name.clone(),
        phone: booking.customer.phone.clone(),
        email: booking.customer.email.clone(),
        pickup_location: booking.trip.pickup_location.clone(),
        drop_location: booking.trip.drop_location.clone(),
        sub_location: booking.trip.sub_location.clone(),
        travel_date: format_date(booking.trip.travel_date),
        pickup_time: format_pickup_time(booking.trip.pickup_time),
        vehicle_class: booking.vehicle_class.as_str().to_string(),
        vehicle_model: booking.vehicle_model.clone(),
        passengers: booking.passengers,
        price_tier: booking.price_tier.as_str().to_string(),
        total_amount: booking.total_amount,
        advance_amount: booking.advance_amount,
        assigned_vehicle_id: booking.assigned_vehicle_id,
        payment_status: booking.payment_status.as_str().to_string(),
        status: booking.status.as_str().to_string(),
        payment_transaction_id: booking.payment_transaction_id.clone(),
        payment_verified_at: booking
            .payment_verified_at
            .map(format_timestamp)
            .transpose()?,
        payment_verified_by: booking.payment_verified_by.clone(),
        customer_notes: booking.customer_notes.clone(),
        admin_notes: booking.admin_notes.clone(),
        communications,
        updated_at: format_timestamp(booking.updated_at)?,
    })
}

fn booking_summary(booking: &Booking) -> Result<BookingSummary, ApiError> {
    Ok(BookingSummary {
        booking_id: booking.booking_id.clone(),
        created_at: format_timestamp(booking.created_at)?,
        pickup_location: booking.trip.pickup_location.clone(),
        drop_location: booking.trip.drop_location.clone(),
        travel_date: format_date(booking.trip.travel_date),
        pickup_time: format_pickup_time(booking.trip.pickup_time),
        vehicle_class: booking.vehicle_class.as_str().to_string(),
        passengers: booking.passengers,
        price_tier: booking.price_tier.as_str().to_string(),
        total_amount: booking.total_amount,
        advance_amount: booking.advance_amount,
        status: booking.status.as_str().to_string(),
        payment_status: booking.payment_status.as_str().to_string(),
    })
}

fn vehicle_info(vehicle_id: i64, vehicle: &Vehicle) -> VehicleInfo {
    VehicleInfo {
        vehicle_id,
        registration: vehicle.registration.clone(),
        display_name: vehicle.display_name.clone(),
        vehicle_class: vehicle.class.as_str().to_string(),
        model: vehicle.model.clone(),
        seats: vehicle.seats,
        is_active: vehicle.is_active,
        maintenance_mode: vehicle.maintenance_mode,
        blocked_dates: vehicle
            .blocked_dates
            .iter()
            .map(|block| VehicleBlockInfo {
                start_date: format_date(block.range.start),
                end_date: format_date(block.range.end),
                reason: block.reason.clone(),
            })
            .collect(),
    }
}

fn settings_response(settings: &BookingSettings) -> SettingsResponse {
    SettingsResponse {
        success: true,
        default_tier: settings.default_tier.as_str().to_string(),
        seasons: settings
            .seasons
            .iter()
            .map(|season| SeasonInfo {
                name: season.name.clone(),
                tier: season.tier.as_str().to_string(),
                start_date: format_date(season.range.start),
                end_date: format_date(season.range.end),
            })
            .collect(),
        blocked_dates: settings
            .blocked_ranges
            .iter()
            .map(|blocked| BlockedRangeInfo {
                name: blocked.name.clone(),
                start_date: format_date(blocked.range.start),
                end_date: format_date(blocked.range.end),
                message: blocked.message.clone(),
                allow_phone_booking: blocked.allow_phone_booking,
            })
            .collect(),
        min_advance_hours: settings.min_advance_hours,
        max_advance_days: settings.max_advance_days,
        allow_same_day: settings.allow_same_day,
    }
}

fn operator_info(operator: OperatorData) -> OperatorInfo {
    OperatorInfo {
        operator_id: operator.operator_id,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: operator.role,
        is_disabled: operator.is_disabled,
        created_at: operator.created_at,
        last_login_at: operator.last_login_at,
    }
}

fn parse_input_date(value: &str) -> Result<Date, ApiError> {
    parse_date(value.trim()).map_err(translate_domain_error)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_booking_request(request: CreateBookingRequest) -> Result<BookingRequest, ApiError> {
    let travel_date: Date = parse_input_date(&request.travel_date)?;
    let pickup_time: Time =
        parse_pickup_time(request.pickup_time.trim()).map_err(translate_domain_error)?;
    let vehicle_class: VehicleClass =
        VehicleClass::from_str(&request.vehicle_class).map_err(translate_domain_error)?;

    Ok(BookingRequest {
        customer_name: request.customer_name,
        phone: request.phone,
        email: request.email,
        pickup_location: request.pickup_location,
        drop_location: request.drop_location,
        sub_location: request.sub_location,
        travel_date,
        pickup_time,
        vehicle_class,
        vehicle_model: request.vehicle_model,
        passengers: request.passengers,
        total_amount: request.total_amount,
        customer_notes: request.customer_notes,
    })
}

fn vehicle_from_request(
    request: VehicleRequest,
    vehicle_id: Option<i64>,
) -> Result<Vehicle, ApiError> {
    let registration: String =
        normalize_registration(&request.registration).map_err(translate_domain_error)?;
    let display_name: String =
        validate_text_field("displayName", &request.display_name).map_err(translate_domain_error)?;
    let class: VehicleClass =
        VehicleClass::from_str(&request.vehicle_class).map_err(translate_domain_error)?;
    let model: Option<String> = match non_empty(request.model) {
        Some(m) => Some(validate_text_field("model", &m).map_err(translate_domain_error)?),
        None => None,
    };

    if request.seats == 0 || u32::from(request.seats) > MAX_PASSENGERS {
        return Err(ApiError::InvalidInput {
            field: String::from("seats"),
            message: format!("Seats must be between 1 and {MAX_PASSENGERS}"),
        });
    }

    let mut blocked_dates: Vec<VehicleBlock> = Vec::with_capacity(request.blocked_dates.len());
    for block in request.blocked_dates {
        let reason: String =
            validate_text_field("reason", &block.reason).map_err(translate_domain_error)?;
        let range: DateRange = DateRange::new(
            &reason,
            parse_input_date(&block.start_date)?,
            parse_input_date(&block.end_date)?,
        )
        .map_err(translate_domain_error)?;
        blocked_dates.push(VehicleBlock { range, reason });
    }

    Ok(Vehicle {
        vehicle_id,
        registration,
        display_name,
        class,
        model,
        seats: request.seats,
        is_active: request.is_active,
        maintenance_mode: request.maintenance_mode,
        blocked_dates,
    })
}

fn settings_from_request(request: UpdateSettingsRequest) -> Result<BookingSettings, ApiError> {
    let default_tier: PriceTier =
        PriceTier::from_str(&request.default_tier).map_err(translate_domain_error)?;

    let mut seasons: Vec<SeasonRange> = Vec::with_capacity(request.seasons.len());
    for season in request.seasons {
        let name: String = season.name.trim().to_string();
        let range: DateRange = DateRange::new(
            &name,
            parse_input_date(&season.start_date)?,
            parse_input_date(&season.end_date)?,
        )
        .map_err(translate_domain_error)?;
        seasons.push(SeasonRange {
            tier: PriceTier::from_str(&season.tier).map_err(translate_domain_error)?,
            name,
            range,
        });
    }

    let mut blocked_ranges: Vec<BlockedRange> = Vec::with_capacity(request.blocked_dates.len());
    for blocked in request.blocked_dates {
        let name: String = blocked.name.trim().to_string();
        let range: DateRange = DateRange::new(
            &name,
            parse_input_date(&blocked.start_date)?,
            parse_input_date(&blocked.end_date)?,
        )
        .map_err(translate_domain_error)?;
        blocked_ranges.push(BlockedRange {
            name,
            range,
            message: non_empty(blocked.message),
            allow_phone_booking: blocked.allow_phone_booking,
        });
    }

    Ok(BookingSettings {
        default_tier,
        seasons,
        blocked_ranges,
        min_advance_hours: request.min_advance_hours,
        max_advance_days: request.max_advance_days,
        allow_same_day: request.allow_same_day,
    })
}

fn load_booking(persistence: &mut Persistence, booking_id: &str) -> Result<Booking, ApiError> {
    let booking_id: &str = booking_id.trim();
    if !is_booking_id(booking_id) {
        debug!(booking_id, "Malformed booking id");
        return Err(translate_domain_error(DomainError::BookingNotFound(
            booking_id.to_string(),
        )));
    }
    debug!(booking_id, "Loading booking");
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::BookingNotFound(booking_id.to_string())))
}

fn apply_and_persist(
    persistence: &mut Persistence,
    booking: &Booking,
    command: Command,
    author: &Author,
    now: OffsetDateTime,
) -> Result<TransitionResult, ApiError> {
    let command_name: &'static str = command.name();
    let result: TransitionResult = apply(booking, command, author, now).map_err(|e| {
        let err: ApiError = translate_core_error(e);
        info!(
            booking_id = %booking.booking_id,
            command = command_name,
            %err,
            "Transition refused"
        );
        err
    })?;

    persistence
        .persist_transition(&result)
        .map_err(translate_persistence_error)?;

    info!(
        booking_id = %booking.booking_id,
        command = command_name,
        author = %author,
        entries = result.new_entries.len(),
        "Transition applied"
    );
    Ok(result)
}

fn new_booking_id(
    now: OffsetDateTime,
    timezone: Tz,
    entropy: &mut impl FnMut() -> u64,
) -> Result<String, ApiError> {
    booking_id_for(now, timezone, entropy()).map_err(translate_core_error)
}

// ============================================================================
// Public booking flow
// ============================================================================

/// Creates a booking from a customer request.
///
/// The policy snapshot, fleet and same-day assignments are loaded once. On a
/// booking id collision a new id is drawn, up to
/// [`MAX_BOOKING_ID_ATTEMPTS`] times.
///
/// # Returns
///
/// The response and the notification event to dispatch.
///
/// # Errors
///
/// Returns an error if:
/// - A field is missing or malformed
/// - The date is blocked, too soon, too far ahead, or same-day is disabled
/// - No vehicle of the class is free on the date
/// - Database operations fail
pub fn create_booking(
    persistence: &mut Persistence,
    request: CreateBookingRequest,
    now: OffsetDateTime,
    timezone: Tz,
) -> Result<(CreateBookingResponse, NotificationEvent), ApiError> {
    create_booking_with_entropy(persistence, request, now, timezone, &mut rand::random::<u64>)
}

/// Creates a booking, drawing identifier suffixes from `entropy`.
///
/// # Errors
///
/// As [`create_booking`].
pub fn create_booking_with_entropy(
    persistence: &mut Persistence,
    request: CreateBookingRequest,
    now: OffsetDateTime,
    timezone: Tz,
    entropy: &mut impl FnMut() -> u64,
) -> Result<(CreateBookingResponse, NotificationEvent), ApiError> {
    let booking_request: BookingRequest = parse_booking_request(request).map_err(|err| {
        debug!(%err, "Malformed booking request");
        err
    })?;

    let settings: BookingSettings = persistence
        .get_settings()
        .map_err(translate_persistence_error)?;
    let vehicles: Vec<Vehicle> = persistence
        .list_vehicles()
        .map_err(translate_persistence_error)?;
    let assigned_vehicle_ids: HashSet<i64> = persistence
        .assigned_vehicle_ids_on(booking_request.travel_date)
        .map_err(translate_persistence_error)?;

    let context: CreationContext<'_> = CreationContext {
        settings: &settings,
        vehicles: &vehicles,
        assigned_vehicle_ids: &assigned_vehicle_ids,
        now,
        timezone,
    };

    let booking_id: String = new_booking_id(now, timezone, entropy)?;
    let mut booking: Booking = ride_booking::create_booking(booking_request, &context, booking_id)
        .map_err(|e| {
            let err: ApiError = translate_core_error(e);
            info!(%err, "Booking request refused");
            err
        })?;

    let mut attempt: u32 = 1;
    loop {
        match persistence.insert_booking(&booking) {
            Ok(_) => break,
            Err(PersistenceError::DuplicateBookingId(taken))
                if attempt < MAX_BOOKING_ID_ATTEMPTS =>
            {
                warn!(booking_id = %taken, attempt, "Booking id collision, regenerating");
                attempt += 1;
                booking.booking_id = new_booking_id(now, timezone, entropy)?;
            }
            Err(e) => return Err(translate_persistence_error(e)),
        }
    }

    info!(
        booking_id = %booking.booking_id,
        class = %booking.vehicle_class,
        travel_date = %format_date(booking.trip.travel_date),
        price_tier = %booking.price_tier,
        advance_amount = booking.advance_amount,
        "Booking created"
    );

    let response: CreateBookingResponse = CreateBookingResponse {
        success: true,
        booking_id: booking.booking_id.clone(),
        status: booking.status.as_str().to_string(),
        payment_status: booking.payment_status.as_str().to_string(),
        advance_amount: booking.advance_amount,
        total_amount: booking.total_amount,
        price_tier: booking.price_tier.as_str().to_string(),
    };
    Ok((response, NotificationEvent::BookingCreated(booking)))
}

/// Lists a customer's bookings, newest first, cancelled ones included.
///
/// # Errors
///
/// Returns an error if the phone number is invalid or the lookup fails.
pub fn list_bookings_by_phone(
    persistence: &mut Persistence,
    phone: &str,
) -> Result<ListBookingsResponse, ApiError> {
    let phone: String = normalize_phone(phone).map_err(translate_domain_error)?;
    let bookings: Vec<Booking> = persistence
        .list_bookings_by_phone(&phone)
        .map_err(translate_persistence_error)?;
    debug!(count = bookings.len(), "Listed bookings by phone");

    Ok(ListBookingsResponse {
        success: true,
        bookings: bookings
            .iter()
            .map(booking_summary)
            .collect::<Result<_, _>>()?,
    })
}

/// Records a customer's claim to have paid the advance.
///
/// The phone must match the booking's phone; a mismatch is reported exactly
/// like an unknown booking.
///
/// # Errors
///
/// Returns an error if the booking is not found for this phone, the
/// transaction reference is missing, or the payment state does not accept a
/// claim.
pub fn record_payment_claim(
    persistence: &mut Persistence,
    booking_id: &str,
    request: PaymentClaimRequest,
    now: OffsetDateTime,
) -> Result<PaymentClaimResponse, ApiError> {
    let phone: String = normalize_phone(&request.phone).map_err(translate_domain_error)?;
    let booking: Booking = load_booking(persistence, booking_id)?;
    if booking.customer.phone != phone {
        warn!(booking_id = %booking.booking_id, "Payment claim with mismatched phone");
        return Err(translate_domain_error(DomainError::BookingNotFound(
            booking.booking_id,
        )));
    }

    let result: TransitionResult = apply_and_persist(
        persistence,
        &booking,
        Command::ClaimPayment {
            transaction_id: request.transaction_id,
        },
        &Author::Customer,
        now,
    )?;

    Ok(PaymentClaimResponse {
        success: true,
        booking_id: result.new_booking.booking_id,
        payment_status: result.new_booking.payment_status.as_str().to_string(),
    })
}

/// Reports free vehicles on a date, optionally for one class.
///
/// # Errors
///
/// Returns an error if the date or class is malformed, or the lookup fails.
pub fn check_availability(
    persistence: &mut Persistence,
    date: Option<&str>,
    class: Option<&str>,
) -> Result<AvailabilityResponse, ApiError> {
    let date: Date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => parse_input_date(d)?,
        None => {
            return Err(ApiError::InvalidInput {
                field: String::from("date"),
                message: String::from("A date in YYYY-MM-DD format is required"),
            });
        }
    };
    let class: Option<VehicleClass> = class
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(VehicleClass::from_str)
        .transpose()
        .map_err(translate_domain_error)?;

    let vehicles: Vec<Vehicle> = persistence
        .list_vehicles()
        .map_err(translate_persistence_error)?;
    let assigned_vehicle_ids: HashSet<i64> = persistence
        .assigned_vehicle_ids_on(date)
        .map_err(translate_persistence_error)?;

    let result: AvailabilityResult =
        calculate_availability(date, class, &vehicles, &assigned_vehicle_ids);
    debug!(
        date = %format_date(date),
        available_count = result.available_count,
        total_count = result.total_count,
        "Availability checked"
    );

    Ok(AvailabilityResponse {
        success: true,
        available: result.available,
        available_count: result.available_count,
        total_count: result.total_count,
        per_class: result
            .per_class
            .iter()
            .map(|c| ClassAvailabilityInfo {
                class: c.class.as_str().to_string(),
                total: c.total,
                available: c.available,
            })
            .collect(),
    })
}

/// Returns the booking policy customers plan against.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded.
pub fn get_settings(persistence: &mut Persistence) -> Result<SettingsResponse, ApiError> {
    let settings: BookingSettings = persistence
        .get_settings()
        .map_err(translate_persistence_error)?;
    Ok(settings_response(&settings))
}

// ============================================================================
// Operator booking handling
// ============================================================================

/// Returns one booking with its full communication log.
///
/// # Errors
///
/// Returns an error if the booking does not exist.
pub fn get_booking(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    booking_id: &str,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_handle_bookings(actor)?;
    let booking: Booking = load_booking(persistence, booking_id)?;
    Ok(BookingResponse {
        success: true,
        booking: booking_info(&booking)?,
    })
}

/// Verifies, rejects or refunds the advance payment.
///
/// # Returns
///
/// The updated booking and, for verify and reject, the notification event.
///
/// # Errors
///
/// Returns an error if the action is unknown, the booking does not exist,
/// or the payment state does not allow the action.
pub fn verify_payment(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: VerifyPaymentRequest,
    now: OffsetDateTime,
) -> Result<(BookingResponse, Option<NotificationEvent>), ApiError> {
    AuthorizationService::authorize_handle_bookings(actor)?;

    let action: String = request.action.trim().to_ascii_lowercase();
    let command: Command = match action.as_str() {
        "verify" => Command::VerifyPayment {
            transaction_id: request.transaction_id,
            notes: request.notes,
        },
        "reject" => Command::RejectPayment {
            notes: request.notes,
        },
        "refund" => Command::RefundPayment {
            notes: request.notes,
        },
        _ => {
            return Err(ApiError::InvalidInput {
                field: String::from("action"),
                message: format!(
                    "Unknown action '{}'. Must be one of: verify, reject, refund",
                    request.action
                ),
            });
        }
    };

    let booking: Booking = load_booking(persistence, &request.booking_id)?;
    let result: TransitionResult =
        apply_and_persist(persistence, &booking, command, &actor.to_author(), now)?;

    let response: BookingResponse = BookingResponse {
        success: true,
        booking: booking_info(&result.new_booking)?,
    };
    let event: Option<NotificationEvent> = match action.as_str() {
        "verify" => Some(NotificationEvent::PaymentVerified(result.new_booking)),
        "reject" => Some(NotificationEvent::PaymentRejected(result.new_booking)),
        _ => None,
    };
    Ok((response, event))
}

/// Changes status, assigns a vehicle, or replaces admin notes.
///
/// A named vehicle must exist, be available on the travel date, and not be
/// held by another non-cancelled booking on that date.
///
/// # Returns
///
/// The updated booking and, when the status changed, the notification event.
///
/// # Errors
///
/// Returns an error if the status is unknown or not reachable, the booking
/// or vehicle does not exist, or the vehicle is unavailable or taken.
pub fn update_status(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: UpdateStatusRequest,
    now: OffsetDateTime,
) -> Result<(BookingResponse, Option<NotificationEvent>), ApiError> {
    AuthorizationService::authorize_handle_bookings(actor)?;

    let status: Option<BookingStatus> = non_empty(request.status)
        .map(|s| BookingStatus::from_str(&s))
        .transpose()
        .map_err(translate_domain_error)?;
    let booking: Booking = load_booking(persistence, &request.booking_id)?;

    let assignment: Option<VehicleAssignment> = match request.assigned_vehicle_id {
        Some(vehicle_id) => {
            let vehicle: Vehicle = persistence
                .get_vehicle(vehicle_id)
                .map_err(translate_persistence_error)?
                .ok_or_else(|| translate_domain_error(DomainError::VehicleNotFound(vehicle_id)))?;
            let held_by: Option<String> = persistence
                .booking_holding_vehicle(vehicle_id, booking.trip.travel_date)
                .map_err(translate_persistence_error)?;
            Some(VehicleAssignment {
                vehicle_id,
                vehicle,
                held_by,
            })
        }
        None => None,
    };

    let previous: BookingStatus = booking.status;
    let result: TransitionResult = apply_and_persist(
        persistence,
        &booking,
        Command::UpdateStatus {
            status,
            assignment,
            admin_notes: request.admin_notes,
        },
        &actor.to_author(),
        now,
    )?;

    let response: BookingResponse = BookingResponse {
        success: true,
        booking: booking_info(&result.new_booking)?,
    };
    let event: Option<NotificationEvent> = (result.new_booking.status != previous).then(|| {
        NotificationEvent::StatusChanged {
            booking: result.new_booking,
            previous,
        }
    });
    Ok((response, event))
}

/// Logs a conversation with the customer.
///
/// Entries may be added to bookings in any state.
///
/// # Errors
///
/// Returns an error if the channel is unknown or reserved, the message is
/// empty or too long, or the booking does not exist.
pub fn add_communication(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: AddCommunicationRequest,
    now: OffsetDateTime,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_handle_bookings(actor)?;

    let channel: Channel = Channel::from_str(&request.channel).map_err(translate_domain_error)?;
    if channel == Channel::System {
        return Err(ApiError::InvalidInput {
            field: String::from("channel"),
            message: String::from("The system channel is reserved for automatic entries"),
        });
    }

    let booking: Booking = load_booking(persistence, &request.booking_id)?;
    let result: TransitionResult = apply_and_persist(
        persistence,
        &booking,
        Command::AddCommunication {
            channel,
            message: request.message,
        },
        &actor.to_author(),
        now,
    )?;

    Ok(BookingResponse {
        success: true,
        booking: booking_info(&result.new_booking)?,
    })
}

// ============================================================================
// Fleet registry
// ============================================================================

/// Lists every registered vehicle.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded.
pub fn list_vehicles(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListVehiclesResponse, ApiError> {
    AuthorizationService::authorize_handle_bookings(actor)?;
    let vehicles: Vec<Vehicle> = persistence
        .list_vehicles()
        .map_err(translate_persistence_error)?;

    Ok(ListVehiclesResponse {
        success: true,
        vehicles: vehicles
            .iter()
            .filter_map(|v| v.vehicle_id.map(|id| vehicle_info(id, v)))
            .collect(),
    })
}

/// Registers a vehicle.
///
/// Only Admin actors may change the fleet.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a field is invalid, or the
/// registration is already taken.
pub fn create_vehicle(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: VehicleRequest,
) -> Result<VehicleResponse, ApiError> {
    AuthorizationService::authorize_manage_fleet(actor)?;
    let vehicle: Vehicle = vehicle_from_request(request, None)?;
    let vehicle_id: i64 = persistence
        .create_vehicle(&vehicle)
        .map_err(translate_persistence_error)?;

    info!(
        vehicle_id,
        registration = %vehicle.registration,
        class = %vehicle.class,
        login_name = %actor.login_name,
        "Vehicle registered"
    );
    Ok(VehicleResponse {
        success: true,
        vehicle: vehicle_info(vehicle_id, &vehicle),
    })
}

/// Replaces a vehicle's record, including its blocked dates.
///
/// Only Admin actors may change the fleet.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a field is invalid, the
/// vehicle does not exist, or the registration belongs to another vehicle.
pub fn update_vehicle(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: VehicleRequest,
) -> Result<VehicleResponse, ApiError> {
    AuthorizationService::authorize_manage_fleet(actor)?;
    let vehicle: Vehicle = vehicle_from_request(request, Some(vehicle_id))?;
    persistence
        .update_vehicle(vehicle_id, &vehicle)
        .map_err(translate_persistence_error)?;

    info!(
        vehicle_id,
        registration = %vehicle.registration,
        is_active = vehicle.is_active,
        maintenance_mode = vehicle.maintenance_mode,
        login_name = %actor.login_name,
        "Vehicle updated"
    );
    Ok(VehicleResponse {
        success: true,
        vehicle: vehicle_info(vehicle_id, &vehicle),
    })
}

// ============================================================================
// Booking policy
// ============================================================================

/// Replaces the booking policy.
///
/// Only Admin actors may change the policy. Bookings already made keep the
/// tier they were created with.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the settings are invalid.
pub fn update_settings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: UpdateSettingsRequest,
) -> Result<SettingsResponse, ApiError> {
    AuthorizationService::authorize_manage_settings(actor)?;
    let settings: BookingSettings = settings_from_request(request)?;
    validate_settings(&settings).map_err(translate_domain_error)?;

    persistence
        .replace_settings(&settings)
        .map_err(translate_persistence_error)?;

    info!(login_name = %actor.login_name, "Booking policy replaced");
    Ok(settings_response(&settings))
}

// ============================================================================
// Operators and sessions
// ============================================================================

/// Authenticates an operator and opens a session.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the operator is disabled.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let session: IssuedSession =
        AuthenticationService::login(persistence, &request.login_name, &request.password, now)?;

    Ok(LoginResponse {
        success: true,
        session_token: session.session_token,
        login_name: session.operator.login_name,
        display_name: session.operator.display_name,
        role: session.actor.role.as_str().to_string(),
        expires_at: format_timestamp(session.expires_at)?,
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Creates an operator account.
///
/// Only Admin actors may create operators.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the role is unknown, the
/// password breaks the policy, or the login name is taken.
pub fn create_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateOperatorRequest,
) -> Result<OperatorResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    let login_name: String =
        validate_text_field("loginName", &request.login_name).map_err(translate_domain_error)?;
    let display_name: String =
        validate_text_field("displayName", &request.display_name).map_err(translate_domain_error)?;
    let role: Role = Role::from_stored(request.role.trim()).ok_or_else(|| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!(
            "Unknown role '{}'. Must be one of: Admin, Dispatcher",
            request.role
        ),
    })?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &login_name,
    )?;

    let operator_id: i64 = persistence
        .create_operator(&login_name, &display_name, &request.password, role.as_str())
        .map_err(translate_persistence_error)?;
    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Operator not found after creation"),
        })?;

    info!(
        operator_id,
        login_name = %operator.login_name,
        role = %role,
        created_by = %actor.login_name,
        "Operator created"
    );
    Ok(OperatorResponse {
        success: true,
        operator: operator_info(operator),
    })
}

/// Lists operator accounts.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin.
pub fn list_operators(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListOperatorsResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;
    let operators: Vec<OperatorData> = persistence
        .list_operators()
        .map_err(translate_persistence_error)?;

    Ok(ListOperatorsResponse {
        success: true,
        operators: operators.into_iter().map(operator_info).collect(),
    })
}

/// Disables an operator and ends their sessions.
///
/// The last active Admin cannot be disabled.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the operator does not
/// exist, or the operator is the last active Admin.
pub fn disable_operator(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    operator_id: i64,
    now: OffsetDateTime,
) -> Result<OperatorResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(actor)?;

    let target: OperatorData = persistence
        .get_operator_by_id(operator_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message: format!("Operator with ID {operator_id} not found"),
        })?;

    if target.role == Role::Admin.as_str() && !target.is_disabled {
        let active_admins: i64 = persistence
            .count_active_admin_operators()
            .map_err(translate_persistence_error)?;
        if active_admins <= 1 {
            return Err(ApiError::PolicyRejection {
                rule: String::from("last_active_admin"),
                message: String::from("Operation would leave the system without an active admin"),
            });
        }
    }

    persistence
        .disable_operator(operator_id, now)
        .map_err(translate_persistence_error)?;
    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Operator not found after disabling"),
        })?;

    info!(
        operator_id,
        login_name = %operator.login_name,
        disabled_by = %actor.login_name,
        "Operator disabled"
    );
    Ok(OperatorResponse {
        success: true,
        operator: operator_info(operator),
    })
}

/// Creates the first Admin when no operator exists yet.
///
/// # Returns
///
/// The new operator's ID, or `None` if operators already exist.
///
/// # Errors
///
/// Returns an error if the password breaks the policy or the write fails.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    login_name: &str,
    password: &str,
) -> Result<Option<i64>, ApiError> {
    let existing: i64 = persistence
        .count_operators()
        .map_err(translate_persistence_error)?;
    if existing > 0 {
        debug!(existing, "Operators exist, skipping bootstrap admin");
        return Ok(None);
    }

    let login_name: String =
        validate_text_field("loginName", login_name).map_err(translate_domain_error)?;
    PasswordPolicy::default().validate(password, password, &login_name)?;

    let operator_id: i64 = persistence
        .create_operator(
            &login_name,
            BOOTSTRAP_ADMIN_DISPLAY_NAME,
            password,
            Role::Admin.as_str(),
        )
        .map_err(translate_persistence_error)?;
    info!(operator_id, login_name = %login_name, "Bootstrap admin created");
    Ok(Some(operator_id))
}

/// Deletes sessions that have expired by `now`.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn sweep_expired_sessions(
    persistence: &mut Persistence,
    now: OffsetDateTime,
) -> Result<usize, ApiError> {
    persistence
        .delete_expired_sessions(now)
        .map_err(translate_persistence_error)
}
