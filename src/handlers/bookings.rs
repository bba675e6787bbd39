use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::user::{self, UserRole};
use crate::entities::vehicle::{self, AvailabilityStatus, VehicleType};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::utils::rental::{
    can_cancel_on, is_terminal, total_price, transition_allowed, validate_rent_dates,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub rent_start_date: String,
    pub rent_end_date: String,
    /// Required when the caller is an admin booking on a customer's behalf;
    /// ignored for customer callers, who always book for themselves.
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub vehicle: BookedVehicleInfo,
}

#[derive(Debug, Serialize)]
pub struct BookedVehicleInfo {
    pub vehicle_name: String,
    pub daily_rent_price: i32,
}

fn parse_rent_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{} must be a valid date (YYYY-MM-DD)", field)))
}

/// Create a booking.
///
/// The vehicle availability check, booking insert, and availability flip run
/// in one transaction with the vehicle row locked, so two racing requests for
/// the same vehicle serialize and the loser sees it already booked.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let start = parse_rent_date("rent_start_date", &payload.rent_start_date)?;
    let end = parse_rent_date("rent_end_date", &payload.rent_end_date)?;
    validate_rent_dates(start, end)?;

    // Customers always book for themselves; admins must name the customer.
    let customer_id = match claims.role {
        UserRole::Customer => claims.sub,
        UserRole::Admin => {
            let id = payload
                .customer_id
                .ok_or_else(|| AppError::BadRequest("customer_id is required".to_string()))?;
            user::Entity::find_by_id(id)
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
            id
        }
    };

    let txn = state.db.begin().await?;

    let vehicle = vehicle::Entity::find_by_id(payload.vehicle_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if vehicle.availability_status != AvailabilityStatus::Available {
        return Err(AppError::Conflict(
            "Vehicle is not available for booking".to_string(),
        ));
    }

    let price = total_price(start, end, vehicle.daily_rent_price);

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        vehicle_id: Set(vehicle.id),
        rent_start_date: Set(start),
        rent_end_date: Set(end),
        total_price: Set(price),
        status: Set(BookingStatus::Active),
        ..Default::default()
    };
    let booking = new_booking.insert(&txn).await?;

    let mut vehicle_active: vehicle::ActiveModel = vehicle.clone().into();
    vehicle_active.availability_status = Set(AvailabilityStatus::Booked);
    vehicle_active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        vehicle_id = %vehicle.id,
        customer_id = %customer_id,
        "Booking created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            id: booking.id,
            customer_id: booking.customer_id,
            vehicle_id: booking.vehicle_id,
            rent_start_date: booking.rent_start_date,
            rent_end_date: booking.rent_end_date,
            total_price: booking.total_price,
            status: booking.status,
            vehicle: BookedVehicleInfo {
                vehicle_name: vehicle.vehicle_name,
                daily_rent_price: vehicle.daily_rent_price,
            },
        }),
    ))
}

// ============ Listing (role-dependent projections) ============

/// Admin projection: exposes customer identity alongside the vehicle.
#[derive(Debug, Serialize)]
pub struct AdminBookingView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub customer: CustomerSummary,
    pub vehicle: VehicleSummary,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VehicleSummary {
    pub vehicle_name: String,
    pub registration_number: String,
}

/// Customer projection: no customer identity, vehicle type instead.
#[derive(Debug, Serialize)]
pub struct CustomerBookingView {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub vehicle: CustomerVehicleSummary,
}

#[derive(Debug, Serialize)]
pub struct CustomerVehicleSummary {
    pub vehicle_name: String,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
}

/// List bookings. Admins see every booking with customer identity; customers
/// see only their own, without other customers' data. The two projection
/// shapes are a deliberate API contract.
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Response> {
    match claims.role {
        UserRole::Admin => {
            let bookings = booking::Entity::find()
                .order_by_asc(booking::Column::CreatedAt)
                .order_by_asc(booking::Column::Id)
                .all(&state.db)
                .await?;
            let users = user::Entity::find().all(&state.db).await?;
            let vehicles = vehicle::Entity::find().all(&state.db).await?;

            let views: Vec<AdminBookingView> = bookings
                .into_iter()
                .map(|b| {
                    let customer = users.iter().find(|u| u.id == b.customer_id);
                    let veh = vehicles.iter().find(|v| v.id == b.vehicle_id);
                    AdminBookingView {
                        id: b.id,
                        customer_id: b.customer_id,
                        vehicle_id: b.vehicle_id,
                        rent_start_date: b.rent_start_date,
                        rent_end_date: b.rent_end_date,
                        total_price: b.total_price,
                        status: b.status,
                        customer: CustomerSummary {
                            name: customer.map(|u| u.name.clone()).unwrap_or_default(),
                            email: customer.map(|u| u.email.clone()).unwrap_or_default(),
                        },
                        vehicle: VehicleSummary {
                            vehicle_name: veh.map(|v| v.vehicle_name.clone()).unwrap_or_default(),
                            registration_number: veh
                                .map(|v| v.registration_number.clone())
                                .unwrap_or_default(),
                        },
                    }
                })
                .collect();

            Ok(Json(views).into_response())
        }
        UserRole::Customer => {
            let bookings = booking::Entity::find()
                .filter(booking::Column::CustomerId.eq(claims.sub))
                .order_by_asc(booking::Column::CreatedAt)
                .order_by_asc(booking::Column::Id)
                .all(&state.db)
                .await?;
            let vehicles = vehicle::Entity::find().all(&state.db).await?;

            let views: Vec<CustomerBookingView> = bookings
                .into_iter()
                .map(|b| {
                    let veh = vehicles.iter().find(|v| v.id == b.vehicle_id);
                    CustomerBookingView {
                        id: b.id,
                        vehicle_id: b.vehicle_id,
                        rent_start_date: b.rent_start_date,
                        rent_end_date: b.rent_end_date,
                        total_price: b.total_price,
                        status: b.status,
                        vehicle: CustomerVehicleSummary {
                            vehicle_name: veh.map(|v| v.vehicle_name.clone()).unwrap_or_default(),
                            registration_number: veh
                                .map(|v| v.registration_number.clone())
                                .unwrap_or_default(),
                            vehicle_type: veh
                                .map(|v| v.vehicle_type)
                                .unwrap_or(VehicleType::Car),
                        },
                    }
                })
                .collect();

            Ok(Json(views).into_response())
        }
    }
}

// ============ Status transitions ============

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedBookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub vehicle: VehicleAvailabilityInfo,
}

#[derive(Debug, Serialize)]
pub struct VehicleAvailabilityInfo {
    pub availability_status: AvailabilityStatus,
}

/// Transition a booking out of `active`.
///
/// Customers may cancel their own bookings before the rent period starts;
/// admins may mark any booking returned at any time. Either transition is
/// terminal and releases the vehicle, atomically with the status update.
pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> AppResult<Json<UpdatedBookingResponse>> {
    let requested = match payload.status.as_str() {
        "cancelled" => BookingStatus::Cancelled,
        "returned" => BookingStatus::Returned,
        _ => {
            return Err(AppError::BadRequest(
                "Status must be either 'cancelled' or 'returned'".to_string(),
            ))
        }
    };

    if !transition_allowed(claims.role, requested) {
        let msg = match claims.role {
            UserRole::Customer => "Customers can only cancel bookings",
            UserRole::Admin => "Admins can only mark bookings as returned",
        };
        return Err(AppError::Forbidden(msg.to_string()));
    }

    let txn = state.db.begin().await?;

    let booking = booking::Entity::find_by_id(booking_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if claims.role == UserRole::Customer && booking.customer_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }

    if is_terminal(booking.status) {
        let current = match booking.status {
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Returned => "returned",
            BookingStatus::Active => "active",
        };
        return Err(AppError::Conflict(format!(
            "Booking is already {}",
            current
        )));
    }

    if requested == BookingStatus::Cancelled
        && !can_cancel_on(Utc::now().date_naive(), booking.rent_start_date)
    {
        return Err(AppError::RentAlreadyStarted(
            "Cannot cancel booking: rent period has already started".to_string(),
        ));
    }

    let vehicle = vehicle::Entity::find_by_id(booking.vehicle_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Booked vehicle missing".to_string()))?;

    let mut booking_active: booking::ActiveModel = booking.into();
    booking_active.status = Set(requested);
    let updated = booking_active.update(&txn).await?;

    // Both terminal transitions hand the vehicle back
    let mut vehicle_active: vehicle::ActiveModel = vehicle.into();
    vehicle_active.availability_status = Set(AvailabilityStatus::Available);
    let vehicle = vehicle_active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %updated.id,
        vehicle_id = %updated.vehicle_id,
        status = ?updated.status,
        "Booking transitioned"
    );

    Ok(Json(UpdatedBookingResponse {
        id: updated.id,
        customer_id: updated.customer_id,
        vehicle_id: updated.vehicle_id,
        rent_start_date: updated.rent_start_date,
        rent_end_date: updated.rent_end_date,
        total_price: updated.total_price,
        status: updated.status,
        vehicle: VehicleAvailabilityInfo {
            availability_status: vehicle.availability_status,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_date_parsing() {
        assert_eq!(
            parse_rent_date("rent_start_date", "2024-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(parse_rent_date("rent_start_date", "31/01/2024").is_err());
        assert!(parse_rent_date("rent_end_date", "2024-02-30").is_err());
        assert!(parse_rent_date("rent_end_date", "not-a-date").is_err());
    }
}
