use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::vehicle::{self, AvailabilityStatus, VehicleType};
use crate::error::{AppError, AppResult};
use crate::AppState;

// Vehicle create/update payloads deliberately carry no availability field:
// availability_status is owned by the booking lifecycle and is only ever
// written as a side effect of booking transitions.

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub vehicle_name: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub registration_number: String,
    pub daily_rent_price: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub vehicle_name: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,
    pub registration_number: Option<String>,
    pub daily_rent_price: Option<i32>,
}

/// List all vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    let vehicles = vehicle::Entity::find()
        .order_by_asc(vehicle::Column::CreatedAt)
        .order_by_asc(vehicle::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(vehicles))
}

/// Get a vehicle by id
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    Ok(Json(vehicle))
}

/// Create a vehicle (admin)
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<vehicle::Model>)> {
    if payload.daily_rent_price < 0 {
        return Err(AppError::BadRequest(
            "daily_rent_price must not be negative".to_string(),
        ));
    }

    let existing = vehicle::Entity::find()
        .filter(vehicle::Column::RegistrationNumber.eq(&payload.registration_number))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Registration number already in use".to_string(),
        ));
    }

    let new_vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_name: Set(payload.vehicle_name),
        vehicle_type: Set(payload.vehicle_type),
        registration_number: Set(payload.registration_number),
        daily_rent_price: Set(payload.daily_rent_price),
        availability_status: Set(AvailabilityStatus::Available),
        ..Default::default()
    };

    let vehicle = new_vehicle.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Update a vehicle (admin)
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    let vehicle = vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let mut active: vehicle::ActiveModel = vehicle.into();

    if let Some(name) = payload.vehicle_name {
        active.vehicle_name = Set(name);
    }

    if let Some(vehicle_type) = payload.vehicle_type {
        active.vehicle_type = Set(vehicle_type);
    }

    if let Some(registration_number) = payload.registration_number {
        let taken = vehicle::Entity::find()
            .filter(vehicle::Column::RegistrationNumber.eq(&registration_number))
            .filter(vehicle::Column::Id.ne(id))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "Registration number already in use".to_string(),
            ));
        }
        active.registration_number = Set(registration_number);
    }

    if let Some(price) = payload.daily_rent_price {
        if price < 0 {
            return Err(AppError::BadRequest(
                "daily_rent_price must not be negative".to_string(),
            ));
        }
        active.daily_rent_price = Set(price);
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

/// Delete a vehicle (admin). Blocked while an active booking references it.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let active_booking = booking::Entity::find()
        .filter(booking::Column::VehicleId.eq(id))
        .filter(booking::Column::Status.eq(BookingStatus::Active))
        .one(&state.db)
        .await?;

    if active_booking.is_some() {
        return Err(AppError::Conflict(
            "Vehicle is currently booked and cannot be deleted".to_string(),
        ));
    }

    vehicle::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}
