use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::{CreateVehicleRequest, UpdateVehicleRequest},
    repo_types::Vehicle,
};
use crate::{
    errors::ApiError,
    fields::{clean_optional, require_non_negative, require_text},
    state::AppState,
};

pub const NOT_FOUND: &str = "Vehicle not found";

pub fn new_vehicle(owner: Uuid, req: CreateVehicleRequest) -> Result<Vehicle, ApiError> {
    let now = OffsetDateTime::now_utc();
    Ok(Vehicle {
        id: Uuid::new_v4(),
        user_id: owner,
        make: require_text("make", &req.make)?,
        model: require_text("model", &req.model)?,
        year: req.year,
        color: clean_optional(req.color),
        vin: clean_optional(req.vin).map(|v| v.to_uppercase()),
        license_plate: clean_optional(req.license_plate),
        current_mileage: require_non_negative("current_mileage", req.current_mileage.unwrap_or(0))?,
        image_url: clean_optional(req.image_url),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_update(v: &mut Vehicle, req: UpdateVehicleRequest) -> Result<(), ApiError> {
    if let Some(make) = req.make {
        v.make = require_text("make", &make)?;
    }
    if let Some(model) = req.model {
        v.model = require_text("model", &model)?;
    }
    if let Some(year) = req.year {
        v.year = year;
    }
    if req.color.is_some() {
        v.color = clean_optional(req.color);
    }
    if req.vin.is_some() {
        v.vin = clean_optional(req.vin).map(|s| s.to_uppercase());
    }
    if req.license_plate.is_some() {
        v.license_plate = clean_optional(req.license_plate);
    }
    if let Some(m) = req.current_mileage {
        v.current_mileage = require_non_negative("current_mileage", m)?;
    }
    if req.image_url.is_some() {
        v.image_url = clean_optional(req.image_url);
    }
    v.updated_at = OffsetDateTime::now_utc();
    Ok(())
}

/// Loads a vehicle only if `owner` owns it; anything else is a 404.
pub async fn require_owned(
    state: &AppState,
    owner: Uuid,
    vehicle_id: Uuid,
) -> Result<Vehicle, ApiError> {
    state
        .store
        .find_vehicle(owner, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))
}
