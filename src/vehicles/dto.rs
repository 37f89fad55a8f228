use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Vehicle;

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub current_mileage: Option<i64>,
    pub image_url: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub current_mileage: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub current_mileage: i64,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            make: v.make,
            model: v.model,
            year: v.year,
            color: v.color,
            vin: v.vin,
            license_plate: v.license_plate,
            current_mileage: v.current_mileage,
            image_url: v.image_url,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
