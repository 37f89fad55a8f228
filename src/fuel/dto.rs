use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FuelLog;

// Older clients send mileage/fuel_amount/price_per_unit/total_price.
#[derive(Debug, Deserialize)]
pub struct CreateFuelLogRequest {
    pub date: Option<String>, // ISO-8601, defaults to now
    pub time: Option<String>,
    #[serde(alias = "mileage")]
    pub odometer_reading: Option<i64>,
    pub fuel_type: Option<String>,
    #[serde(alias = "fuel_amount")]
    pub liters: f64,
    #[serde(alias = "price_per_unit")]
    pub price_per_liter: Option<f64>,
    #[serde(alias = "total_price")]
    pub total_cost: Option<f64>,
    pub fuel_station_name: Option<String>,
    pub driver_notes: Option<String>,
    pub trip_purpose: Option<String>,
    pub receipt_url: Option<String>,
    pub pump_meter_photo_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFuelLogRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(alias = "mileage")]
    pub odometer_reading: Option<i64>,
    pub fuel_type: Option<String>,
    #[serde(alias = "fuel_amount")]
    pub liters: Option<f64>,
    #[serde(alias = "price_per_unit")]
    pub price_per_liter: Option<f64>,
    #[serde(alias = "total_price")]
    pub total_cost: Option<f64>,
    pub fuel_station_name: Option<String>,
    pub driver_notes: Option<String>,
    pub trip_purpose: Option<String>,
    pub receipt_url: Option<String>,
    pub pump_meter_photo_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FuelLogResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub time: Option<String>,
    pub odometer_reading: Option<i64>,
    pub fuel_type: String,
    pub liters: f64,
    pub price_per_liter: Option<f64>,
    pub total_cost: Option<f64>,
    pub fuel_station_name: Option<String>,
    pub driver_notes: Option<String>,
    pub trip_purpose: Option<String>,
    pub receipt_url: Option<String>,
    pub pump_meter_photo_url: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<FuelLog> for FuelLogResponse {
    fn from(f: FuelLog) -> Self {
        Self {
            id: f.id,
            vehicle_id: f.vehicle_id,
            date: f.date,
            time: f.time,
            odometer_reading: f.odometer_reading,
            fuel_type: f.fuel_type,
            liters: f.liters,
            price_per_liter: f.price_per_liter,
            total_cost: f.total_cost,
            fuel_station_name: f.fuel_station_name,
            driver_notes: f.driver_notes,
            trip_purpose: f.trip_purpose,
            receipt_url: f.receipt_url,
            pump_meter_photo_url: f.pump_meter_photo_url,
            notes: f.notes,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// Aggregates over the logs inside the stats window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStatsResponse {
    pub average_mpg: Option<f64>,
    pub total_cost: f64,
    pub total_fuel: f64,
    pub total_distance: f64,
    pub logs_count: usize,
    pub fuel_type: Option<String>,
}
