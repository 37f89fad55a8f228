use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{
    dto::{CreateFuelLogRequest, FuelStatsResponse, UpdateFuelLogRequest},
    repo_types::FuelLog,
};
use crate::{
    dates,
    errors::ApiError,
    fields::{clean_optional, require_amount, require_non_negative},
};

pub const NOT_FOUND: &str = "Fuel log not found";

const DEFAULT_FUEL_TYPE: &str = "Petrol RON95";
pub const DEFAULT_STATS_DAYS: i64 = 30;
const MAX_STATS_DAYS: i64 = 3650;

fn opt_amount(field: &str, value: Option<f64>) -> Result<Option<f64>, ApiError> {
    value.map(|v| require_amount(field, v)).transpose()
}

fn opt_odometer(value: Option<i64>) -> Result<Option<i64>, ApiError> {
    value
        .map(|v| require_non_negative("odometer_reading", v))
        .transpose()
}

fn fuel_type_or_default(value: Option<String>) -> String {
    clean_optional(value).unwrap_or_else(|| DEFAULT_FUEL_TYPE.to_string())
}

pub fn new_log(
    owner: Uuid,
    vehicle_id: Uuid,
    req: CreateFuelLogRequest,
) -> Result<FuelLog, ApiError> {
    let now = OffsetDateTime::now_utc();
    Ok(FuelLog {
        id: Uuid::new_v4(),
        user_id: owner,
        vehicle_id,
        date: dates::parse_optional_field("date", req.date.as_deref())?.unwrap_or(now),
        time: clean_optional(req.time),
        odometer_reading: opt_odometer(req.odometer_reading)?,
        fuel_type: fuel_type_or_default(req.fuel_type),
        liters: require_amount("liters", req.liters)?,
        price_per_liter: opt_amount("price_per_liter", req.price_per_liter)?,
        total_cost: opt_amount("total_cost", req.total_cost)?,
        fuel_station_name: clean_optional(req.fuel_station_name),
        driver_notes: clean_optional(req.driver_notes),
        trip_purpose: clean_optional(req.trip_purpose),
        receipt_url: clean_optional(req.receipt_url),
        pump_meter_photo_url: clean_optional(req.pump_meter_photo_url),
        notes: clean_optional(req.notes),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_update(f: &mut FuelLog, req: UpdateFuelLogRequest) -> Result<(), ApiError> {
    if let Some(date) = req.date {
        f.date = dates::parse_field("date", &date)?;
    }
    if req.time.is_some() {
        f.time = clean_optional(req.time);
    }
    if req.odometer_reading.is_some() {
        f.odometer_reading = opt_odometer(req.odometer_reading)?;
    }
    if req.fuel_type.is_some() {
        f.fuel_type = fuel_type_or_default(req.fuel_type);
    }
    if let Some(liters) = req.liters {
        f.liters = require_amount("liters", liters)?;
    }
    if req.price_per_liter.is_some() {
        f.price_per_liter = opt_amount("price_per_liter", req.price_per_liter)?;
    }
    if req.total_cost.is_some() {
        f.total_cost = opt_amount("total_cost", req.total_cost)?;
    }
    if req.fuel_station_name.is_some() {
        f.fuel_station_name = clean_optional(req.fuel_station_name);
    }
    if req.driver_notes.is_some() {
        f.driver_notes = clean_optional(req.driver_notes);
    }
    if req.trip_purpose.is_some() {
        f.trip_purpose = clean_optional(req.trip_purpose);
    }
    if req.receipt_url.is_some() {
        f.receipt_url = clean_optional(req.receipt_url);
    }
    if req.pump_meter_photo_url.is_some() {
        f.pump_meter_photo_url = clean_optional(req.pump_meter_photo_url);
    }
    if req.notes.is_some() {
        f.notes = clean_optional(req.notes);
    }
    f.updated_at = OffsetDateTime::now_utc();
    Ok(())
}

pub fn stats_window(days: Option<i64>) -> Result<Duration, ApiError> {
    let days = days.unwrap_or(DEFAULT_STATS_DAYS);
    if !(1..=MAX_STATS_DAYS).contains(&days) {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_STATS_DAYS}"
        )));
    }
    Ok(Duration::days(days))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Totals over logs dated at or after `since`. Distance is the odometer
/// delta between the oldest and newest log in the window, counted only when
/// both readings are present and non-zero.
pub fn summarize(mut logs: Vec<FuelLog>, since: OffsetDateTime) -> FuelStatsResponse {
    logs.retain(|l| l.date >= since);
    logs.sort_by(|a, b| a.date.cmp(&b.date));

    let (Some(first), Some(last)) = (logs.first(), logs.last()) else {
        return FuelStatsResponse {
            average_mpg: None,
            total_cost: 0.0,
            total_fuel: 0.0,
            total_distance: 0.0,
            logs_count: 0,
            fuel_type: None,
        };
    };

    let total_cost: f64 = logs.iter().map(|l| l.total_cost.unwrap_or(0.0)).sum();
    let total_fuel: f64 = logs.iter().map(|l| l.liters).sum();

    let total_distance = match (first.odometer_reading, last.odometer_reading) {
        (Some(a), Some(b)) if a != 0 && b != 0 => (b - a) as f64,
        _ => 0.0,
    };
    let average_mpg = if total_fuel > 0.0 {
        Some(round2(total_distance / total_fuel)).filter(|v| *v != 0.0)
    } else {
        None
    };

    FuelStatsResponse {
        average_mpg,
        total_cost: round2(total_cost),
        total_fuel: round2(total_fuel),
        total_distance: round2(total_distance),
        logs_count: logs.len(),
        fuel_type: Some(first.fuel_type.clone()),
    }
}
