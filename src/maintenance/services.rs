use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::{CreateMaintenanceRequest, UpdateMaintenanceRequest},
    repo_types::MaintenanceRecord,
};
use crate::{
    dates,
    errors::ApiError,
    fields::{clean_optional, require_non_negative, require_text},
};

pub const NOT_FOUND: &str = "Maintenance record not found";

fn check_cost(cost: f64) -> Result<f64, ApiError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(ApiError::BadRequest("cost must be a non-negative number".into()));
    }
    Ok(cost)
}

pub fn new_record(
    owner: Uuid,
    vehicle_id: Uuid,
    req: CreateMaintenanceRequest,
) -> Result<MaintenanceRecord, ApiError> {
    let now = OffsetDateTime::now_utc();
    Ok(MaintenanceRecord {
        id: Uuid::new_v4(),
        user_id: owner,
        vehicle_id,
        date: dates::parse_field("date", &req.date)?,
        service_type: require_text("service_type", &req.service_type)?,
        description: clean_optional(req.description),
        mileage: require_non_negative("mileage", req.mileage)?,
        cost: check_cost(req.cost.unwrap_or(0.0))?,
        service_provider: clean_optional(req.service_provider),
        notes: clean_optional(req.notes),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_update(
    m: &mut MaintenanceRecord,
    req: UpdateMaintenanceRequest,
) -> Result<(), ApiError> {
    if let Some(date) = req.date {
        m.date = dates::parse_field("date", &date)?;
    }
    if let Some(st) = req.service_type {
        m.service_type = require_text("service_type", &st)?;
    }
    if req.description.is_some() {
        m.description = clean_optional(req.description);
    }
    if let Some(mileage) = req.mileage {
        m.mileage = require_non_negative("mileage", mileage)?;
    }
    if let Some(cost) = req.cost {
        m.cost = check_cost(cost)?;
    }
    if req.service_provider.is_some() {
        m.service_provider = clean_optional(req.service_provider);
    }
    if req.notes.is_some() {
        m.notes = clean_optional(req.notes);
    }
    m.updated_at = OffsetDateTime::now_utc();
    Ok(())
}
