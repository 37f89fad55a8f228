use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::{CreateReminderRequest, UpdateReminderRequest},
    repo_types::Reminder,
};
use crate::{
    dates,
    errors::ApiError,
    fields::{clean_optional, require_non_negative, require_text},
};

pub const NOT_FOUND: &str = "Reminder not found";

fn opt_non_negative(field: &str, value: Option<i64>) -> Result<Option<i64>, ApiError> {
    value.map(|v| require_non_negative(field, v)).transpose()
}

fn opt_months(value: Option<i32>) -> Result<Option<i32>, ApiError> {
    match value {
        Some(m) if m <= 0 => Err(ApiError::BadRequest(
            "recurring_interval_months must be positive".into(),
        )),
        other => Ok(other),
    }
}

pub fn new_reminder(
    owner: Uuid,
    vehicle_id: Uuid,
    req: CreateReminderRequest,
) -> Result<Reminder, ApiError> {
    let now = OffsetDateTime::now_utc();
    Ok(Reminder {
        id: Uuid::new_v4(),
        user_id: owner,
        vehicle_id,
        service_type: require_text("service_type", &req.service_type)?,
        description: clean_optional(req.description),
        due_by_mileage: opt_non_negative("due_by_mileage", req.due_by_mileage)?,
        due_by_date: dates::parse_optional_field("due_by_date", req.due_by_date.as_deref())?,
        reminder_threshold_miles: require_non_negative(
            "reminder_threshold_miles",
            req.reminder_threshold_miles.unwrap_or(0),
        )?,
        reminder_threshold_days: require_non_negative(
            "reminder_threshold_days",
            req.reminder_threshold_days.unwrap_or(0),
        )?,
        is_recurring: req.is_recurring,
        recurring_interval_miles: opt_non_negative(
            "recurring_interval_miles",
            req.recurring_interval_miles,
        )?,
        recurring_interval_months: opt_months(req.recurring_interval_months)?,
        last_completed_date: dates::parse_optional_field(
            "last_completed_date",
            req.last_completed_date.as_deref(),
        )?,
        last_completed_mileage: opt_non_negative(
            "last_completed_mileage",
            req.last_completed_mileage,
        )?,
        is_active: req.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_update(r: &mut Reminder, req: UpdateReminderRequest) -> Result<(), ApiError> {
    if let Some(st) = req.service_type {
        r.service_type = require_text("service_type", &st)?;
    }
    if req.description.is_some() {
        r.description = clean_optional(req.description);
    }
    if req.due_by_mileage.is_some() {
        r.due_by_mileage = opt_non_negative("due_by_mileage", req.due_by_mileage)?;
    }
    if req.due_by_date.is_some() {
        r.due_by_date = dates::parse_optional_field("due_by_date", req.due_by_date.as_deref())?;
    }
    if let Some(v) = req.reminder_threshold_miles {
        r.reminder_threshold_miles = require_non_negative("reminder_threshold_miles", v)?;
    }
    if let Some(v) = req.reminder_threshold_days {
        r.reminder_threshold_days = require_non_negative("reminder_threshold_days", v)?;
    }
    if let Some(v) = req.is_recurring {
        r.is_recurring = v;
    }
    if req.recurring_interval_miles.is_some() {
        r.recurring_interval_miles =
            opt_non_negative("recurring_interval_miles", req.recurring_interval_miles)?;
    }
    if req.recurring_interval_months.is_some() {
        r.recurring_interval_months = opt_months(req.recurring_interval_months)?;
    }
    if req.last_completed_date.is_some() {
        r.last_completed_date = dates::parse_optional_field(
            "last_completed_date",
            req.last_completed_date.as_deref(),
        )?;
    }
    if req.last_completed_mileage.is_some() {
        r.last_completed_mileage =
            opt_non_negative("last_completed_mileage", req.last_completed_mileage)?;
    }
    if let Some(v) = req.is_active {
        r.is_active = v;
    }
    r.updated_at = OffsetDateTime::now_utc();
    Ok(())
}
