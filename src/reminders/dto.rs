use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Reminder;

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub service_type: String,
    pub description: Option<String>,
    pub due_by_mileage: Option<i64>,
    pub due_by_date: Option<String>, // ISO-8601
    pub reminder_threshold_miles: Option<i64>,
    pub reminder_threshold_days: Option<i64>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_interval_miles: Option<i64>,
    pub recurring_interval_months: Option<i32>,
    pub last_completed_date: Option<String>,
    pub last_completed_mileage: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderRequest {
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub due_by_mileage: Option<i64>,
    pub due_by_date: Option<String>,
    pub reminder_threshold_miles: Option<i64>,
    pub reminder_threshold_days: Option<i64>,
    pub is_recurring: Option<bool>,
    pub recurring_interval_miles: Option<i64>,
    pub recurring_interval_months: Option<i32>,
    pub last_completed_date: Option<String>,
    pub last_completed_mileage: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub due_by_mileage: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_by_date: Option<OffsetDateTime>,
    pub reminder_threshold_miles: i64,
    pub reminder_threshold_days: i64,
    pub is_recurring: bool,
    pub recurring_interval_miles: Option<i64>,
    pub recurring_interval_months: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_completed_date: Option<OffsetDateTime>,
    pub last_completed_mileage: Option<i64>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Reminder> for ReminderResponse {
    fn from(r: Reminder) -> Self {
        Self {
            id: r.id,
            vehicle_id: r.vehicle_id,
            service_type: r.service_type,
            description: r.description,
            due_by_mileage: r.due_by_mileage,
            due_by_date: r.due_by_date,
            reminder_threshold_miles: r.reminder_threshold_miles,
            reminder_threshold_days: r.reminder_threshold_days,
            is_recurring: r.is_recurring,
            recurring_interval_miles: r.recurring_interval_miles,
            recurring_interval_months: r.recurring_interval_months,
            last_completed_date: r.last_completed_date,
            last_completed_mileage: r.last_completed_mileage,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
