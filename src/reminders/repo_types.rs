use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub due_by_mileage: Option<i64>,
    pub due_by_date: Option<OffsetDateTime>,
    pub reminder_threshold_miles: i64,
    pub reminder_threshold_days: i64,
    pub is_recurring: bool,
    pub recurring_interval_miles: Option<i64>,
    pub recurring_interval_months: Option<i32>,
    pub last_completed_date: Option<OffsetDateTime>,
    pub last_completed_mileage: Option<i64>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
