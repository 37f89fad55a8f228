use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    #[sqlx(rename = "service_date")]
    pub date: OffsetDateTime,
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: i64,
    pub cost: f64,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
