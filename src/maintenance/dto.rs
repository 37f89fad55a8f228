use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::MaintenanceRecord;

#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub date: String, // ISO-8601
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: i64,
    pub cost: Option<f64>,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub date: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub mileage: Option<i64>,
    pub cost: Option<f64>,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: i64,
    pub cost: f64,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MaintenanceRecord> for MaintenanceResponse {
    fn from(m: MaintenanceRecord) -> Self {
        Self {
            id: m.id,
            vehicle_id: m.vehicle_id,
            date: m.date,
            service_type: m.service_type,
            description: m.description,
            mileage: m.mileage,
            cost: m.cost,
            service_provider: m.service_provider,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
