use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FuelLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    #[sqlx(rename = "fill_date")]
    pub date: OffsetDateTime,
    #[sqlx(rename = "fill_time")]
    pub time: Option<String>, // wall-clock "HH:MM" as the driver typed it
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
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
