use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    auth::repo_types::User, fuel::repo_types::FuelLog, maintenance::repo_types::MaintenanceRecord,
    reminders::repo_types::Reminder, settings::repo_types::Preferences,
    vehicles::repo_types::Vehicle,
};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, is_active, reset_token, \
                            reset_token_expires_at, created_at, updated_at";

const VEHICLE_COLUMNS: &str = "id, user_id, make, model, year, color, vin, license_plate, \
                               current_mileage, image_url, created_at, updated_at";

const MAINTENANCE_COLUMNS: &str = "id, user_id, vehicle_id, service_date, service_type, \
                                   description, mileage, cost, service_provider, notes, \
                                   created_at, updated_at";

const REMINDER_COLUMNS: &str = "id, user_id, vehicle_id, service_type, description, \
                                due_by_mileage, due_by_date, reminder_threshold_miles, \
                                reminder_threshold_days, is_recurring, recurring_interval_miles, \
                                recurring_interval_months, last_completed_date, \
                                last_completed_mileage, is_active, created_at, updated_at";

const FUEL_COLUMNS: &str = "id, user_id, vehicle_id, fill_date, fill_time, odometer_reading, \
                            fuel_type, liters, price_per_liter, total_cost, fuel_station_name, \
                            driver_notes, trip_purpose, receipt_url, pump_meter_photo_url, notes, \
                            created_at, updated_at";

const PREFERENCE_COLUMNS: &str =
    "email_notifications, reminders_enabled, theme, currency, distance_unit";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self { db })
    }
}

fn email_conflict(e: sqlx::Error, what: &'static str) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        other => StoreError::Other(anyhow::Error::new(other).context(what)),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .context("ping database")?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, is_active,
                               reset_token, reset_token_expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(&user.reset_token)
        .bind(user.reset_token_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| email_conflict(e, "insert user"))?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("find user by reset token")?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET email = $2, full_name = $3, password_hash = $4, is_active = $5,
                   reset_token = $6, reset_token_expires_at = $7, updated_at = $8
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(&user.reset_token)
        .bind(user.reset_token_expires_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| email_conflict(e, "update user"))?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        // vehicles, their records and preferences cascade via FK
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_preferences(&self, user_id: Uuid) -> StoreResult<Option<Preferences>> {
        let row = sqlx::query_as::<_, Preferences>(&format!(
            "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find preferences")?;
        Ok(row)
    }

    async fn save_preferences(&self, user_id: Uuid, p: &Preferences) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, email_notifications, reminders_enabled,
                                          theme, currency, distance_unit)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
               SET email_notifications = EXCLUDED.email_notifications,
                   reminders_enabled = EXCLUDED.reminders_enabled,
                   theme = EXCLUDED.theme,
                   currency = EXCLUDED.currency,
                   distance_unit = EXCLUDED.distance_unit
            "#,
        )
        .bind(user_id)
        .bind(p.email_notifications)
        .bind(p.reminders_enabled)
        .bind(&p.theme)
        .bind(&p.currency)
        .bind(&p.distance_unit)
        .execute(&self.db)
        .await
        .context("save preferences")?;
        Ok(())
    }

    async fn insert_vehicle(&self, v: &Vehicle) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, user_id, make, model, year, color, vin, license_plate,
                                  current_mileage, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(v.id)
        .bind(v.user_id)
        .bind(&v.make)
        .bind(&v.model)
        .bind(v.year)
        .bind(&v.color)
        .bind(&v.vin)
        .bind(&v.license_plate)
        .bind(v.current_mileage)
        .bind(&v.image_url)
        .bind(v.created_at)
        .bind(v.updated_at)
        .execute(&self.db)
        .await
        .context("insert vehicle")?;
        Ok(())
    }

    async fn list_vehicles(&self, owner: Uuid) -> StoreResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list vehicles")?;
        Ok(rows)
    }

    async fn find_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find vehicle")?;
        Ok(row)
    }

    async fn update_vehicle(&self, v: &Vehicle) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE vehicles
               SET make = $3, model = $4, year = $5, color = $6, vin = $7,
                   license_plate = $8, current_mileage = $9, image_url = $10, updated_at = $11
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(v.id)
        .bind(v.user_id)
        .bind(&v.make)
        .bind(&v.model)
        .bind(v.year)
        .bind(&v.color)
        .bind(&v.vin)
        .bind(&v.license_plate)
        .bind(v.current_mileage)
        .bind(&v.image_url)
        .bind(v.updated_at)
        .execute(&self.db)
        .await
        .context("update vehicle")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        // maintenance_records, reminders and fuel_logs cascade via FK
        let res = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete vehicle")?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_maintenance(&self, m: &MaintenanceRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_records (id, user_id, vehicle_id, service_date, service_type,
                                             description, mileage, cost, service_provider, notes,
                                             created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(m.id)
        .bind(m.user_id)
        .bind(m.vehicle_id)
        .bind(m.date)
        .bind(&m.service_type)
        .bind(&m.description)
        .bind(m.mileage)
        .bind(m.cost)
        .bind(&m.service_provider)
        .bind(&m.notes)
        .bind(m.created_at)
        .bind(m.updated_at)
        .execute(&self.db)
        .await
        .context("insert maintenance record")?;
        Ok(())
    }

    async fn list_maintenance(
        &self,
        owner: Uuid,
        vehicle_id: Uuid,
    ) -> StoreResult<Vec<MaintenanceRecord>> {
        let rows = sqlx::query_as::<_, MaintenanceRecord>(&format!(
            r#"
            SELECT {MAINTENANCE_COLUMNS}
              FROM maintenance_records
             WHERE user_id = $1 AND vehicle_id = $2
             ORDER BY service_date DESC, created_at ASC
            "#
        ))
        .bind(owner)
        .bind(vehicle_id)
        .fetch_all(&self.db)
        .await
        .context("list maintenance records")?;
        Ok(rows)
    }

    async fn find_maintenance(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<MaintenanceRecord>> {
        let row = sqlx::query_as::<_, MaintenanceRecord>(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_records WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find maintenance record")?;
        Ok(row)
    }

    async fn update_maintenance(&self, m: &MaintenanceRecord) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE maintenance_records
               SET service_date = $3, service_type = $4, description = $5, mileage = $6,
                   cost = $7, service_provider = $8, notes = $9, updated_at = $10
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(m.id)
        .bind(m.user_id)
        .bind(m.date)
        .bind(&m.service_type)
        .bind(&m.description)
        .bind(m.mileage)
        .bind(m.cost)
        .bind(&m.service_provider)
        .bind(&m.notes)
        .bind(m.updated_at)
        .execute(&self.db)
        .await
        .context("update maintenance record")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_maintenance(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM maintenance_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete maintenance record")?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_reminder(&self, r: &Reminder) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders (id, user_id, vehicle_id, service_type, description,
                                   due_by_mileage, due_by_date, reminder_threshold_miles,
                                   reminder_threshold_days, is_recurring, recurring_interval_miles,
                                   recurring_interval_months, last_completed_date,
                                   last_completed_mileage, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(r.id)
        .bind(r.user_id)
        .bind(r.vehicle_id)
        .bind(&r.service_type)
        .bind(&r.description)
        .bind(r.due_by_mileage)
        .bind(r.due_by_date)
        .bind(r.reminder_threshold_miles)
        .bind(r.reminder_threshold_days)
        .bind(r.is_recurring)
        .bind(r.recurring_interval_miles)
        .bind(r.recurring_interval_months)
        .bind(r.last_completed_date)
        .bind(r.last_completed_mileage)
        .bind(r.is_active)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&self.db)
        .await
        .context("insert reminder")?;
        Ok(())
    }

    async fn list_reminders(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            SELECT {REMINDER_COLUMNS}
              FROM reminders
             WHERE user_id = $1 AND vehicle_id = $2
             ORDER BY created_at ASC
            "#
        ))
        .bind(owner)
        .bind(vehicle_id)
        .fetch_all(&self.db)
        .await
        .context("list reminders")?;
        Ok(rows)
    }

    async fn find_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find reminder")?;
        Ok(row)
    }

    async fn update_reminder(&self, r: &Reminder) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reminders
               SET service_type = $3, description = $4, due_by_mileage = $5, due_by_date = $6,
                   reminder_threshold_miles = $7, reminder_threshold_days = $8,
                   is_recurring = $9, recurring_interval_miles = $10,
                   recurring_interval_months = $11, last_completed_date = $12,
                   last_completed_mileage = $13, is_active = $14, updated_at = $15
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(r.id)
        .bind(r.user_id)
        .bind(&r.service_type)
        .bind(&r.description)
        .bind(r.due_by_mileage)
        .bind(r.due_by_date)
        .bind(r.reminder_threshold_miles)
        .bind(r.reminder_threshold_days)
        .bind(r.is_recurring)
        .bind(r.recurring_interval_miles)
        .bind(r.recurring_interval_months)
        .bind(r.last_completed_date)
        .bind(r.last_completed_mileage)
        .bind(r.is_active)
        .bind(r.updated_at)
        .execute(&self.db)
        .await
        .context("update reminder")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete reminder")?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_fuel_log(&self, f: &FuelLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fuel_logs (id, user_id, vehicle_id, fill_date, fill_time, odometer_reading,
                                   fuel_type, liters, price_per_liter, total_cost,
                                   fuel_station_name, driver_notes, trip_purpose, receipt_url,
                                   pump_meter_photo_url, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(f.id)
        .bind(f.user_id)
        .bind(f.vehicle_id)
        .bind(f.date)
        .bind(&f.time)
        .bind(f.odometer_reading)
        .bind(&f.fuel_type)
        .bind(f.liters)
        .bind(f.price_per_liter)
        .bind(f.total_cost)
        .bind(&f.fuel_station_name)
        .bind(&f.driver_notes)
        .bind(&f.trip_purpose)
        .bind(&f.receipt_url)
        .bind(&f.pump_meter_photo_url)
        .bind(&f.notes)
        .bind(f.created_at)
        .bind(f.updated_at)
        .execute(&self.db)
        .await
        .context("insert fuel log")?;
        Ok(())
    }

    async fn list_fuel_logs(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<FuelLog>> {
        let rows = sqlx::query_as::<_, FuelLog>(&format!(
            r#"
            SELECT {FUEL_COLUMNS}
              FROM fuel_logs
             WHERE user_id = $1 AND vehicle_id = $2
             ORDER BY fill_date DESC, created_at ASC
            "#
        ))
        .bind(owner)
        .bind(vehicle_id)
        .fetch_all(&self.db)
        .await
        .context("list fuel logs")?;
        Ok(rows)
    }

    async fn find_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<FuelLog>> {
        let row = sqlx::query_as::<_, FuelLog>(&format!(
            "SELECT {FUEL_COLUMNS} FROM fuel_logs WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find fuel log")?;
        Ok(row)
    }

    async fn update_fuel_log(&self, f: &FuelLog) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE fuel_logs
               SET fill_date = $3, fill_time = $4, odometer_reading = $5, fuel_type = $6,
                   liters = $7, price_per_liter = $8, total_cost = $9, fuel_station_name = $10,
                   driver_notes = $11, trip_purpose = $12, receipt_url = $13,
                   pump_meter_photo_url = $14, notes = $15, updated_at = $16
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(f.id)
        .bind(f.user_id)
        .bind(f.date)
        .bind(&f.time)
        .bind(f.odometer_reading)
        .bind(&f.fuel_type)
        .bind(f.liters)
        .bind(f.price_per_liter)
        .bind(f.total_cost)
        .bind(&f.fuel_station_name)
        .bind(&f.driver_notes)
        .bind(&f.trip_purpose)
        .bind(&f.receipt_url)
        .bind(&f.pump_meter_photo_url)
        .bind(&f.notes)
        .bind(f.updated_at)
        .execute(&self.db)
        .await
        .context("update fuel log")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM fuel_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete fuel log")?;
        Ok(res.rows_affected() > 0)
    }
}
