//! Persistence seam. Handlers only see [`Store`]; the backend is picked at
//! startup from `DATABASE_URL`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::User, fuel::repo_types::FuelLog, maintenance::repo_types::MaintenanceRecord,
    reminders::repo_types::Reminder, settings::repo_types::Preferences,
    vehicles::repo_types::Vehicle,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every vehicle, maintenance and reminder query is scoped by `owner`; a
/// record belonging to someone else behaves exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    /// Also removes everything the user owns.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_preferences(&self, user_id: Uuid) -> StoreResult<Option<Preferences>>;
    async fn save_preferences(&self, user_id: Uuid, prefs: &Preferences) -> StoreResult<()>;

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()>;
    async fn list_vehicles(&self, owner: Uuid) -> StoreResult<Vec<Vehicle>>;
    async fn find_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Vehicle>>;
    async fn update_vehicle(&self, vehicle: &Vehicle) -> StoreResult<bool>;
    /// Also removes the vehicle's maintenance records, reminders and fuel logs.
    async fn delete_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn insert_maintenance(&self, record: &MaintenanceRecord) -> StoreResult<()>;
    /// Newest service date first.
    async fn list_maintenance(
        &self,
        owner: Uuid,
        vehicle_id: Uuid,
    ) -> StoreResult<Vec<MaintenanceRecord>>;
    async fn find_maintenance(&self, owner: Uuid, id: Uuid)
        -> StoreResult<Option<MaintenanceRecord>>;
    async fn update_maintenance(&self, record: &MaintenanceRecord) -> StoreResult<bool>;
    async fn delete_maintenance(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn insert_reminder(&self, reminder: &Reminder) -> StoreResult<()>;
    async fn list_reminders(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<Reminder>>;
    async fn find_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Reminder>>;
    async fn update_reminder(&self, reminder: &Reminder) -> StoreResult<bool>;
    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn insert_fuel_log(&self, log: &FuelLog) -> StoreResult<()>;
    /// Newest fill-up first.
    async fn list_fuel_logs(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<FuelLog>>;
    async fn find_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<FuelLog>>;
    async fn update_fuel_log(&self, log: &FuelLog) -> StoreResult<bool>;
    async fn delete_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;
}
