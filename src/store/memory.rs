use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    auth::repo_types::User, fuel::repo_types::FuelLog, maintenance::repo_types::MaintenanceRecord,
    reminders::repo_types::Reminder, settings::repo_types::Preferences,
    vehicles::repo_types::Vehicle,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    preferences: HashMap<Uuid, Preferences>,
    // insertion order is the listing order
    vehicles: Vec<Vehicle>,
    maintenance: Vec<MaintenanceRecord>,
    reminders: Vec<Reminder>,
    fuel_logs: Vec<FuelLog>,
}

/// Process-local store used by tests and `DATABASE_URL=memory://`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T, F>(items: &mut [T], item: &T, same: F) -> bool
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    match items.iter_mut().find(|x| same(x)) {
        Some(slot) => {
            *slot = item.clone();
            true
        }
        None => false,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut g = self.inner.write().await;
        if g.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        g.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let g = self.inner.read().await;
        Ok(g.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        let g = self.inner.read().await;
        Ok(g
            .users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut g = self.inner.write().await;
        if g
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        g.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        if g.users.remove(&id).is_none() {
            return Ok(false);
        }
        g.preferences.remove(&id);
        g.vehicles.retain(|v| v.user_id != id);
        g.maintenance.retain(|m| m.user_id != id);
        g.reminders.retain(|r| r.user_id != id);
        g.fuel_logs.retain(|f| f.user_id != id);
        Ok(true)
    }

    async fn find_preferences(&self, user_id: Uuid) -> StoreResult<Option<Preferences>> {
        Ok(self.inner.read().await.preferences.get(&user_id).cloned())
    }

    async fn save_preferences(&self, user_id: Uuid, prefs: &Preferences) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .preferences
            .insert(user_id, prefs.clone());
        Ok(())
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()> {
        self.inner.write().await.vehicles.push(vehicle.clone());
        Ok(())
    }

    async fn list_vehicles(&self, owner: Uuid) -> StoreResult<Vec<Vehicle>> {
        let g = self.inner.read().await;
        Ok(g
            .vehicles
            .iter()
            .filter(|v| v.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let g = self.inner.read().await;
        Ok(g
            .vehicles
            .iter()
            .find(|v| v.id == id && v.user_id == owner)
            .cloned())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        Ok(replace(&mut g.vehicles, vehicle, |v| {
            v.id == vehicle.id && v.user_id == vehicle.user_id
        }))
    }

    async fn delete_vehicle(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        let before = g.vehicles.len();
        g.vehicles.retain(|v| !(v.id == id && v.user_id == owner));
        if g.vehicles.len() == before {
            return Ok(false);
        }
        g.maintenance.retain(|m| m.vehicle_id != id);
        g.reminders.retain(|r| r.vehicle_id != id);
        g.fuel_logs.retain(|f| f.vehicle_id != id);
        Ok(true)
    }

    async fn insert_maintenance(&self, record: &MaintenanceRecord) -> StoreResult<()> {
        self.inner.write().await.maintenance.push(record.clone());
        Ok(())
    }

    async fn list_maintenance(
        &self,
        owner: Uuid,
        vehicle_id: Uuid,
    ) -> StoreResult<Vec<MaintenanceRecord>> {
        let g = self.inner.read().await;
        let mut rows: Vec<MaintenanceRecord> = g
            .maintenance
            .iter()
            .filter(|m| m.user_id == owner && m.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn find_maintenance(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<MaintenanceRecord>> {
        let g = self.inner.read().await;
        Ok(g
            .maintenance
            .iter()
            .find(|m| m.id == id && m.user_id == owner)
            .cloned())
    }

    async fn update_maintenance(&self, record: &MaintenanceRecord) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        Ok(replace(&mut g.maintenance, record, |m| {
            m.id == record.id && m.user_id == record.user_id
        }))
    }

    async fn delete_maintenance(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        let before = g.maintenance.len();
        g.maintenance.retain(|m| !(m.id == id && m.user_id == owner));
        Ok(g.maintenance.len() != before)
    }

    async fn insert_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        self.inner.write().await.reminders.push(reminder.clone());
        Ok(())
    }

    async fn list_reminders(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<Reminder>> {
        let g = self.inner.read().await;
        Ok(g
            .reminders
            .iter()
            .filter(|r| r.user_id == owner && r.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn find_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Reminder>> {
        let g = self.inner.read().await;
        Ok(g
            .reminders
            .iter()
            .find(|r| r.id == id && r.user_id == owner)
            .cloned())
    }

    async fn update_reminder(&self, reminder: &Reminder) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        Ok(replace(&mut g.reminders, reminder, |r| {
            r.id == reminder.id && r.user_id == reminder.user_id
        }))
    }

    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        let before = g.reminders.len();
        g.reminders.retain(|r| !(r.id == id && r.user_id == owner));
        Ok(g.reminders.len() != before)
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> StoreResult<()> {
        self.inner.write().await.fuel_logs.push(log.clone());
        Ok(())
    }

    async fn list_fuel_logs(&self, owner: Uuid, vehicle_id: Uuid) -> StoreResult<Vec<FuelLog>> {
        let g = self.inner.read().await;
        let mut rows: Vec<FuelLog> = g
            .fuel_logs
            .iter()
            .filter(|f| f.user_id == owner && f.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn find_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<FuelLog>> {
        let g = self.inner.read().await;
        Ok(g
            .fuel_logs
            .iter()
            .find(|f| f.id == id && f.user_id == owner)
            .cloned())
    }

    async fn update_fuel_log(&self, log: &FuelLog) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        Ok(replace(&mut g.fuel_logs, log, |f| {
            f.id == log.id && f.user_id == log.user_id
        }))
    }

    async fn delete_fuel_log(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut g = self.inner.write().await;
        let before = g.fuel_logs.len();
        g.fuel_logs.retain(|f| !(f.id == id && f.user_id == owner));
        Ok(g.fuel_logs.len() != before)
    }
}
