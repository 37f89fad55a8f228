use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Preferences;
use crate::auth::repo_types::User;

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub email_notifications: Option<bool>,
    pub reminders_enabled: Option<bool>,
    pub theme: Option<String>,
    pub currency: Option<String>,
    pub distance_unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub preferences: Preferences,
}

impl SettingsResponse {
    pub fn new(user: User, preferences: Preferences) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            preferences,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for AccountResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
