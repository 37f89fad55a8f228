use serde::Serialize;
use sqlx::FromRow;

/// Per-user display and notification settings. Accounts without a stored row
/// get the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Preferences {
    pub email_notifications: bool,
    pub reminders_enabled: bool,
    pub theme: String,
    pub currency: String,
    pub distance_unit: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            reminders_enabled: true,
            theme: "light".into(),
            currency: "USD".into(),
            distance_unit: "miles".into(),
        }
    }
}
