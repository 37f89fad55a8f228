use super::{dto::UpdatePreferencesRequest, repo_types::Preferences};
use crate::{errors::ApiError, fields::require_text};

pub fn apply_update(p: &mut Preferences, req: UpdatePreferencesRequest) -> Result<(), ApiError> {
    if let Some(v) = req.email_notifications {
        p.email_notifications = v;
    }
    if let Some(v) = req.reminders_enabled {
        p.reminders_enabled = v;
    }
    if let Some(theme) = req.theme {
        p.theme = require_text("theme", &theme)?;
    }
    if let Some(currency) = req.currency {
        p.currency = require_text("currency", &currency)?;
    }
    if let Some(unit) = req.distance_unit {
        p.distance_unit = require_text("distance_unit", &unit)?;
    }
    Ok(())
}
