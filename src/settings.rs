use crate::db;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

const SETTINGS_KEY: &str = "hostel.settings";

/// Per-workspace settings, stored as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostelSettings {
    /// Block handed to warden sessions at login.
    pub warden_block: String,
    /// Overrides the daemon-wide fixture seeding flag when set.
    pub seed_fixtures: Option<bool>,
}

impl Default for HostelSettings {
    fn default() -> Self {
        Self {
            warden_block: "Block A".to_string(),
            seed_fixtures: None,
        }
    }
}

/// Missing or unreadable settings fall back to defaults.
pub fn load(conn: &Connection) -> HostelSettings {
    match db::settings_get_json(conn, SETTINGS_KEY) {
        Ok(Some(v)) => serde_json::from_value(v).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable workspace settings");
            HostelSettings::default()
        }),
        Ok(None) => HostelSettings::default(),
        Err(e) => {
            tracing::warn!(error = %e, "workspace settings unavailable");
            HostelSettings::default()
        }
    }
}

pub fn save(conn: &Connection, settings: &HostelSettings) -> anyhow::Result<()> {
    db::settings_set_json(conn, SETTINGS_KEY, &serde_json::to_value(settings)?)
}
