//! Records persisted in the local database.

use serde::{Deserialize, Serialize};

/// User-facing application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications_enabled: bool,
    pub dark_theme: bool,
    /// BCP-47 language tag, `None` follows the system.
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            dark_theme: false,
            language: None,
        }
    }
}
