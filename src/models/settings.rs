use serde::{Deserialize, Serialize};

/// Toggles threaded into every policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_delete_expired: bool,
    pub auto_purge_trash: bool,
    pub warning_days_15: bool,
    pub warning_days_3: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_delete_expired: true,
            auto_purge_trash: false,
            warning_days_15: true,
            warning_days_3: true,
        }
    }
}
