//! System-wide configuration document (single JSON object, not a list)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemConfig {
    pub system_version: String,
    pub rating_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reboot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system_version: "8.0".to_string(),
            rating_enabled: true,
            last_reboot: None,
            last_modified: None,
        }
    }
}
