//! Service rating record

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub rating_id: String,
    pub timestamp: String,
    pub school_id: String,
    pub stars: u8,
    pub feedback: String,
    /// Submitting surface, e.g. "Mobile" or "Tablet"
    pub platform: String,
}
