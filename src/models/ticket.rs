//! Password-reset ticket record

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Approved,
}

/// Short-lived staff-approved one-time-code handshake. At most one active
/// ticket per `school_id`; a ticket is deleted on successful password
/// finalization or by the reconciliation sweep once `expiry` has passed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ticket {
    pub school_id: String,
    pub status: TicketStatus,
    /// 6-character uppercase-alphanumeric code, set only on approval
    pub code: Option<String>,
    /// Absolute expiry timestamp, 5 minutes from creation
    pub expiry: String,
}
