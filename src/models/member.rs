//! Member record shared by the student and staff registries

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Self-registered students await staff approval
    Pending,
    Approved,
}

impl MemberStatus {
    /// Legacy records predate the status field and were all approved.
    fn legacy_default() -> Self {
        MemberStatus::Approved
    }
}

/// One registry entry. Students live in `users.json`, staff in
/// `admins.json`; both use the same record shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub name: String,
    /// Natural key, stored trimmed and lower-cased
    pub school_id: String,
    pub password: String,
    /// "Student" or "Staff"
    pub category: String,
    /// Profile photo filename; uploads are handled outside the server
    #[serde(default = "Member::default_photo")]
    pub photo: String,
    #[serde(default = "MemberStatus::legacy_default")]
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Member {
    pub fn default_photo() -> String {
        "default.png".to_string()
    }
}

/// Member profile as returned by the API: the registry record plus where it
/// came from, with the password withheld.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberProfile {
    pub name: String,
    pub school_id: String,
    pub category: String,
    pub photo: String,
    pub status: MemberStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub is_staff: bool,
}

impl MemberProfile {
    pub fn from_member(member: &Member, is_staff: bool) -> Self {
        Self {
            name: member.name.clone(),
            school_id: member.school_id.clone(),
            category: member.category.clone(),
            photo: member.photo.clone(),
            status: member.status,
            created_at: member.created_at.clone(),
            is_staff,
        }
    }
}
