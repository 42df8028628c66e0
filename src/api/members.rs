//! Member registry endpoints: registration, approval workflow, admin CRUD

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Member, MemberProfile},
    AppState,
};

use super::StaffUser;

/// Registration request (student self-service or staff account creation)
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub school_id: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    pub name: String,
    /// Whether the member lives in the staff registry
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteMemberRequest {
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MemberStatusResponse {
    pub success: bool,
    pub message: String,
}

/// Register a student account; it stays pending until staff approve it
#[utoipa::path(
    post,
    path = "/members/register",
    tag = "members",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration accepted, pending approval", body = MemberStatusResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "ID already taken")
    )
)]
pub async fn register_student(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MemberStatusResponse>)> {
    state
        .services
        .members
        .register_student(&request.name, &request.school_id, &request.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MemberStatusResponse {
            success: true,
            message: "Registration received; awaiting staff approval".to_string(),
        }),
    ))
}

/// Create a staff account (staff only)
#[utoipa::path(
    post,
    path = "/admin/members/register",
    tag = "members",
    security(("session_token" = [])),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Staff account created", body = MemberStatusResponse),
        (status = 403, description = "Staff only"),
        (status = 409, description = "ID already taken")
    )
)]
pub async fn register_staff(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MemberStatusResponse>)> {
    state
        .services
        .members
        .register_staff(&request.name, &request.school_id, &request.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MemberStatusResponse {
            success: true,
            message: "Staff account created".to_string(),
        }),
    ))
}

/// Student registry, including pending registrations
#[utoipa::path(
    get,
    path = "/admin/members/students",
    tag = "members",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Student registry", body = Vec<Member>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Json<Vec<Member>> {
    Json(state.services.members.list_students().await)
}

/// Staff registry
#[utoipa::path(
    get,
    path = "/admin/members/staff",
    tag = "members",
    security(("session_token" = [])),
    responses(
        (status = 200, description = "Staff registry", body = Vec<Member>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_staff(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Json<Vec<Member>> {
    Json(state.services.members.list_staff().await)
}

/// Public profile lookup across both registries
#[utoipa::path(
    get,
    path = "/members/{school_id}",
    tag = "members",
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Member profile", body = MemberProfile),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(school_id): Path<String>,
) -> AppResult<Json<MemberProfile>> {
    let profile = state
        .services
        .members
        .find_any(&school_id)
        .await
        .ok_or_else(|| AppError::NotFound("ID not found".to_string()))?;
    Ok(Json(profile))
}

/// Approve a pending student registration
#[utoipa::path(
    post,
    path = "/admin/members/{school_id}/approve",
    tag = "members",
    security(("session_token" = [])),
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Account approved", body = MemberStatusResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown student")
    )
)]
pub async fn approve_member(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(school_id): Path<String>,
) -> AppResult<Json<MemberStatusResponse>> {
    state.services.members.approve_student(&school_id).await?;
    Ok(Json(MemberStatusResponse {
        success: true,
        message: "Account approved".to_string(),
    }))
}

/// Reject (remove) a pending student registration
#[utoipa::path(
    post,
    path = "/admin/members/{school_id}/reject",
    tag = "members",
    security(("session_token" = [])),
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    responses(
        (status = 200, description = "Registration removed", body = MemberStatusResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn reject_member(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(school_id): Path<String>,
) -> AppResult<Json<MemberStatusResponse>> {
    state.services.members.reject_student(&school_id).await?;
    Ok(Json(MemberStatusResponse {
        success: true,
        message: "Registration removed".to_string(),
    }))
}

/// Rename a member
#[utoipa::path(
    put,
    path = "/admin/members/{school_id}",
    tag = "members",
    security(("session_token" = [])),
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberStatusResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(school_id): Path<String>,
    Json(request): Json<UpdateMemberRequest>,
) -> AppResult<Json<MemberStatusResponse>> {
    state
        .services
        .members
        .update_member(&school_id, &request.name, request.is_staff)
        .await?;
    Ok(Json(MemberStatusResponse {
        success: true,
        message: "Member updated".to_string(),
    }))
}

/// Remove a member from a registry
#[utoipa::path(
    delete,
    path = "/admin/members/{school_id}",
    tag = "members",
    security(("session_token" = [])),
    params(
        ("school_id" = String, Path, description = "Member school id")
    ),
    request_body = DeleteMemberRequest,
    responses(
        (status = 200, description = "Member removed", body = MemberStatusResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    StaffUser(staff_id): StaffUser,
    Path(school_id): Path<String>,
    Json(request): Json<DeleteMemberRequest>,
) -> AppResult<Json<MemberStatusResponse>> {
    // Staff cannot delete their own account out from under an open session.
    if request.is_staff && crate::models::same_id(&school_id, &staff_id) {
        return Err(AppError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }
    state
        .services
        .members
        .delete_member(&school_id, request.is_staff)
        .await?;
    Ok(Json(MemberStatusResponse {
        success: true,
        message: "Member removed".to_string(),
    }))
}
