//! Catalog endpoints: inventory listing, bulk import, categories

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::Book,
    services::catalog::{BookPatch, BulkImportSummary},
    AppState,
};

use super::StaffUser;

/// Bulk import request: raw pasted text, one book per line
#[derive(Deserialize, ToSchema)]
pub struct BulkImportRequest {
    /// Lines of `number <sep> title`; `|`, `,` or whitespace separated
    pub text: String,
    /// Category assigned to every imported book
    #[serde(default)]
    pub category: String,
    /// Wipe the existing inventory before importing
    #[serde(default)]
    pub clear_first: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct BooksStatusResponse {
    pub success: bool,
    pub message: String,
}

/// List the inventory after a reconciliation pass
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Current inventory", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Json<Vec<Book>> {
    Json(state.services.catalog.list_books().await)
}

/// Bulk-register books from pasted text
#[utoipa::path(
    post,
    path = "/books/bulk",
    tag = "books",
    security(("session_token" = [])),
    request_body = BulkImportRequest,
    responses(
        (status = 201, description = "Import summary", body = BulkImportSummary),
        (status = 400, description = "No parsable lines"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn bulk_import(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<BulkImportRequest>,
) -> AppResult<(StatusCode, Json<BulkImportSummary>)> {
    let summary = state
        .services
        .catalog
        .bulk_import(&request.text, &request.category, request.clear_first)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Update a book's title, category or status
#[utoipa::path(
    put,
    path = "/books/{book_no}",
    tag = "books",
    security(("session_token" = [])),
    params(
        ("book_no" = String, Path, description = "Book number")
    ),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = BooksStatusResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(book_no): Path<String>,
    Json(patch): Json<BookPatch>,
) -> AppResult<Json<BooksStatusResponse>> {
    state.services.catalog.update_book(&book_no, patch).await?;
    Ok(Json(BooksStatusResponse {
        success: true,
        message: "Book updated".to_string(),
    }))
}

/// Remove a book from the inventory
#[utoipa::path(
    delete,
    path = "/books/{book_no}",
    tag = "books",
    security(("session_token" = [])),
    params(
        ("book_no" = String, Path, description = "Book number")
    ),
    responses(
        (status = 200, description = "Book removed", body = BooksStatusResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(book_no): Path<String>,
) -> AppResult<Json<BooksStatusResponse>> {
    state.services.catalog.delete_book(&book_no).await?;
    Ok(Json(BooksStatusResponse {
        success: true,
        message: "Book removed".to_string(),
    }))
}

/// List categories, resynced against the inventory
#[utoipa::path(
    get,
    path = "/categories",
    tag = "books",
    responses(
        (status = 200, description = "Category list", body = CategoriesResponse)
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<CategoriesResponse>> {
    let categories = state.services.catalog.categories().await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Add a category by hand
#[utoipa::path(
    post,
    path = "/categories",
    tag = "books",
    security(("session_token" = [])),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category list including the new entry", body = CategoriesResponse),
        (status = 400, description = "Invalid category name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn add_category(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<CategoryRequest>,
) -> AppResult<Json<CategoriesResponse>> {
    let (categories, _added) = state.services.catalog.add_category(&request.name).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Delete an unused category
#[utoipa::path(
    delete,
    path = "/categories/{name}",
    tag = "books",
    security(("session_token" = [])),
    params(
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Category list after deletion", body = CategoriesResponse),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Category still referenced by books")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(name): Path<String>,
) -> AppResult<Json<CategoriesResponse>> {
    let categories = state.services.catalog.delete_category(&name).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Delete a category together with every book in it
#[utoipa::path(
    delete,
    path = "/categories/{name}/cascade",
    tag = "books",
    security(("session_token" = [])),
    params(
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Category and its books removed", body = BooksStatusResponse),
        (status = 400, description = "Invalid or protected category"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_category_cascade(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(name): Path<String>,
) -> AppResult<Json<BooksStatusResponse>> {
    state.services.catalog.delete_category_cascade(&name).await?;
    Ok(Json(BooksStatusResponse {
        success: true,
        message: "Category and its books removed".to_string(),
    }))
}
