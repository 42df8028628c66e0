//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, circulation, health, leaderboard, members, ratings, tickets};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LBAS API",
        version = "1.0.0",
        description = "Library Borrowing Administration System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::bulk_import,
        books::update_book,
        books::delete_book,
        books::list_categories,
        books::add_category,
        books::delete_category,
        books::delete_category_cascade,
        // Circulation
        circulation::reserve,
        circulation::process_transaction,
        circulation::list_transactions,
        // Tickets
        tickets::request_reset,
        tickets::poll_ticket,
        tickets::list_tickets,
        tickets::approve_ticket,
        tickets::finalize_reset,
        // Leaderboard
        leaderboard::monthly_leaderboard,
        leaderboard::top_borrowers,
        leaderboard::top_books,
        leaderboard::leaderboard_profile,
        // Members
        members::register_student,
        members::register_staff,
        members::list_students,
        members::list_staff,
        members::get_member,
        members::approve_member,
        members::reject_member,
        members::update_member,
        members::delete_member,
        // Ratings
        ratings::toggle_rating,
        ratings::rating_status,
        ratings::rate,
        ratings::ratings_summary,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::StatusResponse,
            // Books
            books::BulkImportRequest,
            books::CategoriesResponse,
            books::CategoryRequest,
            books::BooksStatusResponse,
            crate::models::Book,
            crate::models::BookStatus,
            crate::services::catalog::BookPatch,
            crate::services::catalog::BulkImportSummary,
            // Circulation
            circulation::ReserveRequest,
            circulation::ProcessTransactionRequest,
            circulation::CirculationResponse,
            crate::models::Transaction,
            crate::models::TransactionStatus,
            // Tickets
            tickets::ResetRequest,
            tickets::FinalizeResetRequest,
            tickets::TicketStatusResponse,
            tickets::ApproveTicketResponse,
            crate::models::Ticket,
            crate::models::TicketStatus,
            crate::services::tickets::TicketPoll,
            // Leaderboard
            leaderboard::LeaderboardQuery,
            crate::models::MonthlyLeaderboard,
            crate::models::TopBorrower,
            crate::models::TopBook,
            // Members
            members::RegisterRequest,
            members::UpdateMemberRequest,
            members::DeleteMemberRequest,
            members::MemberStatusResponse,
            crate::models::Member,
            crate::models::MemberProfile,
            crate::models::MemberStatus,
            // Ratings
            ratings::RateRequest,
            ratings::ToggleRatingResponse,
            ratings::RateResponse,
            crate::models::Rating,
            crate::services::ratings::RatingEligibility,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Inventory and category management"),
        (name = "circulation", description = "Reserve, borrow and return"),
        (name = "tickets", description = "Password-reset tickets"),
        (name = "leaderboard", description = "Monthly borrowing rankings"),
        (name = "members", description = "Member registries"),
        (name = "ratings", description = "Service-rating feedback")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
