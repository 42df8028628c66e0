//! LBAS Server - Library Borrowing & Administration System
//!
//! A Rust REST API server for school-library circulation.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lbas_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lbas_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LBAS Server v{}", env!("CARGO_PKG_VERSION"));

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Open the flat-file store, seeding collections on first run
    let repository = Repository::open(&config.storage.data_dir)
        .await
        .expect("Failed to open data store");

    tracing::info!(data_dir = %config.storage.data_dir, "Data store ready");

    // Create services and application state
    let services = Services::new(repository, &config);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books/bulk", post(api::books::bulk_import))
        .route("/books/:book_no", put(api::books::update_book))
        .route("/books/:book_no", delete(api::books::delete_book))
        .route("/categories", get(api::books::list_categories))
        .route("/categories", post(api::books::add_category))
        .route("/categories/:name", delete(api::books::delete_category))
        .route(
            "/categories/:name/cascade",
            delete(api::books::delete_category_cascade),
        )
        // Circulation
        .route("/circulation/reserve", post(api::circulation::reserve))
        .route(
            "/circulation/process",
            post(api::circulation::process_transaction),
        )
        .route(
            "/circulation/transactions",
            get(api::circulation::list_transactions),
        )
        // Password-reset tickets
        .route("/tickets", post(api::tickets::request_reset))
        .route("/tickets/finalize", post(api::tickets::finalize_reset))
        .route("/tickets/:school_id", get(api::tickets::poll_ticket))
        .route("/admin/tickets", get(api::tickets::list_tickets))
        .route(
            "/admin/tickets/:school_id/approve",
            post(api::tickets::approve_ticket),
        )
        // Leaderboard
        .route("/leaderboard", get(api::leaderboard::monthly_leaderboard))
        .route(
            "/leaderboard/top-borrowers",
            get(api::leaderboard::top_borrowers),
        )
        .route("/leaderboard/top-books", get(api::leaderboard::top_books))
        .route(
            "/leaderboard/profile/:school_id",
            get(api::leaderboard::leaderboard_profile),
        )
        // Members
        .route("/members/register", post(api::members::register_student))
        .route("/members/:school_id", get(api::members::get_member))
        .route(
            "/admin/members/register",
            post(api::members::register_staff),
        )
        .route("/admin/members/students", get(api::members::list_students))
        .route("/admin/members/staff", get(api::members::list_staff))
        .route(
            "/admin/members/:school_id/approve",
            post(api::members::approve_member),
        )
        .route(
            "/admin/members/:school_id/reject",
            post(api::members::reject_member),
        )
        .route(
            "/admin/members/:school_id",
            put(api::members::update_member),
        )
        .route(
            "/admin/members/:school_id",
            delete(api::members::delete_member),
        )
        // Ratings
        .route("/ratings", post(api::ratings::rate))
        .route(
            "/ratings/status/:school_id",
            get(api::ratings::rating_status),
        )
        .route("/admin/ratings", get(api::ratings::ratings_summary))
        .route(
            "/admin/ratings/toggle",
            post(api::ratings::toggle_rating),
        )
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
