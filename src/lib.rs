//! LBAS - Library Borrowing & Administration System
//!
//! A Rust implementation of the LBAS circulation backend, providing a REST
//! JSON API over flat-file record collections: book inventory, member
//! registration, reservation/borrow workflow, password-reset ticketing and
//! the monthly usage leaderboard.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod datetime;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
