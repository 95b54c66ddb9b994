use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::*;

/// Creates the API router
///
/// Public endpoints:
/// - GET /, /media, /items/:id, /board-games
///
/// Staff endpoints (Bearer token):
/// - POST /media/books, /media/dvds, /media/cds, /board-games
/// - /members (anonymous GET is redirected to /media)
/// - /loans
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/", get(overview))
        // Catalog
        .route("/media", get(list_media))
        .route("/media/books", post(register_book))
        .route("/media/dvds", post(register_dvd))
        .route("/media/cds", post(register_cd))
        .route("/items/:id", get(get_item))
        .route("/board-games", get(list_board_games).post(register_board_game))
        // Members
        .route("/members", get(member_directory).post(register_member))
        .route("/members/:id", get(get_member))
        .route("/members/:id/block", post(block_member))
        .route("/members/:id/unblock", post(unblock_member))
        // Loans
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/overdue", get(list_overdue_loans))
        .route("/loans/:id", get(get_loan))
        .route("/loans/:id/return", post(return_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
