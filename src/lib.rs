pub mod config;
pub mod deck;
pub mod filters;
pub mod grader;
pub mod handlers;
pub mod render;
pub mod session;
pub mod session_log;
pub mod state;
pub mod trainer;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory served under `/static`
pub const STATIC_DIR: &str = "static";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/next", post(handlers::next))
        .route("/prev", post(handlers::prev))
        .route("/skip", post(handlers::skip))
        .route("/toggle-answer", post(handlers::toggle_answer))
        .route("/submit", post(handlers::submit))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
