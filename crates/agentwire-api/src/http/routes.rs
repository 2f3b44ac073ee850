//! HTTP route definitions.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers::{chat_history, get_workflow, health_check, list_workflows};
use crate::state::AppState;
use crate::websocket::ws_handler;

/// Create the main router.
///
/// ```text
/// GET /ws                        - WebSocket connection
/// GET /chat-history/{thread_id}  - Latest persisted thread state
/// GET /workflows                 - Configured workflows
/// GET /workflows/{name}          - One workflow's locator
/// GET /health                    - Health check
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/chat-history/{thread_id}", get(chat_history))
        .route("/workflows", get(list_workflows))
        .route("/workflows/{name}", get(get_workflow))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
