//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use agentwire_checkpoint::CheckpointerMode;

use crate::error::ApiError;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// `durable`, `in_memory`, or `uninitialized` before the first run.
    pub checkpointer: String,
    pub active_connections: usize,
}

/// A configured workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInfo {
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Serialize)]
pub struct WorkflowsListResponse {
    pub count: usize,
    pub workflows: Vec<WorkflowInfo>,
}

/// GET /chat-history/{thread_id}
///
/// The latest persisted state of the thread, or `null`.
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Json<Value> {
    debug!(thread_id = %thread_id, "Chat history requested");
    let values = state.orchestrator.chat_history(&thread_id).await;
    Json(values.map(Value::Object).unwrap_or(Value::Null))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let checkpointer = match state.orchestrator.checkpointer().get().map(|h| h.mode()) {
        Some(CheckpointerMode::Durable) => "durable",
        Some(CheckpointerMode::InMemory) => "in_memory",
        None => "uninitialized",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime().as_secs(),
        checkpointer: checkpointer.to_string(),
        active_connections: state.active_connections(),
    })
}

/// GET /workflows
pub async fn list_workflows(State(state): State<Arc<AppState>>) -> Json<WorkflowsListResponse> {
    let registry = state.orchestrator.registry();
    let workflows: Vec<WorkflowInfo> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let locator = registry.locator(&name)?.to_string();
            Some(WorkflowInfo { name, locator })
        })
        .collect();

    Json(WorkflowsListResponse {
        count: workflows.len(),
        workflows,
    })
}

/// GET /workflows/{name}
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<WorkflowInfo>, ApiError> {
    let locator = state
        .orchestrator
        .registry()
        .locator(&name)
        .ok_or_else(|| ApiError::WorkflowNotFound(name.clone()))?
        .to_string();
    Ok(Json(WorkflowInfo { name, locator }))
}
