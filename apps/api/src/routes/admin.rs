use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

/// DELETE /cache
/// Empties every cache. Hit and miss counters survive the reset.
pub async fn clear_caches_handler(State(state): State<AppState>) -> Json<Value> {
    let cleared = json!({
        state.analysis_cache.name(): state.analysis_cache.clear(),
        state.interview_cache.name(): state.interview_cache.clear(),
        state.insights_cache.name(): state.insights_cache.clear(),
    });
    info!("Caches cleared: {cleared}");
    Json(json!({ "cleared": cleared }))
}
