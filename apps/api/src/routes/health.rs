use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Service banner with the endpoint list.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Agragrati API - AI Resume & Career Tools",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/upload-resume",
            "/analyze-resume",
            "/generate-cover-letter",
            "/interview-questions",
            "/evaluate-answer",
            "/enhance-resume-section",
            "/career-insights/paths",
            "/career-insights/skill-gaps",
            "/career-insights/salary",
            "/career-insights/interview-prep",
            "/career-insights/learning",
            "/career-insights/industry"
        ]
    }))
}

/// GET /health
/// Liveness plus cache and worker-pool counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let pool = state.gateway.pool();
    Json(json!({
        "status": "healthy",
        "inference_api": if state.config.groq_api_key.is_empty() { "missing" } else { "configured" },
        "version": env!("CARGO_PKG_VERSION"),
        "caches": {
            state.analysis_cache.name(): state.analysis_cache.stats(),
            state.interview_cache.name(): state.interview_cache.stats(),
            state.insights_cache.name(): state.insights_cache.stats(),
        },
        "worker_pool": {
            "size": pool.size(),
            "available": pool.available(),
        }
    }))
}
