pub mod admin;
pub mod health;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::career::handlers;
use crate::config::Config;
use crate::state::AppState;

/// Local frontends allowed in every environment.
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:8080",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/upload-resume", post(handlers::handle_upload_resume))
        .route("/analyze-resume", post(handlers::handle_analyze_resume))
        .route(
            "/generate-cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        .route(
            "/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .route("/evaluate-answer", post(handlers::handle_evaluate_answer))
        .route(
            "/enhance-resume-section",
            post(handlers::handle_enhance_section),
        )
        .route("/career-insights/paths", post(handlers::handle_career_paths))
        .route(
            "/career-insights/skill-gaps",
            post(handlers::handle_skill_gaps),
        )
        .route(
            "/career-insights/salary",
            post(handlers::handle_salary_insights),
        )
        .route(
            "/career-insights/interview-prep",
            post(handlers::handle_interview_prep),
        )
        .route("/career-insights/learning", post(handlers::handle_learning))
        .route(
            "/career-insights/industry",
            post(handlers::handle_industry_insights),
        )
        .route("/cache", delete(admin::clear_caches_handler))
        .with_state(state)
}

/// Dev origins plus `FRONTEND_URL` and, for https, its `www.` variant.
pub fn allowed_origins(config: &Config) -> Vec<String> {
    let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
    if let Some(frontend) = &config.frontend_url {
        origins.push(frontend.clone());
        if let Some(host) = frontend.strip_prefix("https://") {
            if !host.starts_with("www.") {
                origins.push(format!("https://www.{host}"));
            }
        }
    }
    origins
}

pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins(config)
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
