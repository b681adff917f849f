use std::sync::Arc;

use serde_json::Value;

use crate::cache::TtlCache;
use crate::career::analysis::AnalyzeResumeResponse;
use crate::career::interview::InterviewQuestionsResponse;
use crate::config::Config;
use crate::gateway::CallOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Built once in `main`; each cache is an independently configured instance.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CallOrchestrator>,
    /// Resume analyses, keyed by target role + resume prefix.
    pub analysis_cache: Arc<TtlCache<AnalyzeResumeResponse>>,
    /// Generated interview question sets.
    pub interview_cache: Arc<TtlCache<InterviewQuestionsResponse>>,
    /// Career insight reports of every kind, as the JSON the model returned.
    pub insights_cache: Arc<TtlCache<Value>>,
    pub config: Config,
}

impl AppState {
    pub fn new(gateway: CallOrchestrator, config: Config) -> Self {
        Self {
            gateway: Arc::new(gateway),
            analysis_cache: Arc::new(TtlCache::new("resume_analysis", config.analysis_cache())),
            interview_cache: Arc::new(TtlCache::new(
                "interview_questions",
                config.interview_cache(),
            )),
            insights_cache: Arc::new(TtlCache::new("career_insights", config.insights_cache())),
            config,
        }
    }
}
