//! Resume analysis: free-text review of a resume, cached per target role.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{truncate_chars, TtlCache};
use crate::career::prompts::{
    fill_template, RESUME_ANALYSIS_PROMPT_TEMPLATE, RESUME_ANALYSIS_SYSTEM,
};
use crate::career::{non_blank, require_text, GENERATION_TEMPERATURE, RESUME_KEY_CHARS};
use crate::errors::AppError;
use crate::gateway::CallOrchestrator;
use crate::llm_client::ChatMessage;

const DEFAULT_JOB_ROLE: &str = "general job applications";
const MAX_OUTPUT_TOKENS: u32 = 2000;

#[derive(Debug, Deserialize)]
pub struct AnalyzeResumeRequest {
    pub resume_text: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResumeResponse {
    pub analysis: String,
    pub target_role: Option<String>,
}

pub fn analysis_cache_key(job_role: &str, resume_text: &str) -> String {
    format!(
        "analyze:{job_role}:{}",
        truncate_chars(resume_text, RESUME_KEY_CHARS)
    )
}

/// Reviews a resume, serving a cached review when the same role and resume
/// prefix were analysed within the cache TTL.
pub async fn analyze_resume(
    request: &AnalyzeResumeRequest,
    gateway: &CallOrchestrator,
    cache: &TtlCache<AnalyzeResumeResponse>,
) -> Result<AnalyzeResumeResponse, AppError> {
    require_text("resume_text", &request.resume_text)?;

    let job_role = non_blank(request.target_role.as_deref()).unwrap_or(DEFAULT_JOB_ROLE);
    let key = analysis_cache_key(job_role, &request.resume_text);
    if let Some(cached) = cache.get(&key) {
        info!("Returning cached resume analysis");
        return Ok(cached);
    }

    let prompt = fill_template(
        RESUME_ANALYSIS_PROMPT_TEMPLATE,
        &[("job_role", job_role), ("resume_text", request.resume_text.as_str())],
    );
    let call = gateway
        .request(vec![
            ChatMessage::system(RESUME_ANALYSIS_SYSTEM),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(MAX_OUTPUT_TOKENS);

    let analysis = gateway.invoke(&call).await?;
    let response = AnalyzeResumeResponse {
        analysis,
        target_role: request.target_role.clone(),
    };
    cache.put(&key, response.clone());
    Ok(response)
}
