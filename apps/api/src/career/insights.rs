//! Career insights: structured reports about a resume (growth paths, skill
//! gaps, salary, interview prep, learning plan, industry outlook).
//!
//! Each report is a JSON object written by the model. All six kinds share
//! the insights cache, which usually carries a longer TTL than raw analysis.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::cache::{truncate_chars, TtlCache};
use crate::career::prompts::{
    fill_template, CAREER_INSIGHTS_PREAMBLE, CAREER_INSIGHTS_SYSTEM, CAREER_PATHS_PROMPT,
    INDUSTRY_PROMPT, INTERVIEW_PREP_PROMPT, LEARNING_PROMPT, SALARY_PROMPT, SKILL_GAPS_PROMPT,
};
use crate::career::{non_blank, require_text, role_context, GENERATION_TEMPERATURE};
use crate::errors::AppError;
use crate::gateway::CallOrchestrator;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, JSON_ONLY_SYSTEM_SUFFIX};
use crate::llm_client::{parse_json_reply, ChatMessage};

/// Characters of resume text that go into an insight cache key.
pub const INSIGHT_KEY_CHARS: usize = 300;
const MAX_OUTPUT_TOKENS: u32 = 2000;
const DEFAULT_LOCATION: &str = "United States";
const ANY_ROLE: &str = "any";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    CareerPaths,
    SkillGaps,
    Salary,
    InterviewPrep,
    Learning,
    Industry,
}

impl InsightKind {
    /// Prefix of the logical cache key.
    pub fn tag(self) -> &'static str {
        match self {
            InsightKind::CareerPaths => "paths",
            InsightKind::SkillGaps => "skills",
            InsightKind::Salary => "salary",
            InsightKind::InterviewPrep => "interview",
            InsightKind::Learning => "learning",
            InsightKind::Industry => "industry",
        }
    }

    fn label(self) -> &'static str {
        match self {
            InsightKind::CareerPaths => "career paths",
            InsightKind::SkillGaps => "skill gaps",
            InsightKind::Salary => "salary insights",
            InsightKind::InterviewPrep => "interview prep",
            InsightKind::Learning => "learning recommendations",
            InsightKind::Industry => "industry insights",
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            InsightKind::CareerPaths => CAREER_PATHS_PROMPT,
            InsightKind::SkillGaps => SKILL_GAPS_PROMPT,
            InsightKind::Salary => SALARY_PROMPT,
            InsightKind::InterviewPrep => INTERVIEW_PREP_PROMPT,
            InsightKind::Learning => LEARNING_PROMPT,
            InsightKind::Industry => INDUSTRY_PROMPT,
        }
    }
}

/// Body of every `/career-insights/*` request. `location` only matters for salary.
#[derive(Debug, Deserialize)]
pub struct CareerInsightsRequest {
    pub resume_text: String,
    pub target_role: Option<String>,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

pub fn insight_cache_key(
    kind: InsightKind,
    role: &str,
    location: &str,
    resume_text: &str,
) -> String {
    let resume = truncate_chars(resume_text, INSIGHT_KEY_CHARS);
    match kind {
        InsightKind::Salary => format!("salary:{role}:{location}:{resume}"),
        _ => format!("{}:{role}:{resume}", kind.tag()),
    }
}

pub async fn career_insight(
    kind: InsightKind,
    request: &CareerInsightsRequest,
    gateway: &CallOrchestrator,
    cache: &TtlCache<Value>,
) -> Result<Value, AppError> {
    require_text("resume_text", &request.resume_text)?;

    let role = non_blank(request.target_role.as_deref());
    let location = non_blank(Some(request.location.as_str())).unwrap_or(DEFAULT_LOCATION);
    let key = insight_cache_key(
        kind,
        role.unwrap_or(ANY_ROLE),
        location,
        &request.resume_text,
    );
    if let Some(cached) = cache.get(&key) {
        info!("Returning cached {}", kind.label());
        return Ok(cached);
    }

    let role_context = role_context(role);
    let preamble = fill_template(
        CAREER_INSIGHTS_PREAMBLE,
        &[
            ("role_context", role_context.as_str()),
            ("resume_text", request.resume_text.as_str()),
        ],
    );
    let task = fill_template(kind.prompt(), &[("location", location)]);
    let prompt = format!("{preamble}\n{task}\n{JSON_ONLY_INSTRUCTION}");

    let call = gateway
        .request(vec![
            ChatMessage::system(format!("{CAREER_INSIGHTS_SYSTEM}{JSON_ONLY_SYSTEM_SUFFIX}")),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(MAX_OUTPUT_TOKENS);

    let reply = gateway.invoke(&call).await?;
    let report: Map<String, Value> = parse_json_reply(&reply)
        .map_err(|e| AppError::Parse(format!("Failed to parse {}: {e}", kind.label())))?;

    let report = Value::Object(report);
    cache.put(&key, report.clone());
    Ok(report)
}
