//! Interview prep: generated question sets (cached) and answer evaluation.
//!
//! Both endpoints ask the model for JSON and parse the reply with
//! `llm_client::parse_json_reply`, which tolerates code fences and prose
//! around the payload.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{truncate_chars, TtlCache};
use crate::career::prompts::{
    fill_template, EVALUATE_ANSWER_PROMPT_TEMPLATE, EVALUATE_ANSWER_SYSTEM,
    INTERVIEW_QUESTIONS_PROMPT_TEMPLATE, INTERVIEW_QUESTIONS_SYSTEM,
};
use crate::career::{
    non_blank, require_text, role_context, GENERATION_TEMPERATURE, RESUME_KEY_CHARS,
};
use crate::errors::AppError;
use crate::gateway::CallOrchestrator;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, JSON_ONLY_SYSTEM_SUFFIX};
use crate::llm_client::{parse_json_reply, ChatMessage};

const DEFAULT_ROLE: &str = "general";
const QUESTIONS_MAX_OUTPUT_TOKENS: u32 = 2000;
const EVALUATION_MAX_OUTPUT_TOKENS: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub resume_text: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionsResponse {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAnswerRequest {
    pub question: String,
    pub answer: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: f32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub sample_answer: String,
}

pub fn interview_cache_key(role: &str, resume_text: &str) -> String {
    format!(
        "interview_questions:{role}:{}",
        truncate_chars(resume_text, RESUME_KEY_CHARS)
    )
}

pub async fn generate_interview_questions(
    request: &InterviewQuestionsRequest,
    gateway: &CallOrchestrator,
    cache: &TtlCache<InterviewQuestionsResponse>,
) -> Result<InterviewQuestionsResponse, AppError> {
    require_text("resume_text", &request.resume_text)?;

    let role = non_blank(request.target_role.as_deref()).unwrap_or(DEFAULT_ROLE);
    let key = interview_cache_key(role, &request.resume_text);
    if let Some(cached) = cache.get(&key) {
        info!("Returning cached interview questions");
        return Ok(cached);
    }

    let prompt = format!(
        "{}\n{JSON_ONLY_INSTRUCTION}",
        fill_template(
            INTERVIEW_QUESTIONS_PROMPT_TEMPLATE,
            &[("role", role), ("resume_text", request.resume_text.as_str())],
        )
    );
    let call = gateway
        .request(vec![
            ChatMessage::system(format!(
                "{INTERVIEW_QUESTIONS_SYSTEM}{JSON_ONLY_SYSTEM_SUFFIX}"
            )),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(QUESTIONS_MAX_OUTPUT_TOKENS);

    let reply = gateway.invoke(&call).await?;
    let questions: Vec<InterviewQuestion> = parse_json_reply(&reply).map_err(|e| {
        AppError::Parse(format!("Failed to parse interview questions: {e}"))
    })?;

    let response = InterviewQuestionsResponse { questions };
    cache.put(&key, response.clone());
    Ok(response)
}

pub async fn evaluate_answer(
    request: &EvaluateAnswerRequest,
    gateway: &CallOrchestrator,
) -> Result<AnswerEvaluation, AppError> {
    require_text("question", &request.question)?;
    require_text("answer", &request.answer)?;

    let role_context = role_context(request.target_role.as_deref());
    let prompt = format!(
        "{}\n{JSON_ONLY_INSTRUCTION}",
        fill_template(
            EVALUATE_ANSWER_PROMPT_TEMPLATE,
            &[
                ("role_context", role_context.as_str()),
                ("question", request.question.as_str()),
                ("answer", request.answer.as_str()),
            ],
        )
    );
    let call = gateway
        .request(vec![
            ChatMessage::system(format!("{EVALUATE_ANSWER_SYSTEM}{JSON_ONLY_SYSTEM_SUFFIX}")),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(EVALUATION_MAX_OUTPUT_TOKENS);

    let reply = gateway.invoke(&call).await?;
    parse_json_reply(&reply).map_err(|e| AppError::Parse(format!("Failed to parse evaluation: {e}")))
}
