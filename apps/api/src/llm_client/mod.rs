//! LLM client: the wire boundary to the hosted inference service.
//!
//! ARCHITECTURAL RULE: handlers never call a `ChatTransport` directly.
//! Every call goes through `gateway::CallOrchestrator`, which owns the
//! timeout, retry and worker-pool policy.
//!
//! The transport only reports what happened on the wire; deciding what is
//! retryable is the orchestrator's job.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Hard ceiling for a single HTTP exchange. The orchestrator's per-attempt
/// timeout is normally much shorter; this only bounds how long an abandoned
/// call can keep a worker slot.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Service(String),

    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of one chat-completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// What came back from a 2xx response. `content` is `None` when the service
/// returned no choices or a null message body.
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One remote chat completion. Implementations must not retry on their own.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, TransportError>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Groq's OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl ChatTransport for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, TransportError> {
        // Connection failures and client-side timeouts are service-side
        // conditions from the caller's point of view.
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Service(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(classify_status(status, message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Service(format!("failed to read response body: {e}")))?;
        let completion = parse_completion(&body)?;

        if let Some(usage) = completion.usage {
            debug!(
                "Inference call finished: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(completion)
    }
}

fn classify_status(status: StatusCode, message: String) -> TransportError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        TransportError::RateLimited(message)
    } else {
        TransportError::Service(format!("status {}: {message}", status.as_u16()))
    }
}

fn parse_completion(body: &str) -> Result<ChatCompletion, TransportError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::Unexpected(format!("malformed completion body: {e}")))?;
    Ok(ChatCompletion {
        content: parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content),
        usage: parsed.usage,
    })
}

/// Deserializes a model reply that was asked to be JSON.
///
/// Tries the reply with markdown fences stripped, then the outermost
/// bracketed slice, starting with whichever of `[` or `{` opens first so an
/// object is not mistaken for one of its own array fields. Returns the first
/// error if nothing parses.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let stripped = strip_json_fences(text);
    let first_err = match serde_json::from_str(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let mut delimiters = [('[', ']'), ('{', '}')];
    delimiters.sort_by_key(|(open, _)| stripped.find(*open).unwrap_or(usize::MAX));
    for (open, close) in delimiters {
        if let Some(slice) = outermost(stripped, open, close) {
            if let Ok(value) = serde_json::from_str(slice) {
                return Ok(value);
            }
        }
    }
    Err(first_err)
}

fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_reply_finds_array_in_prose() {
        let reply = "Here are your questions:\n[{\"q\": 1}, {\"q\": 2}]\nGood luck!";
        let parsed: Vec<Value> = parse_json_reply(reply).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_json_reply_finds_object_in_prose() {
        let reply = "Evaluation follows. {\"score\": 7, \"strengths\": [\"clear\"]} Thanks.";
        let parsed: Value = parse_json_reply(reply).unwrap();
        assert_eq!(parsed["score"], 7);
        assert_eq!(parsed["strengths"][0], "clear");
    }

    #[test]
    fn test_parse_json_reply_array_of_objects_in_prose() {
        let reply = "Sure: [{\"tips\": [\"a\"]}, {\"tips\": []}] done";
        let parsed: Value = parse_json_reply(reply).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_json_reply_falls_back_to_later_bracket() {
        // "[1-10]" opens first but is not JSON.
        #[derive(Debug, Deserialize)]
        struct Scored {
            score: u8,
        }
        let reply = "Rated on scale [1-10]: {\"score\": 8}";
        let parsed: Scored = parse_json_reply(reply).unwrap();
        assert_eq!(parsed.score, 8);
    }

    #[test]
    fn test_parse_json_reply_rejects_non_json() {
        let result: Result<Value, _> = parse_json_reply("I cannot help with that.");
        assert!(result.is_err());
    }

    #[test]
    fn test_classify_429_as_rate_limited() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
        assert!(matches!(err, TransportError::RateLimited(ref m) if m == "slow down"));
    }

    #[test]
    fn test_classify_5xx_and_4xx_as_service() {
        let err = classify_status(StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert!(matches!(err, TransportError::Service(ref m) if m.contains("502")));

        let err = classify_status(StatusCode::UNAUTHORIZED, "bad key".to_string());
        assert!(matches!(err, TransportError::Service(_)));
    }

    #[test]
    fn test_parse_completion_reads_first_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("Hello"));
        assert_eq!(completion.usage.map(|u| u.completion_tokens), Some(3));
    }

    #[test]
    fn test_parse_completion_without_choices_has_no_content() {
        let completion = parse_completion(r#"{"choices": []}"#).unwrap();
        assert!(completion.content.is_none());

        let completion =
            parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(completion.content.is_none());
    }

    #[test]
    fn test_parse_completion_malformed_body_is_unexpected() {
        let err = parse_completion("<html>gateway error</html>").unwrap_err();
        assert!(matches!(err, TransportError::Unexpected(_)));
    }

    #[test]
    fn test_chat_request_serializes_lowercase_roles() {
        let request = ChatRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 100);
    }
}
