//! Cover letter generation. Uncached: every letter is written fresh.

use serde::{Deserialize, Serialize};

use crate::career::prompts::{fill_template, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM};
use crate::career::{non_blank, require_text, GENERATION_TEMPERATURE};
use crate::errors::AppError;
use crate::gateway::CallOrchestrator;
use crate::llm_client::ChatMessage;

const MAX_OUTPUT_TOKENS: u32 = 1500;

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_text: String,
    pub job_title: String,
    pub company_name: String,
    pub job_description: Option<String>,
    #[serde(default = "default_tone")]
    pub tone: String,
    pub additional_info: Option<String>,
}

fn default_tone() -> String {
    "professional".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

/// Maps the requested tone to the phrase used in the prompt.
/// Unknown tones fall back to the professional register.
pub fn tone_description(tone: &str) -> &'static str {
    match tone.trim().to_ascii_lowercase().as_str() {
        "enthusiastic" => "enthusiastic and energetic",
        "confident" => "confident and assertive",
        "creative" => "creative and unique",
        "formal" => "very formal and traditional",
        _ => "formal and professional",
    }
}

pub async fn generate_cover_letter(
    request: &CoverLetterRequest,
    gateway: &CallOrchestrator,
) -> Result<CoverLetterResponse, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_title", &request.job_title)?;
    require_text("company_name", &request.company_name)?;

    let job_description_section = non_blank(request.job_description.as_deref())
        .map(|jd| format!("\n\n**JOB DESCRIPTION:**\n{jd}"))
        .unwrap_or_default();
    let additional_section = non_blank(request.additional_info.as_deref())
        .map(|info| format!("\n\n**ADDITIONAL POINTS TO MENTION:**\n{info}"))
        .unwrap_or_default();

    let prompt = fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("job_title", request.job_title.as_str()),
            ("company_name", request.company_name.as_str()),
            ("tone", tone_description(&request.tone)),
            ("job_description_section", job_description_section.as_str()),
            ("additional_section", additional_section.as_str()),
            ("resume_text", request.resume_text.as_str()),
        ],
    );

    let call = gateway
        .request(vec![
            ChatMessage::system(COVER_LETTER_SYSTEM),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(MAX_OUTPUT_TOKENS);

    let cover_letter = gateway.invoke(&call).await?;
    Ok(CoverLetterResponse { cover_letter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::orchestrator::tests::{test_config, ScriptedTransport, Step};

    #[test]
    fn test_tone_description_known_tones() {
        assert_eq!(tone_description("enthusiastic"), "enthusiastic and energetic");
        assert_eq!(tone_description("Formal"), "very formal and traditional");
    }

    #[test]
    fn test_tone_description_unknown_falls_back() {
        assert_eq!(tone_description("sarcastic"), "formal and professional");
        assert_eq!(tone_description("professional"), "formal and professional");
    }

    #[test]
    fn test_tone_defaults_to_professional() {
        let request: CoverLetterRequest = serde_json::from_str(
            r#"{"resume_text": "r", "job_title": "SRE", "company_name": "Acme"}"#,
        )
        .unwrap();
        assert_eq!(request.tone, "professional");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generates_letter_uncached() {
        let transport = ScriptedTransport::new(vec![Step::Reply("Dear Hiring Manager, ...")]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 2));
        let request = CoverLetterRequest {
            resume_text: "Jane Doe".to_string(),
            job_title: "SRE".to_string(),
            company_name: "Acme".to_string(),
            job_description: None,
            tone: default_tone(),
            additional_info: Some("Relocating to Berlin".to_string()),
        };

        let first = generate_cover_letter(&request, &gateway).await.unwrap();
        generate_cover_letter(&request, &gateway).await.unwrap();

        assert_eq!(first.cover_letter, "Dear Hiring Manager, ...");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_company_is_rejected() {
        let transport = ScriptedTransport::new(vec![Step::Reply("unused")]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 2));
        let request = CoverLetterRequest {
            resume_text: "Jane Doe".to_string(),
            job_title: "SRE".to_string(),
            company_name: " ".to_string(),
            job_description: None,
            tone: default_tone(),
            additional_info: None,
        };

        let err = generate_cover_letter(&request, &gateway).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("company_name")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_fields_are_not_expanded_as_placeholders() {
        let transport = ScriptedTransport::new(vec![Step::Reply("Dear team")]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 2));
        let request = CoverLetterRequest {
            resume_text: "SECRET_RESUME_BODY".to_string(),
            job_title: "{resume_text}".to_string(),
            company_name: "{tone}".to_string(),
            job_description: Some("{additional_section}".to_string()),
            tone: "confident".to_string(),
            additional_info: Some("{company_name}".to_string()),
        };

        generate_cover_letter(&request, &gateway).await.unwrap();

        let prompt = transport.last_user_prompt();
        assert_eq!(prompt.matches("SECRET_RESUME_BODY").count(), 1);
        assert!(prompt.contains("**TARGET POSITION:** {resume_text} at {tone}"));
        assert!(prompt.contains("**JOB DESCRIPTION:**\n{additional_section}"));
        assert!(prompt.contains("**ADDITIONAL POINTS TO MENTION:**\n{company_name}"));
        assert_eq!(prompt.matches("confident and assertive").count(), 2);
    }
}
