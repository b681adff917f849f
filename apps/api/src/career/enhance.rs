//! Resume section rewrites.

use serde::{Deserialize, Serialize};

use crate::career::prompts::{
    fill_template, ENHANCE_SECTION_PROMPT_TEMPLATE, ENHANCE_SECTION_SYSTEM,
};
use crate::career::{require_text, role_context, GENERATION_TEMPERATURE};
use crate::errors::AppError;
use crate::gateway::CallOrchestrator;
use crate::llm_client::ChatMessage;

const MAX_OUTPUT_TOKENS: u32 = 1500;

#[derive(Debug, Deserialize)]
pub struct EnhanceSectionRequest {
    pub section_type: String,
    pub content: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhanceSectionResponse {
    pub enhanced_content: String,
}

pub fn section_guidance(section_type: &str) -> &'static str {
    match section_type.trim().to_ascii_lowercase().as_str() {
        "summary" => "Write a compelling 2-3 sentence professional summary highlighting key achievements and career goals",
        "experience" => "Use action verbs, specific metrics and quantifiable achievements. Use bullet points.",
        "skills" => "Group skills by category, put the most relevant first, add proficiency levels where useful",
        "education" => "Highlight relevant coursework, honors, GPA if strong, and relevant projects",
        "projects" => "Emphasize technologies used, your specific role and measurable impact",
        "achievements" => "Focus on quantifiable results and recognition",
        "certifications" => "List with dates, issuing organizations and relevance",
        _ => "Improve clarity, impact and professionalism",
    }
}

pub async fn enhance_section(
    request: &EnhanceSectionRequest,
    gateway: &CallOrchestrator,
) -> Result<EnhanceSectionResponse, AppError> {
    require_text("section_type", &request.section_type)?;
    require_text("content", &request.content)?;

    let role_context = role_context(request.target_role.as_deref());
    let prompt = fill_template(
        ENHANCE_SECTION_PROMPT_TEMPLATE,
        &[
            ("section_type", request.section_type.trim()),
            ("role_context", role_context.as_str()),
            ("guidance", section_guidance(&request.section_type)),
            ("content", request.content.as_str()),
        ],
    );

    let call = gateway
        .request(vec![
            ChatMessage::system(ENHANCE_SECTION_SYSTEM),
            ChatMessage::user(prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_output_tokens(MAX_OUTPUT_TOKENS);

    let enhanced_content = gateway.invoke(&call).await?;
    Ok(EnhanceSectionResponse { enhanced_content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::orchestrator::tests::{test_config, ScriptedTransport, Step};
    use crate::gateway::failure::FailureKind;

    #[test]
    fn test_section_guidance_known_and_unknown() {
        assert!(section_guidance("Experience").contains("action verbs"));
        assert!(section_guidance("skills").contains("category"));
        assert_eq!(
            section_guidance("hobbies"),
            "Improve clarity, impact and professionalism"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_then_enhanced() {
        let transport = ScriptedTransport::new(vec![
            Step::RateLimited,
            Step::Reply("- Cut p99 latency 40% by ..."),
        ]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 2));
        let request = EnhanceSectionRequest {
            section_type: "experience".to_string(),
            content: "- Made the service faster".to_string(),
            target_role: Some("SRE".to_string()),
        };

        let response = enhance_section(&request, &gateway).await.unwrap();
        assert!(response.enhanced_content.starts_with("- Cut p99"));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_failure() {
        let transport = ScriptedTransport::new(vec![Step::ServiceError]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 1));
        let request = EnhanceSectionRequest {
            section_type: "summary".to_string(),
            content: "Engineer.".to_string(),
            target_role: None,
        };

        let err = enhance_section(&request, &gateway).await.unwrap_err();
        assert!(matches!(err, AppError::Inference(ref f) if f.kind == FailureKind::ServiceError));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_content_is_not_expanded_as_placeholder() {
        let transport = ScriptedTransport::new(vec![Step::Reply("Better summary.")]);
        let gateway = CallOrchestrator::new(transport.clone(), test_config(5, 2));
        let request = EnhanceSectionRequest {
            section_type: "{content}".to_string(),
            content: "Built {guidance} and {role_context}".to_string(),
            target_role: Some("{section_type}".to_string()),
        };

        enhance_section(&request, &gateway).await.unwrap();

        let prompt = transport.last_user_prompt();
        assert!(prompt.starts_with(
            "Improve this resume {content} section for a {section_type} position."
        ));
        assert!(prompt.contains("**ORIGINAL CONTENT:**\nBuilt {guidance} and {role_context}"));
        assert_eq!(prompt.matches("Improve clarity, impact and professionalism").count(), 1);
    }
}
