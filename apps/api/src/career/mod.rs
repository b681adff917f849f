// Career endpoints: resume analysis, cover letters, interview prep, section rewrites.
// Every inference call goes through gateway::CallOrchestrator; cached endpoints
// consult their TtlCache first and only store successful results.

pub mod analysis;
pub mod cover_letter;
pub mod enhance;
pub mod handlers;
pub mod insights;
pub mod interview;
pub mod prompts;
pub mod upload;

use crate::errors::AppError;

/// Characters of resume text that go into a logical cache key.
pub const RESUME_KEY_CHARS: usize = 500;

/// Sampling temperature for every career generation call.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Rejects a missing or whitespace-only text field.
pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// The trimmed value when present and non-blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `" for a {role} position"`, or nothing when no role was given.
pub fn role_context(target_role: Option<&str>) -> String {
    non_blank(target_role)
        .map(|role| format!(" for a {role} position"))
        .unwrap_or_default()
}
