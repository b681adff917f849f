// Cross-cutting prompt fragments shared by the career endpoints.
// Endpoint-specific templates live in career/prompts.rs.

/// Closing line for every prompt whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Output ONLY valid JSON, no markdown.";

/// Appended to system prompts of JSON-returning endpoints.
pub const JSON_ONLY_SYSTEM_SUFFIX: &str = " Output only valid JSON.";
