// Prompt constants for the career endpoints.
// Templates use `{placeholder}` markers filled by `fill_template` before sending.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Substitutes `{name}` markers in one left-to-right pass.
///
/// Substituted values are copied verbatim and never rescanned, so user text
/// that happens to contain `{resume_text}` stays literal. Braces that do not
/// wrap a known name (the JSON examples in the templates) pass through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub const RESUME_ANALYSIS_SYSTEM: &str =
    "You are an expert resume reviewer with years of experience in HR and recruitment.";

/// Placeholders: `{job_role}` and `{resume_text}`.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a senior resume reviewer and career consultant with deep talent-acquisition experience.
Review the resume below and give thorough, actionable feedback for {job_role}.

Structure the answer with these sections:

1. **OVERALL IMPRESSION** (1-2 sentences)
2. **STRENGTHS** - what already works, standout achievements
3. **AREAS FOR IMPROVEMENT** - content gaps, formatting problems, missing information
4. **SPECIFIC RECOMMENDATIONS** - concrete fixes, advice specific to {job_role}, keywords and skills worth adding
5. **ACTION ITEMS** - prioritised (High/Medium/Low), including quick wins
6. **FINAL SCORE** - 1-10 with a short justification

**RESUME CONTENT:**
{resume_text}

**INSTRUCTIONS:**
- Be honest but constructive
- Quote the resume when pointing out a problem
- Consider ATS (Applicant Tracking System) compatibility
- Keep the focus on {job_role}
- Suggest metrics, action verbs and formatting changes
- Keep every point actionable and prioritised
"#;

pub const COVER_LETTER_SYSTEM: &str =
    "You are an expert career coach and professional writer specializing in compelling cover letters.";

/// Placeholders: `{job_title}`, `{company_name}`, `{tone}`, `{job_description_section}`,
/// `{additional_section}` and `{resume_text}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a compelling cover letter for the position below.

**TARGET POSITION:** {job_title} at {company_name}
**TONE:** {tone}{job_description_section}{additional_section}

**RESUME:**
{resume_text}

**INSTRUCTIONS:**
1. Write a personalised cover letter of 3-4 paragraphs
2. Draw on the most relevant experience in the resume
3. Show genuine interest in this company and role
4. Include concrete achievements, with metrics where possible
5. Keep the tone {tone}
6. Be concise but impactful
7. Do NOT leave placeholder brackets; write complete sentences

Output ONLY the cover letter text, ready to send."#;

pub const INTERVIEW_QUESTIONS_SYSTEM: &str =
    "You are an experienced hiring manager and interview coach.";

/// Placeholders: `{resume_text}` and `{role}`.
pub const INTERVIEW_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Based on this resume, write 10 realistic interview questions this candidate is likely to be asked.

**RESUME:**
{resume_text}

**TARGET ROLE:** {role}

For each question give:
1. The question
2. Category (Technical, Behavioral, Situational, Experience, Culture Fit)
3. Difficulty (Easy, Medium, Hard)
4. 2-3 tips for answering well

Return a JSON array:
[
  {
    "question": "...",
    "category": "...",
    "difficulty": "...",
    "tips": ["...", "..."]
  }
]

Mix behavioral questions (STAR method), technical questions drawn from the listed skills,
role-specific questions and common questions about their experience.
"#;

pub const EVALUATE_ANSWER_SYSTEM: &str =
    "You are an experienced interviewer providing constructive feedback.";

/// Placeholders: `{role_context}`, `{question}` and `{answer}`.
pub const EVALUATE_ANSWER_PROMPT_TEMPLATE: &str = r#"Evaluate this interview answer{role_context}.

**QUESTION:** {question}

**CANDIDATE'S ANSWER:** {answer}

Return the evaluation as JSON:
{
  "score": <1-10>,
  "strengths": ["...", "..."],
  "improvements": ["...", "..."],
  "sample_answer": "A strong sample answer for comparison..."
}

Be constructive and specific.
"#;

pub const ENHANCE_SECTION_SYSTEM: &str =
    "You are an expert resume writer. Enhance content to be more impactful and professional.";

/// Placeholders: `{section_type}`, `{role_context}`, `{content}` and `{guidance}`.
pub const ENHANCE_SECTION_PROMPT_TEMPLATE: &str = r#"Improve this resume {section_type} section{role_context}.

**ORIGINAL CONTENT:**
{content}

**GUIDELINES:**
{guidance}

**INSTRUCTIONS:**
1. Improve wording and structure
2. Add metrics and specifics where possible
3. Use strong action verbs
4. Keep it ATS-friendly
5. Keep the same facts, just make them land harder

Output ONLY the improved content, ready to paste into a resume. No explanations or labels."#;

pub const CAREER_INSIGHTS_SYSTEM: &str =
    "You are a senior career strategist who knows hiring markets, compensation and skills trends.";

/// Shared header for every insight prompt.
/// Placeholders: `{role_context}` and `{resume_text}`.
pub const CAREER_INSIGHTS_PREAMBLE: &str = r#"Study this candidate's resume{role_context}.

**RESUME:**
{resume_text}
"#;

pub const CAREER_PATHS_PROMPT: &str = r#"Map out realistic career paths for this candidate. Return a JSON object:
{
  "current_level": "Junior | Mid | Senior | Lead | Principal",
  "strengths_for_growth": ["..."],
  "growth_areas": ["..."],
  "career_paths": [
    {"title": "...", "description": "...", "timeline": "...", "required_steps": ["..."]}
  ]
}"#;

pub const SKILL_GAPS_PROMPT: &str = r#"Compare the candidate's skills against what the target role demands. Return a JSON object:
{
  "match_percentage": <0-100>,
  "current_skills": {"technical": ["..."], "soft": ["..."]},
  "required_skills": {"technical": ["..."], "soft": ["..."]},
  "skill_gaps": [
    {"skill": "...", "priority": "High | Medium | Low", "importance": "...", "how_to_acquire": "..."}
  ]
}"#;

/// Placeholders: `{location}`.
pub const SALARY_PROMPT: &str = r#"Estimate compensation for this candidate in {location}, in USD per year. Return a JSON object:
{
  "estimated_current_value": {"low": 0, "mid": 0, "high": 0},
  "market_rate": {
    "entry_level": {"low": 0, "high": 0},
    "mid_level": {"low": 0, "high": 0},
    "senior_level": {"low": 0, "high": 0},
    "lead_level": {"low": 0, "high": 0}
  },
  "factors_affecting_salary": [{"factor": "...", "impact": "...", "details": "..."}],
  "negotiation_tips": ["..."]
}"#;

pub const INTERVIEW_PREP_PROMPT: &str = r#"Prepare this candidate for interviews. Return a JSON object:
{
  "likely_questions": [
    {"question": "...", "category": "...", "suggested_approach": "...", "resume_points_to_highlight": ["..."]}
  ],
  "stories_to_prepare": [{"situation": "...", "applicable_questions": ["..."]}],
  "technical_topics_to_review": ["..."],
  "questions_to_ask_interviewer": ["..."],
  "red_flags_to_address": [{"concern": "...", "how_to_address": "..."}]
}"#;

pub const LEARNING_PROMPT: &str = r#"Recommend a learning plan that closes this candidate's gaps. Return a JSON object:
{
  "courses": [
    {"title": "...", "platform": "...", "skill_covered": "...", "estimated_duration": "...", "priority": "..."}
  ],
  "certifications": [
    {"name": "...", "provider": "...", "value": "...", "difficulty": "...", "estimated_prep_time": "..."}
  ],
  "books": [{"title": "...", "author": "...", "why_recommended": "..."}],
  "projects_to_build": [{"project": "...", "skills_demonstrated": ["..."], "portfolio_value": "..."}],
  "communities_to_join": ["..."]
}"#;

pub const INDUSTRY_PROMPT: &str = r#"Describe the industries and market this candidate competes in. Return a JSON object:
{
  "relevant_industries": ["..."],
  "market_outlook": {"demand": "...", "competition": "...", "summary": "..."},
  "industry_trends": [{"trend": "...", "impact": "...", "opportunity": "..."}],
  "emerging_roles": [{"role": "...", "description": "...", "fit_score": "..."}],
  "companies_to_target": [{"name": "...", "reason": "..."}]
}"#;
