//! Axum route handlers for the career endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;

use crate::career::analysis::{analyze_resume, AnalyzeResumeRequest, AnalyzeResumeResponse};
use crate::career::cover_letter::{generate_cover_letter, CoverLetterRequest, CoverLetterResponse};
use crate::career::enhance::{enhance_section, EnhanceSectionRequest, EnhanceSectionResponse};
use crate::career::insights::{career_insight, CareerInsightsRequest, InsightKind};
use crate::career::interview::{
    evaluate_answer, generate_interview_questions, AnswerEvaluation, EvaluateAnswerRequest,
    InterviewQuestionsRequest, InterviewQuestionsResponse,
};
use crate::career::upload::{extract_resume_text, run_extraction, UploadResumeResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /upload-resume
///
/// Multipart form with a single `file` field (.pdf or .txt).
pub async fn handle_upload_resume(
    mut multipart: Multipart,
) -> Result<Json<UploadResumeResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        // PDF parsing is CPU-bound; keep it off the request workers.
        let name = filename.clone();
        let resume_text = run_extraction(move || extract_resume_text(&name, &content)).await?;
        return Ok(Json(UploadResumeResponse {
            resume_text,
            filename,
        }));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

/// POST /analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeResumeRequest>,
) -> Result<Json<AnalyzeResumeResponse>, AppError> {
    let response = analyze_resume(&request, &state.gateway, &state.analysis_cache).await?;
    Ok(Json(response))
}

/// POST /generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    Ok(Json(generate_cover_letter(&request, &state.gateway).await?))
}

/// POST /interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(request): Json<InterviewQuestionsRequest>,
) -> Result<Json<InterviewQuestionsResponse>, AppError> {
    let response =
        generate_interview_questions(&request, &state.gateway, &state.interview_cache).await?;
    Ok(Json(response))
}

/// POST /evaluate-answer
pub async fn handle_evaluate_answer(
    State(state): State<AppState>,
    Json(request): Json<EvaluateAnswerRequest>,
) -> Result<Json<AnswerEvaluation>, AppError> {
    Ok(Json(evaluate_answer(&request, &state.gateway).await?))
}

/// POST /enhance-resume-section
pub async fn handle_enhance_section(
    State(state): State<AppState>,
    Json(request): Json<EnhanceSectionRequest>,
) -> Result<Json<EnhanceSectionResponse>, AppError> {
    Ok(Json(enhance_section(&request, &state.gateway).await?))
}

async fn insight(
    kind: InsightKind,
    state: &AppState,
    request: &CareerInsightsRequest,
) -> Result<Json<Value>, AppError> {
    let report = career_insight(kind, request, &state.gateway, &state.insights_cache).await?;
    Ok(Json(report))
}

/// POST /career-insights/paths
pub async fn handle_career_paths(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::CareerPaths, &state, &request).await
}

/// POST /career-insights/skill-gaps
pub async fn handle_skill_gaps(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::SkillGaps, &state, &request).await
}

/// POST /career-insights/salary
///
/// Accepts an optional `location` (default "United States").
pub async fn handle_salary_insights(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::Salary, &state, &request).await
}

/// POST /career-insights/interview-prep
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::InterviewPrep, &state, &request).await
}

/// POST /career-insights/learning
pub async fn handle_learning(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::Learning, &state, &request).await
}

/// POST /career-insights/industry
pub async fn handle_industry_insights(
    State(state): State<AppState>,
    Json(request): Json<CareerInsightsRequest>,
) -> Result<Json<Value>, AppError> {
    insight(InsightKind::Industry, &state, &request).await
}
