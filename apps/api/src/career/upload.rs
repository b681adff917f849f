//! Resume upload: plain text out of a `.pdf` or `.txt` file.

use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct UploadResumeResponse {
    pub resume_text: String,
    pub filename: String,
}

/// Extracts resume text based on the file extension.
pub fn extract_resume_text(filename: &str, content: &[u8]) -> Result<String, AppError> {
    let lower = filename.to_ascii_lowercase();
    let text = if lower.ends_with(".pdf") {
        pdf_extract::extract_text_from_mem(content)
            .map_err(|e| AppError::Validation(format!("Error reading PDF: {e}")))?
    } else if lower.ends_with(".txt") {
        String::from_utf8(content.to_vec())
            .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))?
    } else {
        return Err(AppError::Validation(
            "Unsupported file type. Please upload PDF or TXT".to_string(),
        ));
    };

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "File is empty or contains no text".to_string(),
        ));
    }
    Ok(text)
}

/// Runs an extraction job on the blocking pool. pdf-extract panics on some
/// malformed files; a panicked job is reported as an unreadable upload.
pub async fn run_extraction<F>(job: F) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            warn!("Resume text extraction panicked");
            Err(AppError::Validation(
                "Error reading PDF: the file could not be parsed".to_string(),
            ))
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Text extraction task failed: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_is_returned_verbatim() {
        let text = extract_resume_text("resume.TXT", b"Jane Doe\nEngineer").unwrap();
        assert_eq!(text, "Jane Doe\nEngineer");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = extract_resume_text("resume.docx", b"PK...").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("Unsupported")));
    }

    #[test]
    fn test_blank_txt_rejected() {
        let err = extract_resume_text("resume.txt", b"  \n\t").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("no text")));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = extract_resume_text("resume.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_panicking_extraction_is_a_validation_error() {
        let err = run_extraction(|| -> Result<String, AppError> { panic!("invalid xref table") })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Error reading PDF")));
    }

    #[tokio::test]
    async fn test_extraction_result_passes_through() {
        let text = run_extraction(|| extract_resume_text("cv.txt", b"Jane Doe"))
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe");
    }
}
