//! Resume ingestion: uploaded file bytes to plain resume text.
//!
//! Supports `.txt` (UTF-8, lossy) and `.pdf` (text layer via `pdf-extract`).
//! Unknown extensions are treated as text.

use axum::body::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;

const PDF_UNREADABLE: &str = "could not extract text from the PDF resume";

/// Extracts plain text from an uploaded resume file.
pub async fn extract_resume_text(filename: Option<&str>, bytes: Bytes) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded resume is empty".into()));
    }

    let is_pdf = filename
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
        || bytes.starts_with(b"%PDF");

    let text = if is_pdf {
        extract_pdf_text(bytes).await?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation(
            "no text could be extracted from the resume".into(),
        ));
    }

    info!(
        "Extracted {} characters from resume {}",
        text.chars().count(),
        filename.unwrap_or("<unnamed>")
    );
    Ok(text)
}

/// PDF parsing is CPU-bound and can panic on malformed fonts or streams,
/// so it runs on the blocking pool. A panic there is an unreadable upload.
async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let joined = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
    .await;

    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            Err(AppError::Validation(PDF_UNREADABLE.into()))
        }
        Err(e) if e.is_panic() => {
            warn!("PDF text extraction panicked on malformed input");
            Err(AppError::Validation(PDF_UNREADABLE.into()))
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "PDF extraction task failed: {e}"
        ))),
    }
}
