//! Application Assembler: pure construction of a queue record.

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::TailoredApplication;
use crate::models::job::JobPosting;

/// Combines a posting with its generated resume and message.
///
/// Fails with `IncompleteApplication` when any required field is blank.
pub fn assemble(
    job: &JobPosting,
    tailored_resume: String,
    message: String,
) -> Result<TailoredApplication, AppError> {
    let missing: Vec<&str> = [
        ("job link", job.link.as_str()),
        ("job title", job.title.as_str()),
        ("tailored resume", tailored_resume.as_str()),
        ("message", message.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::IncompleteApplication(format!(
            "missing {}",
            missing.join(", ")
        )));
    }

    Ok(TailoredApplication {
        id: Uuid::new_v4(),
        job: job.clone(),
        tailored_resume_md: tailored_resume.trim().to_string(),
        email_body: message.trim().to_string(),
        source_system: job.source.clone(),
        target_email: None,
        created_at: Utc::now(),
    })
}
