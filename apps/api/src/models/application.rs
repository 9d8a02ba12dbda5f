use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::JobPosting;

/// A posting together with the resume and message generated for it.
/// Built only by the assembler; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredApplication {
    pub id: Uuid,
    pub job: JobPosting,
    pub tailored_resume_md: String,
    pub email_body: String,
    pub source_system: String,
    /// Hook for downstream senders; nothing in this service fills it.
    pub target_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Flat record written by the export, one per queued application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: Uuid,
    pub job_link: String,
    pub job_title: String,
    pub company: String,
    pub email_body: String,
    pub tailored_resume_md: String,
    pub source_system: String,
    pub target_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&TailoredApplication> for ExportRecord {
    fn from(app: &TailoredApplication) -> Self {
        Self {
            id: app.id,
            job_link: app.job.link.clone(),
            job_title: app.job.title.clone(),
            company: app.job.company.clone(),
            email_body: app.email_body.clone(),
            tailored_resume_md: app.tailored_resume_md.clone(),
            source_system: app.source_system.clone(),
            target_email: app.target_email.clone(),
            created_at: app.created_at,
        }
    }
}

/// Append-only, insertion-ordered queue of prepared applications.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ApplicationQueue {
    entries: Vec<TailoredApplication>,
}

impl ApplicationQueue {
    pub fn push(&mut self, app: TailoredApplication) {
        self.entries.push(app);
    }

    pub fn entries(&self) -> &[TailoredApplication] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.entries.iter().map(ExportRecord::from).collect()
    }

    /// Serializes the queue as a pretty JSON array of [`ExportRecord`].
    pub fn export_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(&self.export_records())
    }
}

/// A posting whose tailoring failed during a batch. Reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailorFailure {
    pub link: String,
    pub title: String,
    pub code: String,
    pub message: String,
}
