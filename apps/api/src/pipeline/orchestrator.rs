//! Session Pipeline: scan → dedupe → (optional) auto-tailor → queue.
//!
//! State machine per session:
//!   Idle --scan--> Scanning --after_scan--> AutoTailoring | Idle
//!   AutoTailoring --batch done--> Idle
//!
//! The auto-prepare branch is the `after_scan` guard. Batch tailoring is
//! sequential in feed order; one posting's failure is recorded and skipped.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{TailorFailure, TailoredApplication};
use crate::models::job::{normalize_link, JobPosting};
use crate::models::session::SessionState;
use crate::pipeline::session::Session;
use crate::search::client::JobSource;
use crate::tailoring::tailor::ResumeTailor;

/// Outcome of one auto-tailoring batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// Ids of the applications appended to the queue, in queue order.
    pub prepared: Vec<Uuid>,
    pub failures: Vec<TailorFailure>,
}

/// What a scan did, returned to the caller for display.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Postings the search returned after filtering.
    pub returned: usize,
    /// Postings not seen before, now appended to the feed.
    pub new_postings: Vec<JobPosting>,
    /// Present only when the scan transitioned into auto-tailoring.
    pub auto_tailor: Option<BatchOutcome>,
    /// Set when auto-prepare is on but could not run.
    pub notice: Option<String>,
}

/// Transition guard out of `Scanning`.
pub fn after_scan(auto_prepare: bool, has_resume: bool, new_count: usize) -> SessionState {
    if auto_prepare && has_resume && new_count > 0 {
        SessionState::AutoTailoring
    } else {
        SessionState::Idle
    }
}

/// The orchestrator. Cheap to clone; the provider clients sit behind `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    job_source: Arc<dyn JobSource>,
    tailor: Arc<dyn ResumeTailor>,
}

impl Pipeline {
    pub fn new(job_source: Arc<dyn JobSource>, tailor: Arc<dyn ResumeTailor>) -> Self {
        Self { job_source, tailor }
    }

    /// Runs one scan. Search errors surface to the caller and leave the
    /// feed, seen-set and queue untouched.
    pub async fn scan(
        &self,
        session: &mut Session,
        extra_query: &str,
    ) -> Result<ScanReport, AppError> {
        session.state = SessionState::Scanning;

        let postings = match self.job_source.search(&session.config, extra_query).await {
            Ok(postings) => postings,
            Err(e) => {
                session.state = SessionState::Idle;
                warn!("Scan failed for session {}: {e}", session.id);
                return Err(e);
            }
        };

        let returned = postings.len();
        let new_postings = session.merge_new(postings);
        session.last_scan = Some(Utc::now());

        info!(
            "Scan for session {}: {} returned, {} new",
            session.id,
            returned,
            new_postings.len()
        );

        let has_resume = session.resume.is_some();
        let next = after_scan(session.config.auto_prepare, has_resume, new_postings.len());
        session.state = next;

        let notice = (session.config.auto_prepare && !has_resume && !new_postings.is_empty())
            .then(|| "auto-prepare skipped: no resume uploaded".to_string());

        let auto_tailor = if next == SessionState::AutoTailoring {
            Some(self.auto_tailor(session, &new_postings).await)
        } else {
            None
        };

        session.state = SessionState::Idle;

        Ok(ScanReport {
            returned,
            new_postings,
            auto_tailor,
            notice,
        })
    }

    async fn auto_tailor(&self, session: &mut Session, batch: &[JobPosting]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let Some(resume) = session.resume.clone() else {
            return outcome;
        };

        for job in batch {
            match self.tailor.tailor(&resume, job, &session.config).await {
                Ok(app) => {
                    outcome.prepared.push(app.id);
                    session.queue.push(app);
                }
                Err(e) => {
                    warn!("Auto-tailoring failed for {}: {e}", job.link);
                    let failure = TailorFailure {
                        link: job.link.clone(),
                        title: job.title.clone(),
                        code: e.code().to_string(),
                        message: e.to_string(),
                    };
                    session.failures.push(failure.clone());
                    outcome.failures.push(failure);
                }
            }
        }

        info!(
            "Auto-tailoring for session {}: {} prepared, {} failed",
            session.id,
            outcome.prepared.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// Manually tailors one posting from the feed. Errors surface directly;
    /// re-tailoring an already queued posting appends another record.
    pub async fn tailor_one(
        &self,
        session: &mut Session,
        link: &str,
    ) -> Result<TailoredApplication, AppError> {
        let link = normalize_link(link)
            .ok_or_else(|| AppError::Validation(format!("'{link}' is not a usable job link")))?;
        let job = session
            .find_in_feed(&link)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("posting {link} is not in the feed")))?;
        let resume = session
            .resume
            .clone()
            .ok_or_else(|| AppError::Validation("upload a base resume before tailoring".into()))?;

        let app = self.tailor.tailor(&resume, &job, &session.config).await?;
        session.queue.push(app.clone());

        info!(
            "Tailored {} @ {} for session {} (queue size {})",
            job.title,
            job.company,
            session.id,
            session.queue.len()
        );
        Ok(app)
    }
}
