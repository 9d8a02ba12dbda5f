//! In-process provider fakes for pipeline and router tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::ProviderError;
use crate::models::job::JobPosting;
use crate::models::session::{ResumeProfile, SessionConfig};
use crate::search::client::JobSource;
use crate::tailoring::tailor::{ResumeTailor, TailoredArtifacts};

/// Returns queued search results in order; times out once exhausted.
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Result<Vec<JobPosting>, AppError>>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Result<Vec<JobPosting>, AppError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl JobSource for ScriptedSource {
    async fn search(
        &self,
        _config: &SessionConfig,
        _extra_query: &str,
    ) -> Result<Vec<JobPosting>, AppError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Provider(ProviderError::Timeout(1))))
    }
}

/// Echoes resume and job back; fails with a 503 for links in `failing`.
/// Every call is recorded in `calls`.
#[derive(Default)]
pub struct FakeTailor {
    pub failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ResumeTailor for FakeTailor {
    async fn generate(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        _config: &SessionConfig,
    ) -> Result<TailoredArtifacts, AppError> {
        self.calls.lock().unwrap().push(job.link.clone());
        if self.failing.contains(&job.link) {
            return Err(AppError::Provider(ProviderError::Api {
                status: 503,
                message: "overloaded".into(),
            }));
        }
        Ok(TailoredArtifacts {
            resume: format!("{} for {}", resume.text(), job.title),
            message: format!("Hello {}", job.company),
        })
    }
}
