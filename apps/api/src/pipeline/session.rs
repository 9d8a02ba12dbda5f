use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{ApplicationQueue, TailorFailure};
use crate::models::job::JobPosting;
use crate::models::session::{ResumeProfile, SessionConfig, SessionState};

/// All in-memory state for one user session. Owned by the session store and
/// handed to the pipeline by `&mut`; nothing here outlives the session.
#[derive(Debug)]
pub struct Session {
    pub(super) id: Uuid,
    pub(super) config: SessionConfig,
    pub(super) resume: Option<ResumeProfile>,
    pub(super) feed: Vec<JobPosting>,
    /// Normalized links already shown. Only grows until `reset`.
    pub(super) seen: HashSet<String>,
    pub(super) queue: ApplicationQueue,
    pub(super) failures: Vec<TailorFailure>,
    pub(super) state: SessionState,
    pub(super) created_at: DateTime<Utc>,
    pub(super) last_scan: Option<DateTime<Utc>>,
}

/// Read-only view returned by the session endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_scan: Option<DateTime<Utc>>,
    pub config: SessionConfig,
    pub search_key_configured: bool,
    pub generation_key_configured: bool,
    pub has_resume: bool,
    pub resume_filename: Option<String>,
    pub feed_len: usize,
    pub seen_len: usize,
    pub queue_len: usize,
    pub failures: Vec<TailorFailure>,
}

impl Session {
    pub fn new(config: SessionConfig, resume: Option<ResumeProfile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            resume,
            feed: Vec::new(),
            seen: HashSet::new(),
            queue: ApplicationQueue::default(),
            failures: Vec::new(),
            state: SessionState::Idle,
            created_at: Utc::now(),
            last_scan: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn resume(&self) -> Option<&ResumeProfile> {
        self.resume.as_ref()
    }

    /// Replaces the base resume. Already queued applications are untouched.
    pub fn set_resume(&mut self, resume: ResumeProfile) {
        self.resume = Some(resume);
    }

    pub fn feed(&self) -> &[JobPosting] {
        &self.feed
    }

    pub fn queue(&self) -> &ApplicationQueue {
        &self.queue
    }

    pub fn failures(&self) -> &[TailorFailure] {
        &self.failures
    }

    pub fn find_in_feed(&self, link: &str) -> Option<&JobPosting> {
        self.feed.iter().find(|p| p.link == link)
    }

    /// Appends postings whose link is not yet seen; returns exactly those, in order.
    pub(super) fn merge_new(&mut self, postings: Vec<JobPosting>) -> Vec<JobPosting> {
        let fresh: Vec<JobPosting> = postings
            .into_iter()
            .filter(|p| self.seen.insert(p.link.clone()))
            .collect();
        self.feed.extend(fresh.iter().cloned());
        fresh
    }

    /// Clears feed, seen-set, queue and failure log. Config and resume stay.
    pub fn reset(&mut self) {
        self.feed.clear();
        self.seen.clear();
        self.queue.clear();
        self.failures.clear();
        self.state = SessionState::Idle;
        self.last_scan = None;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            state: self.state,
            created_at: self.created_at,
            last_scan: self.last_scan,
            config: self.config.clone(),
            search_key_configured: self.config.credentials.search.is_some(),
            generation_key_configured: self.config.credentials.generation.is_some(),
            has_resume: self.resume.is_some(),
            resume_filename: self
                .resume
                .as_ref()
                .and_then(|r| r.filename().map(str::to_string)),
            feed_len: self.feed.len(),
            seen_len: self.seen.len(),
            queue_len: self.queue.len(),
            failures: self.failures.clone(),
        }
    }
}
