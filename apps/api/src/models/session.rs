use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_FRESHNESS_HOURS: u32 = 48;
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Opaque provider credential. Never serialized, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Keys for the two providers, resolved from the session request or the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub search: Option<ApiKey>,
    pub generation: Option<ApiKey>,
}

/// Per-session search and tailoring preferences.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub target_titles: Vec<String>,
    pub locations: Vec<String>,
    pub must_have_keywords: Vec<String>,
    pub nice_to_have_keywords: Vec<String>,
    pub profile_summary: String,
    /// Maximum posting age in hours. Always positive.
    pub freshness_hours: u32,
    pub max_results: usize,
    /// Link hosts (and their subdomains) dropped from search results.
    pub denylist: Vec<String>,
    /// Tailor every new posting right after a scan.
    pub auto_prepare: bool,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_titles: Vec::new(),
            locations: Vec::new(),
            must_have_keywords: Vec::new(),
            nice_to_have_keywords: Vec::new(),
            profile_summary: String::new(),
            freshness_hours: DEFAULT_FRESHNESS_HOURS,
            max_results: DEFAULT_MAX_RESULTS,
            denylist: Vec::new(),
            auto_prepare: false,
            credentials: Credentials::default(),
        }
    }
}

impl SessionConfig {
    /// Checks the preconditions of a search call.
    pub fn validate_for_search(&self) -> Result<&ApiKey, AppError> {
        let key = self
            .credentials
            .search
            .as_ref()
            .ok_or_else(|| AppError::Config("a search provider API key is required".into()))?;

        let has_criteria = self
            .target_titles
            .iter()
            .chain(self.must_have_keywords.iter())
            .chain(self.nice_to_have_keywords.iter())
            .any(|s| !s.trim().is_empty());
        if !has_criteria {
            return Err(AppError::Config(
                "at least one target title or keyword is required".into(),
            ));
        }

        if self.freshness_hours == 0 {
            return Err(AppError::Config(
                "freshness window must be a positive number of hours".into(),
            ));
        }

        Ok(key)
    }

    pub fn generation_key(&self) -> Result<&ApiKey, AppError> {
        self.credentials
            .generation
            .as_ref()
            .ok_or_else(|| AppError::Config("a generation provider API key is required".into()))
    }
}

/// The user's base resume as plain text. Tailoring never modifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    text: String,
    filename: Option<String>,
}

impl ResumeProfile {
    pub fn new(text: String, filename: Option<String>) -> Result<Self, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("resume text cannot be empty".into()));
        }
        Ok(Self { text, filename })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Pipeline state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Scanning,
    AutoTailoring,
}
