//! Axum route handlers for the session pipeline.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::application::TailoredApplication;
use crate::models::job::JobPosting;
use crate::models::session::{
    ApiKey, Credentials, ResumeProfile, SessionConfig, DEFAULT_FRESHNESS_HOURS,
    DEFAULT_MAX_RESULTS,
};
use crate::pipeline::orchestrator::ScanReport;
use crate::pipeline::session::{Session, SessionSummary};
use crate::resume::extract_resume_text;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/v1/sessions`. Not `Debug`: it may carry API keys.
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub target_titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub must_have_keywords: Vec<String>,
    #[serde(default)]
    pub nice_to_have_keywords: Vec<String>,
    #[serde(default)]
    pub profile_summary: String,
    pub freshness_hours: Option<u32>,
    pub max_results: Option<usize>,
    /// Overrides the server's default denylist when present.
    pub denylist: Option<Vec<String>>,
    #[serde(default)]
    pub auto_prepare: bool,
    pub resume_text: Option<String>,
    pub search_api_key: Option<String>,
    pub generation_api_key: Option<String>,
}

impl CreateSessionRequest {
    /// Resolves the request against server defaults.
    /// Keys given in the request take precedence over environment keys.
    pub fn into_session(self, config: &Config) -> Result<Session, AppError> {
        let freshness_hours = self.freshness_hours.unwrap_or(DEFAULT_FRESHNESS_HOURS);
        if freshness_hours == 0 {
            return Err(AppError::Validation(
                "freshness_hours must be a positive integer".into(),
            ));
        }
        let max_results = self.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(AppError::Validation("max_results must be at least 1".into()));
        }

        let resume = self
            .resume_text
            .filter(|t| !t.trim().is_empty())
            .map(|t| ResumeProfile::new(t, None))
            .transpose()?;

        let session_config = SessionConfig {
            target_titles: clean(self.target_titles),
            locations: clean(self.locations),
            must_have_keywords: clean(self.must_have_keywords),
            nice_to_have_keywords: clean(self.nice_to_have_keywords),
            profile_summary: self.profile_summary.trim().to_string(),
            freshness_hours,
            max_results,
            denylist: self
                .denylist
                .map(clean)
                .unwrap_or_else(|| config.job_source_denylist.clone()),
            auto_prepare: self.auto_prepare,
            credentials: Credentials {
                search: key_or(self.search_api_key, &config.perplexity_api_key),
                generation: key_or(self.generation_api_key, &config.openai_api_key),
            },
        };

        Ok(Session::new(session_config, resume))
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn key_or(provided: Option<String>, fallback: &Option<ApiKey>) -> Option<ApiKey> {
    provided
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(ApiKey::new)
        .or_else(|| fallback.clone())
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub extra_query: String,
}

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub filename: Option<String>,
    pub characters: usize,
}

const EXPORT_FILENAME: &str = "applications_payload.json";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSummary>), AppError> {
    let session = request.into_session(&state.config)?;
    let handle = state.sessions.insert(session).await;
    let summary = handle.lock().await.summary();
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = state.sessions.get(id).await?;
    let summary = handle.lock().await.summary();
    Ok(Json(summary))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.reset();
    Ok(Json(session.summary()))
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload; the first part carrying data is taken as the resume file.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let handle = state.sessions.get(id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        if bytes.is_empty() {
            continue;
        }

        let text = extract_resume_text(filename.as_deref(), bytes).await?;
        let characters = text.chars().count();
        let profile = ResumeProfile::new(text, filename.clone())?;
        handle.lock().await.set_resume(profile);

        return Ok(Json(ResumeUploadResponse {
            filename,
            characters,
        }));
    }

    Err(AppError::Validation("no resume file in upload".into()))
}

/// POST /api/v1/sessions/:id/scan
///
/// The body is optional; without one the scan runs with no extra query.
pub async fn handle_scan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<ScanRequest>>,
) -> Result<Json<ScanReport>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let report = state.pipeline.scan(&mut session, &request.extra_query).await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/feed
pub async fn handle_get_feed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let handle = state.sessions.get(id).await?;
    let feed = handle.lock().await.feed().to_vec();
    Ok(Json(feed))
}

/// POST /api/v1/sessions/:id/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailoredApplication>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let app = state.pipeline.tailor_one(&mut session, &request.link).await?;
    Ok(Json(app))
}

/// GET /api/v1/sessions/:id/queue
pub async fn handle_get_queue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TailoredApplication>>, AppError> {
    let handle = state.sessions.get(id).await?;
    let entries = handle.lock().await.queue().entries().to_vec();
    Ok(Json(entries))
}

/// GET /api/v1/sessions/:id/export
///
/// Downloads the queue as a JSON array of export records. Read-only.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    if session.queue().is_empty() {
        info!("Exporting an empty queue for session {id}");
    }
    let body = session
        .queue()
        .export_json()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize export: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}
