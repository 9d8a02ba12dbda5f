//! Job Source Client: one web-grounded search call per scan.
//!
//! `AppState` holds an `Arc<dyn JobSource>`; tests swap in scripted sources.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ARRAY_ONLY;
use crate::llm_client::{ChatClient, ChatRequest, ProviderError};
use crate::models::job::JobPosting;
use crate::models::session::SessionConfig;
use crate::search::filters::filter_postings;
use crate::search::parser::parse_postings;
use crate::search::prompts::{
    SEARCH_MAX_TOKENS, SEARCH_MODEL, SEARCH_PROMPT_TEMPLATE, SEARCH_SYSTEM, SEARCH_TEMPERATURE,
    SEARCH_TOP_P,
};

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Runs one search and returns filtered postings, newest first.
    /// Any provider failure is an error; an empty vec means nothing matched.
    async fn search(
        &self,
        config: &SessionConfig,
        extra_query: &str,
    ) -> Result<Vec<JobPosting>, AppError>;
}

/// Searches through Perplexity's chat-completions endpoint.
pub struct PerplexityJobSource {
    chat: ChatClient,
}

impl PerplexityJobSource {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl JobSource for PerplexityJobSource {
    async fn search(
        &self,
        config: &SessionConfig,
        extra_query: &str,
    ) -> Result<Vec<JobPosting>, AppError> {
        let api_key = config.validate_for_search()?;
        let prompt = build_search_prompt(config, extra_query);

        info!(
            "Searching for jobs: titles={:?}, window={}h",
            config.target_titles, config.freshness_hours
        );

        let response = self
            .chat
            .complete(
                api_key,
                &ChatRequest {
                    model: SEARCH_MODEL,
                    system: SEARCH_SYSTEM,
                    prompt: &prompt,
                    temperature: SEARCH_TEMPERATURE,
                    top_p: Some(SEARCH_TOP_P),
                    max_tokens: SEARCH_MAX_TOKENS,
                },
            )
            .await?;

        let text = response
            .text()
            .ok_or_else(|| ProviderError::Malformed("search reply had no content".into()))?;

        let now = Utc::now();
        let parsed =
            parse_postings(text, now).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let parsed_count = parsed.len();
        let kept = filter_postings(parsed, config, now);

        info!(
            "Search returned {} postings, {} kept after filtering",
            parsed_count,
            kept.len()
        );
        Ok(kept)
    }
}

/// Fills the search template from the session config.
pub fn build_search_prompt(config: &SessionConfig, extra_query: &str) -> String {
    SEARCH_PROMPT_TEMPLATE
        .replace("{titles}", &join_or(&config.target_titles, "any"))
        .replace("{locations}", &join_or(&config.locations, "anywhere"))
        .replace("{must_have}", &join_or(&config.must_have_keywords, "none"))
        .replace("{nice_to_have}", &join_or(&config.nice_to_have_keywords, "none"))
        .replace("{profile_summary}", or_none(&config.profile_summary))
        .replace("{extra_query}", or_none(extra_query))
        .replace("{freshness_hours}", &config.freshness_hours.to_string())
        .replace("{denylist}", &join_or(&config.denylist, "none"))
        .replace("{json_only}", JSON_ARRAY_ONLY)
}

fn join_or(items: &[String], fallback: &str) -> String {
    let joined = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

fn or_none(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "none"
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    use crate::models::session::{ApiKey, Credentials};

    fn config() -> SessionConfig {
        SessionConfig {
            target_titles: vec!["Backend Engineer".into()],
            locations: vec!["Remote".into()],
            freshness_hours: 48,
            denylist: vec!["linkedin.com".into()],
            credentials: Credentials {
                search: Some(ApiKey::new("pplx-test".into())),
                generation: None,
            },
            ..SessionConfig::default()
        }
    }

    fn reply(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 50}
        })
        .to_string()
    }

    #[test]
    fn test_prompt_embeds_criteria_and_window() {
        let prompt = build_search_prompt(&config(), "visa sponsorship");
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("Remote"));
        assert!(prompt.contains("last 48 hours"));
        assert!(prompt.contains("visa sponsorship"));
        assert!(prompt.contains("linkedin.com"));
        assert!(prompt.contains("Must-have keywords: none"));
        assert!(!prompt.contains("{titles}"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[tokio::test]
    async fn test_search_scenario_keeps_only_fresh_allowed_posting() {
        let now = Utc::now();
        let content = json!([
            {"title": "Backend Engineer", "company": "LinkedIn Co",
             "url": "https://www.linkedin.com/jobs/123",
             "posted_at": (now - Duration::hours(1)).to_rfc3339()},
            {"title": "Backend Engineer", "company": "Acme",
             "url": "https://acme.example/jobs/1",
             "posted_at": (now - Duration::hours(10)).to_rfc3339()},
            {"title": "Backend Engineer", "company": "Globex",
             "url": "https://globex.example/jobs/2",
             "posted_at": (now - Duration::hours(72)).to_rfc3339()}
        ])
        .to_string();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer pplx-test")
            .with_status(200)
            .with_body(reply(&content))
            .expect(1)
            .create_async()
            .await;

        let source = PerplexityJobSource::new(ChatClient::new(&server.url(), 5).unwrap());
        let jobs = source.search(&config(), "").await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Acme");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_provider_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let source = PerplexityJobSource::new(ChatClient::new(&server.url(), 5).unwrap());
        let err = source.search(&config(), "").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(ProviderError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_search_reply_without_array_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(reply("Sorry, I could not browse the web right now."))
            .create_async()
            .await;

        let source = PerplexityJobSource::new(ChatClient::new(&server.url(), 5).unwrap());
        let err = source.search(&config(), "").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(ProviderError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_search_without_key_never_calls_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let mut cfg = config();
        cfg.credentials.search = None;
        let source = PerplexityJobSource::new(ChatClient::new(&server.url(), 5).unwrap());
        let err = source.search(&cfg, "").await.unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        mock.assert_async().await;
    }
}
