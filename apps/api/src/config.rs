use anyhow::{Context, Result};

use crate::models::session::ApiKey;

const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_DENYLIST: &str = "linkedin.com,dice.com";

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional here: a session may supply its own keys at
/// creation time. A scan or tailor call without any key fails with a config error.
#[derive(Debug, Clone)]
pub struct Config {
    pub perplexity_api_key: Option<ApiKey>,
    pub openai_api_key: Option<ApiKey>,
    pub perplexity_base_url: String,
    pub openai_base_url: String,
    pub provider_timeout_secs: u64,
    pub job_source_denylist: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY").map(ApiKey::new),
            openai_api_key: optional_env("OPENAI_API_KEY").map(ApiKey::new),
            perplexity_base_url: optional_env("PERPLEXITY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PERPLEXITY_BASE_URL.to_string()),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            provider_timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?,
            job_source_denylist: split_list(
                &std::env::var("JOB_SOURCE_DENYLIST")
                    .unwrap_or_else(|_| DEFAULT_DENYLIST.to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Config pointing both providers at a local mock server.
    pub fn for_tests(base_url: &str) -> Self {
        Config {
            perplexity_api_key: Some(ApiKey::new("pplx-test".to_string())),
            openai_api_key: Some(ApiKey::new("sk-test".to_string())),
            perplexity_base_url: base_url.to_string(),
            openai_base_url: base_url.to_string(),
            provider_timeout_secs: 5,
            job_source_denylist: split_list(DEFAULT_DENYLIST),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
