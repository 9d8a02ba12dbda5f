//! Resume Tailor Client: generates a tailored resume and an outreach message
//! for one posting.
//!
//! Strategy: two independent provider requests per posting (resume, then
//! message). Both must succeed; either one missing fails the whole tailoring
//! with `GenerationIncomplete`.

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::TRUTHFULNESS_INSTRUCTION;
use crate::llm_client::{ChatClient, ChatRequest};
use crate::models::application::TailoredApplication;
use crate::models::job::JobPosting;
use crate::models::session::{ApiKey, ResumeProfile, SessionConfig};
use crate::tailoring::assembler::assemble;
use crate::tailoring::prompts::{
    MESSAGE_MAX_TOKENS, MESSAGE_PROMPT_TEMPLATE, MESSAGE_SYSTEM, MESSAGE_TEMPERATURE,
    RESUME_MAX_TOKENS, RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM, RESUME_TEMPERATURE, TAILOR_MODEL,
};

/// The two generated artifacts for one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailoredArtifacts {
    pub resume: String,
    pub message: String,
}

#[async_trait]
pub trait ResumeTailor: Send + Sync {
    /// Calls the provider and returns both artifacts, never a partial result.
    async fn generate(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        config: &SessionConfig,
    ) -> Result<TailoredArtifacts, AppError>;

    /// Validates inputs, generates, and assembles a queue record.
    async fn tailor(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        config: &SessionConfig,
    ) -> Result<TailoredApplication, AppError> {
        validate_job(job)?;
        let artifacts = self.generate(resume, job, config).await?;
        assemble(job, artifacts.resume, artifacts.message)
    }
}

/// A posting must carry a title plus either a summary or a link to be tailorable.
pub fn validate_job(job: &JobPosting) -> Result<(), AppError> {
    if job.title.trim().is_empty() {
        return Err(AppError::Validation("job posting has no title".into()));
    }
    if job.summary.trim().is_empty() && job.link.trim().is_empty() {
        return Err(AppError::Validation(
            "job posting needs a summary or a link".into(),
        ));
    }
    Ok(())
}

/// Tailors through OpenAI's chat-completions endpoint.
pub struct OpenAiResumeTailor {
    chat: ChatClient,
}

impl OpenAiResumeTailor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    async fn call(
        &self,
        api_key: &ApiKey,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
        artifact: &str,
    ) -> Result<String, AppError> {
        let response = self
            .chat
            .complete(
                api_key,
                &ChatRequest {
                    model: TAILOR_MODEL,
                    system,
                    prompt,
                    temperature,
                    top_p: None,
                    max_tokens,
                },
            )
            .await?;

        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AppError::GenerationIncomplete(format!("provider returned no {artifact}")))
    }
}

#[async_trait]
impl ResumeTailor for OpenAiResumeTailor {
    async fn generate(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        config: &SessionConfig,
    ) -> Result<TailoredArtifacts, AppError> {
        let api_key = config.generation_key()?;
        let job_block = format_job_block(job);

        info!("Tailoring resume for {} @ {}", job.title, job.company);

        let resume_prompt = RESUME_PROMPT_TEMPLATE
            .replace("{truthfulness}", TRUTHFULNESS_INSTRUCTION)
            .replace("{profile_summary}", &config.profile_summary)
            .replace("{resume_text}", resume.text())
            .replace("{job_block}", &job_block);
        let tailored_resume = self
            .call(
                api_key,
                RESUME_SYSTEM,
                &resume_prompt,
                RESUME_TEMPERATURE,
                RESUME_MAX_TOKENS,
                "tailored resume",
            )
            .await?;

        let message_prompt = MESSAGE_PROMPT_TEMPLATE
            .replace("{truthfulness}", TRUTHFULNESS_INSTRUCTION)
            .replace("{profile_summary}", &config.profile_summary)
            .replace("{must_have}", &config.must_have_keywords.join(", "))
            .replace("{job_block}", &job_block);
        let message = self
            .call(
                api_key,
                MESSAGE_SYSTEM,
                &message_prompt,
                MESSAGE_TEMPERATURE,
                MESSAGE_MAX_TOKENS,
                "application message",
            )
            .await?;

        Ok(TailoredArtifacts {
            resume: tailored_resume,
            message,
        })
    }
}

fn format_job_block(job: &JobPosting) -> String {
    format!(
        "- Title: {}\n- Company: {}\n- Location: {}\n- Type: {}\n- Link: {}\n- Summary:\n{}",
        job.title, job.company, job.location, job.employment_type, job.link, job.summary
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    use crate::llm_client::ProviderError;
    use crate::models::session::Credentials;

    fn job() -> JobPosting {
        JobPosting {
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            employment_type: "Full-time".into(),
            link: "https://acme.example/jobs/1".into(),
            posted_at: None,
            posted_label: "2 days ago".into(),
            summary: "Build Rust services.".into(),
            source: "Company site".into(),
        }
    }

    fn config() -> SessionConfig {
        SessionConfig {
            target_titles: vec!["Backend Engineer".into()],
            must_have_keywords: vec!["Rust".into(), "SQL".into()],
            profile_summary: "Systems engineer, 5 years.".into(),
            credentials: Credentials {
                search: None,
                generation: Some(ApiKey::new("sk-test".into())),
            },
            ..SessionConfig::default()
        }
    }

    fn resume() -> ResumeProfile {
        ResumeProfile::new("Jane Doe\nRust, Postgres".into(), None).unwrap()
    }

    fn reply(content: &str) -> String {
        json!({ "choices": [{"message": {"role": "assistant", "content": content}}] }).to_string()
    }

    async fn mock_artifact(
        server: &mut mockito::ServerGuard,
        max_tokens: u32,
        status: usize,
        body: String,
    ) -> mockito::Mock {
        server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({ "max_tokens": max_tokens })))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    #[test]
    fn test_validate_job_requires_title() {
        let mut j = job();
        j.title = " ".into();
        assert!(matches!(validate_job(&j), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_job_accepts_link_without_summary() {
        let mut j = job();
        j.summary.clear();
        assert!(validate_job(&j).is_ok());
        j.link.clear();
        assert!(validate_job(&j).is_err());
    }

    #[tokio::test]
    async fn test_tailor_produces_linked_application() {
        let mut server = mockito::Server::new_async().await;
        let resume_mock =
            mock_artifact(&mut server, RESUME_MAX_TOKENS, 200, reply("# Jane Doe\n- Rust")).await;
        let message_mock =
            mock_artifact(&mut server, MESSAGE_MAX_TOKENS, 200, reply("Dear hiring team,")).await;

        let tailor = OpenAiResumeTailor::new(ChatClient::new(&server.url(), 5).unwrap());
        let app = tailor.tailor(&resume(), &job(), &config()).await.unwrap();

        assert_eq!(app.job, job());
        assert_eq!(app.tailored_resume_md, "# Jane Doe\n- Rust");
        assert_eq!(app.email_body, "Dear hiring team,");
        resume_mock.assert_async().await;
        message_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_message_is_generation_incomplete() {
        let mut server = mockito::Server::new_async().await;
        let _resume = mock_artifact(&mut server, RESUME_MAX_TOKENS, 200, reply("# Jane")).await;
        let _message = mock_artifact(&mut server, MESSAGE_MAX_TOKENS, 200, reply("  ")).await;

        let tailor = OpenAiResumeTailor::new(ChatClient::new(&server.url(), 5).unwrap());
        let err = tailor.tailor(&resume(), &job(), &config()).await.unwrap_err();
        assert!(matches!(err, AppError::GenerationIncomplete(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _resume = mock_artifact(
            &mut server,
            RESUME_MAX_TOKENS,
            429,
            json!({"error": {"message": "quota exceeded"}}).to_string(),
        )
        .await;

        let tailor = OpenAiResumeTailor::new(ChatClient::new(&server.url(), 5).unwrap());
        let err = tailor.tailor(&resume(), &job(), &config()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Api { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_generation_key_is_config_error() {
        let mut cfg = config();
        cfg.credentials.generation = None;
        let tailor = OpenAiResumeTailor::new(ChatClient::new("http://127.0.0.1:9", 1).unwrap());
        let err = tailor.tailor(&resume(), &job(), &cfg).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
