use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single discovered job opening. `link` is the identity used for dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    /// "Full-time", "Internship", "Contract", ... as reported by the provider.
    pub employment_type: String,
    /// Normalized absolute http(s) URL.
    pub link: String,
    /// Best estimate of when the posting went up. `None` when unknown.
    pub posted_at: Option<DateTime<Utc>>,
    /// The provider's raw post-time text, kept for display.
    pub posted_label: String,
    /// Short description snippet from the provider.
    pub summary: String,
    /// Source label such as "Indeed" or "Company site".
    pub source: String,
}

impl JobPosting {
    /// Host of the posting link, lowercased. `None` only for hand-built postings
    /// whose link never went through [`normalize_link`].
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    }
}

/// Normalizes a posting link into its dedup key.
///
/// Returns `None` for anything that is not an absolute http/https URL with a host.
/// The fragment is dropped and a trailing `/` on a non-root path is trimmed.
pub fn normalize_link(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if url.host_str().map_or(true, str::is_empty) {
        return None;
    }
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}

/// True when `host` equals `domain` or is one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}
