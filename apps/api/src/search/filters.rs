//! Post-parse filtering of search results: source denylist, freshness window,
//! in-batch dedup, ordering and truncation.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::job::{host_matches, JobPosting};
use crate::models::session::SessionConfig;

/// True when the posting's link host is a denylisted domain or one of its subdomains.
pub fn is_denylisted(posting: &JobPosting, denylist: &[String]) -> bool {
    match posting.host() {
        Some(host) => denylist.iter().any(|d| host_matches(&host, d)),
        None => false,
    }
}

/// True when the posting is within the window. Unknown post times count as fresh.
pub fn is_fresh(posting: &JobPosting, freshness_hours: u32, now: DateTime<Utc>) -> bool {
    match posting.posted_at {
        Some(posted_at) => now - posted_at <= Duration::hours(i64::from(freshness_hours)),
        None => true,
    }
}

/// Applies the session's filtering policy to one batch of parsed postings.
///
/// Output is newest-first (unknown post times last, otherwise stable), free of
/// duplicate links, and at most `max_results` long.
pub fn filter_postings(
    postings: Vec<JobPosting>,
    config: &SessionConfig,
    now: DateTime<Utc>,
) -> Vec<JobPosting> {
    let mut links = HashSet::new();
    let mut kept: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| {
            if is_denylisted(p, &config.denylist) {
                debug!("Dropping denylisted posting: {}", p.link);
                return false;
            }
            if !is_fresh(p, config.freshness_hours, now) {
                debug!("Dropping stale posting ({}): {}", p.posted_label, p.link);
                return false;
            }
            links.insert(p.link.clone())
        })
        .collect();

    kept.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    kept.truncate(config.max_results);
    kept
}
