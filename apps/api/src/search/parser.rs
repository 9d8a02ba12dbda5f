//! Search reply parser: turns loosely structured provider text into postings.
//!
//! Pure and network-free. The provider is asked for a bare JSON array but in
//! practice wraps it in reasoning blocks, code fences or prose, so extraction is
//! tolerant: strip the noise, try a direct parse, then scan for the first
//! `[` that opens a complete JSON array. Individual items that are not objects
//! or carry no usable link are skipped.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm_client::strip_json_fences;
use crate::models::job::{normalize_link, JobPosting};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no JSON array of postings found in provider reply")]
pub struct MalformedResponse;

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

const TITLE_KEYS: &[&str] = &["title", "job_title", "position", "role"];
const COMPANY_KEYS: &[&str] = &["company", "company_name", "employer"];
const LOCATION_KEYS: &[&str] = &["location", "locations"];
const TYPE_KEYS: &[&str] = &["type", "employment_type", "job_type"];
const LINK_KEYS: &[&str] = &["url", "link", "apply_url", "job_url"];
const POSTED_KEYS: &[&str] = &["posted_at", "posted", "date_posted", "date"];
const SUMMARY_KEYS: &[&str] = &["summary", "description", "snippet"];
const SOURCE_KEYS: &[&str] = &["source", "site", "board"];
const WRAPPER_KEYS: &[&str] = &["jobs", "postings", "results"];

/// Parses a provider reply into postings. `now` anchors relative post times.
///
/// `Ok(vec![])` means the reply held a JSON array with no usable postings;
/// `Err` means no array could be located at all.
pub fn parse_postings(text: &str, now: DateTime<Utc>) -> Result<Vec<JobPosting>, MalformedResponse> {
    let items = extract_json_items(text)?;
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| posting_from_object(obj, now))
        .collect())
}

fn extract_json_items(text: &str) -> Result<Vec<Value>, MalformedResponse> {
    let cleaned = strip_think_blocks(text);
    let cleaned = strip_inline_fences(&cleaned);
    let cleaned = strip_json_fences(&cleaned);

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        if let Some(items) = as_item_list(value) {
            return Ok(items);
        }
    }

    first_embedded_array(cleaned).ok_or(MalformedResponse)
}

/// Tries each `[` in turn and keeps the first array that parses, so trailing
/// prose such as citation markers (`[1]`) does not spoil the reply. An array
/// holding objects wins over an earlier one that holds none.
fn first_embedded_array(text: &str) -> Option<Vec<Value>> {
    let mut fallback = None;
    for (i, _) in text.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&text[i..]).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            if items.iter().any(Value::is_object) {
                return Some(items);
            }
            fallback.get_or_insert(items);
        }
    }
    fallback
}

/// Accepts a bare array or an object wrapping one under a known key.
fn as_item_list(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut obj) => WRAPPER_KEYS.iter().find_map(|k| match obj.remove(*k) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

fn strip_think_blocks(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(start) = out.find(THINK_OPEN) {
        match out[start..].find(THINK_CLOSE) {
            Some(rel_end) => out.replace_range(start..start + rel_end + THINK_CLOSE.len(), ""),
            None => out.truncate(start),
        }
    }
    // A dangling close tag means everything before it was reasoning.
    if let Some(end) = out.find(THINK_CLOSE) {
        out.replace_range(..end + THINK_CLOSE.len(), "");
    }
    out
}

/// Removes code fences that are not at the very start or end of the reply.
fn strip_inline_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}

fn posting_from_object(obj: &Map<String, Value>, now: DateTime<Utc>) -> Option<JobPosting> {
    let link = normalize_link(&str_field(obj, LINK_KEYS)?)?;
    let posted_label = str_field(obj, POSTED_KEYS).unwrap_or_default();

    Some(JobPosting {
        title: str_field(obj, TITLE_KEYS).unwrap_or_else(|| "Unknown Title".to_string()),
        company: str_field(obj, COMPANY_KEYS).unwrap_or_else(|| "Unknown".to_string()),
        location: str_field(obj, LOCATION_KEYS).unwrap_or_default(),
        employment_type: str_field(obj, TYPE_KEYS).unwrap_or_default(),
        posted_at: parse_posted_at(&posted_label, now),
        posted_label,
        summary: str_field(obj, SUMMARY_KEYS).unwrap_or_default(),
        link,
        source: str_field(obj, SOURCE_KEYS).unwrap_or_else(|| "web".to_string()),
    })
}

/// First non-blank string among `keys`. Arrays of strings are joined (e.g. multiple locations).
fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        let text = match obj.get(*k)? {
            Value::String(s) => s.trim().to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// Best-effort post time from the provider's label.
///
/// Accepts RFC 3339, naive ISO datetimes, plain dates and relative phrases
/// ("10 hours ago", "a week ago", "today", "yesterday"). Anything else is unknown.
pub fn parse_posted_at(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }

    parse_relative(&raw.to_ascii_lowercase(), now)
}

fn parse_relative(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match raw {
        "just now" | "now" | "today" | "just posted" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::days(1)),
        _ => {}
    }

    let rest = raw.strip_prefix("posted ").unwrap_or(raw);
    let rest = rest.strip_suffix(" ago")?;
    let mut parts = rest.split_whitespace();
    let amount = match parts.next()?.trim_end_matches('+') {
        "a" | "an" | "one" => 1,
        n => n.parse::<i64>().ok()?,
    };
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    // Out-of-range amounts read as unknown rather than overflowing.
    let unit = unit.trim_end_matches('s');
    let delta = match unit {
        "minute" | "min" => Duration::try_minutes(amount),
        "hour" | "hr" => Duration::try_hours(amount),
        "day" => Duration::try_days(amount),
        "week" => Duration::try_weeks(amount),
        "month" => amount.checked_mul(30).and_then(Duration::try_days),
        _ => None,
    }?;
    now.checked_sub_signed(delta)
}
