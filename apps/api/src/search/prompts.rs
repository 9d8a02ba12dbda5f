// All prompt constants for the job search module.

/// The search provider model. Hardcoded so every scan behaves the same.
pub const SEARCH_MODEL: &str = "sonar-reasoning";
pub const SEARCH_TEMPERATURE: f32 = 0.2;
pub const SEARCH_TOP_P: f32 = 0.9;
pub const SEARCH_MAX_TOKENS: u32 = 2048;

pub const SEARCH_SYSTEM: &str = "You are a job search assistant with live web access. \
    You return job postings as structured JSON and nothing else.";

/// Search prompt template.
/// Replace: {titles}, {locations}, {must_have}, {nice_to_have}, {profile_summary},
///          {extra_query}, {freshness_hours}, {denylist}, {json_only}
pub const SEARCH_PROMPT_TEMPLATE: &str = r#"Search the public web for job postings matching this candidate profile.

PROFILE:
- Target titles: {titles}
- Locations (remote counts): {locations}
- Must-have keywords: {must_have}
- Nice-to-have keywords: {nice_to_have}
- Candidate summary: {profile_summary}
- Extra constraints: {extra_query}

RULES:
1. Only include postings published within the last {freshness_hours} hours.
2. Include every seniority and employment type that matches the titles or keywords:
   internships, entry-level, mid, senior, contract and full-time.
3. Prefer direct company career pages or ATS portals (Greenhouse, Lever, Workday, Ashby).
   Avoid postings whose only apply link is on: {denylist}.
4. Every posting MUST have a direct, absolute URL.

Return a JSON ARRAY where each element has exactly these fields:
[
  {
    "title": "Backend Engineer",
    "company": "Acme Corp",
    "location": "Remote, US",
    "type": "Full-time | Internship | Contract | Other",
    "posted_at": "ISO 8601 datetime if known, otherwise an empty string",
    "summary": "Two or three sentences about the role",
    "url": "https://direct.link/to/the/posting",
    "source": "Short label such as 'Company site', 'Indeed' or 'Wellfound'"
  }
]

{json_only}"#;
