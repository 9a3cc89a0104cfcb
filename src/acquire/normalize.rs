// src/acquire/normalize.rs
//! Text cleanup, URL policy and dedup for job records.

use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::acquire::types::JobRecord;

const MAX_DESCRIPTION_CHARS: usize = 4000;

/// Substrings that mark a URL as a dead end rather than a job page.
const BANNED_URL_PATTERNS: &[&str] = &[
    "expired_jd_redirect",
    "/jobs/search",
    "google.com/search",
    "example.com",
];

/// Decode entities, strip tags, unify quotes and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_DESCRIPTION_CHARS {
        out = out.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }
    out
}

/// Empty, non-http(s), or a known placeholder/redirect pattern.
pub fn is_banned_url(url: &str) -> bool {
    let u = url.trim();
    if u.is_empty() {
        return true;
    }
    let lower = u.to_ascii_lowercase();
    if !(lower.starts_with("https://") || lower.starts_with("http://")) {
        return true;
    }
    BANNED_URL_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Make a relative link absolute against `base`; `None` if the result is still banned.
pub fn repair_url(url: &str, base: &str) -> Option<String> {
    let u = url.trim();
    let candidate = if u.starts_with("//") {
        format!("https:{u}")
    } else if u.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), u)
    } else {
        u.to_string()
    };
    (!is_banned_url(&candidate)).then_some(candidate)
}

/// Lowercased, trimmed, whitespace-collapsed `(title, company, location)`.
pub fn dedup_key(job: &JobRecord) -> (String, String, String) {
    fn norm(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
    }
    (norm(&job.title), norm(&job.company), norm(&job.location))
}

/// Keep the first record per key, preserving order. Returns the number dropped.
pub fn dedup_records(jobs: Vec<JobRecord>) -> (Vec<JobRecord>, usize) {
    let mut seen = HashSet::with_capacity(jobs.len());
    let mut keep = Vec::with_capacity(jobs.len());
    let mut dropped = 0usize;
    for job in jobs {
        if seen.insert(dedup_key(&job)) {
            keep.push(job);
        } else {
            dropped += 1;
        }
    }
    (keep, dropped)
}

/// Short stable hex id from arbitrary parts.
pub fn stable_id(parts: &[&str]) -> String {
    let mut h = Sha256::new();
    for p in parts {
        h.update(p.as_bytes());
        h.update([0x1f]);
    }
    h.finalize()
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// True when any query term (len > 2) occurs in `text`. Empty or generic
/// queries match everything.
pub fn matches_query(text: &str, query: &str) -> bool {
    let text = text.to_lowercase();
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() > 2 && t != "jobs" && t != "job")
        .collect();
    terms.is_empty() || terms.iter().any(|t| text.contains(t.as_str()))
}

/// "stripe" → "Stripe", "data-engineer" → "Data Engineer". Slug
/// separators (`-`, `_`) become spaces.
pub fn title_case(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
