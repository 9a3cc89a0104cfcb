// src/acquire/providers/linkedin_rapidapi.rs
//! LinkedIn job search via RapidAPI. The payload shape varies between plan
//! versions, so fields are read loosely from `serde_json::Value`.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{get_text, host_of, parse_json, usable_key, Draft};
use crate::acquire::normalize::matches_query;
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "linkedin-rapidapi";

/// First non-empty string among `keys`. Nested `{name: ..}` objects count.
fn pick(item: &Value, keys: &[&str]) -> String {
    for k in keys {
        let s = match item.get(*k) {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Object(o)) => o.get("name").and_then(Value::as_str).unwrap_or_default(),
            Some(Value::Array(a)) => a.first().and_then(Value::as_str).unwrap_or_default(),
            _ => "",
        };
        if !s.trim().is_empty() {
            return s.to_string();
        }
    }
    String::new()
}

fn items(root: &Value) -> &[Value] {
    if let Some(arr) = root.as_array() {
        return arr;
    }
    ["jobs", "data", "results"]
        .iter()
        .find_map(|k| root.get(*k).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn parse(body: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let root: Value = parse_json(body, NAME)?;
    Ok(items(&root)
        .iter()
        .filter_map(|it| {
            let title = pick(it, &["title", "job_title", "name"]);
            let description = pick(it, &["description_text", "description", "job_description"]);
            if !matches_query(&format!("{title} {description}"), &q.query) {
                return None;
            }
            Draft {
                id: Some(pick(it, &["id", "job_id"])).filter(|s| !s.is_empty()),
                title,
                company: pick(it, &["organization", "company", "company_name", "employer"]),
                location: pick(it, &["locations_derived", "location", "job_location"]),
                url: pick(it, &["url", "job_url", "apply_url"]),
                description,
            }
            .finish(NAME, "https://www.linkedin.com", &q.location)
        })
        .take(q.limit)
        .collect())
}

pub struct LinkedInRapidApiProvider {
    base: String,
    key: Option<String>,
}

impl LinkedInRapidApiProvider {
    pub fn new(base: &str, key: Option<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            key: usable_key(key),
        }
    }
}

#[async_trait]
impl JobProvider for LinkedInRapidApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Partner
    }

    fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let key = self.key.as_deref().unwrap_or_default();
        let req = http
            .get(format!("{}/active-jb-1h", self.base))
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", host_of(&self.base))
            .query(&[
                ("offset", "0"),
                ("description_type", "text"),
                ("title_filter", q.query.as_str()),
                ("location_filter", q.location.as_str()),
            ]);
        let body = get_text(req, NAME).await?;
        parse(&body, q)
    }
}
