// src/acquire/providers/jsearch.rs
//! JSearch (RapidAPI) aggregated listings. Needs `RAPIDAPI_KEY`.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{get_text, host_of, parse_json, usable_key, Draft};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "jsearch";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    job_is_remote: Option<bool>,
    job_apply_link: Option<String>,
    job_google_link: Option<String>,
    job_description: Option<String>,
}

impl Item {
    fn location(&self) -> String {
        if self.job_is_remote == Some(true) {
            return "Remote".to_string();
        }
        [&self.job_city, &self.job_state, &self.job_country]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    // Google search links are not job pages.
    fn url(&self) -> String {
        let apply = self.job_apply_link.as_deref().unwrap_or_default();
        if !apply.trim().is_empty() {
            return apply.to_string();
        }
        self.job_google_link
            .as_deref()
            .filter(|g| !g.contains("google.com/search"))
            .unwrap_or_default()
            .to_string()
    }
}

pub fn parse(body: &str, fallback_location: &str, limit: usize) -> Result<Vec<JobRecord>> {
    let env: Envelope = parse_json(body, "jsearch")?;
    Ok(env
        .data
        .into_iter()
        .filter_map(|it| {
            let location = it.location();
            let url = it.url();
            Draft {
                id: it.job_id,
                title: it.job_title.unwrap_or_default(),
                company: it.employer_name.unwrap_or_default(),
                location,
                url,
                description: it.job_description.unwrap_or_default(),
            }
            .finish(NAME, "", fallback_location)
        })
        .take(limit)
        .collect())
}

pub struct JSearchProvider {
    base: String,
    key: Option<String>,
}

impl JSearchProvider {
    pub fn new(base: &str, key: Option<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            key: usable_key(key),
        }
    }
}

#[async_trait]
impl JobProvider for JSearchProvider {
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
        let search = format!("{} in {}", q.query, q.location);
        let req = http
            .get(format!("{}/search", self.base))
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", host_of(&self.base))
            .query(&[("query", search.as_str()), ("page", "1"), ("num_pages", "1")]);
        let body = get_text(req, NAME).await?;
        parse(&body, &q.location, q.limit)
    }
}
