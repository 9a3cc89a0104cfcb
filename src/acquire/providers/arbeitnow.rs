// src/acquire/providers/arbeitnow.rs
//! Arbeitnow public job board API (no key).

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{get_text, parse_json, Draft};
use crate::acquire::normalize::matches_query;
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "arbeitnow";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    slug: Option<String>,
    company_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    remote: bool,
    url: Option<String>,
    location: Option<String>,
    tags: Vec<String>,
}

pub fn parse(body: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let env: Envelope = parse_json(body, NAME)?;
    Ok(env
        .data
        .into_iter()
        .filter(|it| {
            let hay = format!("{} {}", it.title.as_deref().unwrap_or_default(), it.tags.join(" "));
            matches_query(&hay, &q.query)
        })
        .filter_map(|it| {
            let location = match (it.remote, it.location) {
                (true, _) => "Remote".to_string(),
                (false, l) => l.unwrap_or_default(),
            };
            Draft {
                id: it.slug,
                title: it.title.unwrap_or_default(),
                company: it.company_name.unwrap_or_default(),
                location,
                url: it.url.unwrap_or_default(),
                description: it.description.unwrap_or_default(),
            }
            .finish(NAME, "https://www.arbeitnow.com", &q.location)
        })
        .take(q.limit)
        .collect())
}

pub struct ArbeitnowProvider {
    base: String,
}

impl ArbeitnowProvider {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobProvider for ArbeitnowProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Aggregator
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let req = http
            .get(format!("{}/api/job-board-api", self.base))
            .query(&[("search", q.query.as_str())]);
        let body = get_text(req, NAME).await?;
        parse(&body, q)
    }
}
