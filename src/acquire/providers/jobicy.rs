// src/acquire/providers/jobicy.rs
//! Jobicy remote-jobs API (no key), tag-filtered server side.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{get_text, parse_json, slugify, Draft};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "jobicy";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    jobs: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Item {
    id: Option<serde_json::Value>,
    url: Option<String>,
    job_title: Option<String>,
    company_name: Option<String>,
    job_geo: Option<String>,
    job_excerpt: Option<String>,
    job_description: Option<String>,
}

pub fn parse(body: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let env: Envelope = parse_json(body, NAME)?;
    Ok(env
        .jobs
        .into_iter()
        .filter_map(|it| {
            let id = it.id.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            Draft {
                id,
                title: it.job_title.unwrap_or_default(),
                company: it.company_name.unwrap_or_default(),
                location: it.job_geo.unwrap_or_else(|| "Remote".to_string()),
                url: it.url.unwrap_or_default(),
                description: it.job_description.or(it.job_excerpt).unwrap_or_default(),
            }
            .finish(NAME, "https://jobicy.com", &q.location)
        })
        .take(q.limit)
        .collect())
}

pub struct JobicyProvider {
    base: String,
}

impl JobicyProvider {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobProvider for JobicyProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Aggregator
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let count = q.limit.clamp(1, 50).to_string();
        let tag = slugify(&q.query);
        let req = http
            .get(format!("{}/api/v2/remote-jobs", self.base))
            .query(&[("count", count.as_str()), ("tag", tag.as_str())]);
        let body = get_text(req, NAME).await?;
        parse(&body, q)
    }
}
