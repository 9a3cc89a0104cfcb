// src/acquire/providers/usajobs.rs
//! USAJOBS search API. Needs `USAJOBS_API_KEY` and a contact e-mail sent as
//! the User-Agent.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{get_text, parse_json, usable_key, Draft};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "usajobs";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    #[serde(default)]
    search_result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct SearchResult {
    search_result_items: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultItem {
    matched_object_descriptor: Descriptor,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Descriptor {
    #[serde(rename = "PositionID")]
    position_id: Option<String>,
    position_title: Option<String>,
    organization_name: Option<String>,
    #[serde(rename = "PositionURI")]
    position_uri: Option<String>,
    position_location_display: Option<String>,
    qualification_summary: Option<String>,
}

pub fn parse(body: &str, fallback_location: &str, limit: usize) -> Result<Vec<JobRecord>> {
    let env: Envelope = parse_json(body, NAME)?;
    Ok(env
        .search_result
        .search_result_items
        .into_iter()
        .filter_map(|it| {
            let d = it.matched_object_descriptor;
            Draft {
                id: d.position_id,
                title: d.position_title.unwrap_or_default(),
                company: d
                    .organization_name
                    .unwrap_or_else(|| "U.S. Government".to_string()),
                location: d.position_location_display.unwrap_or_default(),
                url: d.position_uri.unwrap_or_default(),
                description: d.qualification_summary.unwrap_or_default(),
            }
            .finish(NAME, "https://www.usajobs.gov", fallback_location)
        })
        .take(limit)
        .collect())
}

pub struct UsaJobsProvider {
    base: String,
    key: Option<String>,
    contact: String,
}

impl UsaJobsProvider {
    pub fn new(base: &str, key: Option<String>, contact: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            key: usable_key(key),
            contact: contact.to_string(),
        }
    }
}

#[async_trait]
impl JobProvider for UsaJobsProvider {
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
        let per_page = q.limit.clamp(1, 100).to_string();
        let req = http
            .get(format!("{}/api/Search", self.base))
            .header("User-Agent", self.contact.as_str())
            .header("Authorization-Key", self.key.as_deref().unwrap_or_default())
            .query(&[
                ("Keyword", q.query.as_str()),
                ("LocationName", q.location.as_str()),
                ("ResultsPerPage", per_page.as_str()),
                ("Page", "1"),
            ]);
        let body = get_text(req, NAME).await?;
        parse(&body, &q.location, q.limit)
    }
}
