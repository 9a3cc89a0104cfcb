// src/acquire/providers/greenhouse.rs
//! Greenhouse public job boards, one concurrent request per configured board.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_sites, get_text, parse_json, Draft};
use crate::acquire::normalize::{matches_query, title_case};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "greenhouse";

#[derive(Debug, Deserialize)]
struct Board {
    #[serde(default)]
    jobs: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    id: Option<u64>,
    title: Option<String>,
    absolute_url: Option<String>,
    location: Option<Named>,
    content: Option<String>,
    company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: Option<String>,
}

/// Jobs on `board` whose title matches the query.
pub fn parse(body: &str, board: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let b: Board = parse_json(body, NAME)?;
    Ok(b.jobs
        .into_iter()
        .filter(|it| matches_query(it.title.as_deref().unwrap_or_default(), &q.query))
        .filter_map(|it| {
            Draft {
                id: it.id.map(|n| n.to_string()),
                title: it.title.unwrap_or_default(),
                company: it.company_name.unwrap_or_else(|| title_case(board)),
                location: it.location.and_then(|l| l.name).unwrap_or_default(),
                url: it.absolute_url.unwrap_or_default(),
                description: it.content.unwrap_or_default(),
            }
            .finish(NAME, "https://boards.greenhouse.io", &q.location)
        })
        .collect())
}

pub struct GreenhouseProvider {
    base: String,
    boards: Vec<String>,
}

impl GreenhouseProvider {
    pub fn new(base: &str, boards: Vec<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            boards,
        }
    }
}

#[async_trait]
impl JobProvider for GreenhouseProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Aggregator
    }

    fn is_enabled(&self) -> bool {
        !self.boards.is_empty()
    }

    /// Boards are queried concurrently; see `fetch_sites`.
    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let base = self.base.as_str();
        fetch_sites(NAME, &self.boards, q.limit, move |board| {
            let req = http
                .get(format!("{base}/v1/boards/{board}/jobs"))
                .query(&[("content", "true")]);
            async move { get_text(req, NAME).await.and_then(|body| parse(&body, board, q)) }
        })
        .await
    }
}
