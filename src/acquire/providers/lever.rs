// src/acquire/providers/lever.rs
//! Lever public postings, one request per configured company site.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_sites, get_text, parse_json, Draft};
use crate::acquire::normalize::{matches_query, title_case};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "lever";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Posting {
    id: Option<String>,
    text: Option<String>,
    hosted_url: Option<String>,
    categories: Categories,
    description_plain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Categories {
    location: Option<String>,
    team: Option<String>,
}

pub fn parse(body: &str, company: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let postings: Vec<Posting> = parse_json(body, NAME)?;
    Ok(postings
        .into_iter()
        .filter(|p| {
            let hay = format!(
                "{} {}",
                p.text.as_deref().unwrap_or_default(),
                p.categories.team.as_deref().unwrap_or_default()
            );
            matches_query(&hay, &q.query)
        })
        .filter_map(|p| {
            Draft {
                id: p.id,
                title: p.text.unwrap_or_default(),
                company: title_case(company),
                location: p.categories.location.unwrap_or_default(),
                url: p.hosted_url.unwrap_or_default(),
                description: p.description_plain.unwrap_or_default(),
            }
            .finish(NAME, "https://jobs.lever.co", &q.location)
        })
        .collect())
}

pub struct LeverProvider {
    base: String,
    companies: Vec<String>,
}

impl LeverProvider {
    pub fn new(base: &str, companies: Vec<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            companies,
        }
    }
}

#[async_trait]
impl JobProvider for LeverProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Aggregator
    }

    fn is_enabled(&self) -> bool {
        !self.companies.is_empty()
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let base = self.base.as_str();
        fetch_sites(NAME, &self.companies, q.limit, move |company| {
            let req = http
                .get(format!("{base}/v0/postings/{company}"))
                .query(&[("mode", "json")]);
            async move { get_text(req, NAME).await.and_then(|body| parse(&body, company, q)) }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postings_array() {
        let body = r#"[
            {"id":"a1","text":"Senior Backend Engineer","hostedUrl":"https://jobs.lever.co/netflix/a1",
             "categories":{"location":"Los Gatos, CA","team":"Platform"},"descriptionPlain":"Java, Kafka"},
            {"id":"a2","text":"Recruiter","hostedUrl":"https://jobs.lever.co/netflix/a2","categories":{"team":"People"}}
        ]"#;
        let q = SearchQuery {
            query: "backend".into(),
            location: "US".into(),
            limit: 10,
        };
        let jobs = parse(body, "netflix", &q).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Netflix");
        assert_eq!(jobs[0].location, "Los Gatos, CA");
        assert_eq!(jobs[0].description, "Java, Kafka");
    }

    #[test]
    fn object_payload_is_malformed() {
        let q = SearchQuery {
            query: "x".into(),
            location: "US".into(),
            limit: 1,
        };
        let err = parse(r#"{"ok":false}"#, "netflix", &q).unwrap_err();
        assert!(crate::error::is_permanent(&err));
    }
}
