// src/acquire/providers/linkedin_public.rs
//! LinkedIn public search page. Reads the schema.org `JobPosting` blocks
//! embedded as JSON-LD; nothing else on the page is trusted.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

use super::{get_text, Draft};
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};

pub const NAME: &str = "linkedin-public";

fn json_ld_blocks(html: &str) -> impl Iterator<Item = &str> {
    static RE_LD: OnceCell<Regex> = OnceCell::new();
    let re = RE_LD.get_or_init(|| {
        Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
            .unwrap()
    });
    re.captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Flatten single objects, arrays and `@graph` containers into postings.
fn postings(v: Value, out: &mut Vec<Value>) {
    match v {
        Value::Array(items) => items.into_iter().for_each(|i| postings(i, out)),
        Value::Object(mut o) => {
            if let Some(graph) = o.remove("@graph") {
                postings(graph, out);
            }
            if o.get("@type").and_then(Value::as_str) == Some("JobPosting") {
                out.push(Value::Object(o));
            }
        }
        _ => {}
    }
}

fn str_at<'a>(v: &'a Value, path: &[&str]) -> &'a str {
    let mut cur = v;
    for key in path {
        cur = match cur {
            Value::Array(a) => match a.first().and_then(|x| x.get(*key)) {
                Some(x) => x,
                None => return "",
            },
            _ => match cur.get(*key) {
                Some(x) => x,
                None => return "",
            },
        };
    }
    cur.as_str().unwrap_or_default()
}

/// Malformed blocks are skipped, not fatal: one bad script tag should not
/// discard the rest of the page.
pub fn parse(html: &str, q: &SearchQuery) -> Result<Vec<JobRecord>> {
    let mut found = Vec::new();
    for block in json_ld_blocks(html) {
        if let Ok(v) = serde_json::from_str::<Value>(block.trim()) {
            postings(v, &mut found);
        }
    }
    Ok(found
        .iter()
        .filter_map(|p| {
            let id = match p.get("identifier") {
                Some(Value::Object(o)) => o.get("value").and_then(Value::as_str).map(str::to_string),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            };
            Draft {
                id,
                title: str_at(p, &["title"]).to_string(),
                company: str_at(p, &["hiringOrganization", "name"]).to_string(),
                location: str_at(p, &["jobLocation", "address", "addressLocality"]).to_string(),
                url: str_at(p, &["url"]).to_string(),
                description: str_at(p, &["description"]).to_string(),
            }
            .finish(NAME, "https://www.linkedin.com", &q.location)
        })
        .take(q.limit)
        .collect())
}

pub struct LinkedInPublicProvider {
    base: String,
}

impl LinkedInPublicProvider {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobProvider for LinkedInPublicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Feed
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let req = http
            .get(format!("{}/jobs/search/", self.base))
            .header("Accept", "text/html")
            .query(&[("keywords", q.query.as_str()), ("location", q.location.as_str())]);
        let html = get_text(req, NAME).await?;
        parse(&html, q)
    }
}
