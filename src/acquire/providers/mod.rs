// src/acquire/providers/mod.rs
//! Upstream job sources. Each adapter turns one provider's payload into
//! `JobRecord`s; parsing is a pure function so it can be tested from fixtures.

pub mod arbeitnow;
pub mod greenhouse;
pub mod jobicy;
pub mod jsearch;
pub mod lever;
pub mod linkedin_public;
pub mod linkedin_rapidapi;
pub mod rss_feed;
pub mod synthetic;
pub mod usajobs;

use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::acquire::normalize::{normalize_text, repair_url, stable_id};
use crate::acquire::types::{JobProvider, JobRecord};
use crate::config::ProvidersConfig;
use crate::error::PermanentFailure;

/// Every real adapter, highest priority first. The synthetic generator is not
/// part of this list; the engine always runs it last.
pub fn default_providers(cfg: &ProvidersConfig) -> Vec<Arc<dyn JobProvider>> {
    let ep = &cfg.endpoints;
    let mut out: Vec<Arc<dyn JobProvider>> = vec![
        Arc::new(jsearch::JSearchProvider::new(&ep.jsearch, cfg.rapidapi_key.clone())),
        Arc::new(linkedin_rapidapi::LinkedInRapidApiProvider::new(
            &ep.linkedin_rapidapi,
            cfg.rapidapi_key.clone(),
        )),
        Arc::new(usajobs::UsaJobsProvider::new(
            &ep.usajobs,
            cfg.usajobs_key.clone(),
            &cfg.usajobs_contact,
        )),
        Arc::new(greenhouse::GreenhouseProvider::new(
            &ep.greenhouse,
            cfg.greenhouse_boards.clone(),
        )),
        Arc::new(lever::LeverProvider::new(&ep.lever, cfg.lever_companies.clone())),
        Arc::new(arbeitnow::ArbeitnowProvider::new(&ep.arbeitnow)),
        Arc::new(jobicy::JobicyProvider::new(&ep.jobicy)),
        Arc::new(rss_feed::RssFeedProvider::remoteok(&ep.remoteok)),
        Arc::new(rss_feed::RssFeedProvider::weworkremotely(&ep.weworkremotely)),
        Arc::new(rss_feed::RssFeedProvider::authenticjobs(&ep.authenticjobs)),
        Arc::new(rss_feed::RssFeedProvider::indeed(&ep.indeed)),
        Arc::new(linkedin_public::LinkedInPublicProvider::new(&ep.linkedin_public)),
    ];
    // Stable: keeps declaration order inside a tier.
    out.sort_by_key(|p| p.tier());
    out
}

/// Send, then fail on non-2xx. Client errors other than 408/429 are permanent.
pub(crate) async fn send_checked(
    req: reqwest::RequestBuilder,
    what: &str,
) -> Result<reqwest::Response> {
    let resp = req
        .send()
        .await
        .with_context(|| format!("{what}: request failed"))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let msg = format!("{what}: HTTP {}", status.as_u16());
    let retryable = status.as_u16() == 408 || status.as_u16() == 429;
    if status.is_client_error() && !retryable {
        Err(PermanentFailure::new(msg))
    } else {
        Err(anyhow!(msg))
    }
}

pub(crate) async fn get_text(req: reqwest::RequestBuilder, what: &str) -> Result<String> {
    let resp = send_checked(req, what).await?;
    resp.text()
        .await
        .with_context(|| format!("{what}: reading body"))
}

/// Fetch every site (board, company) concurrently and merge the results in
/// site order. Each request keeps its own reqwest timeout. A failing site is
/// logged and skipped; the call fails only when every site returned `Err`.
pub(crate) async fn fetch_sites<'a, F, Fut>(
    provider: &str,
    sites: &'a [String],
    limit: usize,
    fetch_one: F,
) -> Result<Vec<JobRecord>>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<Vec<JobRecord>>>,
{
    let results = join_all(sites.iter().map(|s| fetch_one(s.as_str()))).await;
    let mut out = Vec::new();
    let mut succeeded = 0usize;
    let mut last_err = None;
    for (site, res) in sites.iter().zip(results) {
        match res {
            Ok(jobs) => {
                succeeded += 1;
                out.extend(jobs);
            }
            Err(e) => {
                warn!(target: "acquire", provider, site = %site, error = %e, "site fetch failed");
                last_err = Some(e);
            }
        }
    }
    if succeeded == 0 {
        if let Some(e) = last_err {
            return Err(e.context(format!("{provider}: every site failed")));
        }
    }
    out.truncate(limit);
    Ok(out)
}

/// A malformed payload will not fix itself on retry.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| PermanentFailure::new(format!("{what}: malformed json: {e}")))
}

/// Provider fields before cleanup.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub description: String,
}

impl Draft {
    /// Clean text, enforce the URL policy and fill defaults. `None` means
    /// the record is unusable (no title or no acceptable URL).
    pub fn finish(self, source: &str, url_base: &str, fallback_location: &str) -> Option<JobRecord> {
        let title = normalize_text(&self.title);
        if title.is_empty() {
            return None;
        }
        let url = repair_url(&self.url, url_base)?;
        let company = match normalize_text(&self.company) {
            c if c.is_empty() => "Company".to_string(),
            c => c,
        };
        let location = match normalize_text(&self.location) {
            l if l.is_empty() => fallback_location.to_string(),
            l => l,
        };
        let id = match self.id.map(|s| s.trim().to_string()) {
            Some(id) if !id.is_empty() => format!("{source}-{id}"),
            _ => format!("{source}-{}", stable_id(&[&url])),
        };
        Some(JobRecord {
            id,
            title,
            company,
            location,
            url,
            description: normalize_text(&self.description),
            source: source.to_string(),
        })
    }
}

/// "rust developer" → "rust-developer"
pub(crate) fn slugify(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Host part of a base URL, for `X-RapidAPI-Host`.
pub(crate) fn host_of(base: &str) -> &str {
    let rest = base
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    rest.split('/').next().unwrap_or(rest)
}

/// Treat blank keys as absent.
pub(crate) fn usable_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
