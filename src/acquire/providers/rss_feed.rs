// src/acquire/providers/rss_feed.rs
//! RSS job feeds (RemoteOK, We Work Remotely, Authentic Jobs, Indeed). Same
//! parser, different URL shapes and title conventions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::{get_text, slugify, Draft};
use crate::acquire::normalize::matches_query;
use crate::acquire::types::{JobProvider, JobRecord, ProviderTier, SearchQuery};
use crate::error::PermanentFailure;

/// Feed entries older than this are treated as filled positions.
pub const MAX_ITEM_AGE_SECS: i64 = 60 * 24 * 3600;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    company: Option<String>,
    region: Option<String>,
    location: Option<String>,
}

/// How a feed packs company/location into `<title>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    /// "Acme: Senior Rust Engineer"
    CompanyColonTitle,
    /// "Rust Engineer - Acme - Austin, TX"
    TitleDashCompanyLocation,
    /// Bare position; the company, if any, is a "Company: Acme" line in the description.
    TitleOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    RemoteOk,
    WeWorkRemotely,
    AuthenticJobs,
    Indeed,
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
}

/// (title, company, location) from a feed title.
fn split_title(raw: &str, style: TitleStyle) -> (String, String, String) {
    match style {
        TitleStyle::CompanyColonTitle => match raw.split_once(": ") {
            Some((company, title)) => (title.to_string(), company.to_string(), String::new()),
            None => (raw.to_string(), String::new(), String::new()),
        },
        TitleStyle::TitleDashCompanyLocation => {
            let mut parts = raw.rsplitn(3, " - ").collect::<Vec<_>>();
            parts.reverse();
            match parts.as_slice() {
                [title, company, location] => {
                    (title.to_string(), company.to_string(), location.to_string())
                }
                [title, company] => (title.to_string(), company.to_string(), String::new()),
                _ => (raw.to_string(), String::new(), String::new()),
            }
        }
        TitleStyle::TitleOnly => (raw.to_string(), String::new(), String::new()),
    }
}

/// "Company: Acme Studio<br>" → "Acme Studio"
fn company_from_description(description: &str) -> Option<String> {
    static RE_COMPANY: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_COMPANY.get_or_init(|| regex::Regex::new(r"(?i)\bcompany\s*:\s*([^\n<]+)").unwrap());
    re.captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Parse one feed body. `now_unix` drives the staleness cut-off; items
/// without a parseable date are kept.
pub fn parse(
    xml: &str,
    source: &str,
    style: TitleStyle,
    url_base: &str,
    q: &SearchQuery,
    filter_by_query: bool,
    now_unix: i64,
) -> Result<Vec<JobRecord>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean)
        .map_err(|e| PermanentFailure::new(format!("{source}: malformed rss: {e}")))
        .context("parsing job feed xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        if out.len() >= q.limit {
            break;
        }
        let published = it.pub_date.as_deref().and_then(parse_rfc2822_to_unix);
        if published.is_some_and(|ts| now_unix.saturating_sub(ts) > MAX_ITEM_AGE_SECS) {
            continue;
        }
        let raw_title = it.title.as_deref().unwrap_or_default();
        let (mut title, mut company, mut location) = split_title(raw_title, style);
        if let Some(c) = it.company.filter(|c| !c.trim().is_empty()) {
            // Explicit element wins; the title then is the bare position.
            company = c;
            title = raw_title.to_string();
        }
        if let Some(l) = it.location.or(it.region).filter(|l| !l.trim().is_empty()) {
            location = l;
        }
        let description = it.description.unwrap_or_default();
        if style == TitleStyle::TitleOnly && company.is_empty() {
            company = company_from_description(&description).unwrap_or_default();
        }
        if filter_by_query && !matches_query(&format!("{title} {description}"), &q.query) {
            continue;
        }
        let url = it.link.filter(|l| !l.trim().is_empty()).or(it.guid).unwrap_or_default();
        let draft = Draft {
            id: None,
            title,
            company,
            location,
            url,
            description,
        };
        if let Some(rec) = draft.finish(source, url_base, &q.location) {
            out.push(rec);
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("provider_parse_ms", "provider" => source.to_string()).record(ms);
    Ok(out)
}

pub struct RssFeedProvider {
    name: &'static str,
    feed: Feed,
    base: String,
}

impl RssFeedProvider {
    pub fn remoteok(base: &str) -> Self {
        Self::with_feed("remoteok", Feed::RemoteOk, base)
    }

    pub fn weworkremotely(base: &str) -> Self {
        Self::with_feed("weworkremotely", Feed::WeWorkRemotely, base)
    }

    pub fn authenticjobs(base: &str) -> Self {
        Self::with_feed("authenticjobs", Feed::AuthenticJobs, base)
    }

    pub fn indeed(base: &str) -> Self {
        Self::with_feed("indeed", Feed::Indeed, base)
    }

    fn with_feed(name: &'static str, feed: Feed, base: &str) -> Self {
        Self {
            name,
            feed,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn style(&self) -> TitleStyle {
        match self.feed {
            Feed::Indeed => TitleStyle::TitleDashCompanyLocation,
            Feed::AuthenticJobs => TitleStyle::TitleOnly,
            Feed::RemoteOk | Feed::WeWorkRemotely => TitleStyle::CompanyColonTitle,
        }
    }

    fn request(&self, q: &SearchQuery, http: &reqwest::Client) -> reqwest::RequestBuilder {
        match self.feed {
            Feed::RemoteOk => http.get(format!("{}/remote-{}-jobs.rss", self.base, slugify(&q.query))),
            Feed::WeWorkRemotely => {
                http.get(format!("{}/categories/remote-programming-jobs.rss", self.base))
            }
            Feed::AuthenticJobs => http
                .get(format!("{}/rss/", self.base))
                .query(&[("search", q.query.as_str())]),
            Feed::Indeed => http
                .get(format!("{}/rss", self.base))
                .query(&[("q", q.query.as_str()), ("l", q.location.as_str())]),
        }
    }
}

#[async_trait]
impl JobProvider for RssFeedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Feed
    }

    async fn fetch(&self, q: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>> {
        let body = get_text(self.request(q, http), self.name).await?;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        // Only WWR serves one fixed category feed; the others search server side.
        let filter = self.feed == Feed::WeWorkRemotely;
        parse(&body, self.name, self.style(), &self.base, q, filter, now)
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
