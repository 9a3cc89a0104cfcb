// src/acquire/mod.rs
//! Acquisition orchestrator: walk the provider list through the resilient
//! client, dedup, top up with synthetic records, then score and rank.
//!
//! `acquire` has no error path. Provider failures become provenance entries
//! and the result always holds at least one record.

pub mod normalize;
pub mod providers;
pub mod types;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{AcquireConfig, EngineConfig, ProvidersConfig};
use crate::error::ProviderError;
use crate::resilience::{CircuitBreaker, ResilientClient};
use crate::skills::{
    build_candidate_vector, build_requirement_vector, generate_fix_actions, score,
};
use normalize::{dedup_key, dedup_records, stable_id};
use providers::synthetic::{self, SyntheticGenerator};
use types::{
    AcquisitionRequest, AcquisitionResult, JobProvider, JobRecord, Provenance, ScoredJob,
    SearchQuery,
};

pub const MIN_DESIRED: usize = 1;
pub const MAX_DESIRED: usize = 100;
pub const DEFAULT_QUERY: &str = "jobs";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("acquire_requests_total", "Acquisition requests handled.");
        describe_counter!(
            "acquire_synthetic_total",
            "Synthetic records included in results."
        );
        describe_counter!(
            "acquire_dedup_total",
            "Records dropped by (title, company, location) dedup."
        );
        describe_counter!(
            "acquire_placeholder_total",
            "Requests answered with the hard-coded placeholder."
        );
        describe_counter!(
            "provider_calls_total",
            "Provider calls by outcome (ok, failed, skipped)."
        );
        describe_counter!("provider_retries_total", "Provider retry attempts.");
        describe_counter!(
            "breaker_transitions_total",
            "Circuit breaker state transitions."
        );
        describe_histogram!("acquire_duration_ms", "End-to-end acquisition time in milliseconds.");
        describe_histogram!("provider_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// What the provider walk produced, before dedup and top-up.
#[derive(Debug, Default)]
struct Walk {
    records: Vec<JobRecord>,
    skipped: Vec<String>,
    failed: Vec<String>,
    deadline_hit: bool,
}

impl Walk {
    fn note_error(&mut self, e: ProviderError) {
        if e.is_unavailable() {
            self.skipped.push(e.provider().to_string());
        } else {
            warn!(target: "acquire", provider = e.provider(), error = %e, "provider failed");
            self.failed.push(e.provider().to_string());
        }
    }
}

pub struct AcquisitionEngine {
    providers: Vec<Arc<dyn JobProvider>>,
    client: ResilientClient,
    synthetic: SyntheticGenerator,
    cfg: AcquireConfig,
    provider_cfg: ProvidersConfig,
}

impl AcquisitionEngine {
    /// Engine with the built-in provider list and a fresh breaker.
    pub fn from_config(cfg: &EngineConfig) -> anyhow::Result<Self> {
        let breaker = Arc::new(CircuitBreaker::new(&cfg.breaker));
        let client = ResilientClient::new(&cfg.http, breaker)?;
        let providers = providers::default_providers(&cfg.providers);
        Ok(Self::with_providers(cfg, client, providers))
    }

    /// Engine over an explicit provider list (priority order as given).
    pub fn with_providers(
        cfg: &EngineConfig,
        client: ResilientClient,
        providers: Vec<Arc<dyn JobProvider>>,
    ) -> Self {
        Self {
            providers,
            client,
            synthetic: SyntheticGenerator::new(&cfg.acquire.synthetic_url_base),
            cfg: cfg.acquire.clone(),
            provider_cfg: cfg.providers.clone(),
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        self.client.breaker()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn search_query(&self, req: &AcquisitionRequest) -> SearchQuery {
        let query = match req.query.trim() {
            "" => DEFAULT_QUERY.to_string(),
            q => q.to_string(),
        };
        let location = match req.location.trim() {
            "" => self.cfg.default_location.clone(),
            l => l.to_string(),
        };
        SearchQuery {
            query,
            location,
            limit: req.desired_count.clamp(MIN_DESIRED, MAX_DESIRED),
        }
    }

    fn is_runnable(&self, p: &dyn JobProvider) -> bool {
        p.is_enabled() && !self.provider_cfg.is_disabled(p.name())
    }

    /// Never fails, never returns an empty item list.
    pub async fn acquire(&self, req: &AcquisitionRequest) -> AcquisitionResult {
        ensure_metrics_described();
        counter!("acquire_requests_total").increment(1);
        let t0 = Instant::now();
        let q = self.search_query(req);
        let query_hash = stable_id(&[&q.query]);
        let deadline = t0 + self.cfg.request_deadline();
        debug!(target: "acquire", query_hash = %query_hash, desired = q.limit, fan_out = self.cfg.fan_out, "acquisition started");

        let walk = if self.cfg.fan_out {
            self.walk_concurrent(&q, deadline).await
        } else {
            self.walk_sequential(&q, deadline).await
        };
        let Walk {
            records,
            skipped,
            failed,
            deadline_hit,
        } = walk;

        let (mut jobs, mut dropped) = dedup_records(records);
        jobs.truncate(q.limit);
        let (synthetic_added, synthetic_dropped) = self.top_up(&q, &mut jobs);
        dropped += synthetic_dropped;

        if jobs.is_empty() {
            counter!("acquire_placeholder_total").increment(1);
            warn!(target: "acquire", query_hash = %query_hash, "no records after top-up, using placeholder");
            jobs.push(placeholder(&q.location));
        }

        let items = self.score_all(req, jobs);
        let provenance = provenance(&items, skipped, failed, deadline_hit);

        let elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0;
        counter!("acquire_synthetic_total").increment(synthetic_added as u64);
        counter!("acquire_dedup_total").increment(dropped as u64);
        histogram!("acquire_duration_ms").record(elapsed_ms);
        info!(
            target: "acquire",
            query_hash = %query_hash,
            total = provenance.total_count,
            primary = %provenance.primary_source,
            synthetic = provenance.synthetic_count,
            skipped = provenance.skipped.len(),
            failed = provenance.failed.len(),
            deadline_hit,
            elapsed_ms,
            "acquisition finished"
        );

        AcquisitionResult { items, provenance }
    }

    /// Priority order; stops once `limit` distinct records are in hand or the
    /// deadline fires.
    async fn walk_sequential(&self, q: &SearchQuery, deadline: Instant) -> Walk {
        let mut walk = Walk::default();
        let mut seen = HashSet::new();
        let http = self.client.http();

        for p in &self.providers {
            if seen.len() >= q.limit {
                break;
            }
            if !self.is_runnable(p.as_ref()) {
                walk.skipped.push(p.name().to_string());
                continue;
            }
            if Instant::now() >= deadline {
                walk.deadline_hit = true;
                break;
            }
            let call = self.client.call(p.name(), || p.fetch(q, http));
            match tokio::time::timeout_at(deadline, call).await {
                Ok(Ok(found)) => {
                    debug!(target: "acquire", provider = p.name(), count = found.len(), "provider returned");
                    for job in found {
                        seen.insert(dedup_key(&job));
                        walk.records.push(job);
                    }
                }
                Ok(Err(e)) => walk.note_error(e),
                Err(_) => {
                    warn!(target: "acquire", provider = p.name(), "request deadline reached mid-call");
                    walk.deadline_hit = true;
                    break;
                }
            }
        }
        walk
    }

    /// Every runnable provider at once; results re-ordered by priority.
    async fn walk_concurrent(&self, q: &SearchQuery, deadline: Instant) -> Walk {
        let mut walk = Walk::default();
        let http = self.client.http();
        let mut pending = FuturesUnordered::new();

        for (idx, p) in self.providers.iter().enumerate() {
            if !self.is_runnable(p.as_ref()) {
                walk.skipped.push(p.name().to_string());
                continue;
            }
            let client = &self.client;
            pending.push(async move {
                let res = client.call(p.name(), || p.fetch(q, http)).await;
                (idx, res)
            });
        }

        let mut done: Vec<(usize, Vec<JobRecord>)> = Vec::new();
        loop {
            let next = tokio::time::timeout_at(deadline, pending.next()).await;
            match next {
                Ok(Some((idx, Ok(found)))) => done.push((idx, found)),
                Ok(Some((_, Err(e)))) => walk.note_error(e),
                Ok(None) => break,
                Err(_) => {
                    warn!(target: "acquire", outstanding = pending.len(), "request deadline reached, keeping partial results");
                    walk.deadline_hit = true;
                    break;
                }
            }
        }

        done.sort_by_key(|(idx, _)| *idx);
        walk.records = done.into_iter().flat_map(|(_, jobs)| jobs).collect();
        walk
    }

    /// Fill up to `q.limit` with synthetic records, skipping any that collide
    /// with what is already there. Returns (added, dropped).
    fn top_up(&self, q: &SearchQuery, jobs: &mut Vec<JobRecord>) -> (usize, usize) {
        let mut seen: HashSet<_> = jobs.iter().map(dedup_key).collect();
        let mut slot = 0usize;
        let mut added = 0usize;
        let mut dropped = 0usize;
        for _ in 0..self.cfg.max_topup_rounds.max(1) {
            if jobs.len() >= q.limit {
                break;
            }
            let need = q.limit - jobs.len();
            for job in self.synthetic.generate(&q.query, &q.location, slot, need) {
                if seen.insert(dedup_key(&job)) {
                    jobs.push(job);
                    added += 1;
                } else {
                    dropped += 1;
                }
            }
            slot += need;
        }
        (added, dropped)
    }

    /// Score every record and sort by score, highest first (stable).
    fn score_all(&self, req: &AcquisitionRequest, jobs: Vec<JobRecord>) -> Vec<ScoredJob> {
        let candidate = build_candidate_vector(&req.candidate_profile);
        let raw_text = match req.resume_text.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => req.candidate_profile.as_text(),
        };

        let mut items: Vec<ScoredJob> = jobs
            .into_iter()
            .map(|job| {
                let requirement =
                    build_requirement_vector(&format!("{} {}", job.title, job.description));
                let outcome = score(&candidate, &requirement, &raw_text);
                let fix_actions = generate_fix_actions(&outcome.gap_skills, &raw_text);
                ScoredJob {
                    job,
                    match_score: outcome.score,
                    why_fit: outcome.why_fit,
                    gaps: outcome.gaps,
                    fix_actions,
                }
            })
            .collect();
        items.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        items
    }
}

fn placeholder(location: &str) -> JobRecord {
    JobRecord {
        id: "placeholder-0".to_string(),
        title: "Open Position".to_string(),
        company: "Hiring Company".to_string(),
        location: location.to_string(),
        url: "https://www.linkedin.com/jobs/".to_string(),
        description: "General opening.".to_string(),
        source: synthetic::NAME.to_string(),
    }
}

/// Most frequent source wins; ties go to the one seen first.
fn provenance(
    items: &[ScoredJob],
    skipped: Vec<String>,
    failed: Vec<String>,
    deadline_hit: bool,
) -> Provenance {
    let mut sources: BTreeMap<String, usize> = BTreeMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for it in items {
        let s = it.job.source.as_str();
        let n = sources.entry(s.to_string()).or_insert(0);
        if *n == 0 {
            first_seen.push(s);
        }
        *n += 1;
    }
    let mut primary = "";
    let mut best = 0usize;
    for s in first_seen {
        let n = sources.get(s).copied().unwrap_or_default();
        if n > best {
            best = n;
            primary = s;
        }
    }
    Provenance {
        primary_source: primary.to_string(),
        total_count: items.len(),
        synthetic_count: sources.get(synthetic::NAME).copied().unwrap_or_default(),
        sources,
        skipped,
        failed,
        deadline_hit,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(source: &str, score: u8) -> ScoredJob {
        ScoredJob {
            job: JobRecord {
                id: format!("{source}-{score}"),
                title: "t".into(),
                company: "c".into(),
                location: "l".into(),
                url: "https://a.org".into(),
                description: String::new(),
                source: source.into(),
            },
            match_score: score,
            why_fit: vec![],
            gaps: vec![],
            fix_actions: vec![],
        }
    }

    #[test]
    fn primary_source_is_most_common_then_first() {
        let items = vec![
            scored("lever", 90),
            scored("synthetic", 80),
            scored("synthetic", 70),
            scored("lever", 60),
        ];
        let p = provenance(&items, vec![], vec!["jsearch".into()], false);
        assert_eq!(p.primary_source, "lever");
        assert_eq!(p.total_count, 4);
        assert_eq!(p.synthetic_count, 2);
        assert_eq!(p.sources.get("lever"), Some(&2));
        assert_eq!(p.failed, vec!["jsearch".to_string()]);
    }

    #[test]
    fn search_query_normalisation() {
        let cfg = EngineConfig::default();
        let breaker = Arc::new(CircuitBreaker::new(&cfg.breaker));
        let client = ResilientClient::new(&cfg.http, breaker).unwrap();
        let engine = AcquisitionEngine::with_providers(&cfg, client, vec![]);
        let req = |q: &str, l: &str, n: usize| AcquisitionRequest {
            query: q.into(),
            location: l.into(),
            desired_count: n,
            candidate_profile: Default::default(),
            resume_text: None,
        };
        let q = engine.search_query(&req("  ", "", 0));
        assert_eq!(q.query, DEFAULT_QUERY);
        assert_eq!(q.location, "US");
        assert_eq!(q.limit, 1);
        assert_eq!(engine.search_query(&req("rust", "Berlin", 500)).limit, 100);
    }

    #[test]
    fn placeholder_url_is_allowed() {
        assert!(!normalize::is_banned_url(&placeholder("US").url));
    }
}
