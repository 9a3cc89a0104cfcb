// tests/providers_fixtures.rs
//
// Adapter parsing from recorded payloads, plus a few end-to-end fetches
// against a local mock server via the `JobProvider` trait.

use job_match_engine::acquire::normalize::is_banned_url;
use job_match_engine::acquire::providers::{
    arbeitnow, greenhouse, jobicy, jsearch, lever, linkedin_public, rss_feed, usajobs,
};
use job_match_engine::acquire::types::{JobProvider, SearchQuery};
use job_match_engine::config::HttpConfig;
use job_match_engine::resilience::{CircuitBreaker, CircuitState, ResilientClient};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREENHOUSE_JSON: &str = include_str!("fixtures/greenhouse_board.json");
const LEVER_JSON: &str = include_str!("fixtures/lever_postings.json");
const JSEARCH_JSON: &str = include_str!("fixtures/jsearch.json");
const USAJOBS_JSON: &str = include_str!("fixtures/usajobs.json");
const ARBEITNOW_JSON: &str = include_str!("fixtures/arbeitnow.json");
const JOBICY_JSON: &str = include_str!("fixtures/jobicy.json");
const WWR_XML: &str = include_str!("fixtures/weworkremotely.rss.xml");
const INDEED_XML: &str = include_str!("fixtures/indeed.rss.xml");
const AUTHENTIC_XML: &str = include_str!("fixtures/authenticjobs.rss.xml");
const LINKEDIN_HTML: &str = include_str!("fixtures/linkedin_search.html");

// Tue, 07 Oct 2025 10:00:00 GMT: one day after the feed fixtures were captured.
const FIXTURE_NOW: i64 = 1_759_831_200;

fn q(query: &str, location: &str) -> SearchQuery {
    SearchQuery {
        query: query.into(),
        location: location.into(),
        limit: 20,
    }
}

#[test]
fn greenhouse_fixture_filters_and_cleans() {
    let jobs = greenhouse::parse(GREENHOUSE_JSON, "stripe", &q("data engineer", "US")).unwrap();
    // Account Executive filtered by title, the link-less posting dropped.
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.company == "Stripe" && j.source == "greenhouse"));
    assert_eq!(jobs[0].location, "Seattle, WA");
    assert!(jobs[0].description.starts_with("You will build pipelines in Python"));
    assert!(!jobs[0].description.contains('<'));
}

#[test]
fn lever_fixture_matches_team_or_title() {
    let jobs = lever::parse(LEVER_JSON, "netflix", &q("backend", "US")).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].title, "Senior Backend Engineer - Streaming");
    assert_eq!(jobs[1].location, "Remote");
}

#[test]
fn jsearch_fixture_drops_search_links() {
    let jobs = jsearch::parse(JSEARCH_JSON, "US", 10).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "Globex");
    assert_eq!(jobs[0].location, "Denver, CO, US");
}

#[test]
fn usajobs_fixture() {
    let jobs = usajobs::parse(USAJOBS_JSON, "US", 10).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "Internal Revenue Service");
    assert_eq!(jobs[0].id, "usajobs-IRS-25-12345");
}

#[test]
fn arbeitnow_fixture_uses_tags() {
    let jobs = arbeitnow::parse(ARBEITNOW_JSON, &q("python", "US")).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].location, "Berlin");
    assert_eq!(jobs[0].description, "Python, Airflow, BigQuery.");
}

#[test]
fn jobicy_fixture_prefers_full_description() {
    let jobs = jobicy::parse(JOBICY_JSON, &q("data engineer", "US")).unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs[0].description.contains("Terraform is a plus"));
    assert_eq!(jobs[1].description, "Kafka and Spark.");
}

#[test]
fn weworkremotely_fixture_filters_and_repairs_links() {
    let jobs = rss_feed::parse(
        WWR_XML,
        "weworkremotely",
        rss_feed::TitleStyle::CompanyColonTitle,
        "https://weworkremotely.com",
        &q("rust", "US"),
        true,
        FIXTURE_NOW,
    )
    .unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].company, "Ferrous Labs");
    assert_eq!(jobs[0].location, "Anywhere in the World");
    assert_eq!(
        jobs[1].url,
        "https://weworkremotely.com/remote-jobs/oxide-tools-rust-developer"
    );
    assert_eq!(jobs[1].description, "Compilers and tooling in Rust.");
}

#[test]
fn indeed_fixture_splits_titles() {
    let jobs = rss_feed::parse(
        INDEED_XML,
        "indeed",
        rss_feed::TitleStyle::TitleDashCompanyLocation,
        "https://www.indeed.com",
        &q("data analyst", "Austin, TX"),
        false,
        FIXTURE_NOW,
    )
    .unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].title, "Data Analyst");
    assert_eq!(jobs[0].company, "Lone Star Health");
    assert_eq!(jobs[1].location, "Austin, TX 78701");
}

#[test]
fn authenticjobs_fixture_takes_company_from_description() {
    let jobs = rss_feed::parse(
        AUTHENTIC_XML,
        "authenticjobs",
        rss_feed::TitleStyle::TitleOnly,
        "https://authenticjobs.com",
        &q("designer", "Remote"),
        false,
        FIXTURE_NOW,
    )
    .unwrap();
    // The 2023 posting is past the staleness cut-off.
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].title, "Senior Product Designer");
    assert_eq!(jobs[0].company, "Northwind Studio");
    assert_eq!(jobs[0].location, "Remote");
    assert_eq!(jobs[0].description, "Company: Northwind Studio Figma, design systems and user research.");
    // "company" without a colon is prose, not a label.
    assert_eq!(jobs[1].company, "Company");
}

#[tokio::test]
async fn authenticjobs_fetch_searches_server_side() {
    let server = MockServer::start().await;
    // Undated items are kept, so the wall clock does not matter here.
    let body = r#"<rss version="2.0"><channel><title>Authentic Jobs</title>
<item><title>Product Designer</title><link>https://authenticjobs.com/job/1/product-designer/</link>
<description>Company: Acme Studio</description></item>
<item><title>Copywriter</title><link>https://authenticjobs.com/job/2/copywriter/</link></item>
</channel></rss>"#;
    Mock::given(method("GET"))
        .and(path("/rss/"))
        .and(query_param("search", "product designer"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let provider = rss_feed::RssFeedProvider::authenticjobs(&server.uri());
    assert_eq!(provider.name(), "authenticjobs");
    let jobs = provider
        .fetch(&q("product designer", "US"), &reqwest::Client::new())
        .await
        .unwrap();
    // The feed already searched; nothing is filtered client side.
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].company, "Acme Studio");
    assert_eq!(jobs[1].title, "Copywriter");
}

#[test]
fn linkedin_fixture_reads_json_ld_only() {
    let jobs = linkedin_public::parse(LINKEDIN_HTML, &q("data engineer", "US")).unwrap();
    // The second posting links to a search page and is dropped.
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "Northwind Traders");
    assert_eq!(jobs[0].location, "Chicago");
    assert_eq!(jobs[0].id, "linkedin-public-4012345678");
}

#[test]
fn every_fixture_record_has_an_acceptable_url() {
    let query = q("data", "US");
    let mut all = Vec::new();
    all.extend(greenhouse::parse(GREENHOUSE_JSON, "stripe", &query).unwrap());
    all.extend(lever::parse(LEVER_JSON, "netflix", &q("engineer", "US")).unwrap());
    all.extend(jsearch::parse(JSEARCH_JSON, "US", 10).unwrap());
    all.extend(jobicy::parse(JOBICY_JSON, &query).unwrap());
    all.extend(linkedin_public::parse(LINKEDIN_HTML, &query).unwrap());
    assert!(!all.is_empty());
    for j in &all {
        assert!(!is_banned_url(&j.url), "banned url leaked: {}", j.url);
        assert!(!j.title.is_empty());
        assert!(!j.id.is_empty());
    }
}

#[tokio::test]
async fn greenhouse_fetch_skips_a_failing_board() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/stripe/jobs"))
        .and(query_param("content", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GREENHOUSE_JSON))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/gone/jobs"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = greenhouse::GreenhouseProvider::new(
        &server.uri(),
        vec!["gone".to_string(), "stripe".to_string()],
    );
    let http = reqwest::Client::new();
    let jobs = provider
        .fetch(&q("data engineer", "US"), &http)
        .await
        .expect("one healthy board is enough");
    assert_eq!(jobs.len(), 2);
}

#[tokio::test]
async fn greenhouse_slow_boards_fit_in_one_attempt() {
    let server = MockServer::start().await;
    for board in ["stripe", "airbnb"] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/boards/{board}/jobs")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(GREENHOUSE_JSON)
                    .set_delay(Duration::from_millis(700)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    // Each board alone takes most of the request budget.
    let cfg = HttpConfig {
        max_retries: 0,
        base_delay_ms: 1,
        request_timeout_ms: 1_000,
        ..HttpConfig::default()
    };
    let client = ResilientClient::new(&cfg, Arc::new(CircuitBreaker::default())).expect("client");
    let provider = greenhouse::GreenhouseProvider::new(
        &server.uri(),
        vec!["stripe".to_string(), "airbnb".to_string()],
    );
    let query = q("data engineer", "US");
    let jobs = client
        .call(provider.name(), || provider.fetch(&query, client.http()))
        .await
        .expect("both boards answered within their own timeout");
    assert_eq!(jobs.len(), 4);
    assert_eq!(jobs[2].company, "Airbnb");

    let state = client.breaker().state("greenhouse");
    assert_eq!(state.state, CircuitState::Closed);
    assert_eq!(state.consecutive_failures, 0);
}

#[tokio::test]
async fn greenhouse_empty_board_beside_a_failing_one_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/quiet/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"jobs":[]}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/down/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = greenhouse::GreenhouseProvider::new(
        &server.uri(),
        vec!["quiet".to_string(), "down".to_string()],
    );
    let jobs = provider
        .fetch(&q("data engineer", "US"), &reqwest::Client::new())
        .await
        .expect("a board that answered keeps the provider healthy");
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn lever_fetch_fails_when_every_company_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = lever::LeverProvider::new(&server.uri(), vec!["uber".into(), "netflix".into()]);
    let http = reqwest::Client::new();
    let err = provider.fetch(&q("backend", "US"), &http).await.unwrap_err();
    assert!(format!("{err:#}").contains("HTTP 500"));
    assert!(!job_match_engine::error::is_permanent(&err));
}

#[tokio::test]
async fn jobicy_fetch_sends_tag_and_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/remote-jobs"))
        .and(query_param("tag", "data-engineer"))
        .and(query_param("count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(JOBICY_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let provider = jobicy::JobicyProvider::new(&server.uri());
    let jobs = provider
        .fetch(&q("Data Engineer", "US"), &reqwest::Client::new())
        .await
        .unwrap();
    assert_eq!(jobs.len(), 2);
}
