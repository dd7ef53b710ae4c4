//! End-to-end campaign tests against a fake EDGAR.

use approx::assert_relative_eq;
use async_trait::async_trait;
use factsheet::data::cache::MemoryCache;
use factsheet::data::edgar::{Fetcher, HttpResponse, RetryConfig, Transport};
use factsheet::data::{DataError, Result as DataResult};
use factsheet::metrics::{ExclusionReason, Metric};
use factsheet::{Campaign, CampaignEvent, CompanyRecord, Roster, RunConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const BASE: &str = "http://edgar.test";
const TICKERS_URL: &str = "http://edgar.test/files/company_tickers.json";

const TICKERS: &str = r#"{
    "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
    "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
}"#;

fn facts_url(cik: u64) -> String {
    format!("{BASE}/api/xbrl/companyfacts/CIK{cik:010}.json")
}

fn usd_facts(name: &str, unit: &str) -> String {
    let duration = |tag: &str, val: f64| {
        format!(
            r#""{tag}": {{"units": {{"{unit}": [
                {{"start": "2022-10-01", "end": "2023-09-30", "val": {val},
                  "accn": "0000000001-23-000001", "fy": 2023, "fp": "FY",
                  "form": "10-K", "filed": "2023-11-03"}}
            ]}}}}"#
        )
    };
    let instant = |tag: &str, val: f64| {
        format!(
            r#""{tag}": {{"units": {{"{unit}": [
                {{"end": "2023-09-30", "val": {val},
                  "accn": "0000000001-23-000001", "fy": 2023, "fp": "FY",
                  "form": "10-K", "filed": "2023-11-03"}}
            ]}}}}"#
        )
    };
    format!(
        r#"{{"cik": 1, "entityName": "{name}", "facts": {{"us-gaap": {{
            {}, {}, {}, {}, {}
        }}}}}}"#,
        duration("Revenues", 383_285_000_000.0),
        duration("NetIncomeLoss", 96_995_000_000.0),
        instant("Liabilities", 290_437_000_000.0),
        instant("StockholdersEquity", 62_146_000_000.0),
        duration("NetCashProvidedByUsedInOperatingActivities", 110_543_000_000.0),
    )
}

const EMPTY_FACTS: &str = r#"{"cik": 42, "entityName": "Shell Co", "facts": {}}"#;

/// Fake transport answering by URL. Each URL has a queue of responses; the
/// last one repeats. Unknown URLs answer 404.
#[derive(Debug, Default)]
struct FakeEdgar {
    routes: Mutex<HashMap<String, Vec<HttpResponse>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeEdgar {
    fn route(self, url: impl Into<String>, responses: Vec<HttpResponse>) -> Self {
        self.routes.lock().unwrap().insert(url.into(), responses);
        self
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Transport for FakeEdgar {
    async fn get(&self, url: &str) -> DataResult<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(url) else {
            return Ok(HttpResponse::status(404));
        };
        match queue.len() {
            0 => Err(DataError::Transport {
                message: "no response scripted".to_string(),
                retryable: false,
            }),
            1 => Ok(queue[0].clone()),
            _ => Ok(queue.remove(0)),
        }
    }
}

fn config() -> RunConfig {
    RunConfig {
        data_base_url: BASE.to_string(),
        tickers_url: TICKERS_URL.to_string(),
        request_delay: Duration::ZERO,
        pause_seconds: Duration::ZERO,
        retry: RetryConfig::fixed(Duration::ZERO, 3),
        ..RunConfig::default()
    }
}

fn fetcher(transport: Arc<FakeEdgar>, config: &RunConfig) -> Fetcher {
    Fetcher::new(transport, Box::new(MemoryCache::new()), config.fetcher_config())
}

fn cik(n: u64) -> Option<factsheet::data::edgar::Cik> {
    factsheet::data::edgar::Cik::from_number(n).ok()
}

#[tokio::test]
async fn test_mixed_roster_outcomes() {
    let transport = Arc::new(
        FakeEdgar::default()
            .route(TICKERS_URL, vec![HttpResponse::ok(TICKERS)])
            .route(facts_url(320193), vec![HttpResponse::ok(usd_facts("Apple Inc.", "USD"))])
            .route(facts_url(111), vec![HttpResponse::ok(usd_facts("Euro AG", "EUR"))])
            .route(facts_url(222), vec![HttpResponse::status(429)])
            .route(facts_url(42), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let config = config();
    let fetcher = fetcher(transport.clone(), &config);

    let roster = Roster::new(vec![
        CompanyRecord::new("AAPL", "", None),
        CompanyRecord::new("EURO", "Euro AG", cik(111)),
        CompanyRecord::new("NOPE", "Nope Inc", None),
        CompanyRecord::new("SLOW", "Throttled Corp", cik(222)),
        CompanyRecord::new("SHELL", "", cik(42)),
    ])
    .unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();

    assert_eq!(results.considered, 5);
    assert_eq!(results.companies.len(), 1);

    let apple = &results.companies[0];
    assert_eq!(apple.name, "Apple Inc.");
    assert_relative_eq!(apple.value(Metric::Revenue).unwrap(), 383285.0);
    assert_relative_eq!(apple.liabilities_to_equity.unwrap(), 290437.0 / 62146.0, epsilon = 1e-9);
    assert!(!apple.is_partial());
    assert_eq!(results.provenance.len(), 5);

    let reasons: Vec<(&str, ExclusionReason)> = results
        .exclusions
        .iter()
        .map(|e| (e.symbol.as_str(), e.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("EURO", ExclusionReason::NonUsd),
            ("NOPE", ExclusionReason::Unresolved),
            ("SLOW", ExclusionReason::FetchFailed),
            ("SHELL", ExclusionReason::NoData),
        ]
    );

    // bound exhausted for SLOW, yet SHELL after it was still fetched
    assert_eq!(transport.calls_to(&facts_url(222)), 3);
    assert_eq!(transport.calls_to(&facts_url(42)), 1);

    let summary = results.summary();
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.excluded(), 4);
}

#[tokio::test]
async fn test_limit_then_resume() {
    let transport = Arc::new(
        FakeEdgar::default()
            .route(facts_url(1), vec![HttpResponse::ok(EMPTY_FACTS)])
            .route(facts_url(2), vec![HttpResponse::ok(EMPTY_FACTS)])
            .route(facts_url(3), vec![HttpResponse::ok(EMPTY_FACTS)])
            .route(facts_url(4), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let config = RunConfig {
        limit: Some(3),
        resume_from: Some("bbb".to_string()),
        ..config()
    };
    let fetcher = fetcher(transport.clone(), &config);

    let roster = Roster::new(vec![
        CompanyRecord::new("AAA", "", cik(1)),
        CompanyRecord::new("BBB", "", cik(2)),
        CompanyRecord::new("CCC", "", cik(3)),
        CompanyRecord::new("DDD", "", cik(4)),
    ])
    .unwrap();

    let mut skipped = Vec::new();
    let mut processed = Vec::new();
    let results = Campaign::from_config(&fetcher, &config)
        .run_with_progress(&roster, |event| match event {
            CampaignEvent::Skipped(record) => skipped.push(record.symbol.clone()),
            CampaignEvent::Processed(record, _) => processed.push(record.symbol.clone()),
        })
        .await
        .unwrap();

    assert_eq!(skipped, vec!["AAA"]);
    assert_eq!(processed, vec!["BBB", "CCC"]);
    assert_eq!(results.considered, 2);
    assert_eq!(transport.calls_to(&facts_url(1)), 0);
    assert_eq!(transport.calls_to(&facts_url(4)), 0);
    // no row lacks a CIK, so the ticker table is never requested
    assert_eq!(transport.calls_to(TICKERS_URL), 0);
}

#[tokio::test]
async fn test_resume_by_cik() {
    let transport = Arc::new(
        FakeEdgar::default().route(facts_url(2), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let config = RunConfig {
        resume_from: Some("0000000002".to_string()),
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![
        CompanyRecord::new("AAA", "", cik(1)),
        CompanyRecord::new("BBB", "", cik(2)),
    ])
    .unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();
    assert_eq!(results.considered, 1);
    assert_eq!(results.exclusions[0].symbol, "BBB");
}

#[tokio::test]
async fn test_missing_resume_marker_processes_nothing() {
    let transport = Arc::new(FakeEdgar::default());
    let config = RunConfig {
        resume_from: Some("ZZZ".to_string()),
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![CompanyRecord::new("AAA", "", cik(1))]).unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();
    assert_eq!(results.considered, 0);
    assert!(results.exclusions.is_empty());
}

#[tokio::test]
async fn test_ticker_table_failure_only_affects_unmapped_rows() {
    let transport = Arc::new(
        FakeEdgar::default()
            .route(TICKERS_URL, vec![HttpResponse::status(500)])
            .route(facts_url(320193), vec![HttpResponse::ok(usd_facts("Apple Inc.", "USD"))]),
    );
    let config = config();
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![
        CompanyRecord::new("MSFT", "Microsoft", None),
        CompanyRecord::new("AAPL", "Apple Inc.", cik(320193)),
    ])
    .unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();

    assert_eq!(results.companies.len(), 1);
    assert_eq!(results.exclusions.len(), 1);
    assert_eq!(results.exclusions[0].reason, ExclusionReason::Unresolved);
}

#[tokio::test]
async fn test_golden_filter_applies_before_limit() {
    let transport = Arc::new(
        FakeEdgar::default().route(facts_url(320193), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let config = RunConfig {
        golden_only: true,
        limit: Some(1),
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![
        CompanyRecord::new("ZZZ", "", cik(9)),
        CompanyRecord::new("AAPL", "", cik(320193)),
        CompanyRecord::new("MSFT", "", cik(789019)),
    ])
    .unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();
    assert_eq!(results.considered, 1);
    assert_eq!(results.exclusions[0].symbol, "AAPL");
}

#[tokio::test]
async fn test_write_outputs() {
    let transport = Arc::new(
        FakeEdgar::default()
            .route(facts_url(320193), vec![HttpResponse::ok(usd_facts("Apple Inc.", "USD"))])
            .route(facts_url(42), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        output_dir: dir.path().join("out"),
        write_json: true,
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![
        CompanyRecord::new("AAPL", "Apple Inc.", cik(320193)),
        CompanyRecord::new("SHELL", "Shell Co", cik(42)),
    ])
    .unwrap();

    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();
    let files = results.write_outputs(&config).unwrap();

    assert!(files.metrics.ends_with("fy2023_metrics.csv"));
    let metrics = std::fs::read_to_string(&files.metrics).unwrap();
    assert!(metrics.starts_with("symbol,name,identifier,fiscal_year"));
    assert_eq!(metrics.lines().count(), 2);

    let excluded = std::fs::read_to_string(&files.exclusions).unwrap();
    assert!(excluded.contains("SHELL"));
    assert!(excluded.contains("NO_DATA"));

    let provenance = std::fs::read_to_string(&files.provenance).unwrap();
    assert_eq!(provenance.lines().count(), 6);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(files.report.unwrap()).unwrap()).unwrap();
    assert_eq!(report["fiscal_year"], 2023);
    assert_eq!(report["companies"].as_array().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_periodic_pause_between_companies() {
    let mut fake = FakeEdgar::default();
    for n in 1..=5 {
        fake = fake.route(facts_url(n), vec![HttpResponse::ok(EMPTY_FACTS)]);
    }
    let transport = Arc::new(fake);
    let config = RunConfig {
        resume_from: Some("B".to_string()),
        pause_every: 2,
        pause_seconds: Duration::from_secs(30),
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(
        ["A", "B", "C", "D", "E"]
            .into_iter()
            .zip(1..)
            .map(|(symbol, n)| CompanyRecord::new(symbol, "", cik(n)))
            .collect(),
    )
    .unwrap();

    let start = Instant::now();
    let mut timeline = Vec::new();
    Campaign::from_config(&fetcher, &config)
        .run_with_progress(&roster, |event| {
            if let CampaignEvent::Processed(record, _) = event {
                timeline.push((record.symbol.clone(), start.elapsed().as_secs()));
            }
        })
        .await
        .unwrap();

    // skipped rows do not count toward the pause
    let expected: Vec<(String, u64)> = [("B", 0), ("C", 0), ("D", 30), ("E", 30)]
        .into_iter()
        .map(|(s, t)| (s.to_string(), t))
        .collect();
    assert_eq!(timeline, expected);
}

#[tokio::test(start_paused = true)]
async fn test_request_delay_paces_each_company() {
    let transport = Arc::new(
        FakeEdgar::default()
            .route(facts_url(1), vec![HttpResponse::ok(EMPTY_FACTS)])
            .route(facts_url(2), vec![HttpResponse::ok(EMPTY_FACTS)]),
    );
    let config = RunConfig {
        request_delay: Duration::from_secs(1),
        pause_every: 0,
        pause_seconds: Duration::from_secs(30),
        ..config()
    };
    let fetcher = fetcher(transport, &config);
    let roster = Roster::new(vec![
        CompanyRecord::new("AAA", "", cik(1)),
        CompanyRecord::new("BBB", "", cik(2)),
    ])
    .unwrap();

    let start = Instant::now();
    let results = Campaign::from_config(&fetcher, &config)
        .run(&roster)
        .await
        .unwrap();
    assert_eq!(results.considered, 2);
    assert_eq!(start.elapsed().as_secs(), 2);
}
