//! Sequential extraction campaign over a roster.
//!
//! Companies are processed one at a time: resolve the CIK, fetch the
//! company-facts document, extract metrics. A failure for one company turns
//! into an exclusion record and the loop moves on; only problems detected
//! before the loop starts abort a run.

use crate::config::RunConfig;
use crate::error::Result;
use crate::roster::{CompanyRecord, Roster};
use factsheet_data::edgar::{Cik, FetchStats, Fetcher, Resolver};
use factsheet_metrics::{
    CompanyMetrics, CompanyOutcome, ExclusionReason, ExclusionRecord, Extractor, ProvenanceLog,
};
use factsheet_output::{
    ExportFormat, Exporter, RunReport, RunSummary, exclusion_rows, metrics_rows, provenance_rows,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Which companies to process and how to pace them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignOptions {
    /// Restrict the roster to the golden set
    pub golden_only: bool,
    /// Keep only the first `limit` companies (after the golden filter)
    pub limit: Option<usize>,
    /// Skip companies until this symbol or CIK
    pub resume_from: Option<String>,
    /// Pause every this many processed companies (0 disables)
    pub pause_every: usize,
    /// Length of the pause
    pub pause_seconds: Duration,
}

impl From<&RunConfig> for CampaignOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            golden_only: config.golden_only,
            limit: config.limit,
            resume_from: config.resume_from.clone(),
            pause_every: config.pause_every,
            pause_seconds: config.pause_seconds,
        }
    }
}

/// Progress notification for one roster row.
#[derive(Debug)]
pub enum CampaignEvent<'a> {
    /// Row skipped while looking for the resume marker
    Skipped(&'a CompanyRecord),
    /// Row processed
    Processed(&'a CompanyRecord, &'a CompanyOutcome),
}

/// Everything a campaign produced.
#[derive(Debug, Clone, Default)]
pub struct CampaignResults {
    /// Target fiscal year
    pub fiscal_year: i32,
    /// Companies processed (rows skipped for resume are not counted)
    pub considered: usize,
    /// Companies with extracted metrics
    pub companies: Vec<CompanyMetrics>,
    /// Excluded companies
    pub exclusions: Vec<ExclusionRecord>,
    /// Provenance of every selected fact
    pub provenance: ProvenanceLog,
    /// Fetcher counters at the end of the run
    pub fetch_stats: FetchStats,
}

/// Files written by [`CampaignResults::write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Metrics CSV
    pub metrics: PathBuf,
    /// Provenance CSV
    pub provenance: PathBuf,
    /// Exclusions CSV
    pub exclusions: PathBuf,
    /// Full JSON report, when requested
    pub report: Option<PathBuf>,
}

impl CampaignResults {
    /// Tally of the run.
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(
            self.fiscal_year,
            self.considered,
            &self.companies,
            &self.exclusions,
        )
    }

    /// Write the CSV outputs, and the JSON report when `config.write_json`.
    pub fn write_outputs(&self, config: &RunConfig) -> Result<OutputFiles> {
        std::fs::create_dir_all(&config.output_dir)?;

        let table = ExportFormat::Csv;
        let report = ExportFormat::PrettyJson;
        let files = OutputFiles {
            metrics: config.output_path("metrics", table.extension()),
            provenance: config.output_path("provenance", table.extension()),
            exclusions: config.output_path("excluded", table.extension()),
            report: config
                .write_json
                .then(|| config.output_path("report", report.extension())),
        };

        metrics_rows(&self.companies).export_to_file(&files.metrics, table)?;
        provenance_rows(self.provenance.entries()).export_to_file(&files.provenance, table)?;
        exclusion_rows(&self.exclusions).export_to_file(&files.exclusions, table)?;

        if let Some(path) = &files.report {
            RunReport::new(
                self.fiscal_year,
                self.companies.clone(),
                self.exclusions.clone(),
                self.provenance.entries().to_vec(),
            )
            .export_to_file(path, report)?;
        }

        info!(dir = %config.output_dir.display(), "wrote outputs");
        Ok(files)
    }
}

/// Drives extraction over a roster.
#[derive(Debug)]
pub struct Campaign<'a> {
    fetcher: &'a Fetcher,
    extractor: Extractor,
    options: CampaignOptions,
}

impl<'a> Campaign<'a> {
    /// Create a campaign.
    pub const fn new(fetcher: &'a Fetcher, extractor: Extractor, options: CampaignOptions) -> Self {
        Self {
            fetcher,
            extractor,
            options,
        }
    }

    /// Create a campaign from a run config.
    pub fn from_config(fetcher: &'a Fetcher, config: &RunConfig) -> Self {
        Self::new(
            fetcher,
            Extractor::new(config.metrics.clone(), config.fiscal_year),
            CampaignOptions::from(config),
        )
    }

    /// Options in use.
    pub const fn options(&self) -> &CampaignOptions {
        &self.options
    }

    /// Apply the golden filter and the limit.
    pub fn plan(&self, roster: &Roster) -> Result<Roster> {
        let mut planned = if self.options.golden_only {
            roster.golden_only()?
        } else {
            roster.clone()
        };
        if let Some(limit) = self.options.limit {
            planned.truncate(limit);
        }
        Ok(planned)
    }

    /// Run without progress reporting.
    pub async fn run(&self, roster: &Roster) -> Result<CampaignResults> {
        self.run_with_progress(roster, |_| {}).await
    }

    /// Run, calling `on_event` once per planned roster row.
    pub async fn run_with_progress<F>(&self, roster: &Roster, mut on_event: F) -> Result<CampaignResults>
    where
        F: FnMut(CampaignEvent<'_>),
    {
        let planned = self.plan(roster)?;
        let resolver = self.load_resolver(&planned).await;

        let mut results = CampaignResults {
            fiscal_year: self.extractor.fiscal_year(),
            ..CampaignResults::default()
        };
        let mut resuming = self
            .options
            .resume_from
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        info!(
            companies = planned.len(),
            fiscal_year = results.fiscal_year,
            "starting extraction"
        );

        for record in planned.companies() {
            let resolved = resolve(record, resolver.as_ref());

            if let Some(marker) = resuming {
                if !record.matches(marker, resolved.as_ref().ok()) {
                    on_event(CampaignEvent::Skipped(record));
                    continue;
                }
                info!(company = %record.label(), "resuming");
                resuming = None;
            }

            if self.options.pause_every > 0
                && results.considered > 0
                && results.considered % self.options.pause_every == 0
                && !self.options.pause_seconds.is_zero()
            {
                info!(
                    processed = results.considered,
                    seconds = self.options.pause_seconds.as_secs_f64(),
                    "pausing"
                );
                tokio::time::sleep(self.options.pause_seconds).await;
            }

            let outcome = self
                .process(record, resolved, resolver.as_ref(), &mut results.provenance)
                .await;
            results.considered += 1;
            on_event(CampaignEvent::Processed(record, &outcome));

            match outcome {
                CompanyOutcome::Extracted(company) => results.companies.push(company),
                CompanyOutcome::Excluded(exclusion) => {
                    info!(
                        company = %exclusion.symbol,
                        reason = %exclusion.reason,
                        detail = %exclusion.detail,
                        "excluded"
                    );
                    results.exclusions.push(exclusion);
                }
            }
        }

        if let Some(marker) = resuming {
            warn!(marker, "resume marker not found in roster; nothing processed");
        }

        results.fetch_stats = self.fetcher.stats();
        info!(
            considered = results.considered,
            extracted = results.companies.len(),
            excluded = results.exclusions.len(),
            "extraction finished"
        );
        Ok(results)
    }

    /// Load the ticker table only when some row lacks a CIK. A failure
    /// leaves those rows unresolved instead of aborting.
    async fn load_resolver(&self, planned: &Roster) -> Option<Resolver> {
        if !planned.needs_resolution() {
            return None;
        }
        match Resolver::load(self.fetcher).await {
            Ok(resolver) => Some(resolver),
            Err(e) => {
                warn!(error = %e, "ticker table unavailable; rows without a CIK will be unresolved");
                None
            }
        }
    }

    async fn process(
        &self,
        record: &CompanyRecord,
        resolved: std::result::Result<Cik, String>,
        resolver: Option<&Resolver>,
        log: &mut ProvenanceLog,
    ) -> CompanyOutcome {
        let symbol = record.label();
        let name = if record.name.is_empty() {
            resolver
                .and_then(|r| r.name_for(&record.symbol))
                .unwrap_or_default()
                .to_string()
        } else {
            record.name.clone()
        };

        let cik = match resolved {
            Ok(cik) => cik,
            Err(detail) => {
                return CompanyOutcome::Excluded(ExclusionRecord::new(
                    symbol,
                    name,
                    None,
                    ExclusionReason::Unresolved,
                    detail,
                ));
            }
        };

        let document = match self.fetcher.fetch_company_facts(&cik).await {
            Ok(document) => document,
            Err(e) => {
                warn!(company = %symbol, cik = %cik, error = %e, "fetch failed");
                return CompanyOutcome::Excluded(ExclusionRecord::new(
                    symbol,
                    name,
                    Some(cik),
                    ExclusionReason::FetchFailed,
                    e.to_string(),
                ));
            }
        };

        self.extractor.extract(&symbol, &name, &cik, &document, log)
    }
}

fn resolve(record: &CompanyRecord, resolver: Option<&Resolver>) -> std::result::Result<Cik, String> {
    if let Some(cik) = &record.identifier {
        return Ok(cik.clone());
    }
    match resolver {
        Some(resolver) => resolver.resolve(&record.symbol).map_err(|e| e.to_string()),
        None => Err("ticker table unavailable".to_string()),
    }
}
