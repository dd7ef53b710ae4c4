//! Campaign and resolver runs with terminal progress.

use super::cache_manager;
use factsheet::data::cache::{DocumentCache, MemoryCache, SqliteCache};
use factsheet::data::edgar::{DEFAULT_TIMEOUT, EdgarClient, Fetcher, Resolver, normalize_symbol};
use factsheet::{Campaign, CampaignEvent, CampaignResults, Roster, RunConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};

type BoxError = Box<dyn Error>;

fn document_cache(config: &RunConfig) -> Box<dyn DocumentCache> {
    match cache_manager::open_cache(config) {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            warn!(
                path = %cache_manager::cache_path(config).display(),
                error = %e,
                "cache unavailable, continuing without persistence"
            );
            Box::new(MemoryCache::new())
        }
    }
}

fn client(config: &RunConfig) -> Result<Arc<EdgarClient>, BoxError> {
    Ok(Arc::new(EdgarClient::with_user_agent(
        &config.user_agent,
        DEFAULT_TIMEOUT,
    )?))
}

/// Load the roster and run the campaign with a progress bar.
pub(crate) async fn run_extraction(config: &RunConfig) -> Result<CampaignResults, BoxError> {
    let client = client(config)?;
    let fetcher = Fetcher::new(client.clone(), document_cache(config), config.fetcher_config());

    let roster = Roster::load(&config.roster, client.as_ref()).await?;
    info!(source = %config.roster, companies = roster.len(), "loaded roster");

    let campaign = Campaign::from_config(&fetcher, config);
    let planned = campaign.plan(&roster)?;

    let pb = ProgressBar::new(planned.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let results = campaign
        .run_with_progress(&roster, |event| match event {
            CampaignEvent::Skipped(record) => {
                pb.set_message(format!("skipping {}", record.label()));
                pb.inc(1);
            }
            CampaignEvent::Processed(record, _) => {
                pb.set_message(record.label());
                pb.inc(1);
            }
        })
        .await;

    match &results {
        Ok(results) => pb.finish_with_message(format!(
            "{} extracted, {} excluded",
            results.companies.len(),
            results.exclusions.len()
        )),
        Err(_) => pb.finish_with_message("Failed!"),
    }

    Ok(results?)
}

/// Resolve symbols to CIKs, remembering results in the cache database.
pub(crate) async fn resolve_symbols(config: &RunConfig, symbols: &[String]) -> Result<(), BoxError> {
    let mappings = cache_manager::open_cache(config).ok();
    let fetcher = Fetcher::new(client(config)?, document_cache(config), config.fetcher_config());
    let mut resolver: Option<Resolver> = None;

    println!("{:<10} {:>12}  {}", "Symbol", "CIK", "Name");
    println!("{}", "-".repeat(60));

    for symbol in symbols {
        let key = normalize_symbol(symbol);

        if config.use_cache
            && let Some(cik) = mappings.as_ref().and_then(|m| m.get_cik(&key).ok().flatten())
        {
            println!("{:<10} {:>12}  (cached)", symbol, cik);
            continue;
        }

        if resolver.is_none() {
            resolver = Some(Resolver::load(&fetcher).await?);
        }
        let Some(resolver) = resolver.as_ref() else {
            continue;
        };

        match resolver.resolve(symbol) {
            Ok(cik) => {
                let name = resolver.name_for(symbol);
                println!("{:<10} {:>12}  {}", symbol, cik, name.unwrap_or(""));
                remember(mappings.as_ref(), &key, &cik, name);
            }
            Err(e) => println!("{:<10} {:>12}  {}", symbol, "-", e),
        }
    }

    Ok(())
}

fn remember(
    mappings: Option<&SqliteCache>,
    symbol: &str,
    cik: &factsheet::data::Cik,
    name: Option<&str>,
) {
    if let Some(mappings) = mappings
        && let Err(e) = mappings.put_cik(symbol, cik, name)
    {
        warn!(symbol, error = %e, "could not store CIK mapping");
    }
}
