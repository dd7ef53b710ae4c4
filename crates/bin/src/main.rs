//! Factsheet CLI binary.
//!
//! Extracts standardized fiscal-year financials from SEC EDGAR company facts.

mod integration;

use clap::{Args, Parser, Subcommand};
use factsheet::output::golden_preview;
use factsheet::{GOLDEN_SET, RunConfig};
use integration::{cache_manager, logging, pipeline};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "factsheet")]
#[command(about = "Factsheet: fiscal-year financials from SEC EDGAR company facts", long_about = None)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metrics for every company in the roster (the default)
    Run(RunArgs),

    /// Resolve symbols to CIKs
    Resolve {
        /// Symbols to resolve
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Inspect or clear the document cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,

        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Delete every cached document and CIK mapping
    Clear,
}

/// Options shared by every command.
#[derive(Args, Clone, Default)]
struct SourceArgs {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache database path
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// User-Agent sent to the SEC ("Company Name contact@email.com")
    #[arg(long)]
    user_agent: Option<String>,

    /// Ignore cached documents (fresh ones still overwrite the cache)
    #[arg(long)]
    no_cache: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Options for an extraction run.
#[derive(Args, Clone, Default)]
struct RunArgs {
    /// Roster CSV path or http(s) URL
    #[arg(long)]
    roster: Option<String>,

    /// Fiscal year to extract
    #[arg(long)]
    fiscal_year: Option<i32>,

    /// Process at most N companies
    #[arg(long)]
    limit: Option<usize>,

    /// Seconds to wait after each live request
    #[arg(long)]
    sleep: Option<f64>,

    /// Pause every N companies (0 disables)
    #[arg(long)]
    pause_every: Option<usize>,

    /// Length of the periodic pause in seconds
    #[arg(long)]
    pause_seconds: Option<f64>,

    /// Only process the golden set
    #[arg(long)]
    golden_only: bool,

    /// Skip companies until this symbol or CIK
    #[arg(long)]
    resume_from: Option<String>,

    /// Directory for output files and run.log
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write the full result set as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    source: SourceArgs,
}

fn seconds(flag: &str, value: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value).map_err(|e| format!("--{flag} {value}: {e}"))
}

impl SourceArgs {
    fn load_config(&self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(path) = &self.cache_path {
            config.cache_path = Some(path.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if self.no_cache {
            config.use_cache = false;
        }
        Ok(config)
    }
}

impl RunArgs {
    fn load_config(&self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let mut config = self.source.load_config()?;
        if let Some(roster) = &self.roster {
            config.roster = roster.clone();
        }
        if let Some(year) = self.fiscal_year {
            config.fiscal_year = year;
        }
        if let Some(limit) = self.limit {
            config.limit = Some(limit);
        }
        if let Some(sleep) = self.sleep {
            config.request_delay = seconds("sleep", sleep)?;
        }
        if let Some(every) = self.pause_every {
            config.pause_every = every;
        }
        if let Some(pause) = self.pause_seconds {
            config.pause_seconds = seconds("pause-seconds", pause)?;
        }
        if self.golden_only {
            config.golden_only = true;
        }
        if let Some(marker) = &self.resume_from {
            config.resume_from = Some(marker.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.json {
            config.write_json = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        None => extract(cli.run).await?,
        Some(Commands::Run(args)) => extract(args).await?,
        Some(Commands::Resolve { symbols, source }) => {
            let config = source.load_config()?;
            logging::init_stderr(source.verbose);
            pipeline::resolve_symbols(&config, &symbols).await?;
        }
        Some(Commands::Cache { action, source }) => {
            let config = source.load_config()?;
            logging::init_stderr(source.verbose);
            manage_cache(&config, action)?;
        }
    }

    Ok(())
}

async fn extract(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.load_config()?;
    logging::init_with_file(args.source.verbose, &config.output_dir)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║{:^62}║",
        format!("SEC COMPANY FACTS EXTRACTION: FY{}", config.fiscal_year)
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("  Roster: {}", config.roster);
    if config.use_cache {
        println!(
            "  Cache location: {}",
            cache_manager::cache_path(&config).display()
        );
    } else {
        println!("  Cache: disabled (documents are refetched)");
    }
    println!();

    let results = pipeline::run_extraction(&config).await?;
    let files = results.write_outputs(&config)?;

    println!("\n{}", results.summary());
    let stats = results.fetch_stats;
    println!(
        "  Fetches: {} from cache, {} live ({} attempts, {} failed)",
        stats.cache_hits, stats.live_fetches, stats.attempts, stats.failures
    );
    print!(
        "{}",
        golden_preview(&results.companies, &GOLDEN_SET, config.fiscal_year)
    );

    println!("\nWrote: {}", files.metrics.display());
    println!("       {}", files.provenance.display());
    println!("       {}", files.exclusions.display());
    if let Some(report) = &files.report {
        println!("       {}", report.display());
    }
    println!(
        "       {}",
        config.output_dir.join(logging::LOG_FILE).display()
    );

    Ok(())
}

fn manage_cache(config: &RunConfig, action: CacheAction) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache(config)?;
    println!("Cache location: {}", cache_manager::cache_path(config).display());

    match action {
        CacheAction::Stats => {
            let stats = cache.get_stats()?;
            println!("  Documents:      {}", stats.documents);
            println!("  Company facts:  {}", stats.company_facts);
            println!("  CIK mappings:   {}", stats.cik_mappings);
            println!(
                "  Size:           {:.1} MB",
                stats.total_bytes as f64 / (1024.0 * 1024.0)
            );
        }
        CacheAction::Clear => {
            cache.clear_all()?;
            println!("  Cleared.");
        }
    }
    Ok(())
}
