// src/main.rs
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use kospi_finance::collector::{Collection, Collector, Summary};
use kospi_finance::dart::client::DartClient;
use kospi_finance::extractors::page::NaverPageExtractor;
use kospi_finance::models::roster::{Market, RosterEntry};
use kospi_finance::naver::client::HttpFetcher;
use kospi_finance::storage::RosterStore;
use kospi_finance::utils::{self, AppError};

/// Collects financial summaries of listed Korean companies from Naver Finance
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the company roster of a market from the DART registry
    Refresh {
        /// Directory holding the roster CSV files
        #[arg(long, default_value = "./db")]
        db_dir: PathBuf,

        /// Market to list
        #[arg(long, value_enum, default_value = "kospi")]
        market: Market,

        /// DART OpenAPI key
        #[arg(long, env = "DART_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// Scrape the financial summary of every company in the roster
    Crawl {
        /// Directory holding the roster CSV files
        #[arg(long, default_value = "./db")]
        db_dir: PathBuf,

        /// Market whose roster is crawled
        #[arg(long, value_enum, default_value = "kospi")]
        market: Market,

        /// Only crawl these stock codes (repeatable)
        #[arg(short, long)]
        ticker: Vec<String>,

        /// Stop after this many companies
        #[arg(long)]
        limit: Option<usize>,

        /// Print records as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Save fetched pages (raw and annotated) here for debugging
        #[arg(long)]
        debug_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting processing for args: {:?}", args);

    match args.command {
        Command::Refresh { db_dir, market, api_key } => refresh(db_dir, market, &api_key).await,
        Command::Crawl { db_dir, market, ticker, limit, json, debug_dir } => {
            crawl(db_dir, market, &ticker, limit, json, debug_dir).await
        }
    }
}

async fn refresh(db_dir: PathBuf, market: Market, api_key: &str) -> Result<(), AppError> {
    let store = RosterStore::new(&db_dir)?;
    let client = DartClient::new(api_key)?;

    tracing::info!("Refreshing {} roster into {}", market, db_dir.display());
    let roster = client.listed_in(market).await?;
    if roster.is_empty() {
        return Err(AppError::Config(format!("DART returned no {} companies", market)));
    }

    let today = chrono::Local::now().date_naive();
    let path = store.save(market, today, &roster)?;
    tracing::info!("Roster written to {}", path.display());
    Ok(())
}

/// Picks the roster entries to crawl. Tickers missing from the roster are
/// still crawled, with blank name and registry code.
fn select_entries(roster: Vec<RosterEntry>, tickers: &[String], limit: Option<usize>) -> Vec<RosterEntry> {
    let mut selected: Vec<RosterEntry> = if tickers.is_empty() {
        roster
    } else {
        tickers
            .iter()
            .map(|ticker| {
                roster
                    .iter()
                    .find(|entry| entry.stock_code == *ticker)
                    .cloned()
                    .unwrap_or_else(|| {
                        tracing::warn!("Ticker {} is not in the roster", ticker);
                        RosterEntry {
                            corp_code: String::new(),
                            corp_name: String::new(),
                            stock_code: ticker.clone(),
                            modify_date: String::new(),
                        }
                    })
            })
            .collect()
    };

    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

async fn crawl(
    db_dir: PathBuf,
    market: Market,
    tickers: &[String],
    limit: Option<usize>,
    json: bool,
    debug_dir: Option<PathBuf>,
) -> Result<(), AppError> {
    let store = RosterStore::new(&db_dir)?;
    let roster = store.load(market)?;
    if roster.is_empty() && tickers.is_empty() {
        return Err(AppError::Config(format!(
            "No {} roster in {}; run `refresh` first",
            market,
            db_dir.display()
        )));
    }

    let entries = select_entries(roster, tickers, limit);
    tracing::info!("Crawling {} companies", entries.len());

    let fetcher = HttpFetcher::new()?;
    let extractor = NaverPageExtractor::new();
    let mut collector = Collector::new(&fetcher, &extractor);
    if let Some(dir) = debug_dir {
        collector = collector.with_debug_dir(dir);
    }

    let collections = collector.collect_all(&entries).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&collections)?);
    } else {
        for collection in &collections {
            match collection {
                Collection::Parsed { record } => println!("{}", record),
                Collection::Unreachable { identity, reason } => println!(
                    "회사명: {} ({}) - unreachable: {}\n",
                    identity.corp_name, identity.stock_code, reason
                ),
            }
        }
    }

    let summary = Summary::of(&collections);
    tracing::info!(
        "Processing finished. Complete: {}, Identity only: {}, Unreachable: {}",
        summary.complete,
        summary.identity_only,
        summary.unreachable
    );

    Ok(())
}
