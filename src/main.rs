//! # Mars Scrape
//!
//! Collects the latest Mars data from public sites into one record and keeps
//! it in a singleton store:
//!
//! - Latest news headline and teaser (NASA Mars news)
//! - Featured image URL (JPL space images)
//! - Planet facts table (space-facts.com)
//! - Hemisphere image titles and full-resolution URLs (USGS astrogeology)
//!
//! ## Usage
//!
//! ```sh
//! mars_scrape scrape
//! mars_scrape serve --bind 127.0.0.1:5000
//! mars_scrape show
//! ```
//!
//! ## Architecture
//!
//! 1. **Loading**: script-driven pages are rendered in headless Chrome and
//!    awaited on a readiness selector; the static facts page is fetched over HTTP
//! 2. **Extraction**: one extractor per field, each a pure function over the
//!    parsed document
//! 3. **Aggregation**: extractors run in a fixed order, fail-fast
//! 4. **Storage**: the assembled record replaces the stored one in full

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod models;
mod pipeline;
mod render;
mod scrapers;
mod server;
mod sources;
mod store;
mod utils;

use cli::{Cli, Command};
use pipeline::{MarsScraper, RefreshService};
use render::ChromeLoader;
use render::chrome::ChromeOptions;
use sources::SourceConfig;
use store::{JsonFileStore, MemoryStore, RecordStore};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mars_scrape starting up");

    let args = Cli::parse();
    debug!(?args.command, store = %args.store, ?args.config, "Parsed CLI arguments");

    let store = open_store(&args);

    match &args.command {
        Command::Scrape => {
            let service = build_service(&args, store).await?;
            let record = service.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Serve { bind } => {
            let service = build_service(&args, store).await?;
            server::serve(service, bind).await?;
        }
        // Read-only: no browser and no write access needed.
        Command::Show => match store.find_singleton().await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => info!("No record stored yet; run `mars_scrape scrape` first"),
        },
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

fn open_store(args: &Cli) -> Arc<dyn RecordStore> {
    if args.in_memory_store() {
        info!("Using in-memory record store");
        Arc::new(MemoryStore::new())
    } else {
        let file_store = JsonFileStore::new(Path::new(&args.store));
        info!(path = %file_store.path().display(), "Using JSON record store");
        Arc::new(file_store)
    }
}

/// Loader, scraper and refresh service for the commands that scrape.
async fn build_service(
    args: &Cli,
    store: Arc<dyn RecordStore>,
) -> Result<Arc<RefreshService>, Box<dyn Error>> {
    let sources = SourceConfig::load(args.config.as_deref()).await?;

    if !args.in_memory_store() {
        let path = Path::new(&args.store);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            // Early check: fail before any browser is launched
            if let Err(e) = ensure_writable_dir(dir).await {
                error!(
                    path = %dir.display(),
                    error = %e,
                    "Store directory is not writable (fix perms or choose a different path)"
                );
                return Err(e);
            }
        }
    }

    let loader = ChromeLoader::new(ChromeOptions {
        headless: !args.headful,
        executable: args.chrome.clone(),
        ..ChromeOptions::default()
    })?;
    let scraper = MarsScraper::new(Arc::new(loader), sources)?;
    Ok(Arc::new(RefreshService::new(scraper, store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_store(store: &Path, command: &str) -> Cli {
        let store = store.display().to_string();
        Cli::parse_from(["mars_scrape", "--store", store.as_str(), command])
    }

    #[tokio::test]
    async fn test_show_reads_without_creating_store_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("missing");
        let args = cli_with_store(&dir.join("mars.json"), "show");

        let store = open_store(&args);
        assert!(store.find_singleton().await.unwrap().is_none());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_scrape_setup_prepares_store_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let args = cli_with_store(&dir.join("mars.json"), "scrape");

        let store = open_store(&args);
        build_service(&args, store).await.unwrap();
        assert!(dir.is_dir());
    }
}
