//! Command-line interface definitions for Mars Scrape.
//!
//! All global options can be provided via command-line flags or environment
//! variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Mars Scrape application.
///
/// # Examples
///
/// ```sh
/// # Scrape once and store the record
/// mars_scrape scrape
///
/// # Serve the record with a refresh endpoint
/// mars_scrape --store ./data/mars.json serve --bind 0.0.0.0:5000
///
/// # Override source URLs and waits
/// mars_scrape --config sources.yaml scrape
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional YAML file overriding source URLs, waits and the hemisphere cap
    #[arg(short, long, env = "MARS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path of the JSON record file, or `memory` for an in-process store
    #[arg(short, long, env = "MARS_STORE", default_value = "./data/mars.json")]
    pub store: String,

    /// Chrome/Chromium binary to launch (located automatically when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape all sources once, store the record and print it as JSON
    Scrape,
    /// Serve the stored record over HTTP with a `/scrape` refresh route
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "MARS_BIND", default_value = "127.0.0.1:5000")]
        bind: String,
    },
    /// Print the stored record as JSON
    Show,
}

impl Cli {
    /// True when the record should live only in memory.
    pub fn in_memory_store(&self) -> bool {
        self.store == "memory"
    }
}
