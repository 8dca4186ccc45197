//! Error types for page loading, extraction, and persistence.
//!
//! A scrape can fail in three distinct ways, and each failure names the
//! extractor ([`Stage`]) it happened in:
//!
//! - **Transport**: the page could not be loaded (browser launch, navigation,
//!   HTTP status, readiness wait timed out)
//! - **Structure**: an expected element or attribute is absent from the markup
//! - **Data**: an element was found but its content is malformed
//!
//! The pipeline is fail-fast: the first error aborts the whole scrape and no
//! record is persisted.

use std::fmt;
use thiserror::Error;

/// The extractor a [`ScrapeError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    News,
    FeaturedImage,
    Facts,
    Hemispheres,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::News => "news",
            Stage::FeaturedImage => "featured_image",
            Stage::Facts => "facts",
            Stage::Hemispheres => "hemispheres",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`ScrapeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Structure,
    Data,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Structure => "structure",
            ErrorKind::Data => "data",
        };
        f.write_str(name)
    }
}

/// Failure to obtain markup for a URL.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("timed out after {timeout_secs}s waiting for `{selector}`")]
    WaitTimeout { selector: String, timeout_secs: u64 },

    #[error("render task failed: {0}")]
    Task(String),
}

/// Failure of one extractor; aborts the whole scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("[{stage}] failed to load {url}: {source}")]
    Transport {
        stage: Stage,
        url: String,
        #[source]
        source: LoadError,
    },

    #[error("[{stage}] expected markup missing: {detail}")]
    Structure { stage: Stage, detail: String },

    #[error("[{stage}] malformed data: {detail}")]
    Data { stage: Stage, detail: String },
}

impl ScrapeError {
    pub fn transport(stage: Stage, url: &str, source: LoadError) -> Self {
        ScrapeError::Transport {
            stage,
            url: url.to_string(),
            source,
        }
    }

    pub fn structure(stage: Stage, detail: impl Into<String>) -> Self {
        ScrapeError::Structure {
            stage,
            detail: detail.into(),
        }
    }

    pub fn data(stage: Stage, detail: impl Into<String>) -> Self {
        ScrapeError::Data {
            stage,
            detail: detail.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            ScrapeError::Transport { stage, .. }
            | ScrapeError::Structure { stage, .. }
            | ScrapeError::Data { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Transport { .. } => ErrorKind::Transport,
            ScrapeError::Structure { .. } => ErrorKind::Structure,
            ScrapeError::Data { .. } => ErrorKind::Data,
        }
    }
}

/// Failure reading or writing the singleton record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a full refresh (scrape + upsert).
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
