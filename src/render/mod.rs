//! Obtaining page markup.
//!
//! Two ways to get a page, behind one trait so the pipeline can be driven by
//! live sites or by fixtures:
//!
//! - **render**: load the page in a real browser, wait until a readiness
//!   selector matches, return the post-script DOM as HTML
//! - **fetch**: plain HTTP GET for pages that need no script execution
//!
//! Callers parse the returned markup with [`scraper::Html::parse_document`].

use async_trait::async_trait;

use crate::error::LoadError;
use crate::sources::WaitPolicy;

pub mod chrome;

pub use chrome::ChromeLoader;

/// Source of page markup.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Render `url` in a browser and return the markup once `wait` is satisfied.
    async fn render(&self, url: &str, wait: &WaitPolicy) -> Result<String, LoadError>;

    /// Fetch `url` over HTTP without executing scripts.
    async fn fetch(&self, url: &str) -> Result<String, LoadError>;
}
