//! Headless Chrome renderer with an HTTP client for static pages.
//!
//! Every [`render`](PageLoader::render) call launches its own browser, and the
//! browser is torn down before the markup is handed back, so nothing that
//! happens during extraction can leak a Chrome process.
//!
//! `headless_chrome` is a blocking driver; each render runs on tokio's
//! blocking pool.

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::PageLoader;
use crate::error::LoadError;
use crate::sources::WaitPolicy;
use crate::utils::truncate_for_log;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Browser launch settings.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Chrome binary; `None` lets `headless_chrome` locate one.
    pub executable: Option<PathBuf>,
    /// How long an idle browser connection is kept before giving up.
    pub idle_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// [`PageLoader`] backed by headless Chrome and `reqwest`.
pub struct ChromeLoader {
    options: ChromeOptions,
    http: reqwest::Client,
}

impl ChromeLoader {
    pub fn new(options: ChromeOptions) -> Result<Self, LoadError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { options, http })
    }
}

fn browser_err(context: &str, e: impl std::fmt::Display) -> LoadError {
    LoadError::Browser(format!("{context}: {e}"))
}

/// Launch a browser, load `url`, wait for the readiness selector, and return
/// the rendered markup. The browser is dropped when this function returns.
fn render_blocking(
    options: &ChromeOptions,
    url: &str,
    wait: &WaitPolicy,
) -> Result<String, LoadError> {
    let launch = LaunchOptions::default_builder()
        .headless(options.headless)
        .sandbox(false)
        .path(options.executable.clone())
        .idle_browser_timeout(options.idle_timeout)
        .args(vec![OsStr::new("--disable-gpu"), OsStr::new("--no-first-run")])
        .build()
        .map_err(|e| browser_err("invalid launch options", e))?;

    let browser = Browser::new(launch).map_err(|e| browser_err("launch failed", e))?;
    let tab = browser
        .new_tab()
        .map_err(|e| browser_err("could not open tab", e))?;

    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| browser_err("navigation failed", e))?;

    let timeout = Duration::from_secs(wait.timeout_secs);
    if let Err(e) = tab.wait_for_element_with_custom_timeout(&wait.selector, timeout) {
        debug!(error = %e, selector = %wait.selector, "Readiness wait failed");
        return Err(LoadError::WaitTimeout {
            selector: wait.selector.clone(),
            timeout_secs: wait.timeout_secs,
        });
    }

    tab.get_content()
        .map_err(|e| browser_err("could not read page content", e))
}

#[async_trait]
impl PageLoader for ChromeLoader {
    #[instrument(level = "info", skip(self, wait), fields(selector = %wait.selector))]
    async fn render(&self, url: &str, wait: &WaitPolicy) -> Result<String, LoadError> {
        let t0 = Instant::now();
        let options = self.options.clone();
        let target = url.to_string();
        let policy = wait.clone();

        let html = tokio::task::spawn_blocking(move || render_blocking(&options, &target, &policy))
            .await
            .map_err(|e| LoadError::Task(e.to_string()))??;

        info!(
            bytes = html.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Rendered page"
        );
        debug!(preview = %truncate_for_log(&html, 300), "Rendered markup");
        Ok(html)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Fetch returned non-success status");
            return Err(LoadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await?;
        info!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
