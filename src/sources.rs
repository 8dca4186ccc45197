//! Where each field of the record comes from and how long to wait for it.
//!
//! The defaults point at the live sites. Any subset of fields can be
//! overridden from a YAML file passed with `--config`:
//!
//! ```yaml
//! hemisphere_limit: 4
//! news_wait:
//!   selector: "ul.item_list li"
//!   timeout_secs: 20
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Readiness condition for a browser-rendered page.
///
/// After navigation the renderer polls until `selector` matches, giving up
/// after `timeout_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WaitPolicy {
    pub selector: String,
    pub timeout_secs: u64,
}

impl WaitPolicy {
    pub fn new(selector: &str, timeout_secs: u64) -> Self {
        Self {
            selector: selector.to_string(),
            timeout_secs,
        }
    }
}

/// URLs, base origins, readiness waits and the hemisphere cap.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub news_url: String,
    pub news_wait: WaitPolicy,

    pub featured_image_url: String,
    pub featured_image_base: String,
    pub featured_image_wait: WaitPolicy,

    pub facts_url: String,

    pub hemispheres_url: String,
    pub hemispheres_base: String,
    pub hemispheres_wait: WaitPolicy,
    pub hemisphere_detail_wait: WaitPolicy,
    pub hemisphere_limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            news_url: "https://mars.nasa.gov/news/".to_string(),
            news_wait: WaitPolicy::new("ul.item_list", 10),

            featured_image_url: "https://www.jpl.nasa.gov/spaceimages/?search=&category=Mars"
                .to_string(),
            featured_image_base: "https://www.jpl.nasa.gov".to_string(),
            featured_image_wait: WaitPolicy::new("article.carousel_item", 10),

            facts_url: "https://space-facts.com/mars/".to_string(),

            hemispheres_url:
                "https://astrogeology.usgs.gov/search/results?q=hemisphere+enhanced&k1=target&v1=Mars"
                    .to_string(),
            hemispheres_base: "https://astrogeology.usgs.gov".to_string(),
            hemispheres_wait: WaitPolicy::new("div.item", 15),
            hemisphere_detail_wait: WaitPolicy::new("div.downloads", 15),
            hemisphere_limit: 3,
        }
    }
}

impl SourceConfig {
    /// Parse a YAML document; missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load overrides from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded source configuration");
        Ok(config)
    }

    /// Check that base origins parse as URLs.
    pub fn validate(&self) -> Result<(), url::ParseError> {
        self.featured_image_base()?;
        self.hemispheres_base()?;
        Ok(())
    }

    pub fn featured_image_base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.featured_image_base)
    }

    pub fn hemispheres_base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.hemispheres_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cap_hemispheres_at_three() {
        let config = SourceConfig::default();
        assert_eq!(config.hemisphere_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
hemisphere_limit: 4
news_wait:
  selector: "ul.item_list li"
  timeout_secs: 20
"#;
        let config = SourceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.hemisphere_limit, 4);
        assert_eq!(config.news_wait, WaitPolicy::new("ul.item_list li", 20));
        assert_eq!(config.facts_url, SourceConfig::default().facts_url);
    }

    #[test]
    fn test_invalid_base_fails_validation() {
        let config = SourceConfig::from_yaml("featured_image_base: \"not a url\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_without_path_uses_defaults() {
        let config = SourceConfig::load(None).await.unwrap();
        assert_eq!(config, SourceConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sources.yaml");
        tokio::fs::write(&path, "facts_url: \"http://localhost:9/facts\"\n")
            .await
            .unwrap();
        let config = SourceConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.facts_url, "http://localhost:9/facts");
    }
}
