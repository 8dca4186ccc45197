//! The scrape pipeline: load each page, extract its field, merge, persist.
//!
//! [`MarsScraper::scrape`] runs the four extractors in a fixed order (news,
//! featured image, facts, hemispheres). The policy is fail-fast: the first
//! error aborts the scrape and nothing is produced.
//!
//! [`RefreshService`] wraps a scraper and a [`RecordStore`]. A refresh holds a
//! mutex for the whole scrape + upsert so that concurrent triggers run one
//! after another.
//!
//! Parsed documents ([`Html`]) are not `Send`, so every page is parsed and
//! extracted inside a synchronous helper and only owned values cross an
//! `.await`.

use chrono::Utc;
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::error::{RefreshError, ScrapeError, Stage};
use crate::models::{FactsTable, Hemisphere, NewsHeadline, ScrapedRecord};
use crate::render::PageLoader;
use crate::scrapers::hemispheres::GalleryItem;
use crate::scrapers::{facts, featured_image, hemispheres, news};
use crate::sources::{SourceConfig, WaitPolicy};
use crate::store::RecordStore;

/// Runs all extractors against a [`PageLoader`].
pub struct MarsScraper {
    loader: Arc<dyn PageLoader>,
    sources: SourceConfig,
    image_base: Url,
    hemisphere_base: Url,
}

impl MarsScraper {
    pub fn new(loader: Arc<dyn PageLoader>, sources: SourceConfig) -> Result<Self, url::ParseError> {
        let image_base = sources.featured_image_base()?;
        let hemisphere_base = sources.hemispheres_base()?;
        Ok(Self {
            loader,
            sources,
            image_base,
            hemisphere_base,
        })
    }

    /// Scrape every field and assemble the record.
    #[instrument(level = "info", skip_all)]
    pub async fn scrape(&self) -> Result<ScrapedRecord, ScrapeError> {
        let t0 = Instant::now();

        let headline = self.news().await?;
        let featured_image = self.featured_image().await?;
        let facts = self.facts().await?;
        let hemisphere_images = self.hemispheres().await?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            hemispheres = hemisphere_images.len(),
            "Scrape complete"
        );

        Ok(ScrapedRecord {
            news_title: headline.title,
            news_description: headline.description,
            featured_image,
            facts: facts.to_html(),
            hemisphere_images,
            scraped_at: Utc::now(),
        })
    }

    async fn render(&self, stage: Stage, url: &str, wait: &WaitPolicy) -> Result<String, ScrapeError> {
        self.loader
            .render(url, wait)
            .await
            .map_err(|e| ScrapeError::transport(stage, url, e))
    }

    #[instrument(level = "info", skip_all, fields(url = %self.sources.news_url))]
    async fn news(&self) -> Result<NewsHeadline, ScrapeError> {
        let url = &self.sources.news_url;
        let html = self.render(Stage::News, url, &self.sources.news_wait).await?;
        news::extract_news(&Html::parse_document(&html))
    }

    #[instrument(level = "info", skip_all, fields(url = %self.sources.featured_image_url))]
    async fn featured_image(&self) -> Result<String, ScrapeError> {
        let url = &self.sources.featured_image_url;
        let html = self
            .render(Stage::FeaturedImage, url, &self.sources.featured_image_wait)
            .await?;
        featured_image::extract_featured_image(&Html::parse_document(&html), &self.image_base)
    }

    #[instrument(level = "info", skip_all, fields(url = %self.sources.facts_url))]
    async fn facts(&self) -> Result<FactsTable, ScrapeError> {
        let url = &self.sources.facts_url;
        let html = self
            .loader
            .fetch(url)
            .await
            .map_err(|e| ScrapeError::transport(Stage::Facts, url, e))?;
        facts::extract_facts(&Html::parse_document(&html))
    }

    /// Walk the gallery in order, loading detail pages only until the cap is
    /// reached.
    #[instrument(level = "info", skip_all, fields(url = %self.sources.hemispheres_url))]
    async fn hemispheres(&self) -> Result<Vec<Hemisphere>, ScrapeError> {
        let limit = self.sources.hemisphere_limit;
        let url = &self.sources.hemispheres_url;
        let html = self
            .render(Stage::Hemispheres, url, &self.sources.hemispheres_wait)
            .await?;
        let gallery: Vec<GalleryItem> =
            hemispheres::parse_gallery(&Html::parse_document(&html), &self.hemisphere_base)?;
        info!(found = gallery.len(), limit, "Parsed hemisphere gallery");

        let mut collected = Vec::with_capacity(limit.min(gallery.len()));
        for item in gallery.into_iter().take(limit) {
            let detail = self
                .render(
                    Stage::Hemispheres,
                    &item.detail_url,
                    &self.sources.hemisphere_detail_wait,
                )
                .await?;
            let img_url =
                hemispheres::extract_full_resolution(&Html::parse_document(&detail), &item.detail_url)?;
            debug!(title = %item.title, %img_url, "Collected hemisphere");
            collected.push(Hemisphere {
                title: item.title,
                img_url,
            });
        }
        Ok(collected)
    }
}

/// Serialized scrape-and-store.
pub struct RefreshService {
    scraper: Mutex<MarsScraper>,
    store: Arc<dyn RecordStore>,
}

impl RefreshService {
    pub fn new(scraper: MarsScraper, store: Arc<dyn RecordStore>) -> Self {
        Self {
            scraper: Mutex::new(scraper),
            store,
        }
    }

    /// Scrape and replace the stored record. Concurrent callers queue on the
    /// pipeline lock.
    #[instrument(level = "info", skip_all)]
    pub async fn refresh(&self) -> Result<ScrapedRecord, RefreshError> {
        let scraper = self.scraper.lock().await;
        let record = match scraper.scrape().await {
            Ok(record) => record,
            Err(e) => {
                error!(stage = %e.stage(), kind = %e.kind(), error = %e, "Scrape aborted; keeping previous record");
                return Err(e.into());
            }
        };
        self.store.upsert_singleton(&record).await?;
        info!(news_title = %record.news_title, "Record refreshed");
        Ok(record)
    }

    /// The currently stored record.
    pub async fn current(&self) -> Result<Option<ScrapedRecord>, RefreshError> {
        Ok(self.store.find_singleton().await?)
    }
}
