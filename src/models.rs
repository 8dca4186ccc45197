//! Data models for the scraped Mars record.
//!
//! - [`ScrapedRecord`]: the singleton document stored after each scrape
//! - [`Hemisphere`]: one entry of the hemisphere gallery
//! - [`NewsHeadline`]: output of the news extractor
//! - [`FactsTable`]: output of the facts extractor, serialized into the record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::html_escape;

/// The one record produced by a scrape.
///
/// It is replaced as a whole on every refresh; there is no history and no
/// partial update. All fields are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrapedRecord {
    /// Headline of the most recent news item.
    pub news_title: String,
    /// Teaser text of the same news item.
    pub news_description: String,
    /// Absolute URL of the featured full-resolution image.
    pub featured_image: String,
    /// Facts table as HTML, without header row or index column.
    pub facts: String,
    /// Hemisphere images in source-page order.
    pub hemisphere_images: Vec<Hemisphere>,
    /// When the record was assembled.
    pub scraped_at: DateTime<Utc>,
}

/// A hemisphere image: its title and the URL of the original-resolution file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Hemisphere {
    pub title: String,
    pub img_url: String,
}

/// Title and teaser of a news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsHeadline {
    pub title: String,
    pub description: String,
}

/// Two-column (label, value) facts table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactsTable {
    pub rows: Vec<(String, String)>,
}

impl FactsTable {
    /// Serialize to a dataframe-style HTML table with no `<thead>` and no
    /// index column. Row order is preserved and cell text is escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table border=\"1\" class=\"dataframe\">\n  <tbody>\n");
        for (label, value) in &self.rows {
            out.push_str("    <tr>\n");
            out.push_str(&format!("      <td>{}</td>\n", html_escape(label)));
            out.push_str(&format!("      <td>{}</td>\n", html_escape(value)));
            out.push_str("    </tr>\n");
        }
        out.push_str("  </tbody>\n</table>");
        out
    }
}
