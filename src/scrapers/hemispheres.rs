//! Mars hemisphere gallery.
//!
//! Two page types are involved:
//!
//! 1. The astrogeology search results list one `div.item` per hemisphere,
//!    each with an `h3` title and an `a.itemLink.product-item` link to a
//!    detail page.
//! 2. Each detail page has a `div.downloads` section whose `target="_blank"`
//!    links point at the sample JPEG (first) and the original full-resolution
//!    file (second). The second link is the one recorded.
//!
//! Detail pages are only loaded by the pipeline until the configured number
//! of hemispheres has been collected.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::{first_in_document_order, first_within, selector};
use crate::error::{ScrapeError, Stage};
use crate::utils::element_text;

static ITEM: Lazy<Selector> = Lazy::new(|| selector("div.item"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3"));
static DETAIL_LINK: Lazy<Selector> = Lazy::new(|| selector("a.itemLink.product-item"));
static DOWNLOADS: Lazy<Selector> = Lazy::new(|| selector("div.downloads"));
static EXTERNAL_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[target="_blank"]"#));

/// Position of the full-resolution link among the download links.
pub const FULL_RESOLUTION_LINK_INDEX: usize = 1;

/// One search result: the hemisphere title and its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub title: String,
    pub detail_url: String,
}

/// All gallery items on the search results page, in document order.
///
/// # Errors
///
/// [`ScrapeError::Structure`] if an item has no title or no detail link, and
/// [`ScrapeError::Data`] if a detail link does not resolve against `base`.
#[instrument(level = "debug", skip_all, fields(base = %base))]
pub fn parse_gallery(doc: &Html, base: &Url) -> Result<Vec<GalleryItem>, ScrapeError> {
    let mut items = Vec::new();
    for (position, item) in doc.select(&ITEM).enumerate() {
        let title = first_within(item, &TITLE)
            .map(|h| element_text(&h))
            .ok_or_else(|| {
                ScrapeError::structure(
                    Stage::Hemispheres,
                    format!("gallery item {position} has no `h3` title"),
                )
            })?;

        let href = first_within(item, &DETAIL_LINK)
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| {
                ScrapeError::structure(
                    Stage::Hemispheres,
                    format!("gallery item {position} ({title}) has no detail link"),
                )
            })?;

        let detail_url = base.join(href).map_err(|e| {
            ScrapeError::data(
                Stage::Hemispheres,
                format!("cannot resolve detail link {href:?} against {base}: {e}"),
            )
        })?;

        items.push(GalleryItem {
            title,
            detail_url: detail_url.to_string(),
        });
    }

    debug!(count = items.len(), "Parsed hemisphere gallery");
    Ok(items)
}

/// URL of the full-resolution image on a hemisphere detail page.
///
/// # Errors
///
/// [`ScrapeError::Structure`] if the page has no `div.downloads`, it holds
/// fewer than two externally-targeted links, or the second one has no `href`.
pub fn extract_full_resolution(doc: &Html, page_url: &str) -> Result<String, ScrapeError> {
    let downloads = first_in_document_order(doc.select(&DOWNLOADS)).ok_or_else(|| {
        ScrapeError::structure(
            Stage::Hemispheres,
            format!("no `div.downloads` section on {page_url}"),
        )
    })?;

    let links: Vec<ElementRef<'_>> = downloads.select(&EXTERNAL_LINK).collect();

    let link = links.get(FULL_RESOLUTION_LINK_INDEX).ok_or_else(|| {
        ScrapeError::structure(
            Stage::Hemispheres,
            format!(
                "downloads on {page_url} have {} link(s), expected at least {}",
                links.len(),
                FULL_RESOLUTION_LINK_INDEX + 1
            ),
        )
    })?;

    link.value()
        .attr("href")
        .map(|href| href.to_string())
        .ok_or_else(|| {
            ScrapeError::structure(
                Stage::Hemispheres,
                format!("full-resolution link on {page_url} has no href"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn usgs() -> Url {
        Url::parse("https://astrogeology.usgs.gov").unwrap()
    }

    const SEARCH_PAGE: &str = r#"
        <div class="collapsible results">
          <div class="item">
            <a href="/search/map/Mars/Viking/cerberus_enhanced" class="itemLink product-item"><img class="thumb" src="/cache/images/cerberus.png"></a>
            <div class="description">
              <a href="/search/map/Mars/Viking/cerberus_enhanced" class="itemLink product-item"><h3>Cerberus Hemisphere Enhanced</h3></a>
            </div>
          </div>
          <div class="item">
            <a href="/search/map/Mars/Viking/schiaparelli_enhanced" class="itemLink product-item"><img class="thumb"></a>
            <div class="description"><h3>Schiaparelli Hemisphere Enhanced</h3></div>
          </div>
        </div>"#;

    const DETAIL_PAGE: &str = r#"
        <div class="container">
          <div class="wide-image-wrapper">
            <div class="downloads">
              <img class="thumb" src="/cache/images/cerberus_thumb.png">
              <h3>Download</h3>
              <ul>
                <li><a target="_blank" href="https://astropedia.astrogeology.usgs.gov/download/Mars/Viking/cerberus_enhanced.tif/full.jpg">Sample</a> (jpg)</li>
                <li><a target="_blank" href="https://astropedia.astrogeology.usgs.gov/download/Mars/Viking/cerberus_enhanced.tif">Original</a> (tif)</li>
              </ul>
            </div>
          </div>
        </div>"#;

    #[test]
    fn test_parse_gallery_preserves_order_and_resolves_links() {
        let doc = Html::parse_document(SEARCH_PAGE);
        let items = parse_gallery(&doc, &usgs()).unwrap();
        assert_eq!(
            items,
            vec![
                GalleryItem {
                    title: "Cerberus Hemisphere Enhanced".to_string(),
                    detail_url:
                        "https://astrogeology.usgs.gov/search/map/Mars/Viking/cerberus_enhanced"
                            .to_string(),
                },
                GalleryItem {
                    title: "Schiaparelli Hemisphere Enhanced".to_string(),
                    detail_url:
                        "https://astrogeology.usgs.gov/search/map/Mars/Viking/schiaparelli_enhanced"
                            .to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_gallery_empty_page() {
        let doc = Html::parse_document("<div class='results'></div>");
        assert!(parse_gallery(&doc, &usgs()).unwrap().is_empty());
    }

    #[test]
    fn test_item_without_link_is_structural_error() {
        let doc = Html::parse_document("<div class='item'><h3>Lonely</h3></div>");
        let err = parse_gallery(&doc, &usgs()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(err.to_string().contains("Lonely"));
    }

    #[test]
    fn test_extract_full_resolution_takes_second_link() {
        let doc = Html::parse_document(DETAIL_PAGE);
        assert_eq!(
            extract_full_resolution(&doc, "detail").unwrap(),
            "https://astropedia.astrogeology.usgs.gov/download/Mars/Viking/cerberus_enhanced.tif"
        );
    }

    #[test]
    fn test_links_outside_downloads_are_ignored() {
        let doc = Html::parse_document(
            r#"<a target="_blank" href="/nav">Nav</a>
               <div class="downloads">
                 <a href="/same-tab">same tab</a>
                 <a target="_blank" href="/sample.jpg">Sample</a>
                 <a target="_blank" href="/original.tif">Original</a>
               </div>"#,
        );
        assert_eq!(
            extract_full_resolution(&doc, "detail").unwrap(),
            "/original.tif"
        );
    }

    #[test]
    fn test_single_download_link_is_structural_error() {
        let doc = Html::parse_document(
            r#"<div class="downloads"><a target="_blank" href="/sample.jpg">Sample</a></div>"#,
        );
        let err = extract_full_resolution(&doc, "https://example.com/d").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(err.to_string().contains("1 link(s)"));
    }

    #[test]
    fn test_link_without_href_still_counts() {
        let doc = Html::parse_document(
            r#"<div class="downloads">
                 <a target="_blank">Sample</a>
                 <a target="_blank" href="/second.tif">Original</a>
                 <a target="_blank" href="/third.tif">Other</a>
               </div>"#,
        );
        assert_eq!(
            extract_full_resolution(&doc, "detail").unwrap(),
            "/second.tif"
        );
    }

    #[test]
    fn test_second_link_without_href_is_structural_error() {
        let doc = Html::parse_document(
            r#"<div class="downloads">
                 <a target="_blank" href="/sample.jpg">Sample</a>
                 <a target="_blank">Original</a>
                 <a target="_blank" href="/third.tif">Other</a>
               </div>"#,
        );
        let err = extract_full_resolution(&doc, "detail").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(err.to_string().contains("no href"));
    }

    #[test]
    fn test_missing_downloads_is_structural_error() {
        let doc = Html::parse_document("<div class='content'></div>");
        let err = extract_full_resolution(&doc, "https://example.com/d").unwrap_err();
        assert_eq!(err.stage(), Stage::Hemispheres);
        assert!(err.to_string().contains("https://example.com/d"));
    }
}
