//! Latest Mars news headline.
//!
//! The NASA Mars news page renders its article list client-side into
//! `ul.item_list`. Each list item carries an `h3` headline and a
//! `div.article_teaser_body` teaser. Only the first item is used.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use super::{first_in_document_order, first_within, selector};
use crate::error::{ScrapeError, Stage};
use crate::models::NewsHeadline;
use crate::utils::element_text;

static LIST: Lazy<Selector> = Lazy::new(|| selector("ul.item_list"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h3"));
static TEASER: Lazy<Selector> = Lazy::new(|| selector("div.article_teaser_body"));

/// Title and teaser of the first news item.
///
/// # Errors
///
/// [`ScrapeError::Structure`] if the list, its first item, the heading or the
/// teaser is missing.
#[instrument(level = "debug", skip_all)]
pub fn extract_news(doc: &Html) -> Result<NewsHeadline, ScrapeError> {
    let list = first_in_document_order(doc.select(&LIST))
        .ok_or_else(|| ScrapeError::structure(Stage::News, "no `ul.item_list` on page"))?;

    let item = first_in_document_order(list.children().filter_map(ElementRef::wrap))
        .ok_or_else(|| ScrapeError::structure(Stage::News, "news list has no items"))?;

    let title = first_within(item, &HEADING)
        .map(|h| element_text(&h))
        .ok_or_else(|| ScrapeError::structure(Stage::News, "first news item has no `h3`"))?;

    let description = first_within(item, &TEASER)
        .map(|d| element_text(&d))
        .ok_or_else(|| {
            ScrapeError::structure(
                Stage::News,
                "first news item has no `div.article_teaser_body`",
            )
        })?;

    debug!(%title, "Extracted news headline");
    Ok(NewsHeadline { title, description })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const NEWS_PAGE: &str = r#"
        <html><body>
          <div class="grid_layout">
            <ul class="item_list">
              <li class="slide">
                <div class="list_date">October 16, 2020</div>
                <div class="content_title"><h3>
                    A Martian Roundtrip:   NASA's Perseverance Rover Sample Tubes
                </h3></div>
                <div class="article_teaser_body">Marvels of engineering, the rover's
                    sample tubes must be tough.</div>
              </li>
              <li class="slide">
                <h3>Older story</h3>
                <div class="article_teaser_body">Older teaser</div>
              </li>
            </ul>
          </div>
        </body></html>"#;

    #[test]
    fn test_extracts_first_item_with_normalized_text() {
        let doc = Html::parse_document(NEWS_PAGE);
        let news = extract_news(&doc).unwrap();
        assert_eq!(
            news.title,
            "A Martian Roundtrip: NASA's Perseverance Rover Sample Tubes"
        );
        assert_eq!(
            news.description,
            "Marvels of engineering, the rover's sample tubes must be tough."
        );
    }

    #[test]
    fn test_uses_first_list_only() {
        let doc = Html::parse_document(
            r#"<ul class="item_list"><li><h3>First</h3><div class="article_teaser_body">One</div></li></ul>
               <ul class="item_list"><li><h3>Second</h3><div class="article_teaser_body">Two</div></li></ul>"#,
        );
        let news = extract_news(&doc).unwrap();
        assert_eq!(news.title, "First");
        assert_eq!(news.description, "One");
    }

    #[test]
    fn test_missing_list_is_structural_error() {
        let doc = Html::parse_document("<ul class='other'><li><h3>x</h3></li></ul>");
        let err = extract_news(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert_eq!(err.stage(), Stage::News);
    }

    #[test]
    fn test_empty_list_is_structural_error() {
        let doc = Html::parse_document("<ul class='item_list'>\n  </ul>");
        let err = extract_news(&doc).unwrap_err();
        assert!(err.to_string().contains("no items"));
    }

    #[test]
    fn test_missing_teaser_is_structural_error() {
        let doc = Html::parse_document("<ul class='item_list'><li><h3>Only a title</h3></li></ul>");
        let err = extract_news(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(err.to_string().contains("article_teaser_body"));
    }
}
