//! Field extractors for the Mars record.
//!
//! Each submodule turns the markup of one page into one field of
//! [`ScrapedRecord`](crate::models::ScrapedRecord). Extractors are synchronous
//! functions over a parsed [`Html`](scraper::Html) document; the pipeline does
//! the loading.
//!
//! # Extractors
//!
//! | Field | Module | Page | Loaded via |
//! |-------|--------|------|------------|
//! | `news_title`, `news_description` | [`news`] | NASA Mars news list | browser render |
//! | `featured_image` | [`featured_image`] | JPL space images | browser render |
//! | `facts` | [`facts`] | space-facts.com | HTTP fetch |
//! | `hemisphere_images` | [`hemispheres`] | USGS astrogeology search + detail pages | browser render |
//!
//! # Selection rule
//!
//! Wherever a page offers several candidates (news items, carousel articles,
//! tables, download sections) the extractors take the first one in document
//! order via [`first_in_document_order`]. Changing that policy means changing
//! that one function.

use scraper::{ElementRef, Selector};

pub mod facts;
pub mod featured_image;
pub mod hemispheres;
pub mod news;

/// Pick the first of `candidates` in document order.
pub fn first_in_document_order<'a, I>(candidates: I) -> Option<ElementRef<'a>>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    candidates.into_iter().next()
}

/// First descendant of `scope` matching `selector`.
pub fn first_within<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    first_in_document_order(scope.select(selector))
}

/// Compile a selector that is a compile-time constant.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector `{css}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_first_in_document_order_picks_earliest() {
        let doc = Html::parse_document("<p id='a'></p><div><p id='b'></p></div><p id='c'></p>");
        let sel = selector("p");
        let first = first_in_document_order(doc.select(&sel)).unwrap();
        assert_eq!(first.value().attr("id"), Some("a"));
    }

    #[test]
    fn test_first_in_document_order_empty() {
        let doc = Html::parse_document("<div></div>");
        let sel = selector("p");
        assert!(first_in_document_order(doc.select(&sel)).is_none());
    }

    #[test]
    fn test_first_within_is_scoped() {
        let doc = Html::parse_document(
            "<h3>outside</h3><section><h3>inside</h3><h3>later</h3></section>",
        );
        let section = first_in_document_order(doc.select(&selector("section"))).unwrap();
        let h3 = first_within(section, &selector("h3")).unwrap();
        assert_eq!(h3.text().collect::<String>(), "inside");
    }
}
