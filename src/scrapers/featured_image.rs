//! JPL featured image.
//!
//! The carousel on the JPL space images page does not use an `<img>`; the
//! image is set through an inline style on `article.carousel_item`:
//!
//! ```text
//! <article class="carousel_item" style="background-image: url('/spaceimages/images/wallpaper/PIA17563-1920x1200.jpg');">
//! ```
//!
//! The root-relative path between `url('` and `');` is appended verbatim to
//! the JPL origin.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::{first_in_document_order, selector};
use crate::error::{ScrapeError, Stage};

static CAROUSEL_ITEM: Lazy<Selector> = Lazy::new(|| selector("article.carousel_item"));

static STYLE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"url\('(.*?)'\);").unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
});

/// Relative URL embedded in a `background-image: url('...');` style.
///
/// # Errors
///
/// [`ScrapeError::Data`] if either marker is missing or the path between them
/// is empty.
pub fn style_image_path(style: &str) -> Result<&str, ScrapeError> {
    let captures = STYLE_URL.captures(style).ok_or_else(|| {
        ScrapeError::data(
            Stage::FeaturedImage,
            format!("style has no url('...'); marker: {style:?}"),
        )
    })?;
    let path = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    if path.is_empty() {
        return Err(ScrapeError::data(
            Stage::FeaturedImage,
            "style url('...') is empty",
        ));
    }
    Ok(path)
}

/// Absolute URL of the featured image.
///
/// # Errors
///
/// - [`ScrapeError::Structure`] if there is no carousel item or it has no `style`
/// - [`ScrapeError::Data`] if the style is malformed, the path is not
///   root-relative, or base + path is not a valid URL
#[instrument(level = "debug", skip_all, fields(base = %base))]
pub fn extract_featured_image(doc: &Html, base: &Url) -> Result<String, ScrapeError> {
    let article = first_in_document_order(doc.select(&CAROUSEL_ITEM)).ok_or_else(|| {
        ScrapeError::structure(Stage::FeaturedImage, "no `article.carousel_item` on page")
    })?;

    let style = article.value().attr("style").ok_or_else(|| {
        ScrapeError::structure(
            Stage::FeaturedImage,
            "`article.carousel_item` has no style attribute",
        )
    })?;

    let path = style_image_path(style)?;
    if !path.starts_with('/') {
        return Err(ScrapeError::data(
            Stage::FeaturedImage,
            format!("image path {path:?} is not root-relative"),
        ));
    }

    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    if let Err(e) = Url::parse(&joined) {
        return Err(ScrapeError::data(
            Stage::FeaturedImage,
            format!("{joined:?} is not a valid URL: {e}"),
        ));
    }

    debug!(url = %joined, "Extracted featured image");
    Ok(joined)
}
