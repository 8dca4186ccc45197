//! HTTP surface: view the stored record and trigger a refresh.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | HTML page of the stored record |
//! | `GET /scrape` | runs a refresh; static confirmation text, or `502` naming the failed stage |
//! | `GET /api/mars` | stored record as JSON, `404` when nothing has been scraped |

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::RefreshError;
use crate::models::ScrapedRecord;
use crate::pipeline::RefreshService;
use crate::utils::html_escape;

pub const REFRESH_COMPLETE: &str =
    "Refresh complete. Please return to the previous page and hit refresh.";

pub fn router(service: Arc<RefreshService>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/scrape", get(scrape))
        .route("/api/mars", get(api_record))
        .with_state(service)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            },
        ))
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(service: Arc<RefreshService>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Mars server listening");
    axum::serve(listener, router(service)).await
}

async fn index_page(State(service): State<Arc<RefreshService>>) -> Response {
    match service.current().await {
        Ok(record) => Html(render_page(record.as_ref())).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load record");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading record").into_response()
        }
    }
}

async fn scrape(State(service): State<Arc<RefreshService>>) -> Response {
    match service.refresh().await {
        Ok(_) => REFRESH_COMPLETE.into_response(),
        Err(RefreshError::Scrape(e)) => (
            StatusCode::BAD_GATEWAY,
            format!("Refresh failed in {} ({} error): {e}", e.stage(), e.kind()),
        )
            .into_response(),
        Err(e @ RefreshError::Store(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Refresh failed: {e}"),
        )
            .into_response(),
    }
}

async fn api_record(State(service): State<Arc<RefreshService>>) -> Response {
    match service.current().await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "No record yet; GET /scrape first").into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load record");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading record").into_response()
        }
    }
}

fn render_page(record: Option<&ScrapedRecord>) -> String {
    let Some(record) = record else {
        return build_page(
            r#"<p>Nothing scraped yet.</p><p><a class="btn" href="/scrape">Scrape new data</a></p>"#,
        );
    };

    let hemispheres: String = record
        .hemisphere_images
        .iter()
        .map(|h| {
            format!(
                r#"<figure><img src="{url}" alt="{title}"><figcaption>{title}</figcaption></figure>"#,
                url = html_escape(&h.img_url),
                title = html_escape(&h.title),
            )
        })
        .collect();

    // `facts` is markup generated by the facts extractor with escaped cells.
    let content = format!(
        r#"<p><a class="btn" href="/scrape">Scrape new data</a></p>
<section><h2>Latest Mars News</h2><h3>{title}</h3><p>{description}</p></section>
<section><h2>Featured Mars Image</h2><img src="{image}" alt="Featured Mars image"></section>
<section><h2>Mars Facts</h2>{facts}</section>
<section><h2>Mars Hemispheres</h2><div class="hemispheres">{hemispheres}</div></section>
<footer>Last scraped {scraped_at}</footer>"#,
        title = html_escape(&record.news_title),
        description = html_escape(&record.news_description),
        image = html_escape(&record.featured_image),
        facts = record.facts,
        scraped_at = record.scraped_at.to_rfc3339(),
    );
    build_page(&content)
}

fn build_page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Mission to Mars</title></head>
<body><h1>Mission to Mars</h1>
{content}
</body>
</html>"#
    )
}
