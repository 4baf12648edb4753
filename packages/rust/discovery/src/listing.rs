//! Question discovery by walking tag listing pages.
//!
//! Starts from a listing such as `https://stackoverflow.com/questions/tagged/sap-basis`,
//! collects the question links on each page and follows the "next" link.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use qaharvest_shared::{DiscoveryConfig, HarvestError, Result};
use qaharvest_source::PageSource;

use crate::url_list::dedup_urls;

/// Compiled selectors for listing pages.
#[derive(Debug, Clone)]
pub struct ListingLayout {
    link: Selector,
    next: Selector,
}

impl ListingLayout {
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            link: compile(&config.listing_link)?,
            next: compile(&config.listing_next)?,
        })
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::config(format!("invalid selector `{css}`: {e}")))
}

/// What one listing page yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub questions: Vec<Url>,
    pub next: Option<Url>,
}

/// Extract question links and the next-page link from a listing page.
///
/// Only links whose resolved path is under `/questions/` count as questions.
pub fn parse_listing(html: &str, base: &Url, layout: &ListingLayout) -> ListingPage {
    let document = Html::parse_document(html);

    let questions = document
        .select(&layout.link)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| url.path().starts_with("/questions/"))
        .collect();

    let next = document
        .select(&layout.next)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| base.join(href).ok());

    ListingPage { questions, next }
}

/// Walk listing pages from `start`, up to `max_pages`, collecting unique question URLs.
///
/// A page that fails to fetch ends the walk; what was collected so far is kept.
#[instrument(skip_all, fields(start = %start, source = source.name()))]
pub async fn discover_from_listing<S: PageSource>(
    start: &Url,
    source: &S,
    layout: &ListingLayout,
    max_pages: u32,
) -> Result<Vec<Url>> {
    let mut collected = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(start.clone());
    let mut pages = 0u32;

    while let Some(url) = current.take() {
        if pages >= max_pages {
            info!(max_pages, "page cap reached");
            break;
        }
        if !visited.insert(url.as_str().to_string()) {
            warn!(%url, "listing loops back on itself, stopping");
            break;
        }

        let page = match source.fetch(&url).await {
            Ok(page) => page,
            Err(e) if pages > 0 => {
                warn!(%url, error = %e, "listing page failed, keeping results so far");
                break;
            }
            Err(e) => return Err(e),
        };
        pages += 1;

        let listing = parse_listing(&page.html, &page.url, layout);
        debug!(%url, found = listing.questions.len(), "listing page parsed");

        collected.extend(listing.questions);
        current = listing.next;
    }

    let urls = dedup_urls(collected);
    info!(pages, total = urls.len(), "listing discovery complete");
    Ok(urls)
}
