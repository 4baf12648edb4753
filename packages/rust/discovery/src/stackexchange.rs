//! Question discovery through the Stack Exchange API.
//!
//! Walks `GET /2.3/questions?order=desc&sort=creation&tagged=..&site=..`
//! page by page until the API reports no more results, returns an empty page,
//! or the page cap is reached.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use qaharvest_shared::{DiscoveryConfig, HarvestError, Result};

use crate::url_list::dedup_urls;

/// Parameters for an API walk.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Full URL of the `/questions` endpoint.
    pub api_base: String,
    pub site: String,
    pub tag: String,
    pub page_size: u32,
    pub max_pages: u32,
    /// Pause between pages.
    pub delay_ms: u64,
}

impl From<&DiscoveryConfig> for ApiOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            site: config.site.clone(),
            tag: config.tag.clone(),
            page_size: config.page_size.min(100),
            max_pages: config.max_pages,
            delay_ms: config.delay_ms,
        }
    }
}

/// One question as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub title: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub score: i64,
    /// Canonical question URL.
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_answered: bool,
}

/// One page of the API's common wrapper object.
#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    items: Vec<QuestionSummary>,
    #[serde(default)]
    has_more: bool,
    /// Seconds the API asks us to wait before the next request.
    #[serde(default)]
    backoff: Option<u64>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Fetch every question summary for the configured tag and site.
#[instrument(skip_all, fields(tag = %opts.tag, site = %opts.site))]
pub async fn fetch_questions(client: &Client, opts: &ApiOptions) -> Result<Vec<QuestionSummary>> {
    let mut questions = Vec::new();

    for page in 1..=opts.max_pages {
        let body = fetch_page(client, opts, page).await?;

        if let Some(message) = body.error_message {
            return Err(HarvestError::Network(format!("stack exchange API: {message}")));
        }

        if body.items.is_empty() {
            info!(page, "no items on page, stopping");
            break;
        }

        debug!(page, count = body.items.len(), "collected questions");
        questions.extend(body.items);

        if !body.has_more {
            info!(page, "reached end of available data");
            break;
        }

        let wait_ms = body
            .backoff
            .map(|secs| secs.saturating_mul(1000))
            .unwrap_or(0)
            .max(opts.delay_ms);
        if wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }
    }

    info!(total = questions.len(), "question discovery complete");
    Ok(questions)
}

async fn fetch_page(client: &Client, opts: &ApiOptions, page: u32) -> Result<ApiPage> {
    let page_size = opts.page_size.to_string();
    let page_no = page.to_string();

    let response = client
        .get(&opts.api_base)
        .query(&[
            ("order", "desc"),
            ("sort", "creation"),
            ("tagged", opts.tag.as_str()),
            ("site", opts.site.as_str()),
            ("pagesize", page_size.as_str()),
            ("page", page_no.as_str()),
        ])
        .send()
        .await
        .map_err(|e| HarvestError::Network(format!("{}: {e}", opts.api_base)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| HarvestError::Network(format!("{}: body read failed: {e}", opts.api_base)))?;

    if !status.is_success() {
        // The API reports errors as a wrapper object with `error_message`.
        let detail = serde_json::from_str::<ApiPage>(&text)
            .ok()
            .and_then(|p| p.error_message)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(HarvestError::Network(format!("stack exchange API: {detail}")));
    }

    serde_json::from_str(&text)
        .map_err(|e| HarvestError::parse(format!("stack exchange API page {page}: {e}")))
}

/// Question links as URLs, deduplicated. Unparseable links are skipped.
pub fn question_urls(questions: &[QuestionSummary]) -> Vec<Url> {
    let urls = questions.iter().filter_map(|q| match Url::parse(&q.link) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(link = %q.link, error = %e, "invalid question link");
            None
        }
    });
    dedup_urls(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/json")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn options(server: &MockServer) -> ApiOptions {
        ApiOptions {
            api_base: format!("{}/2.3/questions", server.uri()),
            site: "stackoverflow".into(),
            tag: "sap-basis".into(),
            page_size: 2,
            max_pages: 10,
            delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn walks_pages_until_has_more_is_false() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .and(query_param("page", "1"))
            .and(query_param("tagged", "sap-basis"))
            .and(query_param("sort", "creation"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("se_page1.json")))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("se_page2.json")))
            .mount(&server)
            .await;

        let client = Client::new();
        let questions = fetch_questions(&client, &options(&server)).await.unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].tags, vec!["sap", "sap-basis"]);
        assert!(questions[0].is_answered);
        assert_eq!(questions[2].score, -1);
        assert_eq!(questions[0].creation_date.timestamp(), 1_700_000_000);

        // The duplicate link on page 2 collapses.
        let urls = question_urls(&questions);
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"items": [], "has_more": true}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let questions = fetch_questions(&client, &options(&server)).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn respects_page_cap() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("se_page1.json")))
            .expect(2)
            .mount(&server)
            .await;

        let client = Client::new();
        let opts = ApiOptions {
            max_pages: 2,
            ..options(&server)
        };
        let questions = fetch_questions(&client, &opts).await.unwrap();
        assert_eq!(questions.len(), 4);
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error_id": 400, "error_message": "pagesize", "error_name": "bad_parameter"}"#,
            ))
            .mount(&server)
            .await;

        let client = Client::new();
        let err = fetch_questions(&client, &options(&server)).await.unwrap_err();
        assert!(err.to_string().contains("pagesize"));
    }

    #[test]
    fn options_cap_page_size() {
        let config = DiscoveryConfig {
            page_size: 500,
            ..DiscoveryConfig::default()
        };
        assert_eq!(ApiOptions::from(&config).page_size, 100);
    }
}
