//! Application configuration for qaharvest.
//!
//! User config lives at `~/.qaharvest/qaharvest.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};
use crate::types::DEFAULT_TOPIC;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "qaharvest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".qaharvest";

// ---------------------------------------------------------------------------
// Config structs (matching qaharvest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP fetching.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Page layout selectors.
    #[serde(default)]
    pub selectors: SelectorsConfig,

    /// URL discovery.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Topic label written into every record.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Default output file for a batch.
    #[serde(default = "default_output")]
    pub output: String,

    /// Pages processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            output: default_output(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_topic() -> String {
    DEFAULT_TOPIC.into()
}
fn default_output() -> String {
    "scraped_data.json".into()
}
fn default_concurrency() -> u32 {
    4
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header; empty means the built-in default.
    #[serde(default)]
    pub user_agent: String,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Minimum ms each fetch waits before sending.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: String::new(),
            max_redirects: default_max_redirects(),
            rate_limit_ms: default_rate_limit(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}
fn default_rate_limit() -> u64 {
    200
}

/// `[selectors]` section: where things live on a question page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorsConfig {
    #[serde(default = "default_title_sel")]
    pub title: String,
    #[serde(default = "default_question_body_sel")]
    pub question_body: String,
    #[serde(default = "default_tag_sel")]
    pub tag: String,
    #[serde(default = "default_answer_sel")]
    pub answer: String,
    /// Relative to an answer container.
    #[serde(default = "default_answer_body_sel")]
    pub answer_body: String,
    /// Relative to an answer container.
    #[serde(default = "default_vote_count_sel")]
    pub vote_count: String,
    /// Class token marking the accepted answer container.
    #[serde(default = "default_accepted_class")]
    pub accepted_class: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            title: default_title_sel(),
            question_body: default_question_body_sel(),
            tag: default_tag_sel(),
            answer: default_answer_sel(),
            answer_body: default_answer_body_sel(),
            vote_count: default_vote_count_sel(),
            accepted_class: default_accepted_class(),
        }
    }
}

fn default_title_sel() -> String {
    "#question-header > h1 > a".into()
}
fn default_question_body_sel() -> String {
    ".question .js-post-body".into()
}
fn default_tag_sel() -> String {
    ".post-taglist .post-tag".into()
}
fn default_answer_sel() -> String {
    ".answer".into()
}
fn default_answer_body_sel() -> String {
    ".js-post-body".into()
}
fn default_vote_count_sel() -> String {
    ".js-vote-count".into()
}
fn default_accepted_class() -> String {
    "accepted-answer".into()
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Stack Exchange questions endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Stack Exchange site parameter.
    #[serde(default = "default_site")]
    pub site: String,

    /// Tag filter for the API.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Items per API page (the API caps this at 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Safety cap on pages walked, for both API and listing discovery.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Pause between consecutive pages.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Question links on a search listing page.
    #[serde(default = "default_listing_link_sel")]
    pub listing_link: String,

    /// "Next page" link on a search listing page.
    #[serde(default = "default_listing_next_sel")]
    pub listing_next: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            site: default_site(),
            tag: default_tag(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            delay_ms: default_delay_ms(),
            listing_link: default_listing_link_sel(),
            listing_next: default_listing_next_sel(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.stackexchange.com/2.3/questions".into()
}
fn default_site() -> String {
    "stackoverflow".into()
}
fn default_tag() -> String {
    "sap-basis".into()
}
fn default_page_size() -> u32 {
    100
}
fn default_max_pages() -> u32 {
    100
}
fn default_delay_ms() -> u64 {
    1500
}
fn default_listing_link_sel() -> String {
    ".s-post-summary h3 a".into()
}
fn default_listing_next_sel() -> String {
    "a[rel='next']".into()
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime HTTP configuration used by page sources and discovery.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
}

/// Fallback User-Agent when the config leaves it empty.
pub const DEFAULT_USER_AGENT: &str = concat!("qaharvest/", env!("CARGO_PKG_VERSION"));

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        let user_agent = if config.fetch.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            config.fetch.user_agent.clone()
        };

        Self {
            timeout_secs: config.fetch.timeout_secs,
            user_agent,
            max_redirects: config.fetch.max_redirects,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.qaharvest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| HarvestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.qaharvest/qaharvest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HarvestError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HarvestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HarvestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HarvestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("topic = \"SAP\""));
        assert!(toml_str.contains("accepted-answer"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.concurrency, 4);
        assert_eq!(parsed.selectors.title, "#question-header > h1 > a");
        assert_eq!(parsed.discovery.page_size, 100);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
topic = "Kubernetes"

[selectors]
accepted_class = "is-accepted"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.topic, "Kubernetes");
        assert_eq!(config.defaults.output, "scraped_data.json");
        assert_eq!(config.selectors.accepted_class, "is-accepted");
        assert_eq!(config.selectors.answer, ".answer");
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.timeout_secs, 30);
        assert_eq!(fetch.max_redirects, 5);
        assert_eq!(fetch.user_agent, DEFAULT_USER_AGENT);

        let mut app = AppConfig::default();
        app.fetch.user_agent = "Mozilla/5.0 test".into();
        assert_eq!(FetchConfig::from(&app).user_agent, "Mozilla/5.0 test");
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/qaharvest.toml")).unwrap_err();
        assert!(matches!(err, HarvestError::Io { .. }));
    }
}
