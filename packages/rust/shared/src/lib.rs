//! Shared types, error model, and configuration for qaharvest.
//!
//! This crate is the foundation depended on by all other qaharvest crates.
//! It provides:
//! - [`HarvestError`]: the unified error type
//! - Record types ([`ContentBlock`], [`PageRecord`], [`AnswerRecord`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_USER_AGENT, DefaultsConfig, DiscoveryConfig, FetchConfig, FetchSection,
    SelectorsConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{HarvestError, Result};
pub use types::{AnswerRecord, ContentBlock, DEFAULT_TOPIC, PageRecord, QuestionRecord};
