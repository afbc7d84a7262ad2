//! Shared types, error model, and configuration for careerwatch.
//!
//! This crate is the foundation depended on by all other careerwatch crates.
//! It provides:
//! - [`CareerWatchError`]: the unified error type
//! - Domain types ([`JobRecord`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_USER_AGENT, FetchConfig, KeywordConfig, NotifyConfig, RendererKind,
    ScheduleConfig, SiteConfig, StorageConfig, config_dir, config_file_path, expand_tilde,
    init_config, load_config, load_config_from, parse_hhmm, validate_config,
};
pub use error::{CareerWatchError, Result};
pub use types::JobRecord;
