//! Application configuration for careerwatch.
//!
//! User config lives at `~/.careerwatch/careerwatch.toml`.
//! CLI flags override config file values, which override defaults.
//! The webhook URL may also come from the environment (see [`NotifyConfig`]).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CareerWatchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "careerwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".careerwatch";

/// Browser-like User-Agent; the careers site serves a bare shell to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching careerwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The careers site being watched.
    #[serde(default)]
    pub site: SiteConfig,

    /// Relevance keyword policy.
    #[serde(default)]
    pub keywords: KeywordConfig,

    /// Page fetching.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Webhook notifications.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Seen-set persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily schedule for `watch`.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Company name shown in notifications.
    #[serde(default = "default_company")]
    pub company: String,

    /// Page listing all open postings.
    #[serde(default = "default_careers_url")]
    pub careers_url: String,

    /// Origin prefixed onto relative posting links.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Link prefix identifying a posting detail page.
    #[serde(default = "default_detail_path_prefix")]
    pub detail_path_prefix: String,

    /// Link prefix identifying an external application form.
    #[serde(default = "default_apply_url_prefix")]
    pub apply_url_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            company: default_company(),
            careers_url: default_careers_url(),
            origin: default_origin(),
            detail_path_prefix: default_detail_path_prefix(),
            apply_url_prefix: default_apply_url_prefix(),
        }
    }
}

fn default_company() -> String {
    "OpenAI".into()
}
fn default_careers_url() -> String {
    "https://openai.com/careers/search/".into()
}
fn default_origin() -> String {
    "https://openai.com".into()
}
fn default_detail_path_prefix() -> String {
    "/careers/".into()
}
fn default_apply_url_prefix() -> String {
    "https://jobs.".into()
}

/// `[keywords]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// A title must contain at least one of these to be relevant.
    #[serde(default = "default_target_keywords")]
    pub target: Vec<String>,

    /// A title containing any of these is rejected, whatever else it contains.
    #[serde(default = "default_avoid_keywords")]
    pub avoid: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            target: default_target_keywords(),
            avoid: default_avoid_keywords(),
        }
    }
}

fn default_target_keywords() -> Vec<String> {
    [
        "electrical",
        "hardware",
        "circuit",
        "robotics",
        "system software",
        "machine learning",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_avoid_keywords() -> Vec<String> {
    ["site", "data center", "firmware", "simulation"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// How the careers page is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    /// Plain HTTP GET; enough when the page is server-rendered.
    #[default]
    Http,
    /// Spawn a headless browser command and read the final DOM from stdout.
    Command,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Which fetcher renders the page.
    #[serde(default)]
    pub renderer: RendererKind,

    /// Upper bound on a single page fetch.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// User-Agent sent by the HTTP fetcher.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headless browser invocation; the page URL is appended as the last argument.
    #[serde(default = "default_render_command")]
    pub command: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            command: default_render_command(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_render_command() -> Vec<String> {
    [
        "chromium",
        "--headless",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--virtual-time-budget=5000",
        "--dump-dom",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[notify]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL. Prefer the env var; this is a fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Name of the env var holding the webhook URL (overrides `webhook_url`).
    #[serde(default = "default_webhook_url_env")]
    pub webhook_url_env: String,

    /// Username the messages are posted under.
    #[serde(default = "default_username")]
    pub username: String,

    /// Footer on the "no new jobs" summary.
    #[serde(default = "default_footer")]
    pub footer: String,

    /// Upper bound on a single webhook post.
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_url_env: default_webhook_url_env(),
            username: default_username(),
            footer: default_footer(),
            timeout_secs: default_notify_timeout(),
        }
    }
}

impl NotifyConfig {
    /// The effective webhook URL: env var first, then the file value.
    /// A blank value counts as absent, so a blank env var falls back to the file.
    pub fn resolved_webhook_url(&self) -> Option<String> {
        let non_blank = |u: &str| Some(u.trim().to_string()).filter(|u| !u.is_empty());

        std::env::var(&self.webhook_url_env)
            .ok()
            .and_then(|u| non_blank(&u))
            .or_else(|| self.webhook_url.as_deref().and_then(non_blank))
    }
}

fn default_webhook_url_env() -> String {
    "DISCORD_WEBHOOK_URL".into()
}
fn default_username() -> String {
    "OpenAI Job Bot".into()
}
fn default_footer() -> String {
    "OpenAI Careers Job Scraper".into()
}
fn default_notify_timeout() -> u64 {
    10
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Seen-set file. A leading `~/` expands to the home directory.
    #[serde(default = "default_seen_file")]
    pub seen_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_file: default_seen_file(),
        }
    }
}

impl StorageConfig {
    /// The seen-set file with `~` expanded.
    pub fn seen_file_path(&self) -> PathBuf {
        expand_tilde(&self.seen_file)
    }
}

fn default_seen_file() -> String {
    format!("~/{CONFIG_DIR_NAME}/known_jobs.json")
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Daily run time, local 24-hour `HH:MM`.
    #[serde(default = "default_schedule_time")]
    pub time: String,

    /// Upper bound on one scheduled run.
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: default_schedule_time(),
            run_timeout_secs: default_run_timeout(),
        }
    }
}

fn default_schedule_time() -> String {
    "13:00".into()
}
fn default_run_timeout() -> u64 {
    300
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.careerwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CareerWatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.careerwatch/careerwatch.toml`).
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

/// Load the application config from a specific file path and validate it.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CareerWatchError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        CareerWatchError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file. An existing file is left alone.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CareerWatchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(CareerWatchError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CareerWatchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CareerWatchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs the pipeline cannot run with.
///
/// An empty target keyword list is allowed: it means nothing is ever relevant.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    for (field, value) in [
        ("site.careers_url", &config.site.careers_url),
        ("site.origin", &config.site.origin),
    ] {
        Url::parse(value)
            .map_err(|e| CareerWatchError::config(format!("{field} '{value}' is not a URL: {e}")))?;
    }

    if config.site.detail_path_prefix.is_empty() || config.site.apply_url_prefix.is_empty() {
        return Err(CareerWatchError::config(
            "site.detail_path_prefix and site.apply_url_prefix must not be empty",
        ));
    }

    if config.fetch.timeout_secs == 0 || config.notify.timeout_secs == 0 {
        return Err(CareerWatchError::config("timeouts must be at least 1 second"));
    }

    if config.fetch.renderer == RendererKind::Command && config.fetch.command.is_empty() {
        return Err(CareerWatchError::config(
            "fetch.renderer = \"command\" needs a non-empty fetch.command",
        ));
    }

    parse_hhmm(&config.schedule.time)?;
    Ok(())
}

/// Parse a 24-hour `HH:MM` string into `(hour, minute)`.
pub fn parse_hhmm(value: &str) -> Result<(u32, u32)> {
    let invalid = || CareerWatchError::config(format!("schedule time '{value}' is not HH:MM"));

    let (h, m) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("careers_url"));
        assert!(toml_str.contains("DISCORD_WEBHOOK_URL"));
        assert!(!toml_str.contains("webhook_url ="));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 30);
        assert_eq!(parsed.schedule.time, "13:00");
        assert!(parsed.keywords.avoid.contains(&"firmware".to_string()));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[keywords]
target = ["electrical"]
avoid = []

[fetch]
renderer = "command"
timeout_secs = 45
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.keywords.target, vec!["electrical".to_string()]);
        assert!(config.keywords.avoid.is_empty());
        assert_eq!(config.fetch.renderer, RendererKind::Command);
        assert_eq!(config.fetch.timeout_secs, 45);
        assert_eq!(config.fetch.command[0], "chromium");
        assert_eq!(config.site.detail_path_prefix, "/careers/");
        validate_config(&config).expect("valid");
    }

    #[test]
    fn empty_target_list_is_valid() {
        let mut config = AppConfig::default();
        config.keywords.target.clear();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_bad_origin_and_schedule() {
        let mut config = AppConfig::default();
        config.site.origin = "not a url".into();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.schedule.time = "25:00".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn parses_schedule_time() {
        assert_eq!(parse_hhmm("13:00").unwrap(), (13, 0));
        assert_eq!(parse_hhmm(" 7:05 ").unwrap(), (7, 5));
        assert!(parse_hhmm("1300").is_err());
        assert!(parse_hhmm("12:60").is_err());
    }

    #[test]
    fn unset_webhook_env_uses_file() {
        // Use a unique env var name to avoid interfering with other tests
        let mut notify = NotifyConfig {
            webhook_url: Some("https://example.com/file-hook".into()),
            webhook_url_env: "CW_TEST_WEBHOOK_UNSET_83121".into(),
            ..NotifyConfig::default()
        };
        assert_eq!(
            notify.resolved_webhook_url().as_deref(),
            Some("https://example.com/file-hook")
        );

        notify.webhook_url = Some("   ".into());
        assert!(notify.resolved_webhook_url().is_none());
    }

    #[test]
    fn webhook_env_var_wins_over_file() {
        let notify = NotifyConfig {
            webhook_url: Some("https://example.com/file-hook".into()),
            webhook_url_env: "CW_TEST_WEBHOOK_SET_51907".into(),
            ..NotifyConfig::default()
        };
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("CW_TEST_WEBHOOK_SET_51907", " https://example.com/env-hook ") };

        assert_eq!(
            notify.resolved_webhook_url().as_deref(),
            Some("https://example.com/env-hook")
        );
    }

    #[test]
    fn blank_webhook_env_var_falls_back_to_file() {
        let notify = NotifyConfig {
            webhook_url: Some("https://example.com/file-hook".into()),
            webhook_url_env: "CW_TEST_WEBHOOK_BLANK_62018".into(),
            ..NotifyConfig::default()
        };
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("CW_TEST_WEBHOOK_BLANK_62018", "") };

        assert_eq!(
            notify.resolved_webhook_url().as_deref(),
            Some("https://example.com/file-hook")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde("~/x/known_jobs.json");
        assert!(expanded.ends_with("x/known_jobs.json"));
        assert_eq!(expand_tilde("known_jobs.json"), PathBuf::from("known_jobs.json"));
    }
}
