//! Page fetchers: turn a careers URL into final markup.
//!
//! The careers page is rendered client-side, so the production fetcher is
//! usually a headless browser driven through [`CommandPageFetcher`]. The plain
//! [`HttpPageFetcher`] covers server-rendered pages and tests.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

use careerwatch_shared::{CareerWatchError, FetchConfig, RendererKind, Result};

/// Source of rendered page markup.
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its final markup. Errors and timeouts are
    /// total failures; there is no partial result.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches the page with a single HTTP GET.
pub struct HttpPageFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpPageFetcher {
    /// Build a fetcher with the given User-Agent and request timeout.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CareerWatchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl PageFetcher for HttpPageFetcher {
    #[instrument(skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching page over HTTP");

        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CareerWatchError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        info!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

impl HttpPageFetcher {
    fn classify(&self, url: &Url, e: reqwest::Error) -> CareerWatchError {
        if e.is_timeout() {
            CareerWatchError::timeout(format!("fetch {url}"), self.timeout_secs)
        } else {
            CareerWatchError::Network(format!("{url}: {e}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Headless browser command
// ---------------------------------------------------------------------------

/// Runs a renderer command (e.g. `chromium --headless --dump-dom`) with the
/// page URL appended and reads the rendered DOM from its stdout.
pub struct CommandPageFetcher {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPageFetcher {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String], timeout_secs: u64) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CareerWatchError::config("renderer command is empty"))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl PageFetcher for CommandPageFetcher {
    #[instrument(skip_all, fields(%url, program = %self.program))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("rendering page with external command");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CareerWatchError::Network(format!(
                    "failed to spawn renderer: {e}. Is `{}` installed?",
                    self.program
                ))
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CareerWatchError::timeout(format!("render {url}"), self.timeout.as_secs()))?
            .map_err(|e| CareerWatchError::Network(format!("renderer I/O failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CareerWatchError::Network(format!(
                "renderer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let markup = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(bytes = markup.len(), "page rendered");
        Ok(markup)
    }
}

// ---------------------------------------------------------------------------
// Config-selected fetcher
// ---------------------------------------------------------------------------

/// The fetcher chosen by `[fetch].renderer`.
pub enum Fetcher {
    Http(HttpPageFetcher),
    Command(CommandPageFetcher),
}

impl Fetcher {
    /// Build the configured fetcher.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        match config.renderer {
            RendererKind::Http => Ok(Self::Http(HttpPageFetcher::new(
                &config.user_agent,
                config.timeout_secs,
            )?)),
            RendererKind::Command => Ok(Self::Command(CommandPageFetcher::new(
                &config.command,
                config.timeout_secs,
            )?)),
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        match self {
            Self::Http(f) => f.fetch(url).await,
            Self::Command(f) => f.fetch(url).await,
        }
    }
}
