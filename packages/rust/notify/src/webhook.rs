//! Notification delivery.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use careerwatch_shared::{CareerWatchError, NotifyConfig, Result};

use crate::message::NotificationMessage;

/// Where notification messages go. Delivery is attempted once; retries are the
/// sink's own business.
pub trait NotificationSink: Send + Sync {
    fn send(&self, message: &NotificationMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Posts each message as a JSON embed to a chat webhook.
pub struct WebhookSink {
    client: Client,
    url: String,
    username: String,
    footer: String,
    timeout_secs: u64,
}

impl WebhookSink {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        footer: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                CareerWatchError::Notification(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url: url.into(),
            username: username.into(),
            footer: footer.into(),
            timeout_secs,
        })
    }
}

impl NotificationSink for WebhookSink {
    #[instrument(skip_all, fields(message = %message.summary()))]
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        let payload = message.to_payload(&self.username, &self.footer, Utc::now());
        debug!("posting webhook notification");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CareerWatchError::timeout("webhook post", self.timeout_secs)
                } else {
                    CareerWatchError::Notification(format!("webhook post failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CareerWatchError::Notification(format!(
                "webhook returned HTTP {status}: {}",
                body.trim()
            )));
        }

        info!("notification sent");
        Ok(())
    }
}

/// The sink chosen by configuration: a webhook when a URL resolves, otherwise
/// notifications are skipped.
pub enum Notifier {
    Webhook(WebhookSink),
    Disabled,
}

impl Notifier {
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        match config.resolved_webhook_url() {
            Some(url) => Ok(Self::Webhook(WebhookSink::new(
                url,
                &config.username,
                &config.footer,
                config.timeout_secs,
            )?)),
            None => {
                warn!(
                    env = %config.webhook_url_env,
                    "no webhook URL configured, notifications will be skipped"
                );
                Ok(Self::Disabled)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Webhook(_))
    }
}

impl NotificationSink for Notifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        match self {
            Self::Webhook(sink) => sink.send(message).await,
            Self::Disabled => {
                info!(message = %message.summary(), "notifications disabled, skipping");
                Ok(())
            }
        }
    }
}
