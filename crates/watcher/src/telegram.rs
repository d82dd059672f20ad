//! Outbound adapter for Telegram message delivery.

use std::time::Duration;

use serde_json::json;

use statusbot_common::config::Settings;
use statusbot_common::error::WatchError;

use crate::poller::Messenger;

/// Delivers plain-text messages via the Telegram Bot API.
///
/// The last line of defense: delivery failure is reported as `false`, never
/// raised, so a broken chat target or a rate limit can never crash the loop.
pub struct TelegramMessenger {
    http: reqwest::Client,
    /// Full sendMessage URL; carries the bot token, so it is never logged.
    send_url: String,
    chat_id: String,
}

impl TelegramMessenger {
    pub fn new(settings: &Settings) -> Result<Self, WatchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .map_err(|err| WatchError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            send_url: format!(
                "{}/bot{}/sendMessage",
                settings.telegram_api_base.trim_end_matches('/'),
                settings.telegram_token
            ),
            chat_id: settings.telegram_chat_id.clone(),
        })
    }
}

impl Messenger for TelegramMessenger {
    async fn send(&self, text: &str) -> bool {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        match self.http.post(&self.send_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Message delivered to Telegram");
                true
            }
            Ok(response) => {
                tracing::error!(
                    status = %response.status(),
                    "Telegram rejected the message"
                );
                false
            }
            Err(err) => {
                tracing::error!(error = %err, "Telegram delivery failed");
                false
            }
        }
    }
}
