use crate::error::WatchError;

/// Default homework-status endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Environment variables that must be present before the loop starts.
const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Application configuration loaded once at start-up and passed by reference
/// into the watcher and its collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OAuth token for the homework-status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives status and failure notifications
    pub telegram_chat_id: String,

    /// Homework-status endpoint URL
    pub endpoint: String,

    /// Telegram Bot API base URL (overridable for test servers)
    pub telegram_api_base: String,

    /// Main poll period in seconds (default: 600)
    pub poll_period_secs: u64,

    /// Backoff between delivery retries within one cycle (default: 30)
    pub send_retry_secs: u64,

    /// Safety gap subtracted when advancing the cursor (default: 1)
    pub cursor_gap_secs: i64,

    /// Timeout applied to every outbound HTTP request (default: 10)
    pub http_timeout_secs: u64,

    /// Fixed starting cursor for replaying a past window (testing aid)
    pub replay_from: Option<i64>,
}

impl Settings {
    /// Load configuration from environment variables, reading `.env` first.
    ///
    /// Fails with `MissingTokens` naming every absent required variable,
    /// comma-joined, or with `Config` when an optional numeric override does
    /// not parse. Both are fatal.
    pub fn from_env() -> Result<Self, WatchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. `from_env` passes
    /// `std::env::var`; tests pass a closure over a fixture map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WatchError> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .filter(|name| lookup(name).is_none())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(WatchError::MissingTokens(missing.join(", ")));
        }

        let settings = Settings {
            practicum_token: lookup("PRACTICUM_TOKEN").unwrap_or_default(),
            telegram_token: lookup("TELEGRAM_TOKEN").unwrap_or_default(),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID").unwrap_or_default(),
            endpoint: lookup("WATCH_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            telegram_api_base: lookup("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            poll_period_secs: parse_var(&lookup, "WATCH_POLL_PERIOD_SECS", 600)?,
            send_retry_secs: parse_var(&lookup, "WATCH_SEND_RETRY_SECS", 30)?,
            cursor_gap_secs: parse_var(&lookup, "WATCH_CURSOR_GAP_SECS", 1)?,
            http_timeout_secs: parse_var(&lookup, "WATCH_HTTP_TIMEOUT_SECS", 10)?,
            replay_from: match lookup("WATCH_REPLAY_FROM") {
                Some(raw) => Some(raw.parse().map_err(|_| {
                    WatchError::Config("WATCH_REPLAY_FROM must be a unix timestamp".to_string())
                })?),
                None => None,
            },
        };

        tracing::debug!("All required environment variables present");
        Ok(settings)
    }
}

/// Read an optional numeric variable, falling back to a default.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, WatchError> {
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| WatchError::Config(format!("{name} must be a number"))),
        None => Ok(default),
    }
}
