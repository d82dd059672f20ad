//! The poll loop: fetch → validate → interpret → notify → advance cursor.
//!
//! One cycle at a time, no overlapping ticks. The cursor and the
//! error-reported flag are the only mutable state, both owned here and
//! touched only between ticks. The cursor advances exclusively after a fully
//! successful cycle, so a transient failure re-queries the same window next
//! tick and no status change is ever skipped.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use statusbot_common::config::Settings;
use statusbot_common::error::WatchError;

use crate::status::parse_status;
use crate::validate::check_response;

/// Delivery attempts per cycle before the cycle is declared failed.
const SEND_ATTEMPTS: u32 = 3;

/// One request/response exchange with the homework-status API.
pub trait StatusApi {
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError>;
}

/// Outbound message delivery. Implementations report failure, never raise.
pub trait Messenger {
    async fn send(&self, text: &str) -> bool;
}

/// Watcher that continuously polls the review API for status changes.
pub struct Watcher<A: StatusApi, M: Messenger> {
    api: A,
    messenger: M,
    /// `from_date` of the next query window; advances only on full success.
    cursor: i64,
    /// Set once a failure notification went out for the current streak.
    error_reported: bool,
    poll_period: Duration,
    send_retry: Duration,
    cursor_gap_secs: i64,
}

impl<A: StatusApi, M: Messenger> Watcher<A, M> {
    pub fn new(settings: &Settings, api: A, messenger: M) -> Self {
        let cursor = settings
            .replay_from
            .unwrap_or_else(|| Utc::now().timestamp());
        Self {
            api,
            messenger,
            cursor,
            error_reported: false,
            poll_period: Duration::from_secs(settings.poll_period_secs),
            send_retry: Duration::from_secs(settings.send_retry_secs),
            cursor_gap_secs: settings.cursor_gap_secs,
        }
    }

    /// Current query-window start. After a failed cycle this is unchanged.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Whether the current failure streak has already been reported.
    pub fn error_reported(&self) -> bool {
        self.error_reported
    }

    /// Start the polling loop. Runs until the task is cancelled.
    pub async fn run(&mut self) {
        tracing::info!(
            cursor = self.cursor,
            poll_period_secs = self.poll_period.as_secs(),
            "Watcher started"
        );

        loop {
            self.tick().await;
            tokio::time::sleep(self.poll_period).await;
        }
    }

    /// One full tick: run a cycle and absorb any failure.
    pub async fn tick(&mut self) {
        if let Err(err) = self.run_cycle().await {
            self.handle_cycle_error(err).await;
        }
    }

    /// One poll cycle: fetch the window, validate the shape, notify about
    /// the newest record if any, then advance the cursor.
    pub async fn run_cycle(&mut self) -> Result<(), WatchError> {
        let response = self.api.fetch(self.cursor).await?;
        check_response(&response)?;

        // Validated above: "homeworks" is a present array
        let homeworks = response
            .get("homeworks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        match homeworks.first() {
            Some(newest) => {
                let message = parse_status(newest)?;
                self.deliver(&message).await?;
            }
            None => tracing::debug!("No new statuses in the window"),
        }

        self.cursor = Utc::now().timestamp() - self.cursor_gap_secs;
        self.error_reported = false;
        Ok(())
    }

    /// Deliver one message with bounded retry. Same message, no re-fetch,
    /// no cursor movement between attempts.
    async fn deliver(&self, text: &str) -> Result<(), WatchError> {
        for attempt in 1..=SEND_ATTEMPTS {
            if self.messenger.send(text).await {
                return Ok(());
            }
            if attempt < SEND_ATTEMPTS {
                tracing::warn!(attempt, "Delivery failed, retrying after backoff");
                tokio::time::sleep(self.send_retry).await;
            }
        }
        Err(WatchError::Delivery(format!(
            "giving up after {SEND_ATTEMPTS} attempts"
        )))
    }

    /// Cycle-scoped failure recovery. The cursor is never advanced here, so
    /// the failed window is re-queried next tick.
    async fn handle_cycle_error(&mut self, err: WatchError) {
        tracing::error!(error = %err, "Poll cycle failed");

        match err {
            // The notification channel itself is broken — reporting the
            // failure through it cannot work
            WatchError::Delivery(_) => {}
            WatchError::MissingTokens(_)
            | WatchError::Config(_)
            | WatchError::ApiRequest(_)
            | WatchError::TypeMismatch(_)
            | WatchError::MissingKeys(_)
            | WatchError::HomeworkStatus(_) => {
                if self.error_reported {
                    tracing::debug!("Failure streak already reported, suppressing duplicate");
                } else {
                    let text = format!("Сбой в работе программы: {err}");
                    if self.messenger.send(&text).await {
                        self.error_reported = true;
                    }
                }
            }
        }
    }
}
