//! Scenario tests for the poll loop, driven through fake API and messenger
//! adapters. No network involved:
//!
//! ```bash
//! cargo test -p statusbot-watcher --test integration
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use statusbot_common::config::Settings;
use statusbot_common::error::WatchError;
use statusbot_watcher::poller::{Messenger, StatusApi, Watcher};

// ============================================================
// Fakes
// ============================================================

/// Replays a scripted sequence of fetch results.
struct FakeApi {
    responses: Mutex<VecDeque<Result<Value, WatchError>>>,
}

impl FakeApi {
    fn scripted(responses: Vec<Result<Value, WatchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl StatusApi for &FakeApi {
    async fn fetch(&self, _from_date: i64) -> Result<Value, WatchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetch called more times than scripted")
    }
}

/// Records every send and replays scripted outcomes (default: success).
struct FakeMessenger {
    sent: Mutex<Vec<String>>,
    outcomes: Mutex<VecDeque<bool>>,
}

impl FakeMessenger {
    fn reliable() -> Self {
        Self::with_outcomes(vec![])
    }

    fn with_outcomes(outcomes: Vec<bool>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Messenger for &FakeMessenger {
    async fn send(&self, text: &str) -> bool {
        self.sent.lock().unwrap().push(text.to_string());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(true)
    }
}

// ============================================================
// Shared helpers
// ============================================================

const REPLAY_CURSOR: i64 = 1_000;

fn test_settings() -> Settings {
    Settings {
        practicum_token: "practicum-secret".to_string(),
        telegram_token: "telegram-secret".to_string(),
        telegram_chat_id: "42".to_string(),
        endpoint: "https://example.test/homework_statuses/".to_string(),
        telegram_api_base: "https://api.telegram.test".to_string(),
        poll_period_secs: 600,
        send_retry_secs: 0,
        cursor_gap_secs: 1,
        http_timeout_secs: 10,
        replay_from: Some(REPLAY_CURSOR),
    }
}

fn api_error() -> Result<Value, WatchError> {
    Err(WatchError::ApiRequest(
        "unexpected response status 503 Service Unavailable".to_string(),
    ))
}

// ============================================================
// Successful cycles
// ============================================================

#[tokio::test]
async fn approved_homework_is_relayed_verbatim() {
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [{"homework_name": "proj1", "status": "approved"}],
        "current_date": 123,
    }))]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.run_cycle().await.unwrap();

    assert_eq!(
        messenger.sent(),
        vec![
            "Изменился статус проверки работы \"proj1\". \
             Работа проверена: ревьюеру всё понравилось. Ура!"
        ]
    );
    assert!(watcher.cursor() > REPLAY_CURSOR);
    assert!(!watcher.error_reported());
}

#[tokio::test]
async fn only_newest_record_is_relayed() {
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [
            {"homework_name": "new", "status": "rejected"},
            {"homework_name": "old", "status": "approved"},
        ],
        "current_date": 123,
    }))]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.run_cycle().await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("\"new\""));
}

#[tokio::test]
async fn empty_window_sends_nothing_but_advances_cursor() {
    let empty = json!({"homeworks": [], "current_date": 123});
    let api = FakeApi::scripted(vec![Ok(empty.clone()), Ok(empty)]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.run_cycle().await.unwrap();
    let cursor_after_first = watcher.cursor();
    watcher.run_cycle().await.unwrap();

    assert!(messenger.sent().is_empty());
    assert!(cursor_after_first > REPLAY_CURSOR);
    assert!(watcher.cursor() >= cursor_after_first);
}

// ============================================================
// Failed cycles: cursor holds, failures are reported once
// ============================================================

#[tokio::test]
async fn failed_cycle_never_moves_the_cursor() {
    let api = FakeApi::scripted(vec![api_error()]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    assert!(watcher.run_cycle().await.is_err());
    assert_eq!(watcher.cursor(), REPLAY_CURSOR);
}

#[tokio::test]
async fn repeated_failure_is_reported_exactly_once() {
    let api = FakeApi::scripted(vec![api_error(), api_error()]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.tick().await;
    watcher.tick().await;

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Сбой в работе программы: "));
    assert!(watcher.error_reported());
    assert_eq!(watcher.cursor(), REPLAY_CURSOR);
}

#[tokio::test]
async fn successful_cycle_rearms_failure_reporting() {
    let api = FakeApi::scripted(vec![
        api_error(),
        Ok(json!({"homeworks": [], "current_date": 123})),
        api_error(),
    ]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.tick().await;
    assert!(watcher.error_reported());
    watcher.tick().await;
    assert!(!watcher.error_reported());
    watcher.tick().await;

    let failure_notices: Vec<String> = messenger
        .sent()
        .into_iter()
        .filter(|text| text.starts_with("Сбой в работе программы: "))
        .collect();
    assert_eq!(failure_notices.len(), 2);
}

#[tokio::test]
async fn missing_current_date_fails_validation_before_interpretation() {
    // The record carries an unknown status, but validation must reject the
    // response first, citing the absent key
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [{"homework_name": "x", "status": "unknown"}],
    }))]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    match watcher.run_cycle().await {
        Err(WatchError::MissingKeys(names)) => assert_eq!(names, "current_date"),
        other => panic!("expected MissingKeys, got {other:?}"),
    }
    assert!(messenger.sent().is_empty());
    assert_eq!(watcher.cursor(), REPLAY_CURSOR);
}

#[tokio::test]
async fn unknown_status_is_reported_to_operator() {
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [{"homework_name": "x", "status": "lost"}],
        "current_date": 123,
    }))]);
    let messenger = FakeMessenger::reliable();
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.tick().await;

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Сбой в работе программы: "));
    assert!(sent[0].contains("lost"));
    assert_eq!(watcher.cursor(), REPLAY_CURSOR);
}

// ============================================================
// Delivery retry
// ============================================================

#[tokio::test]
async fn delivery_retries_within_the_cycle_then_advances() {
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [{"homework_name": "proj1", "status": "reviewing"}],
        "current_date": 123,
    }))]);
    let messenger = FakeMessenger::with_outcomes(vec![false, false, true]);
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.run_cycle().await.unwrap();

    let sent = messenger.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|text| text == &sent[0]));
    assert!(watcher.cursor() > REPLAY_CURSOR);
}

#[tokio::test]
async fn exhausted_delivery_holds_cursor_and_is_not_re_reported() {
    let api = FakeApi::scripted(vec![Ok(json!({
        "homeworks": [{"homework_name": "proj1", "status": "reviewing"}],
        "current_date": 123,
    }))]);
    let messenger = FakeMessenger::with_outcomes(vec![false, false, false]);
    let mut watcher = Watcher::new(&test_settings(), &api, &messenger);

    watcher.tick().await;

    // Three delivery attempts and nothing else: no failure notice is pushed
    // through the same broken channel
    assert_eq!(messenger.sent().len(), 3);
    assert_eq!(watcher.cursor(), REPLAY_CURSOR);
    assert!(!watcher.error_reported());
}
