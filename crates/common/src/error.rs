use thiserror::Error;

/// Closed set of failure kinds the poll loop matches on.
///
/// `MissingTokens` and `Config` are fatal and only ever produced before the
/// loop starts. Everything else is cycle-scoped: the loop logs it, optionally
/// notifies the operator once per failure streak, and carries on without
/// advancing the cursor.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("missing required environment variables: {0}")]
    MissingTokens(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("homework API request failed: {0}")]
    ApiRequest(String),

    #[error("unexpected response shape: {0}")]
    TypeMismatch(String),

    #[error("response is missing required keys: {0}")]
    MissingKeys(String),

    #[error("unrecognized homework status: {0}")]
    HomeworkStatus(String),

    #[error("message delivery failed: {0}")]
    Delivery(String),
}
