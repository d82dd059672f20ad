//! Shared building blocks for the homework-status watcher: configuration,
//! the error taxonomy, and the review-status domain types.

pub mod config;
pub mod error;
pub mod types;
