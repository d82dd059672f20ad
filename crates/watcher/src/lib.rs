//! Homework-status watcher: polls the review API on a fixed cadence and
//! relays status changes to a Telegram chat.
//!
//! The [`poller::Watcher`] owns the control loop; [`api`] and [`telegram`]
//! are the two outbound adapters, [`validate`] and [`status`] the pure
//! response-checking collaborators.

pub mod api;
pub mod poller;
pub mod status;
pub mod telegram;
pub mod validate;
