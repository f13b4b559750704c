//! Feed board
//!
//! Terminal client for an RSS feed backend: polls the feed list, keeps the
//! sorted table, scan progress and next-scan countdown consistent, and runs
//! refresh, delete, bulk-add and download actions against the backend.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;

#[cfg(test)]
mod test_utils;

pub use app::{Command, FeedBoardController};
pub use config::BoardConfig;
pub use error::{BackendError, ConfigError};
