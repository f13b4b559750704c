//! HTTP adapter
//!
//! reqwest implementations of the backend and navigator ports.

pub mod client;
pub mod download;

pub use client::HttpFeedBackend;
pub use download::FileDownloader;
