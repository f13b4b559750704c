//! Feed backend port
//!
//! The REST backend owns feeds, articles and scans. The board consumes it
//! as-is.

use async_trait::async_trait;

use crate::domain::entities::{BulkAddOutcome, DownloadTarget, FeedId, FeedSnapshot, RefreshOutcome};
use crate::error::BackendError;

#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// `GET /api/feeds`
    async fn list_feeds(&self) -> Result<FeedSnapshot, BackendError>;

    /// `POST /api/feeds/refresh`: rescan every feed
    async fn refresh_all(&self) -> Result<(), BackendError>;

    /// `POST /api/feeds/{id}/refresh`
    async fn refresh_feed(&self, id: FeedId) -> Result<RefreshOutcome, BackendError>;

    /// `DELETE /api/feeds/{id}`
    async fn delete_feed(&self, id: FeedId) -> Result<(), BackendError>;

    /// `POST /api/feeds/bulk`
    ///
    /// Succeeds when at least one URL was added; rejected URLs are listed in
    /// the outcome's `errors`.
    async fn add_feeds(&self, urls: &[String]) -> Result<BulkAddOutcome, BackendError>;

    /// Absolute URL of a download endpoint
    fn download_url(&self, target: &DownloadTarget) -> String;
}
