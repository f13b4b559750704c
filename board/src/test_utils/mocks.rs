//! Mock implementations of port traits
//!
//! In-memory implementations that can be configured per test and record how
//! they were used.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    BulkAddOutcome, DownloadTarget, FeedId, FeedRecord, FeedSnapshot, FeedStatus, Notice,
    RefreshOutcome, RefreshedFeed, ScanProgress,
};
use crate::domain::ports::{FeedBackend, Navigator, Screen};
use crate::error::BackendError;
use crate::render::BoardView;

pub const TEST_BACKEND_URL: &str = "http://backend.test";

// ============================================================================
// In-Memory Feed Backend
// ============================================================================

#[derive(Default)]
pub struct InMemoryFeedBackend {
    feeds: Arc<RwLock<Vec<FeedRecord>>>,
    scan_progress: Arc<RwLock<Option<ScanProgress>>>,
    next_scan: Arc<RwLock<Option<DateTime<Utc>>>>,
    calls: Arc<RwLock<Vec<&'static str>>>,
    list_error: Arc<RwLock<Option<String>>>,
    /// Number of upcoming `list_feeds` calls that never resolve
    hung_lists: Arc<RwLock<usize>>,
    refresh_error: Option<String>,
    delete_error: Option<String>,
}

impl InMemoryFeedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a feed
    pub fn with_feed(self, feed: FeedRecord) -> Self {
        self.feeds.write().unwrap().push(feed);
        self
    }

    pub fn with_next_scan(self, next_scan: DateTime<Utc>) -> Self {
        *self.next_scan.write().unwrap() = Some(next_scan);
        self
    }

    pub fn with_scan_progress(self, progress: ScanProgress) -> Self {
        *self.scan_progress.write().unwrap() = Some(progress);
        self
    }

    /// Make both single and backend-wide refreshes fail with `message`
    pub fn failing_refresh(mut self, message: &str) -> Self {
        self.refresh_error = Some(message.to_string());
        self
    }

    pub fn failing_delete(mut self, message: &str) -> Self {
        self.delete_error = Some(message.to_string());
        self
    }

    /// Toggle failure of `list_feeds` mid-test
    pub fn fail_list(&self, message: Option<&str>) {
        *self.list_error.write().unwrap() = message.map(str::to_string);
    }

    /// Make the next `count` calls to `list_feeds` hang forever
    pub fn hanging_list(self, count: usize) -> Self {
        *self.hung_lists.write().unwrap() = count;
        self
    }

    /// Number of calls made to the named port method
    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| **call == method)
            .count()
    }

    fn record(&self, method: &'static str) {
        self.calls.write().unwrap().push(method);
    }
}

#[async_trait]
impl FeedBackend for InMemoryFeedBackend {
    async fn list_feeds(&self) -> Result<FeedSnapshot, BackendError> {
        self.record("list_feeds");
        let hang = {
            let mut hung = self.hung_lists.write().unwrap();
            let hang = *hung > 0;
            *hung = hung.saturating_sub(1);
            hang
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if let Some(message) = self.list_error.read().unwrap().clone() {
            return Err(BackendError::api(500, message));
        }

        Ok(FeedSnapshot {
            feeds: self.feeds.read().unwrap().clone(),
            scan_progress: self.scan_progress.read().unwrap().clone(),
            next_scan: *self.next_scan.read().unwrap(),
        })
    }

    async fn refresh_all(&self) -> Result<(), BackendError> {
        self.record("refresh_all");
        match &self.refresh_error {
            Some(message) => Err(BackendError::api(500, message.clone())),
            None => Ok(()),
        }
    }

    async fn refresh_feed(&self, id: FeedId) -> Result<RefreshOutcome, BackendError> {
        self.record("refresh_feed");
        if let Some(message) = &self.refresh_error {
            return Err(BackendError::api(500, message.clone()));
        }

        let mut feeds = self.feeds.write().unwrap();
        let feed = feeds
            .iter_mut()
            .find(|feed| feed.id == id)
            .ok_or_else(|| BackendError::api(404, "Feed not found"))?;

        let now = Utc::now();
        feed.status = FeedStatus::ScanComplete;
        feed.last_scan_time = Some(now);

        Ok(RefreshOutcome {
            message: Some("Feed refreshed".to_string()),
            feed: Some(RefreshedFeed {
                last_scan_time: Some(now),
                last_article_date: feed.last_article_date,
            }),
        })
    }

    async fn delete_feed(&self, id: FeedId) -> Result<(), BackendError> {
        self.record("delete_feed");
        if let Some(message) = &self.delete_error {
            return Err(BackendError::api(500, message.clone()));
        }

        let mut feeds = self.feeds.write().unwrap();
        let before = feeds.len();
        feeds.retain(|feed| feed.id != id);
        if feeds.len() == before {
            return Err(BackendError::api(404, "Feed not found"));
        }
        Ok(())
    }

    /// Mirrors the backend: duplicates are rejected per URL, and a request
    /// that adds nothing is a 400
    async fn add_feeds(&self, urls: &[String]) -> Result<BulkAddOutcome, BackendError> {
        self.record("add_feeds");

        let mut feeds = self.feeds.write().unwrap();
        let mut errors = Vec::new();
        let mut added = 0;

        for url in urls {
            if feeds.iter().any(|feed| &feed.url == url) {
                errors.push(format!("Feed already exists: {}", url));
                continue;
            }
            let id = feeds.iter().map(|feed| feed.id.0).max().unwrap_or(0) + 1;
            feeds.push(FeedRecord {
                id: FeedId(id),
                title: None,
                url: url.clone(),
                num_articles: 0,
                recent_articles: 0,
                last_article_date: None,
                last_scan_time: None,
                last_updated: None,
                last_scan_trigger: None,
                status: FeedStatus::Active,
                next_automatic_scan: None,
            });
            added += 1;
        }

        if added == 0 {
            return Err(BackendError::api(400, errors.join(", ")));
        }

        Ok(BulkAddOutcome {
            message: Some(format!("Added {} feeds", added)),
            errors,
        })
    }

    fn download_url(&self, target: &DownloadTarget) -> String {
        format!("{}{}", TEST_BACKEND_URL, target.path())
    }
}

// ============================================================================
// Recording Navigator
// ============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Arc<RwLock<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.read().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, url: &str) -> Result<String, BackendError> {
        self.visited.write().unwrap().push(url.to_string());
        Ok(url.to_string())
    }
}

// ============================================================================
// Recording Screen
// ============================================================================

#[derive(Default)]
pub struct RecordingScreen {
    pub paints: Vec<BoardView>,
    pub notices: Vec<Notice>,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_view(&self) -> Option<&BoardView> {
        self.paints.last()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Screen for RecordingScreen {
    fn paint(&mut self, view: &BoardView) {
        self.paints.push(view.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
