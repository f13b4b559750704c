//! Download endpoints

use chrono::NaiveDate;
use urlencoding::encode;

use super::feed::FeedId;

/// A file the backend can produce as a CSV download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    /// All articles of one feed
    FeedArticles(FeedId),
    /// Articles published between two dates, both inclusive
    ArticleRange { start: NaiveDate, end: NaiveDate },
    /// The feed list itself
    FeedList,
}

impl DownloadTarget {
    /// Path and query relative to the backend base URL
    pub fn path(&self) -> String {
        match self {
            DownloadTarget::FeedArticles(id) => format!("/api/feeds/{}/articles/download", id),
            DownloadTarget::ArticleRange { start, end } => format!(
                "/api/articles/download?start_date={}&end_date={}",
                encode(&start.format("%Y-%m-%d").to_string()),
                encode(&end.format("%Y-%m-%d").to_string())
            ),
            DownloadTarget::FeedList => "/api/feeds/download".to_string(),
        }
    }
}
