//! Test fixtures
//!
//! Factory functions for test data with sensible defaults.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::app::Board;
use crate::domain::entities::{FeedId, FeedRecord, FeedSnapshot, FeedStatus};
use crate::render::TimeMode;

/// Midnight UTC on the given day
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// An active feed with no articles and no scans
pub fn test_feed(id: i64, title: Option<&str>) -> FeedRecord {
    FeedRecord {
        id: FeedId(id),
        title: title.map(str::to_string),
        url: format!("https://{}.example/rss", id),
        num_articles: 0,
        recent_articles: 0,
        last_article_date: None,
        last_scan_time: None,
        last_updated: None,
        last_scan_trigger: None,
        status: FeedStatus::Active,
        next_automatic_scan: None,
    }
}

/// A snapshot with no scan in progress and no next scan
pub fn test_snapshot(feeds: Vec<FeedRecord>) -> FeedSnapshot {
    FeedSnapshot {
        feeds,
        scan_progress: None,
        next_scan: None,
    }
}

pub fn test_board() -> Board {
    Board::new(TimeMode::Relative, Duration::seconds(2))
}
