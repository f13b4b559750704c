//! Sort state and the feed comparator
//!
//! Clicking the active column flips its direction; clicking another column
//! switches to it ascending. Ordering rules:
//! - a missing value sorts after every present value, whatever the direction
//! - text compares case-folded, ties broken by the raw string
//! - counts compare numerically (missing counts arrive as 0)
//! - timestamps compare by instant

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::entities::{FeedRecord, ScanTrigger, SortColumn, SortConfig, SortDirection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    config: SortConfig,
}

impl SortState {
    pub fn new(config: SortConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SortConfig {
        self.config
    }

    /// Handle a click on a column header
    pub fn click(&mut self, column: SortColumn) -> SortConfig {
        if self.config.column == column {
            self.config.direction = self.config.direction.toggled();
        } else {
            self.config = SortConfig::new(column, SortDirection::Ascending);
        }
        self.config
    }
}

enum SortKey<'a> {
    Text(Option<&'a str>),
    Number(i64),
    Instant(Option<DateTime<Utc>>),
}

fn sort_key(feed: &FeedRecord, column: SortColumn) -> SortKey<'_> {
    match column {
        SortColumn::Title => SortKey::Text(feed.sort_title()),
        SortColumn::Url => SortKey::Text(Some(feed.url.as_str())),
        SortColumn::Status => SortKey::Text(Some(feed.status.as_str())),
        SortColumn::LastScanTrigger => {
            SortKey::Text(feed.last_scan_trigger.as_ref().map(trigger_key))
        }
        SortColumn::NumArticles => SortKey::Number(feed.num_articles),
        SortColumn::RecentArticles => SortKey::Number(feed.recent_articles),
        SortColumn::LastArticleDate => SortKey::Instant(feed.last_article_date),
        SortColumn::LastScanTime => SortKey::Instant(feed.last_scan()),
    }
}

fn trigger_key(trigger: &ScanTrigger) -> &'static str {
    match trigger {
        ScanTrigger::Manual => "manual",
        ScanTrigger::Automatic => "automatic",
        ScanTrigger::Bulk => "bulk",
        ScanTrigger::Unknown => "unknown",
    }
}

fn compare_text(a: &&str, b: &&str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Missing values go last; direction only applies when both are present
fn compare_nullable<T>(
    a: Option<T>,
    b: Option<T>,
    direction: SortDirection,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(compare(&a, &b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare two feeds under a sort configuration
pub fn compare_feeds(a: &FeedRecord, b: &FeedRecord, config: &SortConfig) -> Ordering {
    let direction = config.direction;
    match (sort_key(a, config.column), sort_key(b, config.column)) {
        (SortKey::Text(a), SortKey::Text(b)) => compare_nullable(a, b, direction, compare_text),
        (SortKey::Number(a), SortKey::Number(b)) => {
            compare_nullable(Some(a), Some(b), direction, i64::cmp)
        }
        (SortKey::Instant(a), SortKey::Instant(b)) => {
            compare_nullable(a, b, direction, DateTime::<Utc>::cmp)
        }
        _ => Ordering::Equal,
    }
}

/// Stable sort of a snapshot's feeds
pub fn sort_feeds<'a>(feeds: &'a [FeedRecord], config: &SortConfig) -> Vec<&'a FeedRecord> {
    let mut sorted: Vec<&FeedRecord> = feeds.iter().collect();
    sorted.sort_by(|a, b| compare_feeds(a, b, config));
    sorted
}
