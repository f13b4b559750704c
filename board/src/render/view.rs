//! Pure projection of (snapshot, sort config) into a table view
//!
//! Nothing here touches a screen; the same inputs always produce the same view.

use chrono::{DateTime, Utc};

use crate::app::sort_state::sort_feeds;
use crate::domain::entities::{FeedId, FeedRecord, FeedSnapshot, ScanProgress, SortConfig};

use super::format::{format_timestamp, TimeMode};

pub const DEFAULT_TITLE: &str = "Feed Board";
pub const NO_ARTICLES: &str = "No articles";
pub const NEVER: &str = "Never";

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: FeedId,
    pub title: String,
    pub url: String,
    pub articles: i64,
    pub recent_articles: i64,
    pub last_article: String,
    pub last_scan: String,
    pub trigger: String,
    pub status: String,
    /// Refresh control disabled while a request for this row is in flight
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub percent: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestArticle {
    pub when: String,
    pub feed_title: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryView {
    pub feeds: usize,
    pub total_articles: i64,
    pub recent_articles: i64,
    pub latest: Option<LatestArticle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddDialogView {
    pub draft: String,
    pub submitting: bool,
}

/// Everything a screen needs to draw the board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    /// Window/terminal title; mirrors scan progress while scanning
    pub title: String,
    pub loaded: bool,
    pub sort: SortConfig,
    pub time_mode: TimeMode,
    pub rows: Vec<RowView>,
    pub progress: Option<ProgressView>,
    pub summary: SummaryView,
    pub countdown: String,
    pub refresh_all_busy: bool,
    pub prompt: Option<String>,
    pub add_dialog: Option<AddDialogView>,
}

fn row_view(feed: &FeedRecord, time_mode: TimeMode, now: DateTime<Utc>) -> RowView {
    RowView {
        id: feed.id,
        title: feed.display_title().to_string(),
        url: feed.url.clone(),
        articles: feed.num_articles,
        recent_articles: feed.recent_articles,
        last_article: format_timestamp(feed.last_article_date, time_mode, now, NO_ARTICLES),
        last_scan: format_timestamp(feed.last_scan(), time_mode, now, NEVER),
        trigger: feed
            .last_scan_trigger
            .map(|trigger| trigger.to_string())
            .unwrap_or_else(|| "-".to_string()),
        status: feed.status.to_string(),
        busy: false,
    }
}

fn progress_view(progress: &ScanProgress) -> Option<ProgressView> {
    if !progress.is_scanning {
        return None;
    }

    let percent = progress.percent();
    let mut label = format!(
        "Scanning feeds: {}/{} ({:.0}%)",
        progress.current_index, progress.total_feeds, percent
    );
    if let Some(current) = progress.current_feed.as_deref().filter(|c| !c.is_empty()) {
        label.push_str(&format!(" - {}", current));
    }

    Some(ProgressView { percent, label })
}

fn summary_view(feeds: &[FeedRecord], time_mode: TimeMode, now: DateTime<Utc>) -> SummaryView {
    let mut latest: Option<(&FeedRecord, DateTime<Utc>)> = None;
    for feed in feeds {
        if let Some(date) = feed.last_article_date {
            if latest.map_or(true, |(_, best)| date > best) {
                latest = Some((feed, date));
            }
        }
    }

    SummaryView {
        feeds: feeds.len(),
        total_articles: feeds.iter().map(|f| f.num_articles).sum(),
        recent_articles: feeds.iter().map(|f| f.recent_articles).sum(),
        latest: latest.map(|(feed, date)| LatestArticle {
            when: format_timestamp(Some(date), time_mode, now, NO_ARTICLES),
            feed_title: feed.display_title().to_string(),
        }),
    }
}

/// Project a snapshot into a view. `None` means nothing has loaded yet.
pub fn project(
    snapshot: Option<&FeedSnapshot>,
    sort: &SortConfig,
    time_mode: TimeMode,
    now: DateTime<Utc>,
) -> BoardView {
    let empty = FeedSnapshot::default();
    let loaded = snapshot.is_some();
    let snapshot = snapshot.unwrap_or(&empty);

    let rows = sort_feeds(&snapshot.feeds, sort)
        .into_iter()
        .map(|feed| row_view(feed, time_mode, now))
        .collect();

    let progress = snapshot.scan_progress.as_ref().and_then(progress_view);
    let title = match &progress {
        Some(progress) => format!("{} | {}", progress.label, DEFAULT_TITLE),
        None => DEFAULT_TITLE.to_string(),
    };

    BoardView {
        title,
        loaded,
        sort: *sort,
        time_mode,
        rows,
        progress,
        summary: summary_view(&snapshot.feeds, time_mode, now),
        countdown: String::new(),
        refresh_all_busy: false,
        prompt: None,
        add_dialog: None,
    }
}
