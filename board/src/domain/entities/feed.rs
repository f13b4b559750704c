//! Feed domain entities
//!
//! A `FeedSnapshot` is one complete `GET /api/feeds` response. Snapshots are
//! never merged: each applied poll replaces the previous one wholesale.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::timestamp::{deserialize_null_default, deserialize_opt};

/// Backend identifier of a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct FeedId(pub i64);

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FeedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<i64>()
            .map(FeedId)
            .map_err(|_| format!("'{}' is not a valid feed id", s))
    }
}

/// Feed status as reported by the backend, or patched locally while a
/// single-feed refresh is in flight.
///
/// Unrecognised strings are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FeedStatus {
    Active,
    Error,
    Refreshing,
    Scanning,
    ScanComplete,
    Unknown(String),
}

impl FeedStatus {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            FeedStatus::Active => "active",
            FeedStatus::Error => "error",
            FeedStatus::Refreshing => "refreshing",
            FeedStatus::Scanning => "scanning",
            FeedStatus::ScanComplete => "scan_complete",
            FeedStatus::Unknown(raw) => raw,
        }
    }
}

impl Default for FeedStatus {
    fn default() -> Self {
        FeedStatus::Unknown("unknown".to_string())
    }
}

impl From<String> for FeedStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "active" => FeedStatus::Active,
            "error" => FeedStatus::Error,
            "refreshing" => FeedStatus::Refreshing,
            "scanning" | "scanning…" | "scanning..." => FeedStatus::Scanning,
            "scan_complete" | "scan-complete" | "scan complete" => FeedStatus::ScanComplete,
            _ => FeedStatus::Unknown(raw),
        }
    }
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedStatus::Active => write!(f, "active"),
            FeedStatus::Error => write!(f, "error"),
            FeedStatus::Refreshing => write!(f, "refreshing"),
            FeedStatus::Scanning => write!(f, "scanning…"),
            FeedStatus::ScanComplete => write!(f, "scan complete"),
            FeedStatus::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            FeedStatus::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// What started the last scan of a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTrigger {
    Manual,
    Automatic,
    Bulk,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanTrigger::Manual => write!(f, "manual"),
            ScanTrigger::Automatic => write!(f, "automatic"),
            ScanTrigger::Bulk => write!(f, "bulk"),
            ScanTrigger::Unknown => write!(f, "unknown"),
        }
    }
}

/// One row of the feed table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedRecord {
    pub id: FeedId,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub num_articles: i64,
    /// Articles collected in the last 7 days
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub recent_articles: i64,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub last_article_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub last_scan_time: Option<DateTime<Utc>>,
    /// Older backends only report `last_updated`
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_scan_trigger: Option<ScanTrigger>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub status: FeedStatus,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub next_automatic_scan: Option<DateTime<Utc>>,
}

impl FeedRecord {
    /// Title for display, falling back to the URL
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.url)
    }

    /// Title when the backend has one; `None` for blank titles
    pub fn sort_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.last_scan_time.or(self.last_updated)
    }
}

/// Progress of a backend scan. Only meaningful while `is_scanning` is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScanProgress {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub is_scanning: bool,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub current_index: u32,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub total_feeds: u32,
    #[serde(default)]
    pub current_feed: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub completed: bool,
}

impl ScanProgress {
    /// Percentage of feeds scanned, clamped to [0, 100]
    pub fn percent(&self) -> f64 {
        if self.total_feeds == 0 {
            return 0.0;
        }
        (f64::from(self.current_index) / f64::from(self.total_feeds) * 100.0).clamp(0.0, 100.0)
    }
}

/// One complete feed-list response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "FeedsResponse")]
pub struct FeedSnapshot {
    pub feeds: Vec<FeedRecord>,
    pub scan_progress: Option<ScanProgress>,
    pub next_scan: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn is_scanning(&self) -> bool {
        self.scan_progress
            .as_ref()
            .is_some_and(|progress| progress.is_scanning)
    }

    pub fn find(&self, id: FeedId) -> Option<&FeedRecord> {
        self.feeds.iter().find(|feed| feed.id == id)
    }

    pub fn find_mut(&mut self, id: FeedId) -> Option<&mut FeedRecord> {
        self.feeds.iter_mut().find(|feed| feed.id == id)
    }
}

/// `GET /api/feeds` body: the current envelope or the older bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedsResponse {
    Envelope(FeedsEnvelope),
    Bare(Vec<FeedRecord>),
}

#[derive(Deserialize)]
struct FeedsEnvelope {
    feeds: Vec<FeedRecord>,
    #[serde(default)]
    scan_progress: Option<ScanProgress>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    next_scan: Option<DateTime<Utc>>,
}

impl From<FeedsResponse> for FeedSnapshot {
    fn from(response: FeedsResponse) -> Self {
        let (feeds, scan_progress, next_scan) = match response {
            FeedsResponse::Envelope(envelope) => {
                (envelope.feeds, envelope.scan_progress, envelope.next_scan)
            }
            FeedsResponse::Bare(feeds) => (feeds, None, None),
        };

        let next_scan =
            next_scan.or_else(|| feeds.iter().find_map(|feed| feed.next_automatic_scan));

        FeedSnapshot {
            feeds,
            scan_progress,
            next_scan,
        }
    }
}

/// Timestamps returned by `POST /api/feeds/{id}/refresh`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RefreshedFeed {
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub last_scan_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub last_article_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RefreshOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub feed: Option<RefreshedFeed>,
}

/// `POST /api/feeds/bulk` success body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkAddOutcome {
    #[serde(default)]
    pub message: Option<String>,
    /// One entry per rejected URL
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub errors: Vec<String>,
}
