//! Domain entities
//!
//! Client-side models of the backend's feed payloads plus the board's own
//! value types (sorting, notices, download targets).

pub mod download;
pub mod feed;
pub mod notice;
pub mod sort;
pub mod timestamp;

pub use download::DownloadTarget;
pub use feed::{
    BulkAddOutcome, FeedId, FeedRecord, FeedSnapshot, FeedStatus, RefreshOutcome, RefreshedFeed,
    ScanProgress, ScanTrigger,
};
pub use notice::{Notice, NoticeLevel};
pub use sort::{SortColumn, SortConfig, SortDirection};
pub use timestamp::parse_timestamp;
