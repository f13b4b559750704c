//! User commands accepted by the controller

use chrono::NaiveDate;

use crate::domain::entities::{FeedId, SortColumn};
use crate::render::TimeMode;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Column header click
    Sort(SortColumn),
    SetTimeMode(TimeMode),
    /// Fetch the feed list now
    Reload,
    RefreshOne(FeedId),
    RefreshAll,
    /// Ask for confirmation before deleting
    Delete(FeedId),
    /// Answer to the pending confirmation
    Confirm(bool),
    OpenAddDialog,
    AddLine(String),
    SubmitAddDialog,
    CancelAddDialog,
    /// Newline-separated URLs, bypassing the dialog
    AddFeeds(String),
    DownloadFeed(FeedId),
    DownloadRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    DownloadFeedList,
    Quit,
}
