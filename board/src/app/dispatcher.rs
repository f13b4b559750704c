//! Action dispatcher
//!
//! Starts single-feed and bulk operations and reconciles their results into
//! the board. Starting an action only touches local state and spawns the
//! request; completions come back as events and are handled by the matching
//! `on_*` method, which returns a `Reaction` for the controller to carry out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::entities::{BulkAddOutcome, DownloadTarget, FeedId, Notice, RefreshOutcome};
use crate::domain::ports::{FeedBackend, Navigator};
use crate::error::BackendError;

use super::board::{Board, Control, StatusPatch};
use super::event::Event;

pub const EMPTY_URLS: &str = "Please enter at least one URL";
pub const MISSING_DATES: &str = "Please choose both a start and an end date";

/// Follow-up fetch requested by a completed action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refetch {
    Now,
    After(Duration),
}

/// What the controller should do after an action step
#[derive(Debug, Default, PartialEq)]
pub struct Reaction {
    pub notices: Vec<Notice>,
    pub refetch: Option<Refetch>,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            refetch: None,
        }
    }

    pub fn refetch(refetch: Refetch) -> Self {
        Self {
            notices: Vec::new(),
            refetch: Some(refetch),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}

/// Split newline-separated input into trimmed, de-duplicated URLs in input order
pub fn parse_url_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

pub struct ActionDispatcher<B: FeedBackend + 'static, N: Navigator + 'static> {
    backend: Arc<B>,
    navigator: Arc<N>,
    events: UnboundedSender<Event>,
    refetch_delay: Duration,
}

impl<B: FeedBackend + 'static, N: Navigator + 'static> ActionDispatcher<B, N> {
    pub fn new(
        backend: Arc<B>,
        navigator: Arc<N>,
        events: UnboundedSender<Event>,
        refetch_delay: Duration,
    ) -> Self {
        Self {
            backend,
            navigator,
            events,
            refetch_delay,
        }
    }

    fn send(events: &UnboundedSender<Event>, event: Event) {
        if events.send(event).is_err() {
            tracing::debug!("Controller gone, dropping action result");
        }
    }

    // --- Refresh one ---

    pub fn refresh_one(&self, board: &mut Board, id: FeedId) -> Reaction {
        if !board.acquire(Control::RefreshOne(id)) {
            tracing::debug!(%id, "Refresh already in flight");
            return Reaction::none();
        }

        let patch = board.mark_scanning(id);
        tracing::info!(%id, "Refreshing feed");

        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.refresh_feed(id).await;
            Self::send(&events, Event::RefreshedOne { id, patch, result });
        });

        Reaction::none()
    }

    pub fn on_refreshed_one(
        &self,
        board: &mut Board,
        id: FeedId,
        patch: Option<StatusPatch>,
        result: Result<RefreshOutcome, BackendError>,
    ) -> Reaction {
        board.release(Control::RefreshOne(id));

        match result {
            Ok(outcome) => {
                board.complete_refresh(id, outcome.feed.as_ref());
                Reaction::refetch(Refetch::After(self.refetch_delay))
            }
            Err(e) => {
                tracing::warn!(%id, "Failed to refresh feed: {}", e);
                if let Some(patch) = patch {
                    if !board.restore_status(id, patch) {
                        tracing::debug!(%id, "Newer snapshot applied, keeping its status");
                    }
                }
                Reaction::notice(Notice::error(format!("Error refreshing feed: {}", e)))
            }
        }
    }

    // --- Refresh all ---

    pub fn refresh_all(&self, board: &mut Board) -> Reaction {
        if !board.acquire(Control::RefreshAll) {
            tracing::debug!("Refresh of all feeds already in flight");
            return Reaction::none();
        }

        tracing::info!("Refreshing all feeds");
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.refresh_all().await;
            Self::send(&events, Event::RefreshedAll { result });
        });

        Reaction::none()
    }

    pub fn on_refreshed_all(&self, board: &mut Board, result: Result<(), BackendError>) -> Reaction {
        board.release(Control::RefreshAll);

        let reaction = Reaction::refetch(Refetch::Now);
        match result {
            Ok(()) => reaction,
            Err(e) => {
                tracing::warn!("Failed to refresh feeds: {}", e);
                reaction.with_notice(Notice::error(format!("Error refreshing feeds: {}", e)))
            }
        }
    }

    // --- Delete ---

    /// First step of a delete: ask for confirmation
    pub fn delete_one(&self, board: &mut Board, id: FeedId) -> Reaction {
        if !board.contains(id) {
            return Reaction::notice(Notice::warning(format!("No feed with id {}", id)));
        }
        board.request_delete(id);
        Reaction::none()
    }

    /// Answer to the pending confirmation
    pub fn confirm(&self, board: &mut Board, confirmed: bool) -> Reaction {
        let Some(id) = board.take_pending_delete() else {
            return Reaction::notice(Notice::info("Nothing to confirm"));
        };

        if !confirmed {
            return Reaction::notice(Notice::info(format!("Kept feed {}", id)));
        }

        tracing::info!(%id, "Deleting feed");
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.delete_feed(id).await;
            Self::send(&events, Event::Deleted { id, result });
        });

        Reaction::none()
    }

    pub fn on_deleted(&self, id: FeedId, result: Result<(), BackendError>) -> Reaction {
        match result {
            Ok(()) => Reaction::refetch(Refetch::Now)
                .with_notice(Notice::info(format!("Deleted feed {}", id))),
            Err(e) => {
                tracing::warn!(%id, "Failed to delete feed: {}", e);
                Reaction::notice(Notice::error(format!("Error deleting feed: {}", e)))
            }
        }
    }

    // --- Bulk add ---

    /// Submit newline-separated URLs
    pub fn add_bulk(&self, board: &mut Board, input: &str) -> Reaction {
        let urls = parse_url_list(input);
        if urls.is_empty() {
            return Reaction::notice(Notice::warning(EMPTY_URLS));
        }
        if !board.acquire(Control::AddFeeds) {
            tracing::debug!("Bulk add already in flight");
            return Reaction::none();
        }

        board.set_add_submitting(true);
        tracing::info!(count = urls.len(), "Adding feeds");

        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.add_feeds(&urls).await;
            Self::send(&events, Event::FeedsAdded { result });
        });

        Reaction::none()
    }

    /// Submit whatever is in the add dialog
    pub fn submit_add_dialog(&self, board: &mut Board) -> Reaction {
        let draft = board
            .add_dialog()
            .map(|dialog| dialog.draft.clone())
            .unwrap_or_default();
        self.add_bulk(board, &draft)
    }

    pub fn on_feeds_added(
        &self,
        board: &mut Board,
        result: Result<BulkAddOutcome, BackendError>,
    ) -> Reaction {
        board.release(Control::AddFeeds);

        match result {
            Ok(outcome) => {
                board.close_add_dialog();
                let reaction = Reaction::refetch(Refetch::Now);
                if outcome.errors.is_empty() {
                    let message = outcome.message.unwrap_or_else(|| "Feeds added".to_string());
                    reaction.with_notice(Notice::info(message))
                } else {
                    tracing::warn!(rejected = outcome.errors.len(), "Some feeds were rejected");
                    reaction.with_notice(Notice::warning(format!(
                        "Some feeds could not be added: {}",
                        outcome.errors.join(", ")
                    )))
                }
            }
            Err(e) => {
                tracing::warn!("Failed to add feeds: {}", e);
                board.set_add_submitting(false);
                Reaction::notice(Notice::error(format!("Error adding feeds: {}", e)))
            }
        }
    }

    // --- Downloads ---

    fn navigate(&self, target: DownloadTarget) -> Reaction {
        let url = self.backend.download_url(&target);
        tracing::info!(%url, "Opening download");

        let navigator = self.navigator.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = navigator.navigate(&url).await;
            Self::send(&events, Event::Downloaded { result });
        });

        Reaction::none()
    }

    pub fn download_one(&self, id: FeedId) -> Reaction {
        self.navigate(DownloadTarget::FeedArticles(id))
    }

    pub fn download_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Reaction {
        match (start, end) {
            (Some(start), Some(end)) => self.navigate(DownloadTarget::ArticleRange { start, end }),
            _ => Reaction::notice(Notice::warning(MISSING_DATES)),
        }
    }

    pub fn download_feed_list(&self) -> Reaction {
        self.navigate(DownloadTarget::FeedList)
    }

    pub fn on_downloaded(&self, result: Result<String, BackendError>) -> Reaction {
        match result {
            Ok(location) => Reaction::notice(Notice::info(format!("Downloaded {}", location))),
            Err(e) => {
                tracing::warn!("Download failed: {}", e);
                Reaction::notice(Notice::error(format!("Error downloading: {}", e)))
            }
        }
    }
}
