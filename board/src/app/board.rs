//! Board state
//!
//! The single owner of everything the table is drawn from: the latest
//! snapshot, the sort state, the countdown and the local UI state of
//! in-flight actions. Only the controller mutates it.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::{FeedId, FeedSnapshot, FeedStatus, RefreshedFeed, SortColumn, SortConfig};
use crate::render::{project, AddDialogView, BoardView, TimeMode};

use super::countdown::{Countdown, CountdownChange};
use super::sort_state::SortState;

/// A control that is disabled while its request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    RefreshOne(FeedId),
    RefreshAll,
    AddFeeds,
}

/// Result of offering a fetched snapshot to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    Applied(CountdownChange),
    /// An equal or newer fetch has already been applied
    Stale,
}

/// An optimistic status change that can be rolled back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub prior: FeedStatus,
    /// Snapshot the patch was made on
    pub applied_seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddDialog {
    pub draft: String,
    pub submitting: bool,
}

pub struct Board {
    snapshot: Option<FeedSnapshot>,
    sort: SortState,
    time_mode: TimeMode,
    countdown: Countdown,
    last_issued_seq: u64,
    last_applied_seq: u64,
    busy: HashSet<Control>,
    pending_delete: Option<FeedId>,
    add_dialog: Option<AddDialog>,
}

impl Board {
    pub fn new(time_mode: TimeMode, countdown_tolerance: Duration) -> Self {
        Self {
            snapshot: None,
            sort: SortState::default(),
            time_mode,
            countdown: Countdown::new(countdown_tolerance),
            last_issued_seq: 0,
            last_applied_seq: 0,
            busy: HashSet::new(),
            pending_delete: None,
            add_dialog: None,
        }
    }

    pub fn snapshot(&self) -> Option<&FeedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn sort(&self) -> SortConfig {
        self.sort.config()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_scanning(&self) -> bool {
        self.snapshot.as_ref().is_some_and(FeedSnapshot::is_scanning)
    }

    pub fn contains(&self, id: FeedId) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.find(id).is_some())
    }

    pub fn status_of(&self, id: FeedId) -> Option<&FeedStatus> {
        self.snapshot.as_ref()?.find(id).map(|feed| &feed.status)
    }

    // --- Fetch sequencing ---

    /// Issue the sequence number for a new fetch
    pub fn begin_fetch(&mut self) -> u64 {
        self.last_issued_seq += 1;
        self.last_issued_seq
    }

    /// Whether a response with this sequence number would still be applied
    pub fn is_current(&self, seq: u64) -> bool {
        seq > self.last_applied_seq
    }

    /// Replace the snapshot if `seq` is newer than anything applied so far
    pub fn apply_snapshot(&mut self, seq: u64, snapshot: FeedSnapshot, now: DateTime<Utc>) -> Reconcile {
        if !self.is_current(seq) {
            return Reconcile::Stale;
        }

        self.last_applied_seq = seq;
        let change = self.countdown.observe(snapshot.next_scan, now);
        self.snapshot = Some(snapshot);

        if let Some(id) = self.pending_delete {
            if !self.contains(id) {
                self.pending_delete = None;
            }
        }

        Reconcile::Applied(change)
    }

    // --- Sort / display settings ---

    pub fn click_column(&mut self, column: SortColumn) -> SortConfig {
        self.sort.click(column)
    }

    pub fn set_time_mode(&mut self, mode: TimeMode) {
        self.time_mode = mode;
    }

    pub fn tick_countdown(&mut self, now: DateTime<Utc>) -> String {
        self.countdown.tick(now)
    }

    // --- Controls ---

    /// Disable a control; false if it is already disabled
    pub fn acquire(&mut self, control: Control) -> bool {
        self.busy.insert(control)
    }

    pub fn release(&mut self, control: Control) {
        self.busy.remove(&control);
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.busy.contains(&control)
    }

    // --- Optimistic patches ---

    /// Mark a feed as scanning; returns what is needed to undo it
    pub fn mark_scanning(&mut self, id: FeedId) -> Option<StatusPatch> {
        let applied_seq = self.last_applied_seq;
        let feed = self.snapshot.as_mut()?.find_mut(id)?;
        let prior = std::mem::replace(&mut feed.status, FeedStatus::Scanning);
        Some(StatusPatch { prior, applied_seq })
    }

    /// Patch a successfully refreshed feed
    pub fn complete_refresh(&mut self, id: FeedId, refreshed: Option<&RefreshedFeed>) {
        let Some(feed) = self.snapshot.as_mut().and_then(|s| s.find_mut(id)) else {
            return;
        };

        feed.status = FeedStatus::ScanComplete;
        if let Some(refreshed) = refreshed {
            if let Some(scanned) = refreshed.last_scan_time {
                feed.last_scan_time = Some(scanned);
            }
            if let Some(latest) = refreshed.last_article_date {
                feed.last_article_date = Some(latest);
            }
        }
    }

    /// Roll back an optimistic status patch. A snapshot applied since the
    /// patch already carries fresher status, so it is left alone.
    pub fn restore_status(&mut self, id: FeedId, patch: StatusPatch) -> bool {
        if self.last_applied_seq != patch.applied_seq {
            return false;
        }
        match self.snapshot.as_mut().and_then(|s| s.find_mut(id)) {
            Some(feed) => {
                feed.status = patch.prior;
                true
            }
            None => false,
        }
    }

    // --- Delete confirmation ---

    pub fn request_delete(&mut self, id: FeedId) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<FeedId> {
        self.pending_delete
    }

    pub fn take_pending_delete(&mut self) -> Option<FeedId> {
        self.pending_delete.take()
    }

    // --- Add dialog ---

    pub fn add_dialog(&self) -> Option<&AddDialog> {
        self.add_dialog.as_ref()
    }

    /// Open the dialog, keeping any draft already in it
    pub fn open_add_dialog(&mut self) {
        self.add_dialog.get_or_insert_with(AddDialog::default);
    }

    pub fn append_add_line(&mut self, line: &str) {
        let dialog = self.add_dialog.get_or_insert_with(AddDialog::default);
        if !dialog.draft.is_empty() {
            dialog.draft.push('\n');
        }
        dialog.draft.push_str(line);
    }

    pub fn set_add_submitting(&mut self, submitting: bool) {
        if let Some(dialog) = self.add_dialog.as_mut() {
            dialog.submitting = submitting;
        }
    }

    pub fn close_add_dialog(&mut self) {
        self.add_dialog = None;
    }

    // --- View ---

    /// Project the current state; a pure function of the board and `now`
    pub fn view(&self, now: DateTime<Utc>) -> BoardView {
        let mut view = project(self.snapshot.as_ref(), &self.sort.config(), self.time_mode, now);

        for row in &mut view.rows {
            row.busy = self.is_busy(Control::RefreshOne(row.id));
        }
        view.countdown = self.countdown.display(now);
        view.refresh_all_busy = self.is_busy(Control::RefreshAll);
        view.prompt = self
            .pending_delete
            .map(|id| format!("Are you sure you want to delete feed {}? (yes/no)", id));
        view.add_dialog = self.add_dialog.as_ref().map(|dialog| AddDialogView {
            draft: dialog.draft.clone(),
            submitting: dialog.submitting,
        });

        view
    }
}
