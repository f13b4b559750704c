//! Internal events
//!
//! Spawned network calls report back to the controller through these.

use crate::domain::entities::{BulkAddOutcome, FeedId, FeedSnapshot, RefreshOutcome};
use crate::error::BackendError;

use super::board::StatusPatch;

/// Why a fetch was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Regular poll; its completion schedules the next one
    Scheduled,
    /// Triggered by a user action
    OutOfBand,
}

#[derive(Debug)]
pub enum Event {
    Fetched {
        seq: u64,
        origin: FetchOrigin,
        result: Result<FeedSnapshot, BackendError>,
    },
    /// A delayed re-fetch is due
    RefetchDue,
    RefreshedOne {
        id: FeedId,
        /// Undo record for the optimistic patch; `None` if the row was not shown
        patch: Option<StatusPatch>,
        result: Result<RefreshOutcome, BackendError>,
    },
    RefreshedAll {
        result: Result<(), BackendError>,
    },
    Deleted {
        id: FeedId,
        result: Result<(), BackendError>,
    },
    FeedsAdded {
        result: Result<BulkAddOutcome, BackendError>,
    },
    Downloaded {
        result: Result<String, BackendError>,
    },
}
