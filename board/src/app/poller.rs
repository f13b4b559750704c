//! Poller
//!
//! Fetches feed-list snapshots. Every fetch takes a sequence number from the
//! board so the controller can drop responses that complete out of order.
//! The delay before the next scheduled poll depends on whether the latest
//! applied snapshot shows a scan in progress.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::ports::FeedBackend;

use super::board::Board;
use super::event::{Event, FetchOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// While the backend is scanning
    pub fast: Duration,
    /// Otherwise
    pub slow: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(500),
            slow: Duration::from_secs(5),
        }
    }
}

pub struct Poller<B: FeedBackend + 'static> {
    backend: Arc<B>,
    events: UnboundedSender<Event>,
    intervals: PollIntervals,
}

impl<B: FeedBackend + 'static> Poller<B> {
    pub fn new(backend: Arc<B>, events: UnboundedSender<Event>, intervals: PollIntervals) -> Self {
        Self {
            backend,
            events,
            intervals,
        }
    }

    /// Start a fetch; the result arrives as `Event::Fetched`
    pub fn fetch(&self, board: &mut Board, origin: FetchOrigin) -> u64 {
        let seq = board.begin_fetch();
        let backend = self.backend.clone();
        let events = self.events.clone();

        tracing::debug!(seq, ?origin, "Fetching feeds");
        tokio::spawn(async move {
            let result = backend.list_feeds().await;
            if events
                .send(Event::Fetched {
                    seq,
                    origin,
                    result,
                })
                .is_err()
            {
                tracing::debug!(seq, "Controller gone, dropping fetch result");
            }
        });

        seq
    }

    /// Delay before the next scheduled poll
    pub fn next_interval(&self, board: &Board) -> Duration {
        if board.is_scanning() {
            self.intervals.fast
        } else {
            self.intervals.slow
        }
    }
}
