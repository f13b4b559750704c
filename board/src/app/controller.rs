//! Feed board controller
//!
//! Owns the board and drives everything from one task: the poll deadline, the
//! countdown tick source, completed network calls and user commands are all
//! multiplexed with `tokio::select!`. Network calls run as spawned tasks and
//! report back as `Event`s, so no handler ever waits on the backend.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};

use crate::config::BoardConfig;
use crate::domain::entities::Notice;
use crate::domain::ports::{FeedBackend, Navigator, Screen};

use super::board::{Board, Reconcile};
use super::command::Command;
use super::countdown::CountdownChange;
use super::dispatcher::{ActionDispatcher, Reaction, Refetch};
use super::event::{Event, FetchOrigin};
use super::poller::Poller;

const TICK: Duration = Duration::from_secs(1);

pub struct FeedBoardController<B, N, S>
where
    B: FeedBackend + 'static,
    N: Navigator + 'static,
    S: Screen,
{
    board: Board,
    poller: Poller<B>,
    dispatcher: ActionDispatcher<B, N>,
    screen: S,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    /// Deadline of the next scheduled poll. While one is in flight this is
    /// its give-up deadline, so a hung request cannot stall polling.
    next_poll: Option<Instant>,
    /// Sequence number of the scheduled poll in flight
    scheduled_seq: Option<u64>,
    poll_deadline: Duration,
    /// Countdown tick source; at most one exists at a time
    ticker: Option<Interval>,
}

impl<B, N, S> FeedBoardController<B, N, S>
where
    B: FeedBackend + 'static,
    N: Navigator + 'static,
    S: Screen,
{
    pub fn new(backend: Arc<B>, navigator: Arc<N>, screen: S, config: &BoardConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let tolerance = chrono::Duration::milliseconds(
            i64::try_from(config.countdown_tolerance.as_millis()).unwrap_or(i64::MAX),
        );

        Self {
            board: Board::new(config.time_mode, tolerance),
            poller: Poller::new(backend.clone(), events_tx.clone(), config.poll_intervals()),
            dispatcher: ActionDispatcher::new(
                backend,
                navigator,
                events_tx.clone(),
                config.refetch_delay,
            ),
            screen,
            events_tx,
            events_rx,
            next_poll: None,
            scheduled_seq: None,
            poll_deadline: config.request_timeout,
            ticker: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Run until `Command::Quit` or until every command sender is dropped.
    /// Returns the screen so callers can restore the terminal.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> S {
        self.start();

        loop {
            tokio::select! {
                _ = wait_until(self.next_poll) => self.scheduled_fetch(),
                _ = next_tick(&mut self.ticker) => self.on_tick(),
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                command = commands.recv() => match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => self.handle_command(command),
                },
            }
        }

        tracing::info!("Feed board stopped");
        self.screen
    }

    /// Kick off the first scheduled poll and paint the loading state
    pub fn start(&mut self) {
        tracing::info!("Feed board started");
        self.scheduled_fetch();
        self.paint();
    }

    /// Issue the next scheduled poll, superseding one that never answered
    fn scheduled_fetch(&mut self) {
        if let Some(seq) = self.scheduled_seq {
            tracing::warn!(seq, "Scheduled poll still pending, polling again");
        }
        let seq = self.poller.fetch(&mut self.board, FetchOrigin::Scheduled);
        self.scheduled_seq = Some(seq);
        self.next_poll = Some(Instant::now() + self.poll_deadline);
    }

    pub fn handle_command(&mut self, command: Command) {
        let reaction = match command {
            Command::Sort(column) => {
                let config = self.board.click_column(column);
                tracing::debug!(column = %config.column, direction = %config.direction, "Sort changed");
                Reaction::none()
            }
            Command::SetTimeMode(mode) => {
                self.board.set_time_mode(mode);
                Reaction::none()
            }
            Command::Reload => Reaction::refetch(Refetch::Now),
            Command::RefreshOne(id) => self.dispatcher.refresh_one(&mut self.board, id),
            Command::RefreshAll => self.dispatcher.refresh_all(&mut self.board),
            Command::Delete(id) => self.dispatcher.delete_one(&mut self.board, id),
            Command::Confirm(answer) => self.dispatcher.confirm(&mut self.board, answer),
            Command::OpenAddDialog => {
                self.board.open_add_dialog();
                Reaction::none()
            }
            Command::AddLine(line) => {
                if self.board.add_dialog().is_some_and(|dialog| dialog.submitting) {
                    Reaction::notice(Notice::warning("Feeds are still being added"))
                } else {
                    self.board.append_add_line(&line);
                    Reaction::none()
                }
            }
            Command::SubmitAddDialog => self.dispatcher.submit_add_dialog(&mut self.board),
            Command::CancelAddDialog => {
                if self.board.add_dialog().is_some_and(|dialog| dialog.submitting) {
                    Reaction::notice(Notice::warning("Feeds are still being added"))
                } else {
                    self.board.close_add_dialog();
                    Reaction::none()
                }
            }
            Command::AddFeeds(text) => self.dispatcher.add_bulk(&mut self.board, &text),
            Command::DownloadFeed(id) => self.dispatcher.download_one(id),
            Command::DownloadRange { start, end } => self.dispatcher.download_range(start, end),
            Command::DownloadFeedList => self.dispatcher.download_feed_list(),
            Command::Quit => Reaction::none(),
        };

        self.apply_reaction(reaction);
        self.paint();
    }

    pub fn handle_event(&mut self, event: Event) {
        let reaction = match event {
            Event::Fetched {
                seq,
                origin,
                result,
            } => {
                match result {
                    Ok(snapshot) => match self.board.apply_snapshot(seq, snapshot, Utc::now()) {
                        Reconcile::Applied(change) => self.sync_ticker(change),
                        Reconcile::Stale => tracing::debug!(seq, "Discarding stale snapshot"),
                    },
                    Err(e) if self.board.is_current(seq) => {
                        tracing::warn!(seq, "Failed to load feeds: {}", e);
                        self.screen
                            .notify(&Notice::error(format!("Error loading feeds: {}", e)));
                    }
                    Err(e) => tracing::debug!(seq, "Discarding stale fetch error: {}", e),
                }

                // Only the latest scheduled poll sets the next deadline
                if origin == FetchOrigin::Scheduled && self.scheduled_seq == Some(seq) {
                    self.scheduled_seq = None;
                    let interval = self.poller.next_interval(&self.board);
                    tracing::debug!(?interval, "Next poll scheduled");
                    self.next_poll = Some(Instant::now() + interval);
                }
                Reaction::none()
            }
            Event::RefetchDue => Reaction::refetch(Refetch::Now),
            Event::RefreshedOne { id, patch, result } => {
                self.dispatcher
                    .on_refreshed_one(&mut self.board, id, patch, result)
            }
            Event::RefreshedAll { result } => {
                self.dispatcher.on_refreshed_all(&mut self.board, result)
            }
            Event::Deleted { id, result } => self.dispatcher.on_deleted(id, result),
            Event::FeedsAdded { result } => self.dispatcher.on_feeds_added(&mut self.board, result),
            Event::Downloaded { result } => self.dispatcher.on_downloaded(result),
        };

        self.apply_reaction(reaction);
        self.paint();
    }

    fn on_tick(&mut self) {
        self.board.tick_countdown(Utc::now());
        if !self.board.countdown().is_running() {
            tracing::debug!("Countdown reached zero");
            self.ticker = None;
        }
        self.paint();
    }

    /// Replace the tick source only when the countdown target actually moved
    fn sync_ticker(&mut self, change: CountdownChange) {
        match change {
            CountdownChange::Unchanged => {}
            CountdownChange::Cleared => self.ticker = None,
            CountdownChange::Replaced => {
                self.ticker = None;
                if self.board.countdown().is_running() {
                    let mut ticker = interval_at(Instant::now() + TICK, TICK);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    self.ticker = Some(ticker);
                }
            }
        }
    }

    fn apply_reaction(&mut self, reaction: Reaction) {
        for notice in &reaction.notices {
            self.screen.notify(notice);
        }

        match reaction.refetch {
            Some(Refetch::Now) => {
                self.poller.fetch(&mut self.board, FetchOrigin::OutOfBand);
            }
            Some(Refetch::After(delay)) => {
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(Event::RefetchDue);
                });
            }
            None => {}
        }
    }

    fn paint(&mut self) {
        let view = self.board.view(Utc::now());
        self.screen.paint(&view);
    }

    #[cfg(test)]
    async fn next_event(&mut self) -> Event {
        match self.events_rx.recv().await {
            Some(event) => event,
            None => unreachable!("controller holds a sender"),
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        FeedId, FeedStatus, NoticeLevel, ScanProgress, SortColumn, SortDirection,
    };
    use crate::test_utils::{
        test_feed, test_snapshot, InMemoryFeedBackend, RecordingNavigator, RecordingScreen,
    };

    type TestController =
        FeedBoardController<InMemoryFeedBackend, RecordingNavigator, RecordingScreen>;

    fn controller(backend: InMemoryFeedBackend) -> (TestController, Arc<InMemoryFeedBackend>) {
        let backend = Arc::new(backend);
        let controller = FeedBoardController::new(
            backend.clone(),
            Arc::new(RecordingNavigator::new()),
            RecordingScreen::new(),
            &BoardConfig::default(),
        );
        (controller, backend)
    }

    async fn pump(controller: &mut TestController) {
        let event = controller.next_event().await;
        controller.handle_event(event);
    }

    fn feed_a() -> crate::domain::entities::FeedRecord {
        let mut feed = test_feed(1, Some("A"));
        feed.num_articles = 5;
        feed
    }

    #[tokio::test]
    async fn single_feed_renders_one_row_and_polls_slowly() {
        let (mut controller, _backend) = controller(InMemoryFeedBackend::new().with_feed(feed_a()));

        controller.start();
        assert!(!controller.screen().last_view().unwrap().loaded);

        pump(&mut controller).await;

        let view = controller.screen().last_view().unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].title, "A");
        assert_eq!(view.rows[0].articles, 5);
        assert_eq!(view.rows[0].status, "active");
        assert!(view.progress.is_none());
        assert_eq!(
            controller.poller.next_interval(controller.board()),
            Duration::from_secs(5)
        );
        assert!(controller.next_poll.is_some());
    }

    #[tokio::test]
    async fn scanning_backend_shows_progress_and_polls_fast() {
        let (mut controller, _backend) = controller(
            InMemoryFeedBackend::new()
                .with_feed(feed_a())
                .with_next_scan(Utc::now() + chrono::Duration::seconds(90))
                .with_scan_progress(ScanProgress {
                    is_scanning: true,
                    current_index: 1,
                    total_feeds: 4,
                    current_feed: Some("A".to_string()),
                    completed: false,
                }),
        );
        controller.start();
        pump(&mut controller).await;

        let view = controller.screen().last_view().unwrap();
        assert_eq!(view.progress.as_ref().unwrap().percent, 25.0);
        assert_eq!(view.title, "Scanning feeds: 1/4 (25%) - A | Feed Board");
        assert!(view.countdown.starts_with("1 minute"));
        assert!(controller.ticker.is_some());
        assert_eq!(
            controller.poller.next_interval(controller.board()),
            Duration::from_millis(500)
        );
    }

    #[tokio::test]
    async fn sorting_repaints_without_fetching() {
        let (mut controller, backend) = controller(
            InMemoryFeedBackend::new()
                .with_feed(test_feed(1, Some("a")))
                .with_feed(test_feed(2, Some("b"))),
        );
        controller.start();
        pump(&mut controller).await;

        controller.handle_command(Command::Sort(SortColumn::Title));
        tokio::task::yield_now().await;

        let view = controller.screen().last_view().unwrap();
        assert_eq!(view.sort.direction, SortDirection::Descending);
        let ids: Vec<i64> = view.rows.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(backend.calls_to("list_feeds"), 1);
    }

    #[tokio::test]
    async fn load_failure_is_reported_and_keeps_polling() {
        let (mut controller, backend) = controller(InMemoryFeedBackend::new().with_feed(feed_a()));
        controller.start();
        pump(&mut controller).await;

        backend.fail_list(Some("backend down"));
        controller.handle_command(Command::Reload);
        pump(&mut controller).await;

        let notice = controller.screen().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Error loading feeds: backend down");
        assert_eq!(controller.screen().last_view().unwrap().rows.len(), 1);
        assert!(controller.next_poll.is_some());
    }

    #[tokio::test]
    async fn stale_results_never_overwrite_newer_ones() {
        let (mut controller, _backend) = controller(InMemoryFeedBackend::new());
        let older = controller.board.begin_fetch();
        let newer = controller.board.begin_fetch();

        controller.handle_event(Event::Fetched {
            seq: newer,
            origin: FetchOrigin::OutOfBand,
            result: Ok(test_snapshot(vec![test_feed(2, Some("new"))])),
        });
        controller.handle_event(Event::Fetched {
            seq: older,
            origin: FetchOrigin::OutOfBand,
            result: Ok(test_snapshot(vec![test_feed(1, Some("old"))])),
        });
        controller.handle_event(Event::Fetched {
            seq: older,
            origin: FetchOrigin::OutOfBand,
            result: Err(crate::error::BackendError::api(500, "late failure")),
        });

        let view = controller.screen().last_view().unwrap();
        assert_eq!(view.rows[0].title, "new");
        assert!(controller.screen().notices.is_empty());
    }

    #[tokio::test]
    async fn countdown_ticker_survives_equal_next_scan() {
        let (mut controller, _backend) = controller(InMemoryFeedBackend::new());
        let next_scan = Utc::now() + chrono::Duration::seconds(90);

        let mut snapshot = test_snapshot(vec![feed_a()]);
        snapshot.next_scan = Some(next_scan);
        let seq = controller.board.begin_fetch();
        controller.handle_event(Event::Fetched {
            seq,
            origin: FetchOrigin::OutOfBand,
            result: Ok(snapshot.clone()),
        });
        assert!(controller.ticker.is_some());

        snapshot.next_scan = Some(next_scan + chrono::Duration::seconds(1));
        let seq = controller.board.begin_fetch();
        controller.handle_event(Event::Fetched {
            seq,
            origin: FetchOrigin::OutOfBand,
            result: Ok(snapshot.clone()),
        });
        assert_eq!(controller.board().countdown().target(), Some(next_scan));
        assert!(controller.ticker.is_some());

        snapshot.next_scan = None;
        let seq = controller.board.begin_fetch();
        controller.handle_event(Event::Fetched {
            seq,
            origin: FetchOrigin::OutOfBand,
            result: Ok(snapshot),
        });
        assert!(controller.ticker.is_none());
        assert_eq!(
            controller.screen().last_view().unwrap().countdown,
            "not scheduled"
        );
    }

    #[tokio::test]
    async fn refresh_failure_restores_status_in_painted_row() {
        let mut feed = feed_a();
        feed.status = FeedStatus::Error;
        let (mut controller, _backend) = controller(
            InMemoryFeedBackend::new()
                .with_feed(feed)
                .failing_refresh("timeout"),
        );
        controller.start();
        pump(&mut controller).await;

        controller.handle_command(Command::RefreshOne(FeedId(1)));
        let painted = controller.screen().last_view().unwrap();
        assert_eq!(painted.rows[0].status, "scanning…");
        assert!(painted.rows[0].busy);

        pump(&mut controller).await;

        let painted = controller.screen().last_view().unwrap();
        assert_eq!(painted.rows[0].status, "error");
        assert!(!painted.rows[0].busy);
        assert_eq!(
            controller.screen().last_notice().unwrap().message,
            "Error refreshing feed: timeout"
        );
    }

    #[tokio::test]
    async fn confirmed_delete_refetches_without_the_row() {
        let (mut controller, backend) = controller(
            InMemoryFeedBackend::new()
                .with_feed(feed_a())
                .with_feed(test_feed(2, Some("B"))),
        );
        controller.start();
        pump(&mut controller).await;

        controller.handle_command(Command::Delete(FeedId(1)));
        assert_eq!(
            controller.screen().last_view().unwrap().prompt.as_deref(),
            Some("Are you sure you want to delete feed 1? (yes/no)")
        );

        controller.handle_command(Command::Confirm(true));
        pump(&mut controller).await; // Deleted
        pump(&mut controller).await; // Fetched

        let view = controller.screen().last_view().unwrap();
        assert_eq!(view.prompt, None);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].title, "B");
        assert_eq!(backend.calls_to("list_feeds"), 2);
    }

    #[tokio::test]
    async fn add_dialog_flow() {
        let (mut controller, _backend) = controller(InMemoryFeedBackend::new().with_feed(feed_a()));
        controller.start();
        pump(&mut controller).await;

        controller.handle_command(Command::OpenAddDialog);
        controller.handle_command(Command::AddLine("https://new.example/rss".to_string()));
        controller.handle_command(Command::SubmitAddDialog);
        assert!(controller.screen().last_view().unwrap().add_dialog.as_ref().unwrap().submitting);

        controller.handle_command(Command::CancelAddDialog);
        assert!(controller.board().add_dialog().is_some());

        pump(&mut controller).await; // FeedsAdded
        pump(&mut controller).await; // Fetched

        let view = controller.screen().last_view().unwrap();
        assert!(view.add_dialog.is_none());
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            controller.screen().last_notice().unwrap().message,
            "Added 1 feeds"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_polls_and_refetches_after_refresh() {
        let backend = Arc::new(InMemoryFeedBackend::new().with_feed(feed_a()));
        let controller = FeedBoardController::new(
            backend.clone(),
            Arc::new(RecordingNavigator::new()),
            RecordingScreen::new(),
            &BoardConfig::default(),
        );
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(controller.run(rx));

        // Initial poll plus one scheduled poll 5s later
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(backend.calls_to("list_feeds"), 2);

        tx.send(Command::RefreshOne(FeedId(1))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert_eq!(backend.calls_to("refresh_feed"), 1);
        assert_eq!(backend.calls_to("list_feeds"), 3);

        tx.send(Command::Sort(SortColumn::NumArticles)).await.unwrap();
        tx.send(Command::Quit).await.unwrap();
        let screen = handle.await.unwrap();

        let view = screen.last_view().unwrap();
        assert!(view.loaded);
        assert_eq!(view.sort.column, SortColumn::NumArticles);
        assert_eq!(view.rows[0].status, "scan complete");
    }

    #[tokio::test(start_paused = true)]
    async fn hung_first_poll_does_not_stop_polling() {
        let backend = Arc::new(InMemoryFeedBackend::new().with_feed(feed_a()).hanging_list(1));
        let config = BoardConfig::default();
        let controller = FeedBoardController::new(
            backend.clone(),
            Arc::new(RecordingNavigator::new()),
            RecordingScreen::new(),
            &config,
        );
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(controller.run(rx));

        tokio::time::sleep(config.request_timeout - Duration::from_millis(500)).await;
        assert_eq!(backend.calls_to("list_feeds"), 1);

        // The stuck poll is superseded, then regular slow polling resumes
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.calls_to("list_feeds"), 2);
        tokio::time::sleep(config.slow_poll).await;
        assert_eq!(backend.calls_to("list_feeds"), 3);

        tx.send(Command::Quit).await.unwrap();
        let screen = handle.await.unwrap();
        let view = screen.last_view().unwrap();
        assert!(view.loaded);
        assert_eq!(view.rows.len(), 1);
    }

    #[tokio::test]
    async fn superseded_scheduled_poll_does_not_reschedule() {
        let (mut controller, _backend) = controller(InMemoryFeedBackend::new());
        controller.start();
        let first = controller.scheduled_seq.unwrap();
        controller.scheduled_fetch();
        let second = controller.scheduled_seq.unwrap();
        let deadline = controller.next_poll;

        controller.handle_event(Event::Fetched {
            seq: first,
            origin: FetchOrigin::Scheduled,
            result: Err(crate::error::BackendError::api(500, "late")),
        });
        assert_eq!(controller.scheduled_seq, Some(second));
        assert_eq!(controller.next_poll, deadline);

        controller.handle_event(Event::Fetched {
            seq: second,
            origin: FetchOrigin::Scheduled,
            result: Ok(test_snapshot(vec![feed_a()])),
        });
        assert_eq!(controller.scheduled_seq, None);
        assert!(controller.screen().last_view().unwrap().loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_ends_when_commands_close() {
        let (controller, _backend) = controller(InMemoryFeedBackend::new());
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        let screen = controller.run(rx).await;
        assert!(!screen.paints.is_empty());
    }
}
