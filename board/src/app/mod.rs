//! Application layer
//!
//! The controller and the state objects it drives. Everything here is
//! independent of HTTP and of the terminal; those live behind the ports.

pub mod board;
pub mod command;
pub mod controller;
pub mod countdown;
pub mod dispatcher;
pub mod event;
pub mod poller;
pub mod sort_state;

pub use board::{AddDialog, Board, Control, Reconcile, StatusPatch};
pub use command::Command;
pub use controller::FeedBoardController;
pub use countdown::{Countdown, CountdownChange, NOT_SCHEDULED};
pub use dispatcher::{parse_url_list, ActionDispatcher, Reaction, Refetch, EMPTY_URLS, MISSING_DATES};
pub use event::{Event, FetchOrigin};
pub use poller::{PollIntervals, Poller};
pub use sort_state::{compare_feeds, sort_feeds, SortState};
