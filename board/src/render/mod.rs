//! Rendering
//!
//! Pure transforms from board state to what a screen shows:
//! - `format`: timestamps and countdowns
//! - `view`: snapshot + sort config → `BoardView`
//! - `table`: `BoardView` → plain text

pub mod format;
pub mod table;
pub mod view;

pub use format::{
    format_absolute, format_countdown, format_relative, format_timestamp, TimeMode, DUE_NOW,
    JUST_NOW,
};
pub use table::render_board;
pub use view::{
    project, AddDialogView, BoardView, LatestArticle, ProgressView, RowView, SummaryView,
    DEFAULT_TITLE, NEVER, NO_ARTICLES,
};
