//! Command parser for terminal input
//!
//! Parses lines like "sort title", "refresh 3", "delete 2". While the add
//! dialog is open every line is a URL or a dialog command ("." submits,
//! "cancel" closes). Only the board decides when the dialog has closed, so
//! the reader stays in add mode until the painted board says it is gone.

use chrono::{Duration, NaiveDate};
use feedboard::domain::entities::{FeedId, SortColumn};
use feedboard::render::TimeMode;
use feedboard::Command;
use thiserror::Error;

/// Days covered by `download-range` when no dates are given
const DEFAULT_RANGE_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing argument for: {0}")]
    MissingArgument(String),
}

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Board(Command),
    Help,
}

/// Line interpreter; remembers whether the add dialog is collecting URLs
#[derive(Debug, Default)]
pub struct CommandReader {
    adding: bool,
    /// A submit or cancel was sent; waiting for the board to close the dialog
    closing: bool,
}

impl CommandReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret one line. `dialog_open` is whether the last painted board
    /// showed the add dialog. Blank lines outside the dialog yield `None`.
    pub fn read_line(
        &mut self,
        line: &str,
        today: NaiveDate,
        dialog_open: bool,
    ) -> Result<Option<Input>, CommandError> {
        let trimmed = line.trim();

        if self.adding && self.closing && !dialog_open {
            self.adding = false;
            self.closing = false;
        }

        if self.adding {
            return Ok(Some(Input::Board(match trimmed {
                "." => {
                    self.closing = true;
                    Command::SubmitAddDialog
                }
                "cancel" => {
                    self.closing = true;
                    Command::CancelAddDialog
                }
                url => Command::AddLine(url.to_string()),
            })));
        }

        if trimmed.is_empty() {
            return Ok(None);
        }

        let input = parse_command(trimmed, today)?;
        if input == Input::Board(Command::OpenAddDialog) {
            self.adding = true;
            self.closing = false;
        }
        Ok(Some(input))
    }
}

fn feed_id(command: &str, arg: Option<&&str>) -> Result<FeedId, CommandError> {
    let arg = arg.ok_or_else(|| CommandError::MissingArgument(command.to_string()))?;
    arg.parse().map_err(CommandError::InvalidArgument)
}

fn date(arg: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(arg, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArgument(format!("'{}' is not a date (expected YYYY-MM-DD)", arg))
    })
}

/// Parse a single command line
pub fn parse_command(input: &str, today: NaiveDate) -> Result<Input, CommandError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(CommandError::UnknownCommand("empty input".to_string()));
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let command = parts[0].to_lowercase();

    let parsed = match command.as_str() {
        "sort" => {
            let column = parts
                .get(1)
                .ok_or_else(|| CommandError::MissingArgument("sort".to_string()))?;
            Command::Sort(column.parse().map_err(CommandError::InvalidArgument)?)
        }

        "refresh" => match parts.get(1) {
            Some(_) => Command::RefreshOne(feed_id("refresh", parts.get(1))?),
            None => Command::RefreshAll,
        },

        "refresh-all" => Command::RefreshAll,

        "reload" => Command::Reload,

        "delete" | "rm" => Command::Delete(feed_id("delete", parts.get(1))?),

        "yes" | "y" => Command::Confirm(true),

        "no" | "n" => Command::Confirm(false),

        "add" => {
            if parts.len() > 1 {
                Command::AddFeeds(parts[1..].join("\n"))
            } else {
                Command::OpenAddDialog
            }
        }

        "download" => Command::DownloadFeed(feed_id("download", parts.get(1))?),

        "download-range" => match (parts.get(1), parts.get(2)) {
            (None, None) => Command::DownloadRange {
                start: Some(today - Duration::days(DEFAULT_RANGE_DAYS)),
                end: Some(today),
            },
            (start, end) => Command::DownloadRange {
                start: start.map(|s| date(s)).transpose()?,
                end: end.map(|e| date(e)).transpose()?,
            },
        },

        "download-feeds" => Command::DownloadFeedList,

        "time" => {
            let mode: TimeMode = parts
                .get(1)
                .ok_or_else(|| CommandError::MissingArgument("time".to_string()))?
                .parse()
                .map_err(CommandError::InvalidArgument)?;
            Command::SetTimeMode(mode)
        }

        "help" | "?" => return Ok(Input::Help),

        "quit" | "exit" | "q" => Command::Quit,

        _ => {
            // Bare column names act as header clicks
            match parts[0].parse::<SortColumn>() {
                Ok(column) => Command::Sort(column),
                Err(_) => return Err(CommandError::UnknownCommand(parts[0].to_lowercase())),
            }
        }
    };

    Ok(Input::Board(parsed))
}

pub fn help_text() -> String {
    r#"# Available Commands

## Table
- `sort <column>` - Sort by column; again to flip direction
  (title, url, articles, recent, last-article, last-scan, trigger, status)
- `time relative|absolute` - Switch timestamp display
- `reload` - Fetch the feed list now

## Feeds
- `refresh` - Rescan all feeds
- `refresh <id>` - Rescan one feed
- `delete <id>` - Delete a feed (asks for confirmation: `yes` / `no`)
- `add` - Add feeds, one URL per line; `.` submits, `cancel` closes
- `add <url> [url...]` - Add feeds directly

## Downloads
- `download <id>` - Articles of one feed as CSV
- `download-range [start end]` - Articles between two dates (YYYY-MM-DD, default last 7 days)
- `download-feeds` - The feed list as CSV

## Other
- `help` - Show this help message
- `quit` - Exit
"#
    .to_string()
}
