//! Feed board terminal client
//!
//! Polls an RSS feed backend and keeps a sorted feed table, scan progress and
//! the next-scan countdown on screen. Commands are read from stdin; logs go to
//! stderr so they never interleave with the table.

mod command;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result};
use feedboard::adapters::{FileDownloader, HttpFeedBackend};
use feedboard::{BoardConfig, Command, FeedBoardController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use command::{help_text, CommandReader, Input};
use terminal::TerminalScreen;

const DEFAULT_LOG_FILTER: &str = "info,feedboard=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout carries the table)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BoardConfig::from_env().context("Invalid feed board configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        download_dir = %config.download_dir.display(),
        "Starting feed board"
    );

    let backend = Arc::new(
        HttpFeedBackend::new(&config.api_url, config.request_timeout)
            .context("Failed to build HTTP client")?,
    );
    let navigator = Arc::new(FileDownloader::new(config.download_dir.clone()));
    let screen = TerminalScreen::new(std::io::stdout());
    let dialog = screen.dialog_state();
    let controller = FeedBoardController::new(backend, navigator, screen, &config);

    let (tx, rx) = mpsc::channel(32);
    let reader = tokio::spawn(read_commands(tx, dialog));

    controller.run(rx).await;
    reader.abort();

    Ok(())
}

/// Forward stdin lines to the controller until EOF or `quit`
async fn read_commands(tx: mpsc::Sender<Command>, dialog: watch::Receiver<bool>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reader = CommandReader::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                break;
            }
        };

        let today = chrono::Local::now().date_naive();
        let dialog_open = *dialog.borrow();
        match reader.read_line(&line, today, dialog_open) {
            Ok(Some(Input::Board(command))) => {
                let quit = command == Command::Quit;
                if tx.send(command).await.is_err() || quit {
                    return;
                }
            }
            Ok(Some(Input::Help)) => eprintln!("{}", help_text()),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("Rejected input: {}", e);
                eprintln!("{} (type `help` for commands)", e);
            }
        }
    }

    let _ = tx.send(Command::Quit).await;
}
