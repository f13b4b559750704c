//! Terminal screen
//!
//! Redraws the whole board on every paint: clear, set the window title,
//! print the table. The latest notice stays under the table for a while.
//! Whether the add dialog is showing is published for the input reader.

use std::io::Write;
use std::time::{Duration, Instant};

use feedboard::domain::entities::{Notice, NoticeLevel};
use feedboard::domain::ports::Screen;
use feedboard::render::{render_board, BoardView};
use tokio::sync::watch;

const NOTICE_TTL: Duration = Duration::from_secs(5);

const CLEAR: &str = "\x1b[2J\x1b[H";

pub struct TerminalScreen<W: Write + Send> {
    out: W,
    notice: Option<(Notice, Instant)>,
    dialog_open: watch::Sender<bool>,
}

impl<W: Write + Send> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        let (dialog_open, _) = watch::channel(false);
        Self {
            out,
            notice: None,
            dialog_open,
        }
    }

    /// Follows whether the last painted board showed the add dialog
    pub fn dialog_state(&self) -> watch::Receiver<bool> {
        self.dialog_open.subscribe()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, view: &BoardView) -> std::io::Result<()> {
        let mut frame = String::new();
        frame.push_str(CLEAR);
        // OSC 0: window title
        frame.push_str(&format!("\x1b]0;{}\x07", view.title));
        frame.push_str(&render_board(view));

        if let Some((notice, shown_at)) = &self.notice {
            if shown_at.elapsed() < NOTICE_TTL {
                frame.push_str(&format!("\n{}\n", notice_line(notice)));
            }
        }
        frame.push_str("\n> ");

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

fn notice_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("[info] {}", notice.message),
        NoticeLevel::Warning => format!("[warning] {}", notice.message),
        NoticeLevel::Error => format!("[error] {}", notice.message),
    }
}

impl<W: Write + Send> Screen for TerminalScreen<W> {
    fn paint(&mut self, view: &BoardView) {
        self.dialog_open.send_replace(view.add_dialog.is_some());
        if let Err(e) = self.draw(view) {
            tracing::warn!("Failed to draw board: {}", e);
        }
    }

    fn notify(&mut self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!("{}", notice.message),
            _ => tracing::info!("{}", notice.message),
        }
        // A fresh warning or error outranks a routine info message
        let keep_current = notice.level == NoticeLevel::Info
            && self.notice.as_ref().is_some_and(|(current, shown_at)| {
                current.level != NoticeLevel::Info && shown_at.elapsed() < NOTICE_TTL
            });
        if keep_current {
            return;
        }
        self.notice = Some((notice.clone(), Instant::now()));
    }
}
