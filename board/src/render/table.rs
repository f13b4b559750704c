//! Text renderer
//!
//! Renders a `BoardView` to a plain-text table for terminal screens.

use crate::domain::entities::{SortColumn, SortDirection};

use super::view::{BoardView, RowView};

const BAR_WIDTH: usize = 30;

const COLUMNS: [(SortColumn, &str); 8] = [
    (SortColumn::Title, "Title"),
    (SortColumn::Url, "URL"),
    (SortColumn::NumArticles, "Articles"),
    (SortColumn::RecentArticles, "Last 7 Days"),
    (SortColumn::LastArticleDate, "Last Article"),
    (SortColumn::LastScanTime, "Last Scan"),
    (SortColumn::LastScanTrigger, "Trigger"),
    (SortColumn::Status, "Status"),
];

/// Render the whole board
pub fn render_board(view: &BoardView) -> String {
    let mut buf = String::new();

    buf.push_str(&format!("# {}\n\n", view.title));

    if let Some(progress) = &view.progress {
        buf.push_str(&format!("{} {}\n\n", progress_bar(progress.percent), progress.label));
    }

    if !view.loaded {
        buf.push_str("_Loading feeds..._\n\n");
    } else if view.rows.is_empty() {
        buf.push_str("_No feeds tracked yet. Use `add` to add some._\n\n");
    } else {
        buf.push_str(&render_header(view));
        for row in &view.rows {
            buf.push_str(&render_row(row));
        }
        buf.push('\n');
    }

    let summary = &view.summary;
    buf.push_str(&format!(
        "**Feed Statistics:** {} feeds tracked, {} total articles, {} articles in the last 7 days\n",
        summary.feeds, summary.total_articles, summary.recent_articles
    ));
    if let Some(latest) = &summary.latest {
        buf.push_str(&format!(
            "**Latest Article:** {} from \"{}\"\n",
            latest.when, latest.feed_title
        ));
    }
    buf.push_str(&format!("**Next automatic scan:** {}\n", view.countdown));
    if view.refresh_all_busy {
        buf.push_str("_Refreshing all feeds..._\n");
    }

    if let Some(dialog) = &view.add_dialog {
        buf.push_str("\n## Add Feeds\n\n");
        if dialog.draft.is_empty() {
            buf.push_str("_One URL per line; `.` submits, `cancel` closes._\n");
        } else {
            for line in dialog.draft.lines() {
                buf.push_str(&format!("    {}\n", line));
            }
        }
        if dialog.submitting {
            buf.push_str("_Submitting..._\n");
        }
    }

    if let Some(prompt) = &view.prompt {
        buf.push_str(&format!("\n> {}\n", prompt));
    }

    buf
}

fn render_header(view: &BoardView) -> String {
    let mut names = vec!["ID".to_string()];
    for (column, name) in COLUMNS {
        if column == view.sort.column {
            let arrow = match view.sort.direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            };
            names.push(format!("{} {}", name, arrow));
        } else {
            names.push(name.to_string());
        }
    }
    names.push("Actions".to_string());

    let separator: Vec<String> = names.iter().map(|n| "-".repeat(n.chars().count())).collect();

    format!("| {} |\n|{}|\n", names.join(" | "), separator.join("|"))
}

fn render_row(row: &RowView) -> String {
    let actions = if row.busy { "(busy) delete" } else { "refresh delete" };
    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        row.id,
        cell(&row.title),
        cell(&row.url),
        row.articles,
        row.recent_articles,
        row.last_article,
        row.last_scan,
        row.trigger,
        row.status,
        actions
    )
}

/// Keep table cells on one line
fn cell(text: &str) -> String {
    text.replace(['\n', '\r'], " ").replace('|', "/")
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FeedId, SortConfig};
    use crate::render::{AddDialogView, LatestArticle, ProgressView, SummaryView, TimeMode};

    fn row(id: i64, title: &str) -> RowView {
        RowView {
            id: FeedId(id),
            title: title.to_string(),
            url: format!("https://{}.example/rss", id),
            articles: 5,
            recent_articles: 1,
            last_article: "No articles".to_string(),
            last_scan: "Never".to_string(),
            trigger: "-".to_string(),
            status: "active".to_string(),
            busy: false,
        }
    }

    fn view(rows: Vec<RowView>) -> BoardView {
        BoardView {
            title: "Feed Board".to_string(),
            loaded: true,
            sort: SortConfig::default(),
            time_mode: TimeMode::Relative,
            rows,
            progress: None,
            summary: SummaryView {
                feeds: 1,
                total_articles: 5,
                recent_articles: 1,
                latest: None,
            },
            countdown: "1 minute 30 seconds".to_string(),
            refresh_all_busy: false,
            prompt: None,
            add_dialog: None,
        }
    }

    #[test]
    fn renders_rows_and_summary() {
        let result = render_board(&view(vec![row(1, "A")]));

        assert!(result.contains("# Feed Board"));
        assert!(result.contains("| ID | Title ▲ | URL |"));
        assert!(result.contains("| 1 | A | https://1.example/rss | 5 | 1 | No articles | Never | - | active | refresh delete |"));
        assert!(result.contains("**Feed Statistics:** 1 feeds tracked, 5 total articles, 1 articles in the last 7 days"));
        assert!(result.contains("**Next automatic scan:** 1 minute 30 seconds"));
        assert!(!result.contains("**Latest Article:**"));
    }

    #[test]
    fn renders_progress_bar_and_latest() {
        let mut v = view(vec![row(1, "A")]);
        v.progress = Some(ProgressView {
            percent: 50.0,
            label: "Scanning feeds: 1/2 (50%)".to_string(),
        });
        v.summary.latest = Some(LatestArticle {
            when: "just now".to_string(),
            feed_title: "A".to_string(),
        });

        let result = render_board(&v);

        assert!(result.contains(&format!("[{}{}] Scanning feeds: 1/2 (50%)", "#".repeat(15), " ".repeat(15))));
        assert!(result.contains("**Latest Article:** just now from \"A\""));
    }

    #[test]
    fn busy_row_disables_refresh() {
        let mut busy = row(2, "B");
        busy.busy = true;
        let result = render_board(&view(vec![busy]));
        assert!(result.contains("| (busy) delete |"));
    }

    #[test]
    fn empty_and_loading_states() {
        let result = render_board(&view(vec![]));
        assert!(result.contains("_No feeds tracked yet."));

        let mut loading = view(vec![]);
        loading.loaded = false;
        assert!(render_board(&loading).contains("_Loading feeds..._"));
    }

    #[test]
    fn prompt_and_dialog() {
        let mut v = view(vec![row(1, "A")]);
        v.prompt = Some("Delete feed 1? (yes/no)".to_string());
        v.add_dialog = Some(AddDialogView {
            draft: "https://x.example/rss".to_string(),
            submitting: true,
        });

        let result = render_board(&v);

        assert!(result.contains("> Delete feed 1? (yes/no)"));
        assert!(result.contains("## Add Feeds"));
        assert!(result.contains("    https://x.example/rss"));
        assert!(result.contains("_Submitting..._"));
    }

    #[test]
    fn cells_stay_on_one_line() {
        assert_eq!(cell("a|b\nc"), "a/b c");
    }

    #[test]
    fn progress_bar_is_bounded() {
        assert_eq!(progress_bar(0.0), format!("[{}]", " ".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
    }
}
