//! Terminal and JSON output for the CLI.
//!
//! In `--json` mode every human-oriented message is suppressed so stdout
//! carries exactly one JSON document per command.

use console::{measure_text_width, pad_str, style, Alignment, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use pageturn_commerce::money::Money;
use serde::Serialize;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    fn stdout(&self, icon: StyledObject<&str>, msg: &str) {
        if !self.json {
            println!("{} {}", icon, msg);
        }
    }

    pub fn info(&self, msg: &str) {
        self.stdout(style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.stdout(style("✓").green(), msg);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        self.stdout(style("  •").dim(), item);
    }

    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {}", style("⚠").yellow(), msg);
        }
    }

    /// Print an error; in JSON mode as `{"error": ...}` on stderr.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if self.verbose && !self.json {
            eprintln!("{} {}", style("→").dim(), style(msg).dim());
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.json {
            println!("\n{}", style(msg).bold().underlined());
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    /// Print `value` as pretty JSON.
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("failed to encode output: {}", e)),
        }
    }

    /// Print rows under a bold heading line, each column padded to its
    /// widest cell. Styled cells are measured without their escape codes.
    pub fn table(&self, headings: &[&str], rows: &[Vec<String>]) {
        if self.json {
            return;
        }
        for line in render_table(headings, rows) {
            println!("  {}", line);
        }
    }

    /// Progress bar over `len` steps; hidden in JSON mode.
    pub fn progress(&self, len: u64, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let bar = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let pb = ProgressBar::new(len).with_style(bar);
        pb.set_message(msg.to_string());
        pb
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

fn render_table(headings: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headings.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let join = |cells: Vec<String>| cells.join("  ").trim_end().to_string();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join(
        headings
            .iter()
            .zip(&widths)
            .map(|(h, w)| style(pad_str(h, *w, Alignment::Left, None)).bold().to_string())
            .collect(),
    ));
    for row in rows {
        lines.push(join(
            row.iter()
                .zip(&widths)
                .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, None).into_owned())
                .collect(),
        ));
    }
    lines
}

/// Price with the list price struck through when a discount applies.
pub fn format_price(effective: &Money, list: &Money) -> String {
    if effective == list {
        effective.display()
    } else {
        format!(
            "{} {}",
            style(effective.display()).green(),
            style(list.display()).dim().strikethrough()
        )
    }
}

/// Average rating to one decimal, or a dash when unrated.
pub fn format_rating(average: f64, count: i64) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        format!("{:.1} ({})", average, count)
    }
}

/// Shorten `text` to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
