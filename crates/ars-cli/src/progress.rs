use std::sync::OnceLock;

use ars_session::ThinkingView;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::ui;

pub struct Progress {
    bar: Option<ProgressBar>,
}

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(MultiProgress::new)
}

fn bar_template() -> &'static str {
    match ui::prefs().term_width {
        Some(cols) if cols >= 110 => "{spinner:.cyan} {bar:40.cyan/blue} {pos:>3}% {prefix:.bold} {msg}",
        Some(cols) if cols >= 80 => "{spinner:.cyan} {wide_bar:.cyan/blue} {pos:>3}% {prefix:.bold}",
        _ => "{spinner:.cyan} {pos:>3}% {prefix:.bold} {msg}",
    }
}

/// Trim a progress line so the bar stays on one terminal row.
fn clip(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let mut out: String = line.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = multi_progress().add(ProgressBar::new_spinner());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    /// Percentage bar for a running research session.
    #[must_use]
    pub fn research() -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = multi_progress().add(ProgressBar::new(100));
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar: Some(bar) }
    }

    /// Redraw from a freshly derived view.
    pub fn show(&self, view: &ThinkingView) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(view.percentage));
            bar.set_prefix(view.label());
            bar.set_message(clip(&view.status_line, 60));
        }
    }

    /// Print a line above the bar without tearing it.
    pub fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}
