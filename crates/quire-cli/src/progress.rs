use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use quire_core::Category;
use quire_sync::{CategorySummary, SyncObserver};

use crate::ui;

pub struct Progress {
    bar: Option<ProgressBar>,
}

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| MultiProgress::with_draw_target(ProgressDrawTarget::stderr()))
}

fn bar_template() -> &'static str {
    match ui::prefs().term_width {
        Some(cols) if cols >= 110 => "{prefix:>5} {bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{prefix:>5} {wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{prefix:>5} {wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

impl Progress {
    #[must_use]
    pub fn bar(total: u64, prefix: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = multi_progress().add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(prefix.to_string());
        Self { bar: Some(bar) }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

/// One bar per category pass.
#[derive(Default)]
pub struct ProgressObserver {
    bars: Mutex<HashMap<Category, Progress>>,
}

impl ProgressObserver {
    fn with_bar(&self, category: Category, f: impl FnOnce(&Progress)) {
        if let Ok(bars) = self.bars.lock()
            && let Some(bar) = bars.get(&category)
        {
            f(bar);
        }
    }
}

impl SyncObserver for ProgressObserver {
    fn category_started(&self, category: Category, documents: usize) {
        let bar = Progress::bar(documents as u64, category.as_str());
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(category, bar);
        }
    }

    fn document_finished(&self, category: Category, title: &str, synced: bool) {
        self.with_bar(category, |bar| {
            if !synced {
                bar.set_message(&format!("aborted: {title}"));
            }
            bar.inc(1);
        });
    }

    fn category_finished(&self, summary: &CategorySummary) {
        let message = format!(
            "{} synced, {} aborted, {} warnings",
            summary.synced,
            summary.aborted.len(),
            summary.warnings.len()
        );
        self.with_bar(summary.category, |bar| {
            if summary.aborted.is_empty() {
                bar.finish_ok(&message);
            } else {
                bar.finish_err(&message);
            }
        });
    }
}
