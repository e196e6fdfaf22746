//! Terminal outcome reporter

use crate::cli::style::{CHECK, CROSS, Stylize, WARN, bar_style};
use anstream::println;
use async_trait::async_trait;
use gl_bulk_merge::merge::MergeJob;
use gl_bulk_merge::report::OutcomeSink;
use gl_bulk_merge::types::{Outcome, OutcomeLevel, ProjectRef};
use indicatif::ProgressBar;
use std::time::Duration;

/// Progress bar plus one line per finished project
pub struct CliReporter {
    bar: ProgressBar,
    direction: String,
}

impl CliReporter {
    pub fn new(total: usize, job: &MergeJob) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(bar_style());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            direction: job.direction(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// One styled line for an outcome
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome.level {
        OutcomeLevel::Success => format!("{} {}", CHECK.success(), outcome.message),
        OutcomeLevel::Warning => format!("{} {}", WARN.warn(), outcome.message.warn()),
        OutcomeLevel::Error => format!("{} {}", CROSS.error(), outcome.message.error()),
    }
}

#[async_trait]
impl OutcomeSink for CliReporter {
    async fn on_project_start(&self, _index: usize, _total: usize, project: &ProjectRef) {
        self.bar
            .set_message(format!("Merging {} ({})", project.name, self.direction));
    }

    async fn on_outcome(&self, outcome: &Outcome) {
        let line = render_outcome(outcome);
        // println on the bar is dropped when stderr is not a terminal
        self.bar.suspend(|| println!("{line}"));
        self.bar.inc(1);
    }
}
