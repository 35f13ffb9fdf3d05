//! Aggregation of per-path actions into counts, a summary and an exit code.
//!
//! The report is owned by a single consumer loop; the action channel is the
//! only synchronisation point between it and the workers.

use tokio::sync::mpsc;

use crate::{Action, Mode, Verbosity, EXIT_ERROR, EXIT_WOULD_REFORMAT};

/// Printed on stdout when no candidate file was found.
pub const NOTHING_TO_DO: &str = "No Python files are present to be formatted. Nothing to do 😴";

/// Counts of actions seen during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    mode: Mode,
    reformatted: usize,
    would_reformat: usize,
    unchanged: usize,
    failed: usize,
}

impl Report {
    /// Creates an empty report for a run in `mode`.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Consumes actions until every sender is gone.
    pub async fn collect(mut actions: mpsc::Receiver<Action>, mode: Mode) -> Self {
        let mut report = Self::new(mode);
        while let Some(action) = actions.recv().await {
            report.record(action);
        }
        report
    }

    /// Counts one action.
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Unchanged => self.unchanged += 1,
            Action::Reformatted => self.reformatted += 1,
            Action::WouldBeReformatted => self.would_reformat += 1,
            Action::Error => self.failed += 1,
        }
    }

    /// Number of actions recorded.
    pub fn total(&self) -> usize {
        self.reformatted + self.would_reformat + self.unchanged + self.failed
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Number of files that changed or would change.
    pub fn changed(&self) -> usize {
        self.reformatted + self.would_reformat
    }

    /// Number of files left as they were.
    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Process exit code: errors win over pending changes, which only
    /// count in check mode.
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            EXIT_ERROR
        } else if self.mode.check && self.would_reformat > 0 {
            EXIT_WOULD_REFORMAT
        } else {
            0
        }
    }

    /// Opening line of the summary.
    pub fn headline(&self) -> &'static str {
        if self.failed > 0 {
            "Oh no! 💥 💔 💥"
        } else {
            "All done! ✨ 🍰 ✨"
        }
    }

    /// Comma-joined counts ending with a period, or `None` when nothing
    /// was processed.
    pub fn summary(&self) -> Option<String> {
        if self.total() == 0 {
            return None;
        }
        let dry_run = self.mode.is_dry_run();
        let parts: Vec<String> = [
            (self.changed(), "would be reformatted", "reformatted"),
            (self.unchanged, "would be left unchanged", "left unchanged"),
            (self.failed, "would fail to reformat", "failed to reformat"),
        ]
        .into_iter()
        .filter(|(count, _, _)| *count > 0)
        .map(|(count, dry, wet)| {
            let noun = if count == 1 { "file" } else { "files" };
            format!("{} {} {}", count, noun, if dry_run { dry } else { wet })
        })
        .collect();
        Some(format!("{}.", parts.join(", ")))
    }

    /// Writes the final report: the nothing-to-do notice on stdout, or the
    /// summary on stderr.
    pub fn emit(&self, verbosity: Verbosity) {
        if verbosity == Verbosity::Quiet {
            return;
        }
        match self.summary() {
            None => println!("{NOTHING_TO_DO}"),
            Some(summary) => {
                eprintln!("{}", self.headline());
                eprintln!("{summary}");
            }
        }
    }
}
