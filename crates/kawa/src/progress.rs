use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::segment::StreamKind;

/// Cumulative per-phase progress display.
///
/// Purely observational: advancing the bar can never fail a download. One
/// advance corresponds to one segment written to the output stream, not to a
/// fetch completion, so the bar only ever moves in logical order.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(kind: StreamKind, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{msg:>5} [{bar:30.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("=> "),
        );
        bar.set_message(kind.as_str());
        Self { bar }
    }

    /// A reporter that renders nothing but still counts advances.
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn advance(&self, n: u64) {
        self.bar.inc(n);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}
