use crate::harvest::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Refresh rate for progress updates (10 Hz).
const REFRESH_INTERVAL_MS: u64 = 100;

const TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";
const TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {msg}";

#[derive(Debug)]
struct DelayedProgressState {
    visible_after: Instant,
    visible: AtomicBool,
    length: AtomicU64,
    position: AtomicU64,
}

/// A progress bar that delays showing itself until a threshold is reached.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<DelayedProgressState>,
    refresh_task: Arc<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// The progress bar will only become visible if the harvest continues beyond the delay threshold.
    /// When `use_colors` is false, progress bar chrome is rendered without ANSI styling.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_draw_target(ProgressDrawTarget::hidden());

        let template = if use_colors { TEMPLATE } else { TEMPLATE_NO_COLOR };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .expect("could not create progress bar style")
                .progress_chars("=> "),
        );

        let state = Arc::new(DelayedProgressState {
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            length: AtomicU64::new(0),
            position: AtomicU64::new(0),
        });

        Self {
            refresh_task: Arc::new(tokio::spawn(refresh_task(bar.clone(), Arc::clone(&state)))),
            bar,
            state,
        }
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
    }

    fn set_length(&self, total: u64) {
        self.state.length.store(total, Ordering::Relaxed);
    }

    fn set_position(&self, position: u64) {
        self.state.position.store(position, Ordering::Relaxed);
    }

    fn println(&self, msg: &str) {
        self.bar.suspend(|| eprintln!("{msg}"));
    }

    fn done(&self) {
        self.refresh_task.abort();
        if self.state.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("state", &self.state)
            .field("refresh_task", &"<task>")
            .finish()
    }
}

/// Background refresh task that periodically updates the progress bar.
async fn refresh_task(bar: ProgressBar, state: Arc<DelayedProgressState>) {
    let mut interval = tokio::time::interval(Duration::from_millis(REFRESH_INTERVAL_MS));
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !state.visible.load(Ordering::Relaxed) && Instant::now() >= state.visible_after {
            state.visible.store(true, Ordering::Relaxed);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        if state.visible.load(Ordering::Relaxed) {
            let length = state.length.load(Ordering::Relaxed);
            let position = state.position.load(Ordering::Relaxed);

            if length > 0 {
                bar.set_length(length);
                bar.set_position(position);
            }
            bar.set_message(format!("{position}/{length}"));
        }
    }
}
