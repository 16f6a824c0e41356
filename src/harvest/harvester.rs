use super::collector::{CollectOutcome, collect};
use super::layout::Layout;
use super::progress::Progress;
use super::resume::next_sequence;
use super::scheduler::{RetryScheduler, Signal};
use super::sink::AppendSink;
use super::source::RemoteCollection;
use crate::Result;
use core::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = " harvester";

/// Message shown when a run stops early because the remote quota ran out.
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded, please wait";

/// Message shown when a run stops early because one element could not be fetched.
#[must_use]
pub fn element_failed_message(sequence: u64) -> String {
    format!("could not fetch element {sequence}, retrying later")
}

/// What a completed harvest did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    pub attempts: u32,
    pub rows_appended: usize,
    pub path: PathBuf,
}

/// Binds a remote collection to an output file and shapes its records with a layout.
///
/// Each invocation resumes from the output file's last row, so a harvest interrupted by a
/// rate limit, a failed element, or a process restart picks up where it stopped.
pub struct Harvester<'a, C> {
    collection: &'a C,
    layout: Layout,
    sink: AppendSink,
    progress: &'a dyn Progress,
    rows_appended: usize,
}

impl<C> Debug for Harvester<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Harvester")
            .field("layout", &self.layout)
            .field("sink", &self.sink)
            .field("rows_appended", &self.rows_appended)
            .finish_non_exhaustive()
    }
}

impl<'a, C: RemoteCollection> Harvester<'a, C> {
    pub fn new(collection: &'a C, layout: Layout, path: impl Into<PathBuf>, progress: &'a dyn Progress) -> Self {
        let sink = AppendSink::new(path, layout.output_columns());
        Self {
            collection,
            layout,
            sink,
            progress,
            rows_appended: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.sink.path()
    }

    /// Total rows written by this harvester so far.
    #[must_use]
    pub const fn rows_appended(&self) -> usize {
        self.rows_appended
    }

    /// Run one collection pass and persist whatever it produced.
    ///
    /// # Errors
    ///
    /// Fails on unclassified remote errors and on local I/O errors. Rate limits and failed
    /// elements are not errors; they ask for a retry instead.
    pub async fn run_once(&mut self) -> Result<Signal> {
        let start = next_sequence(self.sink.path());

        let outcome = match collect(self.collection, start, self.progress).await {
            CollectOutcome::Exhausted => {
                log::info!(target: LOG_TARGET, "'{}' is up to date", self.sink.path().display());
                return Ok(Signal::Done);
            }
            CollectOutcome::Fatal(e) => return Err(e),
            outcome => outcome,
        };

        let signal = match &outcome {
            CollectOutcome::RateLimited { reset_at, .. } => {
                match reset_at {
                    Some(at) => log::warn!(target: LOG_TARGET, "Rate limit exceeded, quota resets at {at}"),
                    None => log::warn!(target: LOG_TARGET, "Rate limit exceeded"),
                }
                self.progress.println(RATE_LIMIT_MESSAGE);
                Signal::Retry
            }
            CollectOutcome::ElementFailed { sequence, cause, .. } => {
                log::warn!(target: LOG_TARGET, "Could not resolve element {sequence}, will retry: {cause:#}");
                self.progress.println(&element_failed_message(*sequence));
                Signal::Retry
            }
            CollectOutcome::Success(_) | CollectOutcome::Exhausted | CollectOutcome::Fatal(_) => Signal::Done,
        };

        let batch = outcome.into_batch().unwrap_or_default();
        let last = batch.last_sequence();
        let table = self.layout.normalize(batch)?;
        let written = self.sink.append(&table)?;
        self.rows_appended += written;

        match last {
            Some(last) => {
                log::info!(target: LOG_TARGET, "Appended {written} row(s) to '{}' through element {last}", self.sink.path().display());
            }
            None => log::info!(target: LOG_TARGET, "Nothing new to append to '{}'", self.sink.path().display()),
        }

        Ok(signal)
    }

    /// Keep invoking [`Self::run_once`] under `scheduler` until the collection is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a run, or the scheduler's error if it gives up.
    pub async fn run(mut self, scheduler: &mut RetryScheduler) -> Result<HarvestSummary> {
        let result = scheduler.run(async || self.run_once().await).await;
        self.progress.done();
        let attempts = result?;

        Ok(HarvestSummary {
            attempts,
            rows_appended: self.rows_appended,
            path: self.sink.path().to_path_buf(),
        })
    }
}
