use super::Progress;
use super::batch::{Batch, SourceRecord};
use super::source::{FetchError, RemoteCollection};
use chrono::{DateTime, Utc};

const LOG_TARGET: &str = " collector";

/// How a collector invocation ended.
#[derive(Debug)]
pub enum CollectOutcome {
    /// `start` was at or past the end of the collection. Nothing was fetched.
    Exhausted,

    /// Every element from `start` to the end of the collection was fetched.
    Success(Batch),

    /// The remote quota ran out. The batch holds the elements fetched before that.
    RateLimited { batch: Batch, reset_at: Option<DateTime<Utc>> },

    /// The element with sequence number `sequence` could not be resolved. The batch holds the
    /// elements before it; that element and everything after it are left for the next run.
    ElementFailed { batch: Batch, sequence: u64, cause: ohno::AppError },

    /// An unclassified failure. Whatever was fetched is discarded.
    Fatal(ohno::AppError),
}

impl CollectOutcome {
    /// The batch to persist, if this outcome carries one.
    #[must_use]
    pub fn into_batch(self) -> Option<Batch> {
        match self {
            Self::Success(batch) | Self::RateLimited { batch, .. } | Self::ElementFailed { batch, .. } => Some(batch),
            Self::Exhausted | Self::Fatal(_) => None,
        }
    }
}

/// Fetch every element of `collection` from `start` onward.
///
/// Elements are tagged with sequence numbers `start`, `start + 1`, ... in collection order, and
/// the progress indicator is moved to the count of elements handled after each one.
pub async fn collect<C: RemoteCollection>(collection: &C, start: u64, progress: &dyn Progress) -> CollectOutcome {
    let total = match collection.total_count().await {
        Ok(total) => total,
        Err(FetchError::RateLimited { reset_at }) => {
            return CollectOutcome::RateLimited { batch: Batch::new(), reset_at };
        }
        Err(FetchError::Element(e) | FetchError::Fatal(e)) => return CollectOutcome::Fatal(e),
    };

    progress.set_length(total);
    progress.set_position(start.min(total));

    if start >= total {
        log::info!(target: LOG_TARGET, "Start position {start} is at or past the end of the collection ({total} element(s))");
        return CollectOutcome::Exhausted;
    }

    log::info!(target: LOG_TARGET, "Collecting from position {start} of {total}");

    let page_size = collection.page_size().max(1);
    let mut page_index = start / page_size;
    let mut skip = start % page_size;
    let mut next = start;
    let mut batch = Batch::new();

    loop {
        let elements = match collection.page(page_index).await {
            Ok(elements) => elements,
            Err(FetchError::RateLimited { reset_at }) => return CollectOutcome::RateLimited { batch, reset_at },
            Err(FetchError::Element(e) | FetchError::Fatal(e)) => return CollectOutcome::Fatal(e),
        };

        let page_len = elements.len() as u64;
        let offset = usize::try_from(skip).unwrap_or(usize::MAX);

        for element in elements.into_iter().skip(offset) {
            match collection.expand(element).await {
                Ok(cells) => {
                    if let Err(e) = batch.push(SourceRecord::new(next, cells)) {
                        return CollectOutcome::Fatal(e);
                    }
                    next += 1;
                    progress.set_position(next.min(total));
                }
                Err(FetchError::RateLimited { reset_at }) => {
                    log::debug!(target: LOG_TARGET, "Rate limited while resolving element {next}");
                    return CollectOutcome::RateLimited { batch, reset_at };
                }
                Err(FetchError::Element(cause)) => {
                    log::debug!(target: LOG_TARGET, "Could not resolve element {next}: {cause:#}");
                    return CollectOutcome::ElementFailed { batch, sequence: next, cause };
                }
                Err(FetchError::Fatal(e)) => return CollectOutcome::Fatal(e),
            }
        }

        if page_len < page_size {
            break;
        }

        skip = 0;
        page_index += 1;
    }

    if batch.is_empty() {
        log::info!(target: LOG_TARGET, "No elements found past position {start}");
        return CollectOutcome::Exhausted;
    }

    log::info!(target: LOG_TARGET, "Collected {} element(s), positions {start}..{next}", batch.len());
    CollectOutcome::Success(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::table::Cell;
    use ohno::app_err;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingProgress {
        length: Mutex<Option<u64>>,
        positions: Mutex<Vec<u64>>,
    }

    impl Progress for RecordingProgress {
        fn set_phase(&self, _phase: &str) {}

        fn set_length(&self, total: u64) {
            *self.length.lock().unwrap() = Some(total);
        }

        fn set_position(&self, position: u64) {
            self.positions.lock().unwrap().push(position);
        }

        fn println(&self, _msg: &str) {}

        fn done(&self) {}
    }

    enum Failure {
        RateLimited,
        Element,
        Fatal,
    }

    /// Elements are numbers `0..len`; `fail_at` makes one of them fail to expand.
    struct Numbers {
        len: u64,
        page_size: u64,
        fail_at: Option<(u64, Failure)>,
        pages_requested: Mutex<Vec<u64>>,
    }

    impl Numbers {
        fn new(len: u64, page_size: u64) -> Self {
            Self {
                len,
                page_size,
                fail_at: None,
                pages_requested: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, at: u64, failure: Failure) -> Self {
            self.fail_at = Some((at, failure));
            self
        }
    }

    impl RemoteCollection for Numbers {
        type Element = u64;

        fn page_size(&self) -> u64 {
            self.page_size
        }

        async fn total_count(&self) -> Result<u64, FetchError> {
            Ok(self.len)
        }

        async fn page(&self, index: u64) -> Result<Vec<u64>, FetchError> {
            self.pages_requested.lock().unwrap().push(index);
            let first = index * self.page_size;
            Ok((first..(first + self.page_size).min(self.len)).collect())
        }

        async fn expand(&self, element: u64) -> Result<Vec<Cell>, FetchError> {
            match &self.fail_at {
                Some((at, Failure::RateLimited)) if *at == element => Err(FetchError::RateLimited { reset_at: None }),
                Some((at, Failure::Element)) if *at == element => Err(FetchError::Element(app_err!("boom"))),
                Some((at, Failure::Fatal)) if *at == element => Err(FetchError::Fatal(app_err!("fatal"))),
                _ => Ok(vec![Cell::from(format!("item-{element}"))]),
            }
        }
    }

    fn sequences(batch: &Batch) -> Vec<u64> {
        batch.records().iter().map(|r| r.sequence).collect()
    }

    #[tokio::test]
    async fn test_collects_everything_from_zero() {
        let progress = RecordingProgress::default();
        let outcome = collect(&Numbers::new(7, 3), 0, &progress).await;

        let CollectOutcome::Success(batch) = outcome else {
            panic!("expected success");
        };
        assert_eq!(sequences(&batch), (0..7).collect::<Vec<_>>());
        assert_eq!(batch.records()[4].cells, vec![Cell::from("item-4")]);
        assert_eq!(*progress.length.lock().unwrap(), Some(7));
        assert_eq!(progress.positions.lock().unwrap().last(), Some(&7));
    }

    #[tokio::test]
    async fn test_starts_mid_page() {
        let collection = Numbers::new(10, 4);
        let outcome = collect(&collection, 5, &RecordingProgress::default()).await;

        let CollectOutcome::Success(batch) = outcome else {
            panic!("expected success");
        };
        assert_eq!(sequences(&batch), vec![5, 6, 7, 8, 9]);
        assert_eq!(batch.records()[0].cells, vec![Cell::from("item-5")]);
        assert_eq!(*collection.pages_requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size_requests_trailing_empty_page() {
        let collection = Numbers::new(6, 3);
        let outcome = collect(&collection, 0, &RecordingProgress::default()).await;

        assert!(matches!(outcome, CollectOutcome::Success(ref b) if b.len() == 6));
        assert_eq!(*collection.pages_requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_start_at_end_is_exhausted() {
        let collection = Numbers::new(5, 3);
        let outcome = collect(&collection, 5, &RecordingProgress::default()).await;

        assert!(matches!(outcome, CollectOutcome::Exhausted));
        assert!(collection.pages_requested.lock().unwrap().is_empty());
        assert!(matches!(collect(&collection, 50, &RecordingProgress::default()).await, CollectOutcome::Exhausted));
    }

    #[tokio::test]
    async fn test_empty_collection_is_exhausted() {
        let outcome = collect(&Numbers::new(0, 3), 0, &RecordingProgress::default()).await;
        assert!(matches!(outcome, CollectOutcome::Exhausted));
    }

    #[tokio::test]
    async fn test_rate_limit_keeps_partial_batch() {
        let collection = Numbers::new(10, 4).failing(6, Failure::RateLimited);
        let outcome = collect(&collection, 0, &RecordingProgress::default()).await;

        let CollectOutcome::RateLimited { batch, reset_at } = outcome else {
            panic!("expected rate limit");
        };
        assert_eq!(sequences(&batch), (0..6).collect::<Vec<_>>());
        assert!(reset_at.is_none());
    }

    #[tokio::test]
    async fn test_failed_element_is_excluded() {
        let collection = Numbers::new(10, 4).failing(3, Failure::Element);
        let outcome = collect(&collection, 1, &RecordingProgress::default()).await;

        let CollectOutcome::ElementFailed { batch, sequence, .. } = outcome else {
            panic!("expected element failure");
        };
        assert_eq!(sequence, 3);
        assert_eq!(sequences(&batch), vec![1, 2]);
        assert!(batch.records().iter().all(|r| r.cells != vec![Cell::from("item-3")]));
    }

    #[tokio::test]
    async fn test_fatal_discards_batch() {
        let collection = Numbers::new(10, 4).failing(2, Failure::Fatal);
        let outcome = collect(&collection, 0, &RecordingProgress::default()).await;

        assert!(matches!(outcome, CollectOutcome::Fatal(_)));
        assert!(outcome.into_batch().is_none());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let progress = RecordingProgress::default();
        let _ = collect(&Numbers::new(9, 2), 3, &progress).await;

        let positions = progress.positions.lock().unwrap();
        assert_eq!(positions.first(), Some(&3));
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        assert!(positions.iter().all(|&p| p <= 9));
    }
}
