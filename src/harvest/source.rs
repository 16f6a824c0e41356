use super::table::Cell;
use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};

/// Why reading from a remote collection stopped.
#[derive(Debug)]
pub enum FetchError {
    /// The remote quota is exhausted; `reset_at` is when it replenishes, if known.
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// One element's nested data could not be retrieved.
    Element(ohno::AppError),

    /// Anything else. The run is aborted.
    Fatal(ohno::AppError),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RateLimited { reset_at: Some(at) } => write!(f, "rate limited until {at}"),
            Self::RateLimited { reset_at: None } => write!(f, "rate limited"),
            Self::Element(e) => write!(f, "could not fetch element: {e:#}"),
            Self::Fatal(e) => write!(f, "{e:#}"),
        }
    }
}

/// An ordered, paginated remote collection whose elements can be addressed by index.
///
/// Element `i` lives on page `i / page_size()` at offset `i % page_size()`. Every page but the
/// last holds exactly `page_size()` elements.
#[expect(async_fn_in_trait, reason = "collections are driven from a single task and never boxed")]
pub trait RemoteCollection {
    type Element;

    /// Number of elements per page.
    fn page_size(&self) -> u64;

    /// Total number of elements currently in the collection.
    async fn total_count(&self) -> Result<u64, FetchError>;

    /// Elements on the zero-based page `index`. An empty page marks the end of the collection.
    async fn page(&self, index: u64) -> Result<Vec<Self::Element>, FetchError>;

    /// Resolve an element into record cells, fetching any nested sub-resources.
    ///
    /// The cells follow the layout's record columns, sequence column excluded.
    async fn expand(&self, element: Self::Element) -> Result<Vec<Cell>, FetchError>;
}
