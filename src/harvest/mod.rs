//! Incremental, resumable harvesting of paginated remote collections into CSV files
//!
//! A harvest copies every element of an ordered remote collection into a local CSV file,
//! surviving rate limits, transient per-element failures, and process restarts without
//! producing gaps or duplicate rows.
//!
//! # Implementation Model
//!
//! Each element gets a sequence number equal to its zero-based position in the collection.
//! The number is stored in the leading `number` column of every persisted row, which makes
//! the output file its own checkpoint: [`next_sequence`] reads the last row back to decide
//! where the next pass starts.
//!
//! One pass works like this:
//! - **Resume**: find the next sequence number from the output file
//! - **Collect**: fetch elements from that position onward until the collection ends, the
//!   quota runs out, or an element cannot be resolved ([`collect`])
//! - **Normalize**: turn the fetched records into a [`Table`] and apply the [`Layout`]'s
//!   explode steps, which split list-valued cells into one row per value
//! - **Persist**: append the rows to the file, writing the header only once ([`AppendSink`])
//!
//! The [`Harvester`] ties these together and hands each pass to a [`RetryScheduler`], which
//! keeps re-running passes on a fixed interval until one reports the collection exhausted.

mod batch;
mod collector;
mod explode;
mod harvester;
mod layout;
mod progress;
mod resume;
mod scheduler;
mod sink;
mod source;
mod table;

pub use batch::{Batch, SourceRecord};
pub use collector::{CollectOutcome, collect};
pub use explode::explode;
pub use harvester::{HarvestSummary, Harvester, RATE_LIMIT_MESSAGE, element_failed_message};
pub use layout::{Layout, SEQUENCE_COLUMN, Step};
pub use progress::Progress;
pub use resume::next_sequence;
pub use scheduler::{RetryScheduler, SchedulerState, Signal};
pub use sink::AppendSink;
pub use source::{FetchError, RemoteCollection};
pub use table::{Cell, Row, Table};
