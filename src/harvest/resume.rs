use super::layout::SEQUENCE_COLUMN;
use crate::Result;
use ohno::{IntoAppError, app_err};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

const LOG_TARGET: &str = "    resume";

/// The next sequence number to fetch for the output at `path`.
///
/// Returns one past the sequence number of the last persisted row, or 0 when the file does
/// not exist, holds no rows, or cannot be read.
#[must_use]
pub fn next_sequence(path: impl AsRef<Path>) -> u64 {
    let path = path.as_ref();

    match last_sequence(path) {
        Ok(Some(last)) => {
            log::debug!(target: LOG_TARGET, "Resuming '{}' after sequence number {last}", path.display());
            last + 1
        }
        Ok(None) => {
            log::debug!(target: LOG_TARGET, "No prior rows in '{}', starting from the beginning", path.display());
            0
        }
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not read prior output '{}', starting from the beginning: {e:#}", path.display());
            0
        }
    }
}

/// The highest sequence number persisted in `path`, if any.
///
/// Rows are appended in sequence order, so this is the last row's value.
fn last_sequence(path: &Path) -> Result<Option<u64>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).into_app_err_with(|| format!("opening '{}'", path.display())),
    };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let headers = match reader.headers() {
        Ok(headers) if headers.is_empty() => return Ok(None),
        Ok(headers) => headers.clone(),
        Err(e) => return Err(e).into_app_err("reading header row"),
    };

    let column = headers
        .iter()
        .position(|h| h == SEQUENCE_COLUMN)
        .into_app_err_with(|| format!("no '{SEQUENCE_COLUMN}' column in header row"))?;

    let mut last = None;
    for (line, record) in reader.records().enumerate() {
        let record = record.into_app_err_with(|| format!("reading data row {}", line + 1))?;
        let value = record
            .get(column)
            .ok_or_else(|| app_err!("data row {} has no '{SEQUENCE_COLUMN}' value", line + 1))?;
        let sequence = value
            .trim()
            .parse::<u64>()
            .into_app_err_with(|| format!("data row {} has a malformed sequence number '{value}'", line + 1))?;

        last = Some(last.map_or(sequence, |prev: u64| prev.max(sequence)));
    }

    Ok(last)
}
