use super::table::Table;
use crate::Result;
use ohno::IntoAppError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "      sink";

/// Appends rows to a CSV file with a fixed column order.
///
/// The header row is written only when the file is created; later writes append data rows.
/// Existing rows are never rewritten.
#[derive(Debug, Clone)]
pub struct AppendSink {
    path: PathBuf,
    columns: Vec<String>,
}

impl AppendSink {
    pub fn new(path: impl Into<PathBuf>, columns: &[&str]) -> Self {
        Self {
            path: path.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the destination holds at least a header row. Checked on every write, since the
    /// file may be removed between retries.
    fn is_initialized(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.len() > 0)
    }

    /// Append the rows of `table`, returning how many were written.
    ///
    /// An empty table leaves the destination untouched.
    ///
    /// # Errors
    ///
    /// Fails if the table lacks one of the sink's columns or the file cannot be written.
    pub fn append(&mut self, table: &Table) -> Result<usize> {
        if table.is_empty() {
            return Ok(0);
        }

        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let rows = table.project(&columns)?;
        let write_header = !self.is_initialized();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{}'", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .into_app_err_with(|| format!("opening '{}' for append", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if write_header {
            writer.write_record(&self.columns)?;
        }

        for row in &rows {
            writer.write_record(row)?;
        }

        writer.flush().into_app_err_with(|| format!("flushing '{}'", self.path.display()))?;

        log::debug!(
            target: LOG_TARGET,
            "Appended {} row(s) to '{}'{}",
            rows.len(),
            self.path.display(),
            if write_header { " (new file)" } else { "" }
        );

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::table::Cell;

    fn table(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::new(["number", "sha", "extra"]);
        for (n, sha) in rows {
            table.push(vec![Cell::from(*n), Cell::from(*sha), Cell::from("ignored")]).unwrap();
        }
        table
    }

    #[test]
    fn test_first_write_has_header_later_writes_do_not() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let mut sink = AppendSink::new(&path, &["number", "sha"]);

        assert_eq!(sink.append(&table(&[("0", "a"), ("1", "b")])).unwrap(), 2);
        assert_eq!(sink.append(&table(&[("2", "c")])).unwrap(), 1);

        assert_eq!(fs::read_to_string(&path).unwrap(), "number,sha\n0,a\n1,b\n2,c\n");
    }

    #[test]
    fn test_existing_file_is_appended_without_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        fs::write(&path, "number,sha\n0,a\n").unwrap();

        let mut sink = AppendSink::new(&path, &["number", "sha"]);
        let _ = sink.append(&table(&[("1", "b")])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "number,sha\n0,a\n1,b\n");
    }

    #[test]
    fn test_zero_length_file_gets_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        fs::write(&path, "").unwrap();

        let mut sink = AppendSink::new(&path, &["number", "sha"]);
        let _ = sink.append(&table(&[("0", "a")])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "number,sha\n0,a\n");
    }

    #[test]
    fn test_removed_file_gets_header_again() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let mut sink = AppendSink::new(&path, &["number", "sha"]);

        let _ = sink.append(&table(&[("0", "a")])).unwrap();
        fs::remove_file(&path).unwrap();
        let _ = sink.append(&table(&[("1", "b")])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "number,sha\n1,b\n");
        assert_eq!(crate::harvest::next_sequence(&path), 2);
    }

    #[test]
    fn test_empty_table_does_not_create_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let mut sink = AppendSink::new(&path, &["number", "sha"]);

        assert_eq!(sink.append(&table(&[])).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_column_fails_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let mut sink = AppendSink::new(&path, &["number", "files"]);

        assert!(sink.append(&table(&[("0", "a")])).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("dir").join("out.csv");
        let mut sink = AppendSink::new(&path, &["number"]);

        let _ = sink.append(&table(&[("0", "a")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "number\n0\n");
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let mut sink = AppendSink::new(&path, &["number", "sha"]);

        let _ = sink.append(&table(&[("0", "a,b")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "number,sha\n0,\"a,b\"\n");
    }
}
