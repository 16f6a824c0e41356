use super::table::{Cell, Row, Table};
use crate::Result;
use ohno::bail;

/// One element fetched from a remote collection, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub sequence: u64,
    pub cells: Vec<Cell>,
}

impl SourceRecord {
    #[must_use]
    pub const fn new(sequence: u64, cells: Vec<Cell>) -> Self {
        Self { sequence, cells }
    }
}

/// Records gathered during one collector invocation, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    records: Vec<SourceRecord>,
}

impl Batch {
    #[must_use]
    pub const fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Append a record.
    ///
    /// Sequence numbers must be strictly increasing within a batch.
    ///
    /// # Errors
    ///
    /// Fails if `record` does not follow the last record's sequence number.
    pub fn push(&mut self, record: SourceRecord) -> Result<()> {
        if let Some(last) = self.records.last()
            && record.sequence <= last.sequence
        {
            bail!("sequence number {} does not follow {}", record.sequence, last.sequence);
        }

        self.records.push(record);
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn last_sequence(&self) -> Option<u64> {
        self.records.last().map(|r| r.sequence)
    }

    /// Lay the batch out as a table whose first column carries the sequence number.
    ///
    /// `columns` names every column including the leading sequence column.
    ///
    /// # Errors
    ///
    /// Fails if a record does not carry one cell per remaining column.
    pub fn into_table(self, columns: &[&str]) -> Result<Table> {
        let mut table = Table::new(columns.iter().copied());
        for record in self.records {
            let mut row: Row = Vec::with_capacity(columns.len());
            row.push(Cell::Scalar(record.sequence.to_string()));
            row.extend(record.cells);
            table.push(row)?;
        }

        Ok(table)
    }
}
