use crate::Result;
use ohno::{IntoAppError, bail};

/// A single value in a table.
///
/// Multi-valued fields start out as [`Cell::List`] and become [`Cell::Scalar`] once a column
/// has been exploded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Scalar(String),
    List(Vec<String>),
}

impl Cell {
    /// Number of values held by this cell when treated as a multi-valued field.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(values) => values.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `index`, or `None` if this cell has fewer values.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&str> {
        match self {
            Self::Scalar(s) if index == 0 => Some(s),
            Self::Scalar(_) => None,
            Self::List(values) => values.get(index).map(String::as_str),
        }
    }

    /// Render the cell as a single CSV field.
    ///
    /// Lists that were never exploded are written as JSON arrays.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(values) => serde_json::to_string(values).unwrap_or_default(),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for Cell {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

pub type Row = Vec<Cell>;

/// An ordered collection of rows sharing a set of named columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    exploded: Vec<String>,
}

impl Table {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            exploded: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Fails if the row width does not match the number of columns.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!("row has {} cells but the table has {} columns", row.len(), self.columns.len());
        }

        self.rows.push(row);
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a column, failing with a descriptive error when it is missing.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .into_app_err_with(|| format!("column '{name}' is not present in [{}]", self.columns.join(", ")))
    }

    /// Append a column whose value is computed from each existing row.
    pub fn add_column(&mut self, name: impl Into<String>, mut f: impl FnMut(&Self, &Row) -> Cell) -> Result<()> {
        let name = name.into();
        if self.column_index(&name).is_some() {
            bail!("column '{name}' already exists");
        }

        let values: Vec<Cell> = self.rows.iter().map(|row| f(self, row)).collect();
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }

        self.columns.push(name);
        Ok(())
    }

    /// Whether the named column has already been through an explosion pass.
    #[must_use]
    pub fn is_exploded(&self, name: &str) -> bool {
        self.exploded.iter().any(|c| c == name)
    }

    pub(super) fn mark_exploded(&mut self, name: &str) {
        self.exploded.push(name.to_string());
    }

    pub(super) fn into_parts(self) -> (Vec<String>, Vec<Row>, Vec<String>) {
        (self.columns, self.rows, self.exploded)
    }

    pub(super) const fn from_parts(columns: Vec<String>, rows: Vec<Row>, exploded: Vec<String>) -> Self {
        Self { columns, rows, exploded }
    }

    /// Render every row as strings, ordered by `columns`.
    ///
    /// # Errors
    ///
    /// Fails if any requested column is missing from the table.
    pub fn project(&self, columns: &[&str]) -> Result<Vec<Vec<String>>> {
        let indices = columns.iter().map(|c| self.require_column(c)).collect::<Result<Vec<_>>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].render()).collect())
            .collect())
    }
}
