//! Row normalization.
//!
//! An explosion pass turns every row holding multi-valued cells in a set of designated
//! columns into one row per index position across those columns. Columns outside the set
//! are copied into each produced row. A row whose designated cells are all empty still
//! produces exactly one row, with the designated cells set to the fill value.

use super::table::{Cell, Table};
use crate::Result;
use ohno::bail;

/// Explode `columns` of `table`, preserving row order and positional order within a row.
///
/// Sibling cells shorter than the longest designated cell of the same row are padded with
/// `fill`. The produced row count is the sum over input rows of `max(1, width)`, where
/// `width` is the longest designated cell in that row.
///
/// # Errors
///
/// Fails if a column is missing, named twice, or has already been exploded.
pub fn explode(table: Table, columns: &[&str], fill: &str) -> Result<Table> {
    if columns.is_empty() {
        return Ok(table);
    }

    let mut indices = Vec::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            bail!("column '{name}' is named more than once in a single explosion pass");
        }

        if table.is_exploded(name) {
            bail!("column '{name}' has already been exploded");
        }

        indices.push(table.require_column(name)?);
    }

    let (column_names, rows, mut exploded) = table.into_parts();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let width = indices.iter().map(|&i| row[i].len()).max().unwrap_or(0);

        if width == 0 {
            let mut filled = row;
            for &i in &indices {
                filled[i] = Cell::Scalar(fill.to_string());
            }
            out.push(filled);
            continue;
        }

        for position in 0..width {
            let mut produced = row.clone();
            for &i in &indices {
                let value = row[i].value_at(position).unwrap_or(fill);
                produced[i] = Cell::Scalar(value.to_string());
            }
            out.push(produced);
        }
    }

    exploded.extend(columns.iter().map(ToString::to_string));
    Ok(Table::from_parts(column_names, out, exploded))
}
