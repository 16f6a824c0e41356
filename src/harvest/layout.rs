//! Column layouts for the record kinds the harvester knows how to persist.

use super::batch::Batch;
use super::explode::explode;
use super::table::{Cell, Table};
use crate::Result;

pub const SEQUENCE_COLUMN: &str = "number";

const COMMIT_COLUMNS: &[&str] = &["number", "sha", "author_id", "author_name", "date", "files", "files_sha"];

const ISSUE_COLUMNS: &[&str] = &[
    "number",
    "id",
    "state",
    "assignee",
    "user",
    "tags",
    "created_at",
    "updated_at",
    "closed_at",
];

const ISSUE_EVENT_COLUMNS: &[&str] = &["number", "id", "state", "assignee", "user", "tags", "time", "activity"];

/// Lifecycle events derived from an issue's timestamps, paired with the column they come from.
const LIFECYCLE_EVENTS: [(&str, &str); 3] = [
    ("open_issue", "created_at"),
    ("change_issue", "updated_at"),
    ("close_issue", "closed_at"),
];

/// A transformation applied to a normalized table, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Explode a set of positionally aligned columns together.
    Explode(Vec<&'static str>),

    /// Derive `activity`/`time` pairs from the lifecycle timestamps and explode them.
    LifecycleEvents,
}

/// How the records of one kind are shaped into persisted rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    record_columns: &'static [&'static str],
    steps: Vec<Step>,
    output_columns: &'static [&'static str],
    fill: String,
}

impl Layout {
    /// Layout for commits, optionally one row per changed file.
    #[must_use]
    pub fn commits(explode_files: bool, fill: impl Into<String>) -> Self {
        let steps = if explode_files {
            vec![Step::Explode(vec!["files", "files_sha"])]
        } else {
            Vec::new()
        };

        Self {
            record_columns: COMMIT_COLUMNS,
            steps,
            output_columns: COMMIT_COLUMNS,
            fill: fill.into(),
        }
    }

    /// Layout for issues with independent label, assignee and lifecycle explosions.
    #[must_use]
    pub fn issues(explode_tags: bool, explode_assignee: bool, explode_time: bool, fill: impl Into<String>) -> Self {
        let mut steps = Vec::new();
        if explode_tags {
            steps.push(Step::Explode(vec!["tags"]));
        }
        if explode_assignee {
            steps.push(Step::Explode(vec!["assignee"]));
        }
        if explode_time {
            steps.push(Step::LifecycleEvents);
        }

        Self {
            record_columns: ISSUE_COLUMNS,
            steps,
            output_columns: if explode_time { ISSUE_EVENT_COLUMNS } else { ISSUE_COLUMNS },
            fill: fill.into(),
        }
    }

    /// Columns each source record provides, the leading sequence column included.
    #[must_use]
    pub const fn record_columns(&self) -> &'static [&'static str] {
        self.record_columns
    }

    /// Columns written to disk, in order.
    #[must_use]
    pub const fn output_columns(&self) -> &'static [&'static str] {
        self.output_columns
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Turn a batch into the table that gets persisted.
    pub fn normalize(&self, batch: Batch) -> Result<Table> {
        let mut table = batch.into_table(self.record_columns)?;

        for step in &self.steps {
            table = match step {
                Step::Explode(columns) => explode(table, columns, &self.fill)?,
                Step::LifecycleEvents => {
                    let sources = LIFECYCLE_EVENTS
                        .iter()
                        .map(|(_, column)| table.require_column(column))
                        .collect::<Result<Vec<_>>>()?;

                    table.add_column("activity", |_, _| {
                        Cell::List(LIFECYCLE_EVENTS.iter().map(|(event, _)| (*event).to_string()).collect())
                    })?;
                    table.add_column("time", |_, row| Cell::List(sources.iter().map(|&i| row[i].render()).collect()))?;

                    explode(table, &["time", "activity"], &self.fill)?
                }
            };
        }

        Ok(table)
    }
}
