//! Command-line interface and orchestration for repo-harvest
//!
//! This module implements the CLI commands and wires the GitHub collections from
//! [`crate::hosting`] into the harvesting machinery of [`crate::harvest`].
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **commits**: Harvest a repository's commits, with the files each commit touched
//! - **issues**: Harvest a repository's issues, one file per requested state
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. The harvesting commands follow the same pattern:
//!
//! 1. Initialize logging, load configuration, and build the API client (`common`)
//! 2. Pick the output layout and file from configuration and flags
//! 3. Run a harvester under a retry scheduler until the collection is exhausted
//! 4. Print a summary of what was written
//!
//! Progress is reported through an `indicatif` bar that stays hidden for short runs.

mod commits;
mod common;
mod config;
mod host;
mod init;
mod issues;
mod progress_reporter;
mod run;

pub use commits::{CommitsArgs, harvest_commits};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use issues::{IssuesArgs, harvest_issues};
pub use progress_reporter::ProgressReporter;
pub use run::run;
