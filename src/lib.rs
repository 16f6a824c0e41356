#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Incremental harvesting of GitHub repository history into CSV files
//!
//! This library powers the repo-harvest tool, which copies a repository's commits and
//! issues into local CSV files and keeps going across API rate limits and restarts.
//!
//! # Module Organization
//!
//! - [`harvest`]: Collection, normalization, persistence, and retry scheduling
//! - [`hosting`]: GitHub REST collections
//! - `commands`: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

mod commands;
pub mod harvest;
pub mod hosting;

pub use crate::commands::{Host, run};
