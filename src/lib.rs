//! PMD History Miner - static analysis across a repository's commit history
//!
//! Checks out every commit of a git repository oldest first, runs PMD on the
//! working tree, stores a JSON artifact per commit and finally aggregates the
//! per-commit results into a repository summary.

pub mod analyzer;
pub mod builder;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod stats;

pub use error::{AppError, Result};
