//! Application error types.
//!
//! Defines `AppError` for every failure the miner can hit and splits them
//! into two groups:
//! - setup errors (`RepoNotFound`, `AnalyzerUnavailable`, `RuntimeMissing`,
//!   `Config`) stop the run before any commit is processed
//! - everything else is recovered by the pipeline loop, which records the
//!   commit as skipped and moves on

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Analyzer unavailable: {0}")]
    AnalyzerUnavailable(String),

    #[error("Required runtime missing: {0}")]
    RuntimeMissing(String),

    #[error("Analyzer failed with exit code {code}: {detail}")]
    AnalyzerFailed { code: i32, detail: String },

    #[error("Analyzer timed out after {}s", .0.as_secs())]
    AnalyzerTimeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error belongs to the setup phase and must abort the run.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            AppError::RepoNotFound(_)
                | AppError::AnalyzerUnavailable(_)
                | AppError::RuntimeMissing(_)
                | AppError::Config(_)
        )
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
