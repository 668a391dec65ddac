//! Static analyzer invocation.
//!
//! - `pmd`: locating a PMD installation and running it as a child process
//! - `report`: parsing PMD's XML report into an `AnalysisResult`
//!
//! The exit-code contract of the wrapped tool lives in one table,
//! `ExitOutcome::from_code`, and `resolve_outcome` is the only place that
//! turns a finished invocation into a result or an error.

pub mod pmd;
pub mod report;

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::AnalysisResult;

pub use pmd::{PmdInstallation, PmdOptions, PmdRunner};

/// Runs a static analyzer over a working tree.
pub trait Analyzer {
    fn run(&self, tree: &Path, ruleset: &Path) -> Result<AnalysisResult>;
}

/// How an analyzer exit code is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// No violations.
    Clean,
    /// Violations were reported; a normal result.
    ViolationsFound,
    /// Some files failed to process; the report may be partial.
    ProcessingErrors,
    /// The invocation itself failed.
    Fatal,
}

impl ExitOutcome {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => ExitOutcome::Clean,
            Some(1..=4) => ExitOutcome::ViolationsFound,
            Some(5) => ExitOutcome::ProcessingErrors,
            _ => ExitOutcome::Fatal,
        }
    }
}

/// Finished invocation as seen by `resolve_outcome`.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub code: Option<i32>,
    /// Report contents; `None` when no report file was written.
    pub report: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

pub fn resolve_outcome(invocation: Invocation, tree: &Path) -> Result<AnalysisResult> {
    match ExitOutcome::from_code(invocation.code) {
        ExitOutcome::Fatal => {
            let mut detail = invocation.stderr.trim().to_string();
            if !invocation.stdout.trim().is_empty() {
                if !detail.is_empty() {
                    detail.push('\n');
                }
                detail.push_str(invocation.stdout.trim());
            }
            Err(AppError::AnalyzerFailed {
                code: invocation.code.unwrap_or(-1),
                detail,
            })
        }
        ExitOutcome::ProcessingErrors => {
            tracing::warn!("Analyzer reported processing errors; continuing with partial results");
            if !invocation.stderr.is_empty() {
                tracing::debug!("Analyzer stderr: {}", invocation.stderr);
            }
            let mut result = parse_optional(invocation.report.as_deref(), tree);
            result.partial = true;
            Ok(result)
        }
        ExitOutcome::Clean | ExitOutcome::ViolationsFound => {
            Ok(parse_optional(invocation.report.as_deref(), tree))
        }
    }
}

fn parse_optional(report: Option<&str>, tree: &Path) -> AnalysisResult {
    match report {
        Some(xml) if !xml.trim().is_empty() => report::parse_report(xml, tree),
        _ => AnalysisResult::default(),
    }
}
