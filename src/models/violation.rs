//! Analyzer findings.
//!
//! - `ViolationRecord`: one finding at a file/line/rule
//! - `AnalysisResult`: every finding for one commit plus the counts derived
//!   from them

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub rule: String,
    pub ruleset: String,
    /// Lower is more severe.
    pub priority: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalysisResult {
    pub violation_count: usize,
    pub files_with_violations: usize,
    /// Distinct rule identifiers, sorted.
    pub rules_violated: Vec<String>,
    pub violations: Vec<ViolationRecord>,
    /// Set when the analyzer exited with its processing-error code.
    #[serde(default)]
    pub partial: bool,
    /// Set when the report could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl AnalysisResult {
    pub fn from_violations(violations: Vec<ViolationRecord>) -> Self {
        let files: BTreeSet<&str> = violations.iter().map(|v| v.file.as_str()).collect();
        let rules: BTreeSet<&str> = violations.iter().map(|v| v.rule.as_str()).collect();

        Self {
            violation_count: violations.len(),
            files_with_violations: files.len(),
            rules_violated: rules.into_iter().map(str::to_string).collect(),
            violations,
            partial: false,
            parse_error: None,
        }
    }

    /// Empty result annotated with the reason the report was unreadable.
    pub fn unparseable(reason: impl Into<String>) -> Self {
        Self {
            parse_error: Some(reason.into()),
            ..Self::default()
        }
    }
}
