use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnalysisResult, CommitRecord, SourceFileSurvey};

/// Everything known about one processed commit. Persisted as
/// `commits/<hash>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub commit: CommitRecord,
    pub source_files: SourceFileSurvey,
    pub analysis: AnalysisResult,
    pub statistics: DerivedStats,
    pub processed_at: DateTime<Utc>,
}

/// Per-commit ratios and breakdowns. Every ratio is 0 when its denominator is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DerivedStats {
    pub violations_per_file: f64,
    pub violations_per_1000_lines: f64,
    pub files_with_violations_ratio: f64,
    pub average_lines_per_file: f64,
    pub violation_by_priority: BTreeMap<i64, usize>,
    pub rule_frequency: BTreeMap<String, usize>,
    pub file_violation_stats: BTreeMap<String, FileViolationStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FileViolationStats {
    pub violation_count: usize,
    pub rules: Vec<String>,
    pub unique_rules: usize,
}
