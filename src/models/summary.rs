use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository-wide statistics over every processed commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RepositorySummary {
    pub commit_count: usize,
    pub source_files: FileCountStats,
    pub warnings: WarningStats,
    pub temporal_trends: TemporalTrends,
    pub rule_statistics: BTreeMap<String, RuleStats>,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileCountStats {
    pub average_count: f64,
    pub median_count: f64,
    pub min_count: usize,
    pub max_count: usize,
    pub total_commits: usize,
    pub average_total_lines: f64,
    pub median_total_lines: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WarningStats {
    pub average_count: f64,
    pub median_count: f64,
    pub min_count: usize,
    pub max_count: usize,
    pub total_violations: usize,
    pub average_files_with_violations: f64,
    pub priority_distribution: BTreeMap<i64, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TemporalTrends {
    /// OLS slope of source file count over commit index.
    pub source_files_trend: f64,
    /// OLS slope of violation count over commit index.
    pub warnings_trend: f64,
    pub first_commit_date: Option<DateTime<Utc>>,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub analysis_period_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleStats {
    pub total_violations: usize,
    pub commits_affected: usize,
    pub average_per_commit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityMetrics {
    pub average_violation_density: f64,
    pub median_violation_density: f64,
    pub average_clean_file_ratio: f64,
    pub median_clean_file_ratio: f64,
}

/// The persisted `summary.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub repository: RepositoryInfo,
    pub source_files: FileCountStats,
    pub warnings: WarningStats,
    pub temporal_trends: TemporalTrends,
    pub rule_statistics: BTreeMap<String, RuleStats>,
    pub quality_metrics: QualityMetrics,
    /// Rule name to total violations.
    pub warning_statistics: BTreeMap<String, usize>,
    pub formatted_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub location: String,
    pub analyzed_at: DateTime<Utc>,
    pub commit_count: usize,
}
