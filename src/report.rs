//! Summary rendering.
//!
//! Turns a `RepositorySummary` plus the repository location into the
//! persisted `summary.json` document, including the line-oriented
//! `formatted_summary` text.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{RepositoryInfo, RepositorySummary, SummaryReport};

pub fn format_summary(
    location: &str,
    summary: &RepositorySummary,
    analyzed_at: DateTime<Utc>,
) -> SummaryReport {
    let warning_statistics: BTreeMap<String, usize> = summary
        .rule_statistics
        .iter()
        .map(|(rule, stats)| (rule.clone(), stats.total_violations))
        .collect();

    let formatted_summary = formatted_text(location, summary, &warning_statistics);

    SummaryReport {
        repository: RepositoryInfo {
            location: location.to_string(),
            analyzed_at,
            commit_count: summary.commit_count,
        },
        source_files: summary.source_files.clone(),
        warnings: summary.warnings.clone(),
        temporal_trends: summary.temporal_trends.clone(),
        rule_statistics: summary.rule_statistics.clone(),
        quality_metrics: summary.quality_metrics.clone(),
        warning_statistics,
        formatted_summary,
    }
}

fn formatted_text(
    location: &str,
    summary: &RepositorySummary,
    warning_statistics: &BTreeMap<String, usize>,
) -> String {
    // A BTreeMap<String, usize> always serializes.
    let breakdown = serde_json::to_string(warning_statistics).unwrap_or_else(|_| "{}".to_string());
    let location = serde_json::to_string(location).unwrap_or_else(|_| format!("\"{location}\""));

    [
        format!("\"location\": {location}"),
        format!("\"commit_count\": {}", summary.commit_count),
        format!(
            "\"average_source_files\": {:.1}",
            summary.source_files.average_count
        ),
        format!("\"average_warnings\": {:.1}", summary.warnings.average_count),
        format!("\"warning_statistics\": {breakdown}"),
    ]
    .join("\n")
}
