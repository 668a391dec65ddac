//! Repository-wide statistics over the processed commits.
//!
//! Input order does not matter: commits are re-sorted by timestamp, then by
//! their position in the history listing, then by hash, before anything is
//! computed. The only order-sensitive outputs are the trend slopes, which use
//! the position in that chronological order as the independent variable.
//!
//! Every mean, median, min, max, slope and ratio over an empty collection or a
//! zero denominator is 0.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::models::{
    CommitAnalysis, FileCountStats, QualityMetrics, RepositorySummary, RuleStats, TemporalTrends,
    WarningStats,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn summarize(results: &[CommitAnalysis]) -> RepositorySummary {
    if results.is_empty() {
        return RepositorySummary::default();
    }

    let mut ordered: Vec<&CommitAnalysis> = results.iter().collect();
    ordered.sort_by(|a, b| {
        (a.commit.timestamp, a.commit.sequence, &a.commit.hash).cmp(&(
            b.commit.timestamp,
            b.commit.sequence,
            &b.commit.hash,
        ))
    });

    RepositorySummary {
        commit_count: ordered.len(),
        source_files: file_count_stats(&ordered),
        warnings: warning_stats(&ordered),
        temporal_trends: temporal_trends(&ordered),
        rule_statistics: rule_statistics(&ordered),
        quality_metrics: quality_metrics(&ordered),
    }
}

fn file_count_stats(ordered: &[&CommitAnalysis]) -> FileCountStats {
    let counts: Vec<usize> = ordered.iter().map(|r| r.source_files.count).collect();
    let lines: Vec<usize> = ordered.iter().map(|r| r.source_files.total_lines).collect();

    FileCountStats {
        average_count: mean(&as_f64(&counts)),
        median_count: median(&as_f64(&counts)),
        min_count: counts.iter().copied().min().unwrap_or(0),
        max_count: counts.iter().copied().max().unwrap_or(0),
        total_commits: counts.len(),
        average_total_lines: mean(&as_f64(&lines)),
        median_total_lines: median(&as_f64(&lines)),
    }
}

fn warning_stats(ordered: &[&CommitAnalysis]) -> WarningStats {
    let counts: Vec<usize> = ordered.iter().map(|r| r.analysis.violation_count).collect();
    let files: Vec<usize> = ordered
        .iter()
        .map(|r| r.analysis.files_with_violations)
        .collect();

    let mut priority_distribution: BTreeMap<i64, usize> = BTreeMap::new();
    for violation in ordered.iter().flat_map(|r| &r.analysis.violations) {
        *priority_distribution.entry(violation.priority).or_insert(0) += 1;
    }

    WarningStats {
        average_count: mean(&as_f64(&counts)),
        median_count: median(&as_f64(&counts)),
        min_count: counts.iter().copied().min().unwrap_or(0),
        max_count: counts.iter().copied().max().unwrap_or(0),
        total_violations: counts.iter().sum(),
        average_files_with_violations: mean(&as_f64(&files)),
        priority_distribution,
    }
}

fn temporal_trends(ordered: &[&CommitAnalysis]) -> TemporalTrends {
    let files: Vec<usize> = ordered.iter().map(|r| r.source_files.count).collect();
    let warnings: Vec<usize> = ordered.iter().map(|r| r.analysis.violation_count).collect();

    let first = ordered.first().map(|r| r.commit.timestamp);
    let last = ordered.last().map(|r| r.commit.timestamp);

    let analysis_period_days = match (first, last) {
        (Some(first), Some(last)) if ordered.len() > 1 => (last - first) as f64 / SECONDS_PER_DAY,
        _ => 0.0,
    };

    TemporalTrends {
        source_files_trend: trend_slope(&as_f64(&files)),
        warnings_trend: trend_slope(&as_f64(&warnings)),
        first_commit_date: first.and_then(to_datetime),
        last_commit_date: last.and_then(to_datetime),
        analysis_period_days,
    }
}

fn rule_statistics(ordered: &[&CommitAnalysis]) -> BTreeMap<String, RuleStats> {
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    let mut commits: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for result in ordered {
        for violation in &result.analysis.violations {
            *totals.entry(violation.rule.as_str()).or_insert(0) += 1;
            commits
                .entry(violation.rule.as_str())
                .or_default()
                .insert(result.commit.hash.as_str());
        }
    }

    let commit_count = ordered.len();
    totals
        .into_iter()
        .map(|(rule, total)| {
            let stats = RuleStats {
                total_violations: total,
                commits_affected: commits.get(rule).map_or(0, BTreeSet::len),
                average_per_commit: if commit_count == 0 {
                    0.0
                } else {
                    total as f64 / commit_count as f64
                },
            };
            (rule.to_string(), stats)
        })
        .collect()
}

/// Commits with no lines (for density) or no files (for clean ratio) are left
/// out of the respective collections instead of contributing a 0.
fn quality_metrics(ordered: &[&CommitAnalysis]) -> QualityMetrics {
    let densities: Vec<f64> = ordered
        .iter()
        .filter(|r| r.source_files.total_lines > 0)
        .map(|r| r.analysis.violation_count as f64 / r.source_files.total_lines as f64 * 1000.0)
        .collect();

    let clean_ratios: Vec<f64> = ordered
        .iter()
        .filter(|r| r.source_files.count > 0)
        .map(|r| {
            let files = r.source_files.count as f64;
            let dirty = r.analysis.files_with_violations as f64;
            (files - dirty) / files
        })
        .collect();

    QualityMetrics {
        average_violation_density: mean(&densities),
        median_violation_density: median(&densities),
        average_clean_file_ratio: mean(&clean_ratios),
        median_clean_file_ratio: median(&clean_ratios),
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Ordinary least-squares slope of `values` against their 0-based index.
pub fn trend_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (numerator, denominator) =
        values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, &y)| {
                let dx = i as f64 - x_mean;
                (num + dx * (y - y_mean), den + dx * dx)
            });

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn as_f64(values: &[usize]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_commit_analysis;
    use crate::models::{
        AnalysisResult, AuthorInfo, ChangeStats, CommitRecord, SourceFile, SourceFileSurvey,
        ViolationRecord,
    };
    use pretty_assertions::assert_eq;

    fn commit(hash: &str, timestamp: i64) -> CommitRecord {
        let author = AuthorInfo {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
        };
        CommitRecord {
            hash: hash.to_string(),
            short_hash: CommitRecord::short(hash),
            author: author.clone(),
            committer: author,
            date: DateTime::from_timestamp(timestamp, 0).unwrap(),
            timestamp,
            sequence: 0,
            message: format!("commit {hash}"),
            stats: ChangeStats::default(),
        }
    }

    /// `files` source files of 10 lines each; `rules` one violation each,
    /// spread over the first files.
    fn analysis(hash: &str, timestamp: i64, files: usize, rules: &[&str]) -> CommitAnalysis {
        let survey = SourceFileSurvey::from_files(
            (0..files)
                .map(|i| SourceFile {
                    path: format!("F{i}.java"),
                    lines: 10,
                })
                .collect(),
        );
        let violations = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| ViolationRecord {
                file: format!("F{}.java", i % files.max(1)),
                line: 1,
                column: 1,
                end_line: 1,
                end_column: 2,
                rule: rule.to_string(),
                ruleset: "Design".to_string(),
                priority: (i % 3) as i64 + 1,
                message: String::new(),
            })
            .collect();
        build_commit_analysis(
            commit(hash, timestamp),
            survey,
            AnalysisResult::from_violations(violations),
            DateTime::from_timestamp(0, 0).unwrap(),
        )
    }

    fn with_counts(hash: &str, timestamp: i64, files: usize, violations: usize) -> CommitAnalysis {
        let rules: Vec<&str> = std::iter::repeat_n("Rule", violations).collect();
        analysis(hash, timestamp, files, &rules)
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary, RepositorySummary::default());
        assert_eq!(summary.warnings.average_count, 0.0);
        assert_eq!(summary.source_files.median_count, 0.0);
        assert_eq!(summary.temporal_trends.warnings_trend, 0.0);
        assert!(summary.temporal_trends.first_commit_date.is_none());
    }

    #[test]
    fn helpers_default_to_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(trend_slope(&[]), 0.0);
        assert_eq!(trend_slope(&[42.0]), 0.0);
    }

    #[test]
    fn median_of_even_length_averages_middle() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0, 0.0, 10.0]), 5.0);
    }

    #[test]
    fn slope_of_unit_increments_is_one() {
        let slope = trend_slope(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!((slope - 1.0).abs() < 1e-12);
    }

    #[test]
    fn slope_of_constant_series_is_zero() {
        assert_eq!(trend_slope(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn three_commit_scenario() {
        let results = vec![
            with_counts("a", 100, 10, 5),
            with_counts("b", 200, 12, 0),
            with_counts("c", 300, 12, 10),
        ];

        let summary = summarize(&results);

        assert_eq!(summary.commit_count, 3);
        assert_eq!(summary.warnings.average_count, 5.0);
        assert_eq!(summary.warnings.median_count, 5.0);
        assert_eq!(summary.warnings.min_count, 0);
        assert_eq!(summary.warnings.max_count, 10);
        assert_eq!(summary.warnings.total_violations, 15);
        assert_eq!(summary.source_files.min_count, 10);
        assert_eq!(summary.source_files.max_count, 12);
        assert_eq!(summary.source_files.median_count, 12.0);
        assert!((summary.temporal_trends.source_files_trend - 1.0).abs() < 1e-12);
        assert!((summary.temporal_trends.warnings_trend - 2.5).abs() < 1e-12);
    }

    #[test]
    fn permutation_does_not_change_summary() {
        let chronological = vec![
            analysis("a", 10, 3, &["X", "Y"]),
            analysis("b", 20, 4, &["X"]),
            analysis("c", 30, 0, &[]),
            analysis("d", 40, 5, &["Y", "Y", "Z"]),
        ];
        let shuffled = vec![
            chronological[2].clone(),
            chronological[0].clone(),
            chronological[3].clone(),
            chronological[1].clone(),
        ];

        assert_eq!(summarize(&shuffled), summarize(&chronological));
    }

    fn at(mut result: CommitAnalysis, sequence: usize) -> CommitAnalysis {
        result.commit.sequence = sequence;
        result
    }

    #[test]
    fn tied_timestamps_follow_listing_position() {
        let a = at(with_counts("a", 10, 1, 0), 0);
        let b = at(with_counts("b", 20, 1, 0), 1);
        let c = at(with_counts("c", 20, 1, 9), 2);

        let listed = summarize(&[a.clone(), b.clone(), c.clone()]);
        let permuted = summarize(&[a.clone(), c.clone(), b.clone()]);
        let reversed = summarize(&[c, b, a]);

        assert!((listed.temporal_trends.warnings_trend - 4.5).abs() < 1e-12);
        assert_eq!(permuted, listed);
        assert_eq!(reversed, listed);
    }

    #[test]
    fn listing_position_outranks_hash_on_ties() {
        let a = at(with_counts("a", 10, 1, 0), 0);
        let b = at(with_counts("b", 20, 1, 0), 2);
        let c = at(with_counts("c", 20, 1, 9), 1);

        let summary = summarize(&[a.clone(), b.clone(), c.clone()]);

        // a, c, b: warnings 0, 9, 0
        assert_eq!(summary.temporal_trends.warnings_trend, 0.0);
        assert_eq!(summarize(&[b, c, a]), summary);
    }

    #[test]
    fn tied_records_without_position_fall_back_to_hash() {
        let first = summarize(&[with_counts("y", 5, 1, 3), with_counts("x", 5, 1, 0)]);
        let second = summarize(&[with_counts("x", 5, 1, 0), with_counts("y", 5, 1, 3)]);

        assert_eq!(first, second);
        assert!((first.temporal_trends.warnings_trend - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rule_statistics_count_commits_and_average_over_all() {
        let results = vec![
            analysis("a", 1, 2, &["X", "X", "Y"]),
            analysis("b", 2, 2, &["X"]),
            analysis("c", 3, 2, &[]),
            analysis("d", 4, 2, &[]),
        ];

        let rules = summarize(&results).rule_statistics;

        assert_eq!(
            rules["X"],
            RuleStats {
                total_violations: 3,
                commits_affected: 2,
                average_per_commit: 0.75,
            }
        );
        assert_eq!(rules["Y"].commits_affected, 1);
        assert_eq!(rules["Y"].average_per_commit, 0.25);
    }

    #[test]
    fn quality_metrics_exclude_empty_commits() {
        // 100 lines / 10 files each; the empty commit must not drag the means to 0.
        let results = vec![
            with_counts("a", 1, 10, 2),
            with_counts("b", 2, 0, 0),
            with_counts("c", 3, 10, 4),
        ];

        let quality = summarize(&results).quality_metrics;

        assert!((quality.average_violation_density - 30.0).abs() < 1e-9);
        assert!((quality.median_violation_density - 30.0).abs() < 1e-9);
        // "a": 2 violations on F0,F1 -> 8/10 clean; "c": F0..F3 -> 6/10 clean.
        assert!((quality.average_clean_file_ratio - 0.7).abs() < 1e-9);
    }

    #[test]
    fn priority_distribution_spans_all_commits() {
        let results = vec![
            analysis("a", 1, 3, &["A", "B", "C"]),
            analysis("b", 2, 3, &["A"]),
        ];

        let warnings = summarize(&results).warnings;

        assert_eq!(
            warnings.priority_distribution,
            BTreeMap::from([(1, 2), (2, 1), (3, 1)])
        );
    }

    #[test]
    fn period_and_dates_follow_chronology() {
        let results = vec![
            with_counts("late", 3 * 86_400, 1, 0),
            with_counts("early", 86_400, 1, 0),
        ];

        let trends = summarize(&results).temporal_trends;

        assert_eq!(trends.analysis_period_days, 2.0);
        assert_eq!(trends.first_commit_date.map(|d| d.timestamp()), Some(86_400));
        assert_eq!(trends.last_commit_date.map(|d| d.timestamp()), Some(3 * 86_400));
    }

    #[test]
    fn summary_survives_json() {
        let results = vec![analysis("a", 5, 2, &["X"]), analysis("b", 9, 1, &["Y", "Y"])];
        let summary = summarize(&results);

        let json = serde_json::to_string(&summary).unwrap();
        let restored: RepositorySummary = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, summary);
    }
}
