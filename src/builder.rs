//! Per-commit result assembly.
//!
//! Combines a commit's metadata, its source file survey and the analyzer
//! output into a `CommitAnalysis`, computing the derived ratios on the way.
//! All ratios resolve to 0 when their denominator is 0.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::models::{
    AnalysisResult, CommitAnalysis, CommitRecord, DerivedStats, FileViolationStats,
    SourceFileSurvey,
};

/// Build the immutable per-commit record.
pub fn build_commit_analysis(
    commit: CommitRecord,
    survey: SourceFileSurvey,
    analysis: AnalysisResult,
    processed_at: DateTime<Utc>,
) -> CommitAnalysis {
    tracing::debug!("Building result for commit {}", commit.short_hash);
    let statistics = derive_stats(&survey, &analysis);

    CommitAnalysis {
        commit,
        source_files: survey,
        analysis,
        statistics,
        processed_at,
    }
}

pub fn derive_stats(survey: &SourceFileSurvey, analysis: &AnalysisResult) -> DerivedStats {
    let file_count = survey.count;
    let total_lines = survey.total_lines;
    let violations = analysis.violation_count;

    let mut violation_by_priority: BTreeMap<i64, usize> = BTreeMap::new();
    let mut rule_frequency: BTreeMap<String, usize> = BTreeMap::new();
    let mut per_file: BTreeMap<String, (usize, BTreeSet<String>)> = BTreeMap::new();

    for violation in &analysis.violations {
        *violation_by_priority.entry(violation.priority).or_insert(0) += 1;
        *rule_frequency.entry(violation.rule.clone()).or_insert(0) += 1;

        let (count, rules) = per_file.entry(violation.file.clone()).or_default();
        *count += 1;
        rules.insert(violation.rule.clone());
    }

    let file_violation_stats = per_file
        .into_iter()
        .map(|(file, (violation_count, rules))| {
            let rules: Vec<String> = rules.into_iter().collect();
            let stats = FileViolationStats {
                violation_count,
                unique_rules: rules.len(),
                rules,
            };
            (file, stats)
        })
        .collect();

    DerivedStats {
        violations_per_file: ratio(violations, file_count),
        violations_per_1000_lines: ratio(violations * 1000, total_lines),
        files_with_violations_ratio: ratio(analysis.files_with_violations, file_count),
        average_lines_per_file: ratio(total_lines, file_count),
        violation_by_priority,
        rule_frequency,
        file_violation_stats,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorInfo, ChangeStats, SourceFile, ViolationRecord};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn commit() -> CommitRecord {
        let date = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        CommitRecord {
            hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
            short_hash: "01234567".to_string(),
            author: AuthorInfo {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            committer: AuthorInfo {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            date,
            timestamp: date.timestamp(),
            sequence: 0,
            message: "Add parser".to_string(),
            stats: ChangeStats {
                files_changed: 1,
                insertions: 100,
                deletions: 0,
            },
        }
    }

    fn violation(file: &str, rule: &str, priority: i64) -> ViolationRecord {
        ViolationRecord {
            file: file.to_string(),
            line: 3,
            column: 5,
            end_line: 3,
            end_column: 20,
            rule: rule.to_string(),
            ruleset: "Code Style".to_string(),
            priority,
            message: "message".to_string(),
        }
    }

    #[test]
    fn single_file_single_violation() {
        let survey = SourceFileSurvey::from_files(vec![SourceFile {
            path: "src/Main.java".to_string(),
            lines: 100,
        }]);
        let analysis =
            AnalysisResult::from_violations(vec![violation("src/Main.java", "UnusedImport", 3)]);

        let result = build_commit_analysis(commit(), survey, analysis, Utc::now());

        assert_eq!(result.statistics.violations_per_1000_lines, 10.0);
        assert_eq!(result.statistics.violations_per_file, 1.0);
        assert_eq!(result.statistics.files_with_violations_ratio, 1.0);
        assert_eq!(result.statistics.average_lines_per_file, 100.0);
        assert_eq!(
            result.statistics.violation_by_priority,
            BTreeMap::from([(3, 1)])
        );
    }

    #[test]
    fn empty_survey_yields_zero_ratios() {
        let analysis = AnalysisResult::from_violations(vec![violation("Gone.java", "X", 1)]);
        let stats = derive_stats(&SourceFileSurvey::default(), &analysis);

        assert_eq!(stats.violations_per_file, 0.0);
        assert_eq!(stats.violations_per_1000_lines, 0.0);
        assert_eq!(stats.files_with_violations_ratio, 0.0);
        assert_eq!(stats.average_lines_per_file, 0.0);
        assert_eq!(stats.rule_frequency, BTreeMap::from([("X".to_string(), 1)]));
    }

    #[test]
    fn groups_by_rule_and_file() {
        let survey = SourceFileSurvey::from_files(vec![
            SourceFile {
                path: "A.java".to_string(),
                lines: 40,
            },
            SourceFile {
                path: "B.java".to_string(),
                lines: 60,
            },
            SourceFile {
                path: "C.java".to_string(),
                lines: 100,
            },
        ]);
        let analysis = AnalysisResult::from_violations(vec![
            violation("A.java", "SystemPrintln", 2),
            violation("A.java", "SystemPrintln", 2),
            violation("A.java", "UnusedPrivateField", 3),
            violation("B.java", "SystemPrintln", 2),
        ]);

        let stats = derive_stats(&survey, &analysis);

        assert_eq!(stats.files_with_violations_ratio, 2.0 / 3.0);
        assert_eq!(stats.violations_per_1000_lines, 20.0);
        assert_eq!(
            stats.rule_frequency,
            BTreeMap::from([
                ("SystemPrintln".to_string(), 3),
                ("UnusedPrivateField".to_string(), 1),
            ])
        );
        assert_eq!(stats.violation_by_priority, BTreeMap::from([(2, 3), (3, 1)]));

        let a = &stats.file_violation_stats["A.java"];
        assert_eq!(a.violation_count, 3);
        assert_eq!(a.unique_rules, 2);
        assert_eq!(
            a.rules,
            vec!["SystemPrintln".to_string(), "UnusedPrivateField".to_string()]
        );
    }

    #[test]
    fn commit_analysis_survives_json() {
        let survey = SourceFileSurvey::from_files(vec![SourceFile {
            path: "A.java".to_string(),
            lines: 7,
        }]);
        let analysis = AnalysisResult::from_violations(vec![violation("A.java", "R", 4)]);
        let original = build_commit_analysis(commit(), survey, analysis, Utc::now());

        let json = serde_json::to_string_pretty(&original).unwrap();
        let restored: CommitAnalysis = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
    }
}
