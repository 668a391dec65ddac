//! The per-commit analysis loop.
//!
//! Commits are processed strictly one at a time because each one rewrites
//! the shared working tree. A failure anywhere in a commit's steps
//! (checkout, survey, analysis, persistence) is recorded in the
//! `RunAccumulator` skip list and the loop moves on; nothing is retried.

use std::path::PathBuf;

use chrono::Utc;

use crate::analyzer::Analyzer;
use crate::builder::build_commit_analysis;
use crate::error::{AppError, Result};
use crate::git::{CheckoutOutcome, SurveyOptions, VersionControlSource};
use crate::models::{CommitAnalysis, CommitRecord, SkippedCommit};
use crate::output::OutputStore;
use crate::progress::Progress;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub ruleset: PathBuf,
    pub survey: SurveyOptions,
}

/// Everything a run produced, handed back when the loop ends.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    pub results: Vec<CommitAnalysis>,
    pub skipped: Vec<SkippedCommit>,
}

impl RunAccumulator {
    fn record(&mut self, analysis: CommitAnalysis) {
        self.results.push(analysis);
    }

    fn skip(&mut self, commit: &CommitRecord, error: &AppError) {
        self.skipped.push(SkippedCommit {
            commit: commit.hash.clone(),
            error: error.to_string(),
        });
    }
}

pub struct Pipeline<'a, V, A> {
    vcs: &'a mut V,
    analyzer: &'a A,
    store: &'a OutputStore,
    options: &'a PipelineOptions,
}

impl<'a, V, A> Pipeline<'a, V, A>
where
    V: VersionControlSource,
    A: Analyzer,
{
    pub fn new(
        vcs: &'a mut V,
        analyzer: &'a A,
        store: &'a OutputStore,
        options: &'a PipelineOptions,
    ) -> Self {
        Self {
            vcs,
            analyzer,
            store,
            options,
        }
    }

    pub fn run(&mut self, commits: &[CommitRecord], progress: &Progress) -> RunAccumulator {
        let mut acc = RunAccumulator::default();
        let total = commits.len();

        for (i, commit) in commits.iter().enumerate() {
            tracing::info!("Processing commit {}/{}: {}", i + 1, total, commit.short_hash);
            progress.set_message(&commit.short_hash);

            match self.process(commit) {
                Ok(analysis) => acc.record(analysis),
                Err(e) => {
                    tracing::error!("Failed to process commit {}: {}", commit.short_hash, e);
                    acc.skip(commit, &e);
                }
            }
            progress.inc();
        }

        acc
    }

    fn process(&mut self, commit: &CommitRecord) -> Result<CommitAnalysis> {
        match self.vcs.checkout(&commit.hash)? {
            CheckoutOutcome::Complete => {}
            CheckoutOutcome::Partial(reason) => {
                tracing::warn!(
                    "Partial checkout of {}: {}; continuing with current tree",
                    commit.short_hash,
                    reason
                );
            }
        }

        let survey = self.vcs.survey_source_files(&self.options.survey)?;
        let result = self
            .analyzer
            .run(self.vcs.work_dir(), &self.options.ruleset)?;

        let analysis = build_commit_analysis(commit.clone(), survey, result, Utc::now());
        self.store.write_commit(&analysis)?;

        Ok(analysis)
    }
}
