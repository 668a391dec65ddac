//! Version-control access backed by libgit2.
//!
//! - `repository`: opening a local checkout or cloning a remote, and restoring
//!   it afterwards
//! - `history`: chronological commit listing with change stats
//! - `checkout`: materializing one commit in the working tree
//! - `survey`: measuring the source files of the current working tree

pub mod checkout;
pub mod history;
pub mod repository;
pub mod survey;

use std::path::Path;

use crate::error::Result;
use crate::models::{CommitRecord, SourceFileSurvey};

pub use checkout::CheckoutOutcome;
pub use repository::{GitRepository, RepoSource};
pub use survey::{survey_source_files, SurveyOptions};

/// What the pipeline needs from a version-control system.
pub trait VersionControlSource {
    /// Root of the working tree that `checkout` mutates.
    fn work_dir(&self) -> &Path;

    /// Commits oldest first, truncated to `max_commits`.
    fn list_commits(&self, max_commits: Option<usize>) -> Result<Vec<CommitRecord>>;

    fn checkout(&mut self, hash: &str) -> Result<CheckoutOutcome>;

    fn survey_source_files(&self, options: &SurveyOptions) -> Result<SourceFileSurvey> {
        survey::survey_source_files(self.work_dir(), options)
    }
}

impl VersionControlSource for GitRepository {
    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn list_commits(&self, max_commits: Option<usize>) -> Result<Vec<CommitRecord>> {
        history::list_commits(&self.repo, max_commits)
    }

    fn checkout(&mut self, hash: &str) -> Result<CheckoutOutcome> {
        self.checkout_commit(hash)
    }
}
