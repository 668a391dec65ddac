//! Output directory layout.
//!
//! ```text
//! <output>/
//!   commits/<full hash>.json   one artifact per processed commit
//!   logs/
//!   summary.json
//!   skipped.json
//! ```
//!
//! Commit artifacts are written as soon as each commit is analyzed so that an
//! interrupted run keeps everything processed so far.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::models::{CommitAnalysis, SkippedCommit, SummaryReport};

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    /// Create the directory structure under `root`.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("commits"))?;
        fs::create_dir_all(root.join("logs"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn commit_path(&self, hash: &str) -> PathBuf {
        self.root.join("commits").join(format!("{hash}.json"))
    }

    pub fn write_commit(&self, analysis: &CommitAnalysis) -> Result<PathBuf> {
        let path = self.commit_path(&analysis.commit.hash);
        write_json(&path, analysis)?;
        Ok(path)
    }

    pub fn write_summary(&self, report: &SummaryReport) -> Result<PathBuf> {
        let path = self.root.join("summary.json");
        write_json(&path, report)?;
        Ok(path)
    }

    pub fn write_skipped(&self, skipped: &[SkippedCommit]) -> Result<PathBuf> {
        let path = self.root.join("skipped.json");
        write_json(&path, &skipped)?;
        Ok(path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
