use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the abbreviated hash used in logs and artifacts.
pub const SHORT_HASH_LEN: usize = 8;

/// One commit as reported by the version-control source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub author: AuthorInfo,
    pub committer: AuthorInfo,
    /// Committed date, ISO-8601.
    pub date: DateTime<Utc>,
    /// Committed time in seconds since the epoch.
    pub timestamp: i64,
    /// Position in the chronological listing. Orders commits that share a
    /// timestamp.
    #[serde(default)]
    pub sequence: usize,
    pub message: String,
    pub stats: ChangeStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

/// Change statistics relative to the first parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChangeStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl CommitRecord {
    pub fn short(hash: &str) -> String {
        hash.chars().take(SHORT_HASH_LEN).collect()
    }
}

/// A commit the pipeline could not analyze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCommit {
    pub commit: String,
    pub error: String,
}
