//! Commit enumeration.
//!
//! Commits reachable from the analyzed branch (`main`, else `master`, else
//! HEAD) are ordered oldest first by committer timestamp. The walk runs in
//! reverse topological order (parents before children) and the timestamp
//! sort is stable over that order, so commits sharing a timestamp keep
//! their topological order.
//!
//! Change stats compare each commit with its first parent; root commits are
//! compared with the empty tree.

use chrono::DateTime;
use git2::{BranchType, Commit, Oid, Repository, Sort};

use crate::error::Result;
use crate::models::{AuthorInfo, ChangeStats, CommitRecord};

/// Tip of the branch whose history is mined.
pub fn history_tip(repo: &Repository) -> Result<Oid> {
    for name in ["main", "master"] {
        if let Ok(branch) = repo.find_branch(name, BranchType::Local) {
            if let Ok(commit) = branch.get().peel_to_commit() {
                tracing::debug!("Reading history from branch {}", name);
                return Ok(commit.id());
            }
        }
    }

    tracing::debug!("No main/master branch; reading history from HEAD");
    Ok(repo.head()?.peel_to_commit()?.id())
}

pub fn list_commits(repo: &Repository, max_commits: Option<usize>) -> Result<Vec<CommitRecord>> {
    tracing::info!("Retrieving commit history...");
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
    revwalk.push(history_tip(repo)?)?;

    let mut ordered: Vec<(i64, Oid)> = Vec::new();
    for oid in revwalk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        ordered.push((commit.time().seconds(), oid));
    }

    // stable: ties stay in walk order
    ordered.sort_by_key(|(timestamp, _)| *timestamp);

    if let Some(max) = max_commits {
        ordered.truncate(max);
    }

    let commits = ordered
        .into_iter()
        .enumerate()
        .map(|(sequence, (_, oid))| {
            let commit = repo.find_commit(oid)?;
            commit_record(repo, &commit, sequence)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Retrieved {} commits", commits.len());
    Ok(commits)
}

pub fn commit_record(
    repo: &Repository,
    commit: &Commit,
    sequence: usize,
) -> Result<CommitRecord> {
    let hash = commit.id().to_string();
    let timestamp = commit.time().seconds();
    let author = commit.author();
    let committer = commit.committer();

    Ok(CommitRecord {
        short_hash: CommitRecord::short(&hash),
        hash,
        author: AuthorInfo {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        committer: AuthorInfo {
            name: committer.name().unwrap_or("Unknown").to_string(),
            email: committer.email().unwrap_or("").to_string(),
        },
        date: DateTime::from_timestamp(timestamp, 0).unwrap_or_default(),
        timestamp,
        sequence,
        message: String::from_utf8_lossy(commit.message_bytes())
            .trim()
            .to_string(),
        stats: change_stats(repo, commit)?,
    })
}

fn change_stats(repo: &Repository, commit: &Commit) -> Result<ChangeStats> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let stats = diff.stats()?;

    Ok(ChangeStats {
        files_changed: stats.files_changed(),
        insertions: stats.insertions(),
        deletions: stats.deletions(),
    })
}
