use git2::{Oid, Repository, StatusOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{AppError, Result};

/// Where the repository comes from, decided once at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// Existing checkout, analyzed in place.
    Local(PathBuf),
    /// Remote URL, cloned into a temporary directory.
    Remote(String),
}

impl RepoSource {
    pub fn parse(location: &str) -> Self {
        if ["http://", "https://", "git@"]
            .iter()
            .any(|prefix| location.starts_with(prefix))
        {
            RepoSource::Remote(location.to_string())
        } else {
            RepoSource::Local(PathBuf::from(location))
        }
    }
}

/// HEAD as it was before the run touched the working tree.
#[derive(Debug, Clone)]
enum OriginalHead {
    Branch { refname: String, oid: Oid },
    Detached(Oid),
}

pub struct GitRepository {
    pub repo: Repository,
    pub work_dir: PathBuf,
    pub source: RepoSource,
    original_head: Option<OriginalHead>,
    /// Commit whose tree was last written to the working tree. Differs from
    /// HEAD after a partial checkout.
    pub(crate) materialized: Option<Oid>,
    // Held so the clone lives as long as the repository handle.
    clone_dir: Option<TempDir>,
}

impl GitRepository {
    pub fn open(source: RepoSource) -> Result<Self> {
        match source {
            RepoSource::Local(path) => Self::open_local(path),
            RepoSource::Remote(url) => Self::clone_remote(url),
        }
    }

    fn open_local(path: PathBuf) -> Result<Self> {
        let path_str = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(AppError::RepoNotFound(format!(
                "{path_str} (path does not exist)"
            )));
        }

        tracing::info!("Using local repository at {}", path.display());
        let repo = Repository::open(&path).map_err(|_| AppError::RepoNotFound(path_str.clone()))?;
        let work_dir = working_dir(&repo, &path_str)?;

        if has_local_changes(&repo) {
            tracing::warn!(
                "Working tree at {} has uncommitted changes; they will be overwritten",
                work_dir.display()
            );
        }

        let original_head = current_head(&repo);
        Ok(Self {
            repo,
            work_dir,
            source: RepoSource::Local(path),
            original_head,
            materialized: None,
            clone_dir: None,
        })
    }

    fn clone_remote(url: String) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("pmd-history-").tempdir()?;
        let target = dir.path().join("repo");

        tracing::info!("Cloning repository from {}", url);
        let repo = Repository::clone(&url, &target)
            .map_err(|e| AppError::RepoNotFound(format!("{url}: {}", e.message())))?;
        let work_dir = working_dir(&repo, &url)?;

        Ok(Self {
            repo,
            work_dir,
            source: RepoSource::Remote(url),
            original_head: None,
            materialized: None,
            clone_dir: Some(dir),
        })
    }

    /// Put a local repository back on the HEAD it started from and drop any
    /// temporary clone.
    pub fn cleanup(&mut self) -> Result<()> {
        if let Some(head) = self.original_head.take() {
            tracing::info!("Restoring original HEAD");
            let oid = match &head {
                OriginalHead::Branch { oid, .. } | OriginalHead::Detached(oid) => *oid,
            };
            self.materialize(oid)?;

            match head {
                OriginalHead::Branch { refname, .. } => self.repo.set_head(&refname)?,
                OriginalHead::Detached(oid) => self.repo.set_head_detached(oid)?,
            }
        }

        if let Some(dir) = self.clone_dir.take() {
            tracing::info!("Removing temporary clone at {}", dir.path().display());
            dir.close()?;
        }
        Ok(())
    }
}

fn working_dir(repo: &Repository, location: &str) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| AppError::RepoNotFound(format!("{location} (bare repository)")))
}

fn current_head(repo: &Repository) -> Option<OriginalHead> {
    let head = repo.head().ok()?;
    let oid = head.peel_to_commit().ok()?.id();

    if head.is_branch() {
        head.name().map(|refname| OriginalHead::Branch {
            refname: refname.to_string(),
            oid,
        })
    } else {
        Some(OriginalHead::Detached(oid))
    }
}

fn has_local_changes(repo: &Repository) -> bool {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);
    repo.statuses(Some(&mut opts))
        .map(|statuses| !statuses.is_empty())
        .unwrap_or(false)
}
