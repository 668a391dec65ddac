use git2::build::CheckoutBuilder;
use git2::Oid;

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;

/// Result of materializing a commit in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Complete,
    /// Files were written but HEAD could not be moved.
    Partial(String),
}

impl GitRepository {
    /// Force the working tree to the given commit and detach HEAD there.
    pub fn checkout_commit(&mut self, hash: &str) -> Result<CheckoutOutcome> {
        let oid = Oid::from_str(hash).map_err(|_| AppError::CommitNotFound(hash.to_string()))?;
        self.repo
            .find_commit(oid)
            .map_err(|_| AppError::CommitNotFound(hash.to_string()))?;

        self.materialize(oid)?;

        match self.repo.set_head_detached(oid) {
            Ok(()) => Ok(CheckoutOutcome::Complete),
            Err(e) => {
                tracing::warn!(
                    "HEAD left behind the working tree at {}; next checkout diffs against the written tree",
                    oid
                );
                Ok(CheckoutOutcome::Partial(e.message().to_string()))
            }
        }
    }

    /// Write `oid`'s tree over the working tree. The baseline is the tree
    /// written last, not HEAD, so files from a commit whose HEAD update
    /// failed are still removed.
    pub(crate) fn materialize(&mut self, oid: Oid) -> Result<()> {
        let target = self.repo.find_commit(oid)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        if let Some(previous) = self.materialized {
            checkout.baseline(self.repo.find_commit(previous)?.tree()?);
        }
        self.repo
            .checkout_tree(target.as_object(), Some(&mut checkout))?;

        self.materialized = Some(oid);
        Ok(())
    }
}
