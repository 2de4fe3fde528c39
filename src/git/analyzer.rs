//! History queries over a git2 repository.

use std::path::Path;

use chrono::{Duration, Utc};
use git2::{Oid, Repository, Sort};
use tracing::debug;

use crate::error::GitError;

use super::commits::Commit;
use super::range::resolve_range;

/// Reads commit history from a local repository.
pub struct GitAnalyzer {
    repo: Repository,
}

impl GitAnalyzer {
    /// Open the repository containing `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path.as_ref()).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Working directory root, if the repository is not bare.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Up to `limit` commits reachable from HEAD made within the last `days`
    /// days, newest first.
    ///
    /// Only commits that survive the age filter and the limit are diffed.
    pub fn commits_since(&self, days: u32, limit: usize) -> Result<Vec<Commit>, GitError> {
        let cutoff = (Utc::now() - Duration::days(i64::from(days))).timestamp();
        let head = self.head_oid()?;

        let mut commits = Vec::new();
        for oid in self.walk(head, None)? {
            if commits.len() == limit {
                break;
            }
            let commit = self.repo.find_commit(oid).map_err(GitError::ParseCommit)?;
            if commit.time().seconds() < cutoff {
                continue;
            }
            commits.push(Commit::from_git2_commit(&self.repo, &commit)?);
        }

        debug!(days, limit, count = commits.len(), "collected commits by age");
        Ok(commits)
    }

    /// Commits reachable from `to` (default HEAD) but not from `from`, newest first.
    pub fn commit_range(&self, from: &str, to: Option<&str>) -> Result<Vec<Commit>, GitError> {
        let range = resolve_range(&self.repo, from, to)?;

        let commits = self
            .walk(range.to, Some(range.from))?
            .into_iter()
            .map(|oid| self.load(oid))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            from = %range.from_ref,
            to = %range.to_ref,
            count = commits.len(),
            "collected commits in range"
        );
        Ok(commits)
    }

    /// The newest `limit` commits reachable from HEAD.
    pub fn recent_commits(&self, limit: usize) -> Result<Vec<Commit>, GitError> {
        let head = self.head_oid()?;
        self.walk(head, None)?
            .into_iter()
            .take(limit)
            .map(|oid| self.load(oid))
            .collect()
    }

    /// Short name of the checked-out branch, or `"HEAD"` when detached.
    pub fn current_branch(&self) -> Result<String, GitError> {
        if self.repo.head_detached().unwrap_or(false) {
            return Ok("HEAD".to_string());
        }
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::ReferenceNotFound("HEAD".to_string(), e))?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::ReferenceNotFound("HEAD".to_string(), e))?;
        Ok(head.peel_to_commit().map_err(GitError::ParseCommit)?.id())
    }

    fn walk(&self, tip: Oid, hide: Option<Oid>) -> Result<Vec<Oid>, GitError> {
        let mut revwalk = self.repo.revwalk().map_err(GitError::RevwalkError)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(GitError::RevwalkError)?;
        revwalk.push(tip).map_err(GitError::RevwalkError)?;
        if let Some(hidden) = hide {
            revwalk.hide(hidden).map_err(GitError::RevwalkError)?;
        }
        revwalk
            .collect::<Result<Vec<_>, _>>()
            .map_err(GitError::RevwalkError)
    }

    fn load(&self, oid: Oid) -> Result<Commit, GitError> {
        let commit = self.repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        Commit::from_git2_commit(&self.repo, &commit)
    }
}
