//! Repository access layer; every libgit2 call lives behind [`GitRepo`].

use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{BranchType, Commit, DiffFormat, ErrorCode, Oid, Repository};

use crate::branch::{BranchInfo, sort_branches};
use crate::error::{Error, Result};

/// Reported by [`GitRepo::current_branch`] when HEAD points at a commit
/// instead of a branch.
pub const DETACHED_HEAD: &str = "HEAD (detached)";

/// Wrapper over a discovered repository.
pub struct GitRepo {
    inner: Repository,
}

impl GitRepo {
    /// Locates the repository containing `start_path`, walking parent
    /// directories up to the filesystem root.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Repository::discover(start_path) {
            Ok(inner) => Ok(Self { inner }),
            Err(_) => Err(Error::RepositoryNotFound {
                path: start_path.to_path_buf(),
            }),
        }
    }

    /// Working-tree root; bare repositories fall back to the git directory.
    pub fn workdir(&self) -> &Path {
        self.inner.workdir().unwrap_or_else(|| self.inner.path())
    }

    /// Short name of the checked-out branch, [`DETACHED_HEAD`] when not on
    /// a branch, or the unborn branch's name in a repository without
    /// commits.
    pub fn current_branch(&self) -> Result<String> {
        match self.inner.head() {
            Ok(head) if head.is_branch() => {
                Ok(String::from_utf8_lossy(head.shorthand_bytes()).into_owned())
            }
            Ok(_) => Ok(DETACHED_HEAD.to_string()),
            Err(err) if err.code() == ErrorCode::UnbornBranch => self.unborn_branch_name(),
            Err(err) => Err(Error::op("Failed to get current branch", err)),
        }
    }

    /// Local branches, optionally unioned with remote-tracking branches,
    /// sorted newest-first. Fails with [`Error::NoBranchesFound`] when the
    /// result is empty.
    pub fn list_branches(&self, include_remote: bool) -> Result<Vec<BranchInfo>> {
        let mut branches = self.collect_branches(BranchType::Local)?;
        if include_remote {
            branches.extend(self.collect_branches(BranchType::Remote)?);
        }
        if branches.is_empty() {
            return Err(Error::NoBranchesFound);
        }
        sort_branches(&mut branches);
        Ok(branches)
    }

    /// Unified diff of the commit against its first parent, or against the
    /// empty tree for a root commit. Non-UTF-8 content is decoded lossily.
    pub fn commit_diff(&self, commit_hash: &str) -> Result<String> {
        let oid = Oid::from_str(commit_hash).map_err(|e| diff_error(commit_hash, e))?;
        let commit = self
            .inner
            .find_commit(oid)
            .map_err(|e| diff_error(commit_hash, e))?;
        let tree = commit.tree().map_err(|e| diff_error(commit_hash, e))?;

        let parent_tree = if commit.parent_count() > 0 {
            let parent = commit
                .parent(0)
                .and_then(|parent| parent.tree())
                .map_err(|e| diff_error(commit_hash, e))?;
            Some(parent)
        } else {
            None
        };

        let diff = self
            .inner
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .map_err(|e| diff_error(commit_hash, e))?;

        let mut patch = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            // Content lines carry their origin marker separately.
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin() as u8);
            }
            patch.extend_from_slice(line.content());
            true
        })
        .map_err(|e| diff_error(commit_hash, e))?;

        Ok(String::from_utf8_lossy(&patch).into_owned())
    }

    /// Switches to `branch`. A remote-only target first gets a local
    /// branch under its short name, tracking the remote one; an existing
    /// local branch of that name is reused instead. Switching to the
    /// current branch is a no-op.
    pub fn checkout(&self, branch: &BranchInfo) -> Result<()> {
        let local_name = branch.short_name().to_string();
        // An unborn HEAD reports the name of a branch that does not
        // exist yet, so the shortcut also requires a real local branch.
        if self.inner.find_branch(&local_name, BranchType::Local).is_ok()
            && self.current_branch()? == local_name
        {
            return Ok(());
        }
        if branch.is_remote {
            self.ensure_local_branch(&local_name, &branch.name)?;
        }

        let refname = format!("refs/heads/{local_name}");
        let target = self
            .inner
            .revparse_single(&refname)
            .map_err(|e| checkout_error(&branch.name, e))?;
        self.inner
            .checkout_tree(&target, None)
            .map_err(|e| checkout_error(&branch.name, e))?;
        self.inner
            .set_head(&refname)
            .map_err(|e| checkout_error(&branch.name, e))?;
        Ok(())
    }

    fn collect_branches(&self, kind: BranchType) -> Result<Vec<BranchInfo>> {
        let iter = self
            .inner
            .branches(Some(kind))
            .map_err(|e| Error::op("Failed to fetch branches", e))?;

        let mut collected = Vec::new();
        for entry in iter {
            let Ok((branch, _)) = entry else {
                continue;
            };
            let name = match branch.name_bytes() {
                Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                Err(_) => continue,
            };
            // origin/HEAD is an alias for another branch, not a branch
            // itself. Local branches may legitimately end in /HEAD.
            if kind == BranchType::Remote && name.ends_with("/HEAD") {
                continue;
            }
            // Skip branches whose tip cannot be resolved to a commit.
            let Some(target) = branch.get().target() else {
                continue;
            };
            let Ok(commit) = self.inner.find_commit(target) else {
                continue;
            };
            collected.push(branch_info(name, &commit, kind == BranchType::Remote));
        }
        Ok(collected)
    }

    fn ensure_local_branch(&self, local_name: &str, remote_name: &str) -> Result<()> {
        if self.inner.find_branch(local_name, BranchType::Local).is_ok() {
            return Ok(());
        }
        let remote = self
            .inner
            .find_branch(remote_name, BranchType::Remote)
            .map_err(|e| checkout_error(remote_name, e))?;
        let tip = remote
            .get()
            .peel_to_commit()
            .map_err(|e| checkout_error(remote_name, e))?;
        let mut local = self
            .inner
            .branch(local_name, &tip, false)
            .map_err(|e| checkout_error(remote_name, e))?;
        local
            .set_upstream(Some(remote_name))
            .map_err(|e| checkout_error(remote_name, e))?;
        Ok(())
    }

    fn unborn_branch_name(&self) -> Result<String> {
        let head = self
            .inner
            .find_reference("HEAD")
            .map_err(|e| Error::op("Failed to get current branch", e))?;
        let target = head.symbolic_target().unwrap_or("HEAD");
        Ok(target
            .strip_prefix("refs/heads/")
            .unwrap_or(target)
            .to_string())
    }
}

fn branch_info(name: String, commit: &Commit<'_>, is_remote: bool) -> BranchInfo {
    let message =
        String::from_utf8_lossy(commit.summary_bytes().unwrap_or_default()).into_owned();
    let author = commit.author().name().unwrap_or("Unknown").to_string();
    BranchInfo::new(
        name,
        commit.id().to_string(),
        commit_time(commit),
        author,
        message,
        is_remote,
    )
}

fn commit_time(commit: &Commit<'_>) -> DateTime<FixedOffset> {
    let time = commit.time();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset)
}

fn checkout_error(name: &str, source: git2::Error) -> Error {
    Error::op(format!("Failed to checkout {name}"), source)
}

fn diff_error(hash: &str, source: git2::Error) -> Error {
    Error::op(format!("Failed to get diff for {hash}"), source)
}
