//! Branch snapshot model and listing order.

use chrono::{DateTime, FixedOffset};
use derive_new::new;

/// Tag appended to remote-tracking entries in tables and prompt labels.
pub const REMOTE_TAG: &str = "[remote]";

const LABEL_MESSAGE_LIMIT: usize = 50;

/// One branch and its latest commit, captured at listing time.
///
/// Built fresh on every listing from live repository state and never
/// persisted. For remote-tracking branches `name` keeps the remote
/// prefix, e.g. `origin/feature`.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct BranchInfo {
    pub name: String,
    pub commit_hash: String,
    pub commit_date: DateTime<FixedOffset>,
    pub author: String,
    pub message: String,
    pub is_remote: bool,
}

impl BranchInfo {
    /// First seven hex characters of the commit hash.
    pub fn short_hash(&self) -> &str {
        &self.commit_hash[..self.commit_hash.len().min(7)]
    }

    /// Commit date rendered in the commit's own UTC offset.
    pub fn formatted_date(&self) -> String {
        self.commit_date.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Branch name without the remote prefix (`origin/feature` -> `feature`).
    pub fn short_name(&self) -> &str {
        if self.is_remote {
            self.name
                .split_once('/')
                .map_or(self.name.as_str(), |(_, rest)| rest)
        } else {
            &self.name
        }
    }

    /// Whether this entry is the checked-out branch. Remote-tracking
    /// entries never count as current, even when they mirror it.
    pub fn is_current(&self, current_branch: &str) -> bool {
        !self.is_remote && self.name == current_branch
    }

    /// One prompt line for the fuzzy selector, mirroring the table marker.
    pub fn display_label(&self, current_branch: &str) -> String {
        let marker = if self.is_current(current_branch) {
            "* "
        } else {
            "  "
        };
        let tag = if self.is_remote {
            format!(" {REMOTE_TAG}")
        } else {
            String::new()
        };
        let message: String = self.message.chars().take(LABEL_MESSAGE_LIMIT).collect();
        format!("{marker}{}{tag} ({}) - {message}", self.name, self.short_hash())
    }
}

/// Listing order: newest commit first; equal dates fall back to the
/// branch name so the order stays deterministic.
pub fn sort_branches(branches: &mut [BranchInfo]) {
    branches.sort_by(|a, b| {
        b.commit_date
            .cmp(&a.commit_date)
            .then_with(|| a.name.cmp(&b.name))
    });
}
