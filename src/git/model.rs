//! Typed records produced by the parsers.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Name and email of a commit author or committer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Change kind of a file, inferred from line counts.
///
/// This is a heuristic: renames and copies surface as `Modified` or as an
/// `Added`/`Deleted` pair, never as a distinct status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    pub fn from_counts(insertions: u64, deletions: u64) -> Self {
        match (insertions, deletions) {
            (i, 0) if i > 0 => FileStatus::Added,
            (0, d) if d > 0 => FileStatus::Deleted,
            _ => FileStatus::Modified,
        }
    }

    /// Single-letter code as used by `git diff --name-status`
    pub fn code(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
    pub insertions: u64,
    pub deletions: u64,
    /// Line counts were unavailable (`-` in numstat, `Bin` in diffstat)
    #[serde(default)]
    pub binary: bool,
}

impl FileChange {
    pub fn new(path: impl Into<String>, insertions: u64, deletions: u64) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::from_counts(insertions, deletions),
            insertions,
            deletions,
            binary: false,
        }
    }

    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            binary: true,
            ..Self::new(path, 0, 0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitStats {
    pub files_changed: usize,
    pub insertions: u64,
    pub deletions: u64,
    pub files: Vec<FileChange>,
}

impl CommitStats {
    /// Build stats whose totals are the sums over `files`
    pub fn from_files(files: Vec<FileChange>) -> Self {
        let mut stats = Self::default();
        for file in files {
            stats.push(file);
        }
        stats
    }

    /// Append a file and fold its counts into the totals
    pub fn push(&mut self, file: FileChange) {
        self.insertions = self.insertions.saturating_add(file.insertions);
        self.deletions = self.deletions.saturating_add(file.deletions);
        self.files.push(file);
        self.files_changed = self.files.len();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: Author,
    pub committer: Author,
    /// `None` when git printed a date we could not parse
    pub author_date: Option<DateTime<FixedOffset>>,
    pub committer_date: Option<DateTime<FixedOffset>>,
    pub parent_hashes: Vec<String>,
    pub tree_hash: String,
    pub stats: CommitStats,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() >= 2
    }

    pub fn is_root(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// One row of `git shortlog -sne`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub total_commits: u64,
}

/// Represents a branch from git branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
}
