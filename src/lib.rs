pub mod config;
pub mod error;
pub mod git;
pub mod security;

// Re-export commonly used types for convenience
pub use config::{Config, GitConfig};
pub use error::{ExecutionError, GitError, GitResult};
pub use git::{
    Author, BranchEntry, CommandResult, Commit, CommitStats, Contributor, FileChange, FileStatus,
    GitExecutor, GitVersion, LogQuery, Repository,
};
pub use security::{CommandSanitizer, SanitizationError};
