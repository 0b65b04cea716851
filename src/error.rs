use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::git::executor::CommandResult;
use crate::security::validator::SanitizationError;

/// Failures of a single git invocation after it passed sanitization
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("git timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("git invocation was cancelled")]
    Cancelled,

    #[error("git exited with code {exit_code}: {stderr}")]
    NonZeroExit { exit_code: i32, stderr: String },

    /// The output ceiling was hit. `partial` holds what was captured before it.
    #[error("git output exceeded {limit} bytes")]
    OutputTooLarge {
        limit: usize,
        partial: Box<CommandResult>,
    },

    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while waiting for git: {0}")]
    Io(#[from] io::Error),
}

impl ExecutionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }

    pub fn is_too_large(&self) -> bool {
        matches!(self, ExecutionError::OutputTooLarge { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionError::NonZeroExit { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Truncated result of an oversized invocation, if any
    pub fn partial_result(&self) -> Option<&CommandResult> {
        match self {
            ExecutionError::OutputTooLarge { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Invalid working directory {}: {reason}", .path.display())]
    InvalidWorkingDirectory { path: PathBuf, reason: String },

    #[error("Command rejected: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("Git command failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid revision: {0:?}")]
    InvalidRevision(String),

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Git version {0} is too old. Minimum required: 2.20")]
    GitVersionTooOld(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitError {
    /// The execution failure behind this error, if there was one
    pub fn as_execution(&self) -> Option<&ExecutionError> {
        match self {
            GitError::Execution(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
