use crate::config::GitConfig;
use crate::error::{ExecutionError, GitError, GitResult};
use crate::security::{CommandSanitizer, SanitizedCommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Environment injected into every git process.
///
/// The parsers rely on a fixed date format and undecorated output.
const PINNED_ENV: &[(&str, &str)] = &[
    ("LC_ALL", "C"),
    ("LANG", "C"),
    ("TZ", "UTC"),
    ("GIT_PAGER", "cat"),
    ("PAGER", "cat"),
    ("GIT_EDITOR", "true"),
    ("EDITOR", "true"),
    ("VISUAL", "true"),
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GCM_INTERACTIVE", "never"),
];

const READ_CHUNK: usize = 8192;

/// Result of executing a git command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub output: String,
    pub error_text: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes sanitized git commands within a repository.
///
/// Holds no mutable state between calls, so one executor can serve
/// concurrent queries.
#[derive(Debug)]
pub struct GitExecutor {
    repo_path: PathBuf,
    config: GitConfig,
    sanitizer: CommandSanitizer,
}

impl GitExecutor {
    /// Create an executor with default settings for a repository root
    pub fn new<P: AsRef<Path>>(repo_path: P) -> GitResult<Self> {
        Self::with_config(repo_path, GitConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(repo_path: P, config: GitConfig) -> GitResult<Self> {
        let repo_path = validate_repo_root(repo_path.as_ref())?;

        Ok(Self {
            repo_path,
            config,
            sanitizer: CommandSanitizer::new(),
        })
    }

    /// Point the executor at another repository root, validated like `new`
    pub fn set_repo_path<P: AsRef<Path>>(&mut self, repo_path: P) -> GitResult<()> {
        self.repo_path = validate_repo_root(repo_path.as_ref())?;
        Ok(())
    }

    /// Execute a git subcommand with the configured deadline
    ///
    /// Example: `executor.execute("status", &["--porcelain"])`
    pub async fn execute<S: AsRef<str>>(
        &self,
        subcommand: &str,
        args: &[S],
    ) -> GitResult<CommandResult> {
        self.execute_with_timeout(subcommand, args, self.config.timeout())
            .await
    }

    /// Execute a git subcommand with a custom deadline
    pub async fn execute_with_timeout<S: AsRef<str>>(
        &self,
        subcommand: &str,
        args: &[S],
        timeout: Duration,
    ) -> GitResult<CommandResult> {
        let never = CancellationToken::new();
        self.execute_cancellable(subcommand, args, timeout, &never)
            .await
    }

    /// Execute a git subcommand that stops early when `cancel` fires
    pub async fn execute_cancellable<S: AsRef<str>>(
        &self,
        subcommand: &str,
        args: &[S],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> GitResult<CommandResult> {
        let command = self.sanitizer.validate(subcommand, args)?;

        tracing::debug!(
            subcommand = command.subcommand(),
            args = command.args().len(),
            cwd = %self.repo_path.display(),
            "running git"
        );

        self.run(&command, timeout, cancel)
            .await
            .map_err(GitError::from)
    }

    async fn run(
        &self,
        command: &SanitizedCommand,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<CommandResult, ExecutionError> {
        let started = Instant::now();
        let limit = self.config.max_output_bytes;

        let mut child = Command::new(&self.config.binary)
            .arg(command.subcommand())
            .args(command.args())
            .current_dir(&self.repo_path)
            .envs(PINNED_ENV.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        let outcome = {
            let collect = collect_output(&mut child, limit);
            tokio::select! {
                res = collect => Outcome::Finished(res),
                _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
                _ = cancel.cancelled() => Outcome::Cancelled,
            }
        };

        let captured = match outcome {
            Outcome::Finished(res) => res?,
            Outcome::TimedOut => {
                terminate(&mut child).await;
                tracing::warn!(
                    subcommand = command.subcommand(),
                    ?timeout,
                    "git timed out and was killed"
                );
                return Err(ExecutionError::Timeout { timeout });
            }
            Outcome::Cancelled => {
                terminate(&mut child).await;
                tracing::debug!(subcommand = command.subcommand(), "git cancelled");
                return Err(ExecutionError::Cancelled);
            }
        };

        // Killed by a signal
        let exit_code = captured.status.code().unwrap_or(-1);
        let result = CommandResult {
            output: String::from_utf8_lossy(&captured.stdout).into_owned(),
            error_text: String::from_utf8_lossy(&captured.stderr).into_owned(),
            exit_code,
            duration: started.elapsed(),
        };

        if captured.truncated {
            tracing::warn!(
                subcommand = command.subcommand(),
                limit,
                "git output exceeded ceiling, result truncated"
            );
            return Err(ExecutionError::OutputTooLarge {
                limit,
                partial: Box::new(result),
            });
        }

        if exit_code != 0 {
            tracing::warn!(
                subcommand = command.subcommand(),
                exit_code,
                "git exited unsuccessfully"
            );
            return Err(ExecutionError::NonZeroExit {
                exit_code,
                stderr: result.error_text.trim().to_string(),
            });
        }

        Ok(result)
    }

    /// Get the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn config(&self) -> &GitConfig {
        &self.config
    }
}

/// Check that `path` is an absolute, existing directory holding a `.git` entry
pub fn validate_repo_root(path: &Path) -> GitResult<PathBuf> {
    let invalid = |reason: &str| GitError::InvalidWorkingDirectory {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.is_absolute() {
        return Err(invalid("path must be absolute"));
    }
    if !path.exists() {
        return Err(invalid("path does not exist"));
    }
    if !path.is_dir() {
        return Err(invalid("path is not a directory"));
    }
    // `.git` may be a file for worktrees and submodules
    if !path.join(".git").exists() {
        return Err(GitError::NotARepository(path.to_path_buf()));
    }

    Ok(path.to_path_buf())
}

enum Outcome {
    Finished(io::Result<Captured>),
    TimedOut,
    Cancelled,
}

struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    truncated: bool,
    status: ExitStatus,
}

/// Drain both pipes, then reap the child. The ceiling covers stdout and
/// stderr together: both readers draw from one byte budget, and bytes past it
/// are read and discarded so git never blocks on a full pipe.
async fn collect_output(child: &mut Child, limit: usize) -> io::Result<Captured> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("git stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("git stderr was not captured"))?;

    let budget = AtomicUsize::new(limit);
    let ((out, out_cut), (err, err_cut)) = tokio::try_join!(
        read_limited(stdout, &budget),
        read_limited(stderr, &budget)
    )?;
    let status = child.wait().await?;

    Ok(Captured {
        stdout: out,
        stderr: err,
        truncated: out_cut || err_cut,
        status,
    })
}

/// Read `reader` to EOF, keeping only what `budget` still allows.
///
/// Returns the kept bytes and whether anything was discarded.
async fn read_limited<R: AsyncRead + Unpin>(
    mut reader: R,
    budget: &AtomicUsize,
) -> io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    let mut truncated = false;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let (Ok(left) | Err(left)) =
            budget.fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                Some(left.saturating_sub(n))
            });
        let take = left.min(n);
        buf.extend_from_slice(&chunk[..take]);
        if take < n {
            truncated = true;
        }
    }

    Ok((buf, truncated))
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "failed to kill git process");
    }
}
