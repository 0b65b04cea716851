use crate::config::GitConfig;
use crate::error::{ExecutionError, GitError, GitResult};
use crate::git::executor::GitExecutor;
use crate::git::model::{BranchEntry, Commit, Contributor, FileChange};
use crate::git::parser::{self, LOG_FORMAT};
use chrono::{DateTime, Utc};
use std::env;
use std::path::{Path, PathBuf};

/// Width handed to `--stat` so paths are not elided
const DIFF_STAT_WIDTH: u32 = 4096;

/// Options for a history query
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    /// Maximum number of commits to retrieve
    pub max_count: Option<usize>,
    /// Only include commits after this date
    pub since: Option<DateTime<Utc>>,
    /// Only include commits before this date
    pub until: Option<DateTime<Utc>>,
    /// Author name or email pattern
    pub author: Option<String>,
    /// Revision or range to walk (defaults to HEAD)
    pub revision: Option<String>,
    pub no_merges: bool,
    /// Limit to commits touching these paths
    pub paths: Vec<String>,
}

impl LogQuery {
    /// Query the N most recent commits
    #[must_use]
    pub fn latest(n: usize) -> Self {
        Self {
            max_count: Some(n),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.since = Some(date);
        self
    }

    #[must_use]
    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.until = Some(date);
        self
    }

    #[must_use]
    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    #[must_use]
    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = Some(revision.to_string());
        self
    }

    #[must_use]
    pub fn without_merges(mut self) -> Self {
        self.no_merges = true;
        self
    }

    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.paths.push(path.to_string());
        self
    }

    /// Arguments for `git log`
    pub fn to_args(&self) -> GitResult<Vec<String>> {
        let mut args = vec![format!("--pretty=format:{}", LOG_FORMAT), "--numstat".to_string()];

        if let Some(n) = self.max_count {
            args.push(format!("--max-count={}", n));
        }
        if let Some(since) = self.since {
            args.push(format!("--since={}", since.to_rfc3339()));
        }
        if let Some(until) = self.until {
            args.push(format!("--until={}", until.to_rfc3339()));
        }
        if let Some(author) = &self.author {
            args.push(format!("--author={}", author));
        }
        if self.no_merges {
            args.push("--no-merges".to_string());
        }
        if let Some(revision) = &self.revision {
            args.push(check_revision(revision)?.to_string());
        }
        if !self.paths.is_empty() {
            args.push("--".to_string());
            args.extend(self.paths.iter().cloned());
        }

        Ok(args)
    }
}

/// A git repository root with typed history queries
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    executor: GitExecutor,
}

impl Repository {
    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Detect git repository starting from a specific directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        let start = start_path.as_ref();
        let mut current = start
            .canonicalize()
            .map_err(|_| GitError::NotARepository(start.to_path_buf()))?;

        loop {
            if current.join(".git").exists() {
                return Self::open(current);
            }

            // Move up to parent directory
            if !current.pop() {
                return Err(GitError::NotARepository(start.to_path_buf()));
            }
        }
    }

    /// Open a known repository root with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> GitResult<Self> {
        Self::open_with_config(path, GitConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: GitConfig) -> GitResult<Self> {
        let executor = GitExecutor::with_config(path, config)?;
        let path = executor.repo_path().to_path_buf();

        Ok(Self { path, executor })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the git executor for this repository
    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    /// Commits matching `query`, newest first as git lists them
    pub async fn commits(&self, query: &LogQuery) -> GitResult<Vec<Commit>> {
        let args = query.to_args()?;
        if query.revision.is_none() && !self.has_commits().await? {
            return Ok(Vec::new());
        }

        let output = self.executor.execute("log", &args).await?;
        let commits = parser::parse_log(&output.output);
        tracing::debug!(count = commits.len(), "parsed commits");
        Ok(commits)
    }

    /// Per-file changes between two revisions, from `git diff --stat`.
    ///
    /// Insertion/deletion splits for mixed lines are approximate.
    pub async fn diff_stat(&self, from: &str, to: &str) -> GitResult<Vec<FileChange>> {
        let args = [
            format!("--stat={}", DIFF_STAT_WIDTH),
            check_revision(from)?.to_string(),
            check_revision(to)?.to_string(),
        ];
        let output = self.executor.execute("diff", &args).await?;
        Ok(parser::parse_diff_stat(&output.output))
    }

    /// Commit counts per author from `git shortlog -sne`
    pub async fn contributors(&self) -> GitResult<Vec<Contributor>> {
        if !self.has_commits().await? {
            return Ok(Vec::new());
        }

        // Without a revision shortlog reads stdin
        let output = self.executor.execute("shortlog", &["-sne", "HEAD"]).await?;
        Ok(parser::parse_shortlog(&output.output))
    }

    /// Local and remote-tracking branches
    pub async fn branches(&self) -> GitResult<Vec<BranchEntry>> {
        let output = self.executor.execute("branch", &["-a", "--no-color"]).await?;
        Ok(parser::parse_branch_list(&output.output))
    }

    /// Get the current branch name, `None` on a detached HEAD
    pub async fn current_branch(&self) -> GitResult<Option<String>> {
        let output = self.executor.execute("branch", &["--show-current"]).await?;
        let branch = output.output.trim();
        if branch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(branch.to_string()))
        }
    }

    /// Number of commits reachable from HEAD
    pub async fn commit_count(&self) -> GitResult<u64> {
        if !self.has_commits().await? {
            return Ok(0);
        }

        let output = self.executor.execute("rev-list", &["--count", "HEAD"]).await?;
        output
            .output
            .trim()
            .parse()
            .map_err(|_| GitError::ParseError(format!("Invalid commit count: {}", output.output.trim())))
    }

    /// Paths tracked in the index
    pub async fn tracked_files(&self) -> GitResult<Vec<String>> {
        let output = self.executor.execute("ls-files", &["-z"]).await?;
        Ok(split_nonempty(&output.output, '\0'))
    }

    pub async fn tags(&self) -> GitResult<Vec<String>> {
        let output = self.executor.execute("tag", &["--list"]).await?;
        Ok(split_nonempty(&output.output, '\n'))
    }

    pub async fn remotes(&self) -> GitResult<Vec<String>> {
        let output = self.executor.execute::<&str>("remote", &[]).await?;
        Ok(split_nonempty(&output.output, '\n'))
    }

    /// False for a freshly initialized repository
    async fn has_commits(&self) -> GitResult<bool> {
        match self
            .executor
            .execute("rev-parse", &["--verify", "-q", "HEAD"])
            .await
        {
            Ok(_) => Ok(true),
            Err(GitError::Execution(ExecutionError::NonZeroExit { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Revisions are passed positionally, so one that looks like an option
/// (`--output=...`) would be read as a flag.
fn check_revision(revision: &str) -> GitResult<&str> {
    if revision.is_empty() || revision.starts_with('-') {
        return Err(GitError::InvalidRevision(revision.to_string()));
    }
    Ok(revision)
}

fn split_nonempty(output: &str, separator: char) -> Vec<String> {
    output
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().to_path_buf();

        let setup: [&[&str]; 3] = [
            &["init"],
            &["config", "user.name", "Test User"],
            &["config", "user.email", "test@example.com"],
        ];
        for args in setup {
            Command::new("git")
                .args(args)
                .current_dir(&repo_path)
                .output()
                .unwrap();
        }

        (temp_dir, repo_path)
    }

    #[test]
    fn test_log_query_args() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let args = LogQuery::latest(5)
            .since(since)
            .author("jane")
            .without_merges()
            .path("src")
            .to_args()
            .unwrap();

        assert_eq!(args[0], format!("--pretty=format:{}", LOG_FORMAT));
        assert_eq!(args[1], "--numstat");
        assert!(args.contains(&"--max-count=5".to_string()));
        assert!(args.contains(&"--since=2024-01-01T00:00:00+00:00".to_string()));
        assert!(args.contains(&"--author=jane".to_string()));
        assert!(args.contains(&"--no-merges".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--", "src"]);
    }

    #[test]
    fn test_option_like_revision_rejected() {
        let result = LogQuery::default().revision("--output=/tmp/x").to_args();
        assert!(matches!(result, Err(GitError::InvalidRevision(_))));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (_temp, repo_path) = create_test_repo();

        let sub_dir = repo_path.join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let repo = Repository::discover_from(&sub_dir).unwrap();
        assert_eq!(repo.path(), repo_path.canonicalize().unwrap().as_path());
    }

    #[test]
    fn test_discover_not_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        let result = Repository::discover_from(temp_dir.path());

        assert!(matches!(result.unwrap_err(), GitError::NotARepository(_)));
    }

    #[tokio::test]
    async fn test_empty_repo_queries() {
        let (_temp, repo_path) = create_test_repo();
        let repo = Repository::open(&repo_path).unwrap();

        assert!(repo.commits(&LogQuery::default()).await.unwrap().is_empty());
        assert!(repo.contributors().await.unwrap().is_empty());
        assert_eq!(repo.commit_count().await.unwrap(), 0);
        assert!(repo.tracked_files().await.unwrap().is_empty());
        assert!(repo.remotes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_diff_stat_rejects_option_revision() {
        let (_temp, repo_path) = create_test_repo();
        let repo = Repository::open(&repo_path).unwrap();

        let err = repo.diff_stat("--output=/tmp/pwned", "HEAD").await.unwrap_err();
        assert!(matches!(err, GitError::InvalidRevision(_)));
    }
}
