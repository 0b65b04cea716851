use crate::error::{GitError, GitResult};
use crate::git::executor::GitExecutor;

/// Oldest git whose `log`/`shortlog` output the parsers are known to handle
const MIN_GIT_VERSION: (u32, u32) = (2, 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Ask the executor's git binary for its version
    pub async fn detect(executor: &GitExecutor) -> GitResult<Self> {
        let result = executor.execute::<&str>("version", &[]).await?;
        Self::parse(&result.output)
    }

    /// Detect the version and reject anything older than 2.20
    pub async fn validate(executor: &GitExecutor) -> GitResult<Self> {
        let version = Self::detect(executor).await?;
        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(version.to_string()));
        }
        tracing::debug!(%version, "git version accepted");
        Ok(version)
    }

    /// Parse `git version X.Y[.Z][.vendor suffix]`
    pub fn parse(version_str: &str) -> GitResult<Self> {
        let number = version_str
            .trim()
            .strip_prefix("git version ")
            .and_then(|rest| rest.split_whitespace().next())
            .ok_or_else(|| {
                GitError::ParseError(format!("Unexpected git version format: {}", version_str.trim()))
            })?;

        let mut components = number.split('.');
        let mut next_number = |label: &str| -> GitResult<u32> {
            let raw = components.next().unwrap_or("");
            raw.parse()
                .map_err(|_| GitError::ParseError(format!("Invalid {} version in {}", label, number)))
        };

        let major = next_number("major")?;
        let minor = next_number("minor")?;
        // Suffixes like "2.39.2.windows.1" or "2.45.rc0" leave patch at 0
        let patch = next_number("patch").unwrap_or(0);

        Ok(GitVersion { major, minor, patch })
    }

    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= MIN_GIT_VERSION
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
