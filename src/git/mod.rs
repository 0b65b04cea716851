pub mod executor;
pub mod model;
pub mod parser;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use executor::{CommandResult, GitExecutor, validate_repo_root};
pub use model::{Author, BranchEntry, Commit, CommitStats, Contributor, FileChange, FileStatus};
pub use parser::{parse_branch_list, parse_diff_stat, parse_log, parse_shortlog};
pub use repository::{LogQuery, Repository};
pub use version::GitVersion;
