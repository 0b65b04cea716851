pub mod validator;

pub use validator::{CommandSanitizer, SanitizationError, SanitizedCommand};

/// Allowlist of git subcommands the executor may run
///
/// Every entry is read-only with respect to history, apart from `init` which
/// only creates an empty repository. Adding a new subcommand requires careful
/// security review.
pub const ALLOWED_GIT_SUBCOMMANDS: &[&str] = &[
    // History queries
    "log",
    "show",
    "rev-list",
    "shortlog",
    "diff",
    // Refs and working tree
    "branch",
    "status",
    "ls-files",
    "rev-parse",
    "tag",
    "remote",
    // Configuration and tooling
    "config",
    "version",
    "init",
];

/// Characters that are never allowed inside an argument.
///
/// `|` is intentionally absent: log format strings use it as a field separator.
pub const FORBIDDEN_ARG_CHARS: &[char] = &[';', '&', '`', '$', '(', ')', '<', '>'];

/// Maximum accepted argument length, in bytes
pub const MAX_ARG_LEN: usize = 4096;
