//! Pure parsers turning git's text output into typed records.
//!
//! A line that does not fit its format is skipped and logged; parsers never
//! fail as a whole, and empty input yields an empty vector.

mod branch;
mod diff_stat;
mod log;
mod path;
mod shortlog;

pub use branch::parse_branch_list;
pub use diff_stat::parse_diff_stat;
pub use log::{GIT_DATE_FORMAT, LOG_FORMAT, parse_git_date, parse_log, parse_numstat};
pub use shortlog::parse_shortlog;
