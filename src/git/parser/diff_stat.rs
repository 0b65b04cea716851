use crate::git::model::{FileChange, FileStatus};
use crate::git::parser::path::unquote_path;

/// Parse `git diff --stat` output into per-file changes.
///
/// Each line reads ` <path> | <N> <bar>`. The trailing "N files changed"
/// summary has no `|` and is dropped along with any other line that does not
/// split into exactly two parts.
///
/// For a bar mixing `+` and `-` the real split is not recoverable from this
/// format: git scales the bar to the terminal width. The total is divided in
/// proportion to the bar's characters, so counts are approximate.
pub fn parse_diff_stat(output: &str) -> Vec<FileChange> {
    let mut files = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() != 2 {
            if !line.trim().is_empty() {
                tracing::trace!(line, "skipping diffstat line");
            }
            continue;
        }

        let path = parts[0].trim();
        if path.is_empty() {
            continue;
        }

        match parse_change(&unquote_path(path), parts[1].trim()) {
            Some(file) => files.push(file),
            None => tracing::debug!(line, "skipping malformed diffstat line"),
        }
    }

    files
}

fn parse_change(path: &str, change: &str) -> Option<FileChange> {
    // "Bin 0 -> 1234 bytes"
    if change.starts_with("Bin") {
        return Some(FileChange::binary(path));
    }

    let (count, bar) = match change.split_once(char::is_whitespace) {
        Some((count, bar)) => (count, bar.trim()),
        None => (change, ""),
    };
    let total: u64 = count.parse().ok()?;

    let plus = bar.chars().filter(|&c| c == '+').count() as u64;
    let minus = bar.chars().filter(|&c| c == '-').count() as u64;

    let (insertions, deletions, status) = match (plus, minus) {
        (0, 0) => (0, 0, FileStatus::Modified),
        (_, 0) => (total, 0, FileStatus::Added),
        (0, _) => (0, total, FileStatus::Deleted),
        (p, m) => {
            let insertions = (u128::from(total) * u128::from(p) / u128::from(p + m)) as u64;
            (insertions, total - insertions, FileStatus::Modified)
        }
    };

    Some(FileChange {
        path: path.to_string(),
        status,
        insertions,
        deletions,
        binary: false,
    })
}
