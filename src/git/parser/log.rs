//! Parser for `git log --numstat` output with a `|`-separated header.
//!
//! The stream interleaves one header line per commit with zero or more
//! numstat lines, and nothing marks the end of a commit. Boundaries are
//! inferred from separator counts plus a one-line lookahead across blank
//! lines, which is what lets a commit with no file lines (an empty merge,
//! say) terminate cleanly.

use chrono::{DateTime, FixedOffset};

use crate::git::model::{Author, Commit, CommitStats, FileChange};
use crate::git::parser::path::unquote_path;

/// Pretty format producing the header lines this parser expects
pub const LOG_FORMAT: &str = "%H|%an|%ae|%ai|%cn|%ce|%ci|%s|%P|%T";

/// Layout of `%ai` / `%ci`
pub const GIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

const FIELD_SEPARATOR: char = '|';
const MIN_SEPARATORS: usize = 7;
const MIN_FIELDS: usize = 8;
const FULL_FIELDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingHeader,
    InCommitBody,
}

/// Parse `git log --pretty=format:<LOG_FORMAT> --numstat` output.
///
/// Commits come back in the order their headers appear. Malformed headers
/// and numstat lines are skipped; nothing here fails the whole parse.
pub fn parse_log(output: &str) -> Vec<Commit> {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();
    let mut commits = Vec::new();
    let mut current: Option<Commit> = None;
    let mut state = State::AwaitingHeader;
    // Blank lines before this index were already covered by a lookahead
    let mut resume_at = 0;

    for (idx, line) in lines.iter().enumerate() {
        if idx < resume_at {
            continue;
        }

        if is_header(line) {
            if let Some(done) = current.take() {
                commits.push(done);
            }
            current = parse_header(line);
            state = if current.is_some() {
                State::InCommitBody
            } else {
                State::AwaitingHeader
            };
            continue;
        }

        if state == State::AwaitingHeader {
            if !line.is_empty() {
                tracing::trace!(line = idx + 1, "skipping line outside a commit");
            }
            continue;
        }

        if line.is_empty() {
            let next = lines[idx + 1..]
                .iter()
                .position(|l| !l.is_empty())
                .map(|offset| idx + 1 + offset);
            resume_at = next.unwrap_or(lines.len());

            if !continues_commit(next.map(|n| lines[n])) {
                if let Some(done) = current.take() {
                    commits.push(done);
                }
                state = State::AwaitingHeader;
            }
            continue;
        }

        if line.contains('\t') {
            match (parse_numstat(line), current.as_mut()) {
                (Some(file), Some(commit)) => commit.stats.push(file),
                (None, _) => {
                    tracing::debug!(line = idx + 1, "skipping malformed numstat line")
                }
                (Some(_), None) => {}
            }
        }
    }

    if let Some(done) = current {
        commits.push(done);
    }

    commits
}

/// Lookahead after a blank line: true only when the next non-blank line is
/// another numstat line for the same commit.
fn continues_commit(next: Option<&str>) -> bool {
    match next {
        Some(next) if is_header(next) => false,
        Some(next) => looks_like_numstat(next),
        None => false,
    }
}

fn is_header(line: &str) -> bool {
    line.matches(FIELD_SEPARATOR).count() >= MIN_SEPARATORS
}

fn looks_like_numstat(line: &str) -> bool {
    line.split('\t').count() >= 3
}

/// Split a header line into a commit with empty stats.
///
/// With the full ten-field layout the message is whatever sits between the
/// committer date and the trailing parents/tree pair, so a `|` inside a
/// subject does not shift the hashes.
fn parse_header(line: &str) -> Option<Commit> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < MIN_FIELDS {
        tracing::debug!(fields = fields.len(), "skipping short commit header");
        return None;
    }

    let hash = fields[0].trim();
    if hash.is_empty() {
        tracing::debug!("skipping commit header without a hash");
        return None;
    }

    let (message, parents, tree) = if fields.len() >= FULL_FIELDS {
        let tail = fields.len() - 2;
        (fields[7..tail].join("|"), fields[tail], fields[tail + 1])
    } else {
        (fields[7].to_string(), fields.get(8).copied().unwrap_or(""), "")
    };

    Some(Commit {
        hash: hash.to_string(),
        message,
        author: Author {
            name: fields[1].to_string(),
            email: fields[2].to_string(),
        },
        committer: Author {
            name: fields[4].to_string(),
            email: fields[5].to_string(),
        },
        author_date: parse_git_date(fields[3]),
        committer_date: parse_git_date(fields[6]),
        parent_hashes: parents.split_whitespace().map(str::to_string).collect(),
        tree_hash: tree.trim().to_string(),
        stats: CommitStats::default(),
    })
}

/// Parse a `YYYY-MM-DD HH:MM:SS ±ZZZZ` date, keeping its offset
pub fn parse_git_date(value: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_str(value.trim(), GIT_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(value, error = %e, "unparsable commit date");
            None
        }
    }
}

/// Parse `insertions<TAB>deletions<TAB>path`; `-` marks a binary file.
///
/// Quoted paths (non-ASCII names under `core.quotePath`) are unquoted.
pub fn parse_numstat(line: &str) -> Option<FileChange> {
    let mut parts = line.splitn(3, '\t');
    let insertions = parts.next()?.trim();
    let deletions = parts.next()?.trim();
    let path = unquote_path(parts.next()?.trim());

    if insertions == "-" || deletions == "-" {
        return Some(FileChange::binary(path));
    }

    let insertions = insertions.parse().ok()?;
    let deletions = deletions.parse().ok()?;
    Some(FileChange::new(path, insertions, deletions))
}
