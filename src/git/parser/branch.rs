use crate::git::model::BranchEntry;

const REMOTE_PREFIX: &str = "remotes/";

/// Parse `git branch -a` output.
///
/// The current-branch (`*`) and linked-worktree (`+`) markers are stripped, `HEAD -> target` aliases and
/// detached-HEAD placeholders are dropped, and `remotes/origin/x` becomes
/// `origin/x` so remote names share the local namespace.
pub fn parse_branch_list(output: &str) -> Vec<BranchEntry> {
    let mut branches = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() || line.contains("HEAD ->") {
            continue;
        }

        // Format: * main
        // or:     + checked-out-in-another-worktree
        // or:       remotes/origin/feature-x
        let entry = line.trim();
        let (is_current, name) = if let Some(rest) = entry.strip_prefix('*') {
            (true, rest.trim_start())
        } else if let Some(rest) = entry.strip_prefix("+ ") {
            (false, rest.trim_start())
        } else {
            (false, entry)
        };

        // (HEAD detached at 1a2b3c4)
        if name.is_empty() || name.starts_with('(') {
            continue;
        }

        let (name, is_remote) = match name.strip_prefix(REMOTE_PREFIX) {
            Some(rest) => (rest, true),
            None => (name, false),
        };

        branches.push(BranchEntry {
            name: name.to_string(),
            is_current,
            is_remote,
        });
    }

    branches
}
