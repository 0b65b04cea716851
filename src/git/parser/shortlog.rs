use regex::Regex;
use std::sync::LazyLock;

use crate::git::model::Contributor;

static SHORTLOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(.+?)\s+<([^>]*)>\s*$").expect("shortlog pattern is valid")
});

/// Parse `git shortlog -sne` output: `  <count>\t<name> <email>` per line
pub fn parse_shortlog(output: &str) -> Vec<Contributor> {
    output
        .lines()
        .filter_map(|line| {
            let contributor = parse_contributor(line);
            if contributor.is_none() && !line.trim().is_empty() {
                tracing::debug!(line, "skipping shortlog line");
            }
            contributor
        })
        .collect()
}

fn parse_contributor(line: &str) -> Option<Contributor> {
    let caps = SHORTLOG_LINE.captures(line)?;
    let total_commits = caps[1].parse().ok()?;

    Some(Contributor {
        name: caps[2].to_string(),
        email: caps[3].to_string(),
        total_commits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shortlog() {
        let output = "    42\tJane Doe <jane@example.com>\n     3\tBob <bob@example.com>\n";
        let contributors = parse_shortlog(output);

        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].name, "Jane Doe");
        assert_eq!(contributors[0].email, "jane@example.com");
        assert_eq!(contributors[0].total_commits, 42);
        assert_eq!(contributors[1].total_commits, 3);
    }

    #[test]
    fn test_space_separated_count() {
        let contributors = parse_shortlog("  7  Ann Lee <ann@x.io>");
        assert_eq!(contributors[0].name, "Ann Lee");
        assert_eq!(contributors[0].total_commits, 7);
    }

    #[test]
    fn test_skips_non_matching_lines() {
        let output = "Jane <jane@example.com>\n  12\tNo Email\n   5\tValid <v@x>\n";
        let contributors = parse_shortlog(output);

        assert_eq!(contributors.len(), 1);
        assert_eq!(contributors[0].email, "v@x");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_shortlog("").is_empty());
    }
}
