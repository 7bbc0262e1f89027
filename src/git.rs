//! Git subprocess layer: runs `git` as an opaque service and parses its
//! porcelain/name-status/ls-tree/numstat output into the maps and listings
//! the local provider assembles trees from.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityMap, CommitInfo, FileStat, GitStatus};

/// Number of commits listed by `commits`.
pub const COMMIT_LIST_LIMIT: usize = 50;

/// Status code attached to files whose status came from commit history
/// rather than the working tree.
pub const COMMITTED_CODE: &str = "C ";

pub fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    debug!(?args, repo = %repo.display(), "running git");
    let output = Command::new("git").arg("-C").arg(repo).args(args).output()?;
    if !output.status.success() {
        return Err(Error::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Map a 2-character porcelain code to a status. Checked in the same order
/// the original tooling used: M, then A, then D, then untracked.
fn porcelain_status(code: &str) -> GitStatus {
    if code.contains('M') {
        GitStatus::Modified
    } else if code.contains('A') {
        GitStatus::Created
    } else if code.contains('D') {
        GitStatus::Deleted
    } else if code == "??" {
        GitStatus::Untracked
    } else {
        GitStatus::Clean
    }
}

/// Parse `git status --porcelain` output into path -> (status, raw code).
pub fn parse_porcelain(output: &str) -> HashMap<String, (GitStatus, String)> {
    let mut map = HashMap::new();
    for line in output.lines() {
        if line.len() < 4 {
            continue;
        }
        let code = &line[..2];
        let file = line[3..].trim();
        if file.is_empty() {
            continue;
        }
        map.insert(file.to_string(), (porcelain_status(code), code.to_string()));
    }
    map
}

/// Working-tree status map.
pub fn status_map(repo: &Path) -> Result<HashMap<String, (GitStatus, String)>> {
    Ok(parse_porcelain(&run_git(repo, &["status", "--porcelain"])?))
}

/// Parse `--name-status` output (`X\tpath` lines) into path -> status.
pub fn parse_name_status(output: &str) -> HashMap<String, GitStatus> {
    let mut map = HashMap::new();
    for line in output.lines() {
        let mut parts = line.split('\t');
        let (Some(code), Some(file)) = (parts.next(), parts.next()) else {
            continue;
        };
        let status = match code.chars().next() {
            Some('M') => GitStatus::Modified,
            Some('A') => GitStatus::Created,
            Some('D') => GitStatus::Deleted,
            // Renames carry the new path in a third column.
            Some('R') => {
                if let Some(new_path) = parts.next() {
                    map.insert(new_path.to_string(), GitStatus::Modified);
                }
                continue;
            }
            _ => continue,
        };
        map.insert(file.to_string(), status);
    }
    map
}

/// Files changed in a single commit relative to its parent.
pub fn commit_status_map(repo: &Path, hash: &str) -> Result<HashMap<String, GitStatus>> {
    let out = run_git(repo, &["show", "--name-status", "--format=", hash])?;
    Ok(parse_name_status(&out))
}

/// Files changed between two commits.
pub fn diff_status_map(repo: &Path, base: &str, target: &str) -> Result<HashMap<String, GitStatus>> {
    let out = run_git(repo, &["diff", "--name-status", base, target])?;
    Ok(parse_name_status(&out))
}

/// Parse `git ls-tree -r -l --full-tree` output into (path, blob size).
pub fn parse_ls_tree(output: &str) -> Vec<(String, u64)> {
    let mut items = Vec::new();
    for line in output.lines() {
        let Some((meta, path)) = line.split_once('\t') else {
            continue;
        };
        // <mode> <type> <object> <size>
        let mut fields = meta.split_whitespace();
        let kind = fields.nth(1);
        if kind != Some("blob") {
            continue;
        }
        let size = fields.nth(1).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        items.push((path.to_string(), size));
    }
    items
}

/// Full file listing at a commit.
pub fn ls_tree(repo: &Path, hash: &str) -> Result<Vec<(String, u64)>> {
    let out = run_git(repo, &["ls-tree", "-r", "-l", "--full-tree", hash])?;
    Ok(parse_ls_tree(&out))
}

/// Parse the `%h|%s|%an|%ad` log format. Hashes never contain `|` and the
/// author/date fields come last, so the hash splits off the left and the
/// author/date off the right; anything between is the subject, pipes and all.
pub fn parse_commit_log(output: &str) -> Vec<CommitInfo> {
    output
        .lines()
        .filter(|l| !l.is_empty())
        .filter_map(|line| {
            let (hash, rest) = line.split_once('|')?;
            let mut tail = rest.rsplitn(3, '|');
            let date = tail.next()?;
            let author = tail.next()?;
            let msg = tail.next()?;
            Some(CommitInfo {
                hash: hash.to_string(),
                msg: msg.to_string(),
                author: author.to_string(),
                date: date.to_string(),
            })
        })
        .collect()
}

/// Most recent commits, newest first.
pub fn commits(repo: &Path) -> Result<Vec<CommitInfo>> {
    let limit = format!("-n{COMMIT_LIST_LIMIT}");
    let out = run_git(
        repo,
        &[
            "log",
            &limit,
            "--pretty=format:%h|%s|%an|%ad",
            "--date=iso",
        ],
    )?;
    Ok(parse_commit_log(&out))
}

fn since_arg(date: NaiveDate) -> String {
    format!("--since={date} 00:00:00")
}

fn until_arg(date: NaiveDate) -> String {
    // End date is inclusive.
    format!("--until={date} 23:59:59")
}

/// Commit hashes in an inclusive date range, newest first.
pub fn commits_in_range(repo: &Path, start: NaiveDate, end: NaiveDate) -> Result<Vec<String>> {
    let since = since_arg(start);
    let until = until_arg(end);
    let out = run_git(repo, &["log", "--pretty=format:%H", &since, &until])?;
    Ok(out.lines().filter(|l| !l.is_empty()).map(String::from).collect())
}

/// Union per-commit statuses across a range. Conflicts resolve by the fixed
/// priority deleted > created > modified > clean.
pub fn merge_range_statuses(
    maps: impl IntoIterator<Item = HashMap<String, GitStatus>>,
) -> HashMap<String, GitStatus> {
    fn rank(status: GitStatus) -> u8 {
        match status {
            GitStatus::Deleted => 3,
            GitStatus::Created => 2,
            GitStatus::Modified => 1,
            _ => 0,
        }
    }

    let mut merged: HashMap<String, GitStatus> = HashMap::new();
    for map in maps {
        for (path, status) in map {
            merged
                .entry(path)
                .and_modify(|existing| {
                    if rank(status) > rank(*existing) {
                        *existing = status;
                    }
                })
                .or_insert(status);
        }
    }
    merged
}

/// Count file appearances in commits over a trailing day window.
pub fn parse_activity_log(output: &str) -> ActivityMap {
    let mut map = ActivityMap::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        *map.entry(line.to_string()).or_insert(0) += 1;
    }
    map
}

/// File path -> change count over the trailing `days` window.
pub fn activity_map(repo: &Path, days: u32) -> Result<ActivityMap> {
    let since = format!("--since={days} days ago");
    let out = run_git(repo, &["log", &since, "--name-only", "--format="])?;
    Ok(parse_activity_log(&out))
}

/// Parse `--numstat` output (`added\tremoved\tpath`) keeping first-seen file
/// order; repeated files (range queries) accumulate. Binary files report `-`
/// and count as zero.
pub fn parse_numstat(output: &str) -> Vec<FileStat> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (u64, u64)> = HashMap::new();

    for line in output.lines() {
        let mut parts = line.split('\t');
        let (Some(added), Some(removed), Some(file)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let added = added.parse::<u64>().unwrap_or(0);
        let removed = removed.parse::<u64>().unwrap_or(0);
        let entry = totals.entry(file.to_string()).or_insert_with(|| {
            order.push(file.to_string());
            (0, 0)
        });
        entry.0 += added;
        entry.1 += removed;
    }

    order
        .into_iter()
        .map(|file| {
            let (added, removed) = totals[&file];
            FileStat {
                file,
                added,
                removed,
            }
        })
        .collect()
}

/// Line stats for a single commit relative to its parent.
pub fn commit_file_stats(repo: &Path, hash: &str) -> Result<Vec<FileStat>> {
    let out = run_git(repo, &["show", "--numstat", "--format=", hash])?;
    Ok(parse_numstat(&out))
}

/// Line stats between two commits.
pub fn diff_file_stats(repo: &Path, base: &str, target: &str) -> Result<Vec<FileStat>> {
    let out = run_git(repo, &["diff", "--numstat", base, target])?;
    Ok(parse_numstat(&out))
}

/// Line stats of the working tree against HEAD.
pub fn worktree_file_stats(repo: &Path) -> Result<Vec<FileStat>> {
    let out = run_git(repo, &["diff", "--numstat", "HEAD"])?;
    Ok(parse_numstat(&out))
}

/// Aggregated line stats over all commits in an inclusive date range.
pub fn range_file_stats(repo: &Path, start: NaiveDate, end: NaiveDate) -> Result<Vec<FileStat>> {
    let since = since_arg(start);
    let until = until_arg(end);
    let out = run_git(repo, &["log", "--numstat", "--format=", &since, &until])?;
    Ok(parse_numstat(&out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porcelain_parsing() {
        let output = " M src/main.rs\nM  src/lib.rs\nMM src/mixed.rs\nA  new.rs\nD  gone.rs\n?? notes.txt\n";
        let map = parse_porcelain(output);

        assert_eq!(
            map["src/main.rs"],
            (GitStatus::Modified, " M".to_string())
        );
        assert_eq!(map["src/lib.rs"], (GitStatus::Modified, "M ".to_string()));
        assert_eq!(map["src/mixed.rs"], (GitStatus::Modified, "MM".to_string()));
        assert_eq!(map["new.rs"], (GitStatus::Created, "A ".to_string()));
        assert_eq!(map["gone.rs"], (GitStatus::Deleted, "D ".to_string()));
        assert_eq!(map["notes.txt"], (GitStatus::Untracked, "??".to_string()));
    }

    #[test]
    fn name_status_parsing_includes_renames() {
        let output = "M\tsrc/a.rs\nA\tsrc/b.rs\nD\tsrc/c.rs\nR100\told.rs\tnew.rs\n";
        let map = parse_name_status(output);
        assert_eq!(map["src/a.rs"], GitStatus::Modified);
        assert_eq!(map["src/b.rs"], GitStatus::Created);
        assert_eq!(map["src/c.rs"], GitStatus::Deleted);
        assert_eq!(map["new.rs"], GitStatus::Modified);
        assert!(!map.contains_key("old.rs"));
    }

    #[test]
    fn ls_tree_parsing_skips_non_blobs() {
        let output = "100644 blob 8f94c4a 1234\tsrc/main.rs\n\
                      040000 tree 1ab2c3d -\tsrc/sub\n\
                      100644 blob 9e8d7c6 77\tREADME.md\n";
        let items = parse_ls_tree(output);
        assert_eq!(
            items,
            vec![
                ("src/main.rs".to_string(), 1234),
                ("README.md".to_string(), 77)
            ]
        );
    }

    #[test]
    fn commit_log_parsing_keeps_pipes_in_subject() {
        let output = "abc1234|fix: tree | layout glitch|Ada|2024-03-01 10:00:00 +0000\n\
                      def5678|initial commit|Grace|2024-02-28 09:00:00 +0000";
        let commits = parse_commit_log(output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc1234");
        assert_eq!(commits[0].msg, "fix: tree | layout glitch");
        assert_eq!(commits[0].author, "Ada");
        assert_eq!(commits[0].date, "2024-03-01 10:00:00 +0000");
        assert_eq!(commits[1].author, "Grace");
    }

    #[test]
    fn range_merge_priority() {
        let first: HashMap<String, GitStatus> =
            [("a.rs".to_string(), GitStatus::Modified)].into();
        let second: HashMap<String, GitStatus> = [
            ("a.rs".to_string(), GitStatus::Deleted),
            ("b.rs".to_string(), GitStatus::Created),
        ]
        .into();
        let third: HashMap<String, GitStatus> =
            [("b.rs".to_string(), GitStatus::Modified)].into();

        let merged = merge_range_statuses([first, second, third]);
        assert_eq!(merged["a.rs"], GitStatus::Deleted);
        assert_eq!(merged["b.rs"], GitStatus::Created);
    }

    #[test]
    fn activity_counts_appearances() {
        let output = "src/main.rs\nsrc/lib.rs\n\nsrc/main.rs\n\nsrc/main.rs\n";
        let map = parse_activity_log(output);
        assert_eq!(map["src/main.rs"], 3);
        assert_eq!(map["src/lib.rs"], 1);
    }

    #[test]
    fn numstat_accumulates_in_first_seen_order() {
        let output = "10\t2\tsrc/main.rs\n-\t-\tassets/logo.png\n3\t1\tsrc/lib.rs\n5\t0\tsrc/main.rs\n";
        let stats = parse_numstat(output);
        assert_eq!(
            stats,
            vec![
                FileStat {
                    file: "src/main.rs".to_string(),
                    added: 15,
                    removed: 2
                },
                FileStat {
                    file: "assets/logo.png".to_string(),
                    added: 0,
                    removed: 0
                },
                FileStat {
                    file: "src/lib.rs".to_string(),
                    added: 3,
                    removed: 1
                },
            ]
        );
    }
}
