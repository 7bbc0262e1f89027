//! Provider abstraction and the data service.
//!
//! A [`Provider`] answers the four data questions (tree, commits, activity,
//! file stats) for one repository, whether that repository is a local
//! checkout or a remote GitHub reference. [`Service`] wraps a provider and
//! applies the error policy: tree fetches never fail, they degrade to an
//! error tree the front end can render.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::git;
use crate::model::{ActivityMap, CommitInfo, FileStat, RawNode};
use crate::remote::{GitHubClient, RepoRef, GITHUB_CODE};
use crate::scanner::{self, default_ignore_list};

/// What slice of history a tree (or stats) request is about.
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    /// Snapshot at a single commit; `None` means the live working tree.
    pub commit: Option<String>,
    /// Diff base. With `commit` set, statuses come from `base..commit`.
    pub base: Option<String>,
    /// Inclusive date range; unions statuses across the range's commits.
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Folder names excluded from the tree.
    pub ignore: Vec<String>,
}

impl TreeQuery {
    pub fn live() -> Self {
        Self {
            ignore: default_ignore_list(),
            ..Self::default()
        }
    }

    pub fn at_commit(commit: impl Into<String>) -> Self {
        Self {
            commit: Some(commit.into()),
            ignore: default_ignore_list(),
            ..Self::default()
        }
    }
}

pub trait Provider {
    fn tree(&self, query: &TreeQuery) -> Result<RawNode>;
    fn commits(&self) -> Result<Vec<CommitInfo>>;
    fn activity(&self, days: u32) -> Result<ActivityMap>;
    fn file_stats(&self, query: &TreeQuery) -> Result<Vec<FileStat>>;
    /// Human-readable identity, shown in logs and the TUI title.
    fn describe(&self) -> String;
}

/// Local checkout: live trees come from a working-tree walk, historical ones
/// from `ls-tree` at the commit; statuses from porcelain or name-status.
pub struct LocalProvider {
    repo: PathBuf,
}

impl LocalProvider {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    fn live_tree(&self, ignore: &[String]) -> Result<RawNode> {
        let statuses = git::status_map(&self.repo)?;
        scanner::scan_worktree(&self.repo, ignore, &statuses)
    }

    fn commit_tree(&self, query: &TreeQuery, commit: &str) -> Result<RawNode> {
        let listing = git::ls_tree(&self.repo, commit)?;
        let statuses = match (&query.base, &query.range) {
            (Some(base), _) => git::diff_status_map(&self.repo, base, commit)?,
            (None, Some((start, end))) => self.range_statuses(*start, *end)?,
            (None, None) => git::commit_status_map(&self.repo, commit)?,
        };
        Ok(scanner::tree_from_listing(
            &listing,
            &statuses,
            git::COMMITTED_CODE,
            &query.ignore,
        ))
    }

    fn range_statuses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, crate::model::GitStatus>> {
        let hashes = git::commits_in_range(&self.repo, start, end)?;
        if hashes.is_empty() {
            return Err(Error::EmptyRange { start, end });
        }
        let maps = hashes
            .iter()
            .map(|hash| git::commit_status_map(&self.repo, hash))
            .collect::<Result<Vec<_>>>()?;
        Ok(git::merge_range_statuses(maps))
    }
}

impl Provider for LocalProvider {
    fn tree(&self, query: &TreeQuery) -> Result<RawNode> {
        match (&query.commit, &query.range) {
            (Some(commit), _) => self.commit_tree(query, commit),
            // Range with no explicit commit: snapshot at the newest commit in
            // the range, statuses unioned across it.
            (None, Some((start, end))) => {
                let hashes = git::commits_in_range(&self.repo, *start, *end)?;
                let Some(newest) = hashes.first() else {
                    return Err(Error::EmptyRange {
                        start: *start,
                        end: *end,
                    });
                };
                let listing = git::ls_tree(&self.repo, newest)?;
                let statuses = self.range_statuses(*start, *end)?;
                Ok(scanner::tree_from_listing(
                    &listing,
                    &statuses,
                    git::COMMITTED_CODE,
                    &query.ignore,
                ))
            }
            (None, None) => self.live_tree(&query.ignore),
        }
    }

    fn commits(&self) -> Result<Vec<CommitInfo>> {
        git::commits(&self.repo)
    }

    fn activity(&self, days: u32) -> Result<ActivityMap> {
        git::activity_map(&self.repo, days)
    }

    fn file_stats(&self, query: &TreeQuery) -> Result<Vec<FileStat>> {
        match (&query.commit, &query.base, &query.range) {
            (Some(commit), Some(base), _) => git::diff_file_stats(&self.repo, base, commit),
            (Some(commit), None, _) => git::commit_file_stats(&self.repo, commit),
            (None, _, Some((start, end))) => git::range_file_stats(&self.repo, *start, *end),
            (None, _, None) => git::worktree_file_stats(&self.repo),
        }
    }

    fn describe(&self) -> String {
        self.repo.display().to_string()
    }
}

/// GitHub repository reached over the REST API. There is no working tree, so
/// "live" means the branch tip with no change statuses.
pub struct RemoteProvider {
    repo: RepoRef,
    client: GitHubClient,
}

impl RemoteProvider {
    pub fn new(repo: RepoRef, token: Option<String>) -> Result<Self> {
        let client = GitHubClient::new(token)?;
        Ok(Self { repo, client })
    }

    fn range_statuses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Vec<String>, HashMap<String, crate::model::GitStatus>)> {
        let shas = self.client.commits_between(&self.repo, start, end)?;
        if shas.is_empty() {
            return Err(Error::EmptyRange { start, end });
        }
        let maps = shas
            .iter()
            .map(|sha| self.client.commit_status_map(&self.repo, sha))
            .collect::<Result<Vec<_>>>()?;
        Ok((shas, git::merge_range_statuses(maps)))
    }
}

impl Provider for RemoteProvider {
    fn tree(&self, query: &TreeQuery) -> Result<RawNode> {
        let (listing, statuses) = match (&query.commit, &query.range) {
            (Some(commit), _) => {
                let listing = self.client.commit_listing(&self.repo, commit)?;
                let statuses = match &query.base {
                    Some(base) => self.client.compare_status_map(&self.repo, base, commit)?,
                    None => self.client.commit_status_map(&self.repo, commit)?,
                };
                (listing, statuses)
            }
            (None, Some((start, end))) => {
                let (shas, statuses) = self.range_statuses(*start, *end)?;
                let listing = self.client.commit_listing(&self.repo, &shas[0])?;
                (listing, statuses)
            }
            (None, None) => (self.client.branch_listing(&self.repo)?, HashMap::new()),
        };
        Ok(scanner::tree_from_listing(
            &listing,
            &statuses,
            GITHUB_CODE,
            &query.ignore,
        ))
    }

    fn commits(&self) -> Result<Vec<CommitInfo>> {
        self.client.commits(&self.repo, git::COMMIT_LIST_LIMIT)
    }

    fn activity(&self, days: u32) -> Result<ActivityMap> {
        self.client.activity_map(&self.repo, days)
    }

    fn file_stats(&self, query: &TreeQuery) -> Result<Vec<FileStat>> {
        match (&query.commit, &query.base, &query.range) {
            (Some(commit), Some(base), _) => {
                self.client.compare_file_stats(&self.repo, base, commit)
            }
            (Some(commit), None, _) => self.client.commit_file_stats(&self.repo, commit),
            (None, _, Some((start, end))) => {
                let shas = self.client.commits_between(&self.repo, *start, *end)?;
                if shas.is_empty() {
                    return Err(Error::EmptyRange {
                        start: *start,
                        end: *end,
                    });
                }
                // Oldest..newest covers the whole range in one compare call.
                let oldest = shas.last().map(String::as_str).unwrap_or_default();
                self.client.compare_file_stats(&self.repo, oldest, &shas[0])
            }
            (None, _, None) => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        match &self.repo.branch {
            Some(branch) => format!("{}/{}@{branch}", self.repo.owner, self.repo.repo),
            None => format!("{}/{}", self.repo.owner, self.repo.repo),
        }
    }
}

/// Front door for both front ends. Tree fetches degrade instead of failing.
pub struct Service {
    provider: Box<dyn Provider + Send + Sync>,
}

impl Service {
    pub fn new(provider: Box<dyn Provider + Send + Sync>) -> Self {
        Self { provider }
    }

    pub fn local(repo: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(LocalProvider::new(repo)))
    }

    pub fn remote(repo: RepoRef, token: Option<String>) -> Result<Self> {
        Ok(Self::new(Box::new(RemoteProvider::new(repo, token)?)))
    }

    pub fn describe(&self) -> String {
        self.provider.describe()
    }

    /// Fetch the raw tree. Any failure becomes a renderable error tree, so
    /// callers never need a fallback path.
    pub fn data(&self, query: &TreeQuery) -> RawNode {
        match self.provider.tree(query) {
            Ok(tree) => {
                info!(files = tree.value, "tree fetched");
                tree
            }
            Err(err) => {
                warn!(%err, "tree fetch failed");
                RawNode::error_tree(err.to_string())
            }
        }
    }

    pub fn commits(&self) -> Result<Vec<CommitInfo>> {
        self.provider.commits()
    }

    pub fn activity(&self, days: u32) -> Result<ActivityMap> {
        self.provider.activity(days)
    }

    pub fn file_stats(&self, query: &TreeQuery) -> Result<Vec<FileStat>> {
        self.provider.file_stats(query)
    }
}
