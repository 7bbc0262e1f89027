//! Remote provider: equivalent trees built from the GitHub REST API.
//!
//! The HTTP client is async, but the async-ness is confined here: a
//! current-thread runtime drives each request to completion so callers see
//! the same synchronous provider surface as the local scanner. Responses are
//! cached by URL for the lifetime of the client.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ActivityMap, CommitInfo, FileStat, GitStatus};

const API_BASE: &str = "https://api.github.com";

/// Synthetic status code for files whose tree came from the GitHub API.
pub const GITHUB_CODE: &str = "GH";

/// A parsed `owner/repo[@branch]` reference. Accepts bare `owner/repo`,
/// `github.com/owner/repo(.git)` URLs, and `.../tree/branch` URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim().trim_end_matches('/');

        if let Some(idx) = input.find("github.com/") {
            let rest = &input[idx + "github.com/".len()..];
            let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
            if parts.len() >= 2 {
                let owner = parts[0].to_string();
                let repo = parts[1].trim_end_matches(".git").to_string();
                let branch = (parts.len() >= 4 && parts[2] == "tree")
                    .then(|| parts[3].to_string());
                return Ok(RepoRef {
                    owner,
                    repo,
                    branch,
                });
            }
            return Err(Error::RepoRef(input.to_string()));
        }

        // Bare owner/repo, optionally @branch.
        let (spec, branch) = match input.split_once('@') {
            Some((spec, branch)) => (spec, Some(branch.to_string())),
            None => (input, None),
        };
        match spec.split('/').collect::<Vec<_>>()[..] {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(RepoRef {
                owner: owner.to_string(),
                repo: repo.trim_end_matches(".git").to_string(),
                branch,
            }),
            _ => Err(Error::RepoRef(input.to_string())),
        }
    }
}

pub struct GitHubClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    token: Option<String>,
    cache: Mutex<HashMap<String, Value>>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("codemap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            http,
            runtime,
            token,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn get(&self, url: &str) -> Result<Value> {
        if let Some(hit) = self.cache.lock().expect("cache lock").get(url) {
            return Ok(hit.clone());
        }
        debug!(%url, "GitHub API request");

        let value = self.runtime.block_on(async {
            let mut req = self
                .http
                .get(url)
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = &self.token {
                req = req.header("Authorization", format!("token {token}"));
            }
            let resp = req.send().await?;
            let status = resp.status();
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            if !status.is_success() {
                let message = body["message"]
                    .as_str()
                    .unwrap_or_else(|| status.as_str())
                    .to_string();
                return Err(Error::GitHub {
                    status: status.as_u16(),
                    message,
                });
            }
            Ok(body)
        })?;

        self.cache
            .lock()
            .expect("cache lock")
            .insert(url.to_string(), value.clone());
        Ok(value)
    }

    pub fn default_branch(&self, repo: &RepoRef) -> Result<String> {
        let url = format!("{API_BASE}/repos/{}/{}", repo.owner, repo.repo);
        let body = self.get(&url)?;
        Ok(body["default_branch"].as_str().unwrap_or("main").to_string())
    }

    fn branch_of(&self, repo: &RepoRef) -> Result<String> {
        match &repo.branch {
            Some(branch) => Ok(branch.clone()),
            None => self.default_branch(repo),
        }
    }

    /// Recursive blob listing at a ref, as `(path, size)` pairs.
    pub fn tree_listing(&self, repo: &RepoRef, git_ref: &str) -> Result<Vec<(String, u64)>> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/git/trees/{git_ref}?recursive=1",
            repo.owner, repo.repo
        );
        let body = self.get(&url)?;
        Ok(parse_tree_listing(&body))
    }

    /// Blob listing at the configured (or default) branch tip.
    pub fn branch_listing(&self, repo: &RepoRef) -> Result<Vec<(String, u64)>> {
        let branch = self.branch_of(repo)?;
        self.tree_listing(repo, &branch)
    }

    pub fn commits(&self, repo: &RepoRef, limit: usize) -> Result<Vec<CommitInfo>> {
        let mut url = format!(
            "{API_BASE}/repos/{}/{}/commits?per_page={limit}",
            repo.owner, repo.repo
        );
        if let Some(branch) = &repo.branch {
            url.push_str(&format!("&sha={branch}"));
        }
        let body = self.get(&url)?;
        Ok(parse_commit_list(&body))
    }

    pub fn commits_between(
        &self,
        repo: &RepoRef,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<String>> {
        let since = format!("{start}T00:00:00Z");
        let until = format!("{end}T23:59:59Z");
        let mut url = format!(
            "{API_BASE}/repos/{}/{}/commits?since={since}&until={until}&per_page=100",
            repo.owner, repo.repo
        );
        if let Some(branch) = &repo.branch {
            url.push_str(&format!("&sha={branch}"));
        }
        let body = self.get(&url)?;
        Ok(body
            .as_array()
            .map(|commits| {
                commits
                    .iter()
                    .filter_map(|c| c["sha"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn commit(&self, repo: &RepoRef, sha: &str) -> Result<Value> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/commits/{sha}",
            repo.owner, repo.repo
        );
        self.get(&url)
    }

    /// Tree listing at a specific commit.
    pub fn commit_listing(&self, repo: &RepoRef, sha: &str) -> Result<Vec<(String, u64)>> {
        let commit = self.commit(repo, sha)?;
        let tree_sha = commit["commit"]["tree"]["sha"]
            .as_str()
            .unwrap_or(sha)
            .to_string();
        self.tree_listing(repo, &tree_sha)
    }

    /// Files changed in one commit, mapped to our statuses.
    pub fn commit_status_map(&self, repo: &RepoRef, sha: &str) -> Result<HashMap<String, GitStatus>> {
        let commit = self.commit(repo, sha)?;
        Ok(parse_commit_files(&commit))
    }

    /// Files changed between two commits via the compare API.
    pub fn compare_status_map(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<HashMap<String, GitStatus>> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/compare/{base}...{head}",
            repo.owner, repo.repo
        );
        let body = self.get(&url)?;
        Ok(parse_commit_files(&body))
    }

    pub fn commit_file_stats(&self, repo: &RepoRef, sha: &str) -> Result<Vec<FileStat>> {
        let commit = self.commit(repo, sha)?;
        Ok(parse_file_stats(&commit))
    }

    pub fn compare_file_stats(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<FileStat>> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/compare/{base}...{head}",
            repo.owner, repo.repo
        );
        let body = self.get(&url)?;
        Ok(parse_file_stats(&body))
    }

    /// Change counts over a trailing day window, summed across the window's
    /// commits. Bounded by one listing page, like the commit dropdown.
    pub fn activity_map(&self, repo: &RepoRef, days: u32) -> Result<ActivityMap> {
        let today = Utc::now().date_naive();
        let start = today - chrono::Duration::days(days as i64);
        let shas = self.commits_between(repo, start, today)?;

        let mut map = ActivityMap::new();
        for sha in shas {
            let commit = self.commit(repo, &sha)?;
            if let Some(files) = commit["files"].as_array() {
                for file in files {
                    if let Some(name) = file["filename"].as_str() {
                        *map.entry(name.to_string()).or_insert(0) += 1;
                    }
                }
            }
        }
        Ok(map)
    }
}

/// Blobs only; sizes floored at 1 so every file stays visible.
fn parse_tree_listing(body: &Value) -> Vec<(String, u64)> {
    body["tree"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e["type"].as_str() == Some("blob"))
                .filter_map(|e| {
                    let path = e["path"].as_str()?;
                    let size = e["size"].as_u64().unwrap_or(1).max(1);
                    Some((path.to_string(), size))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Short hash, first message line, author, ISO date — the same shape the
/// local `git log` parser produces.
fn parse_commit_list(body: &Value) -> Vec<CommitInfo> {
    body.as_array()
        .map(|commits| {
            commits
                .iter()
                .filter_map(|c| {
                    let sha = c["sha"].as_str()?;
                    let commit = &c["commit"];
                    Some(CommitInfo {
                        hash: sha.chars().take(7).collect(),
                        msg: commit["message"]
                            .as_str()
                            .unwrap_or("")
                            .lines()
                            .next()
                            .unwrap_or("")
                            .to_string(),
                        author: commit["author"]["name"].as_str().unwrap_or("").to_string(),
                        date: commit["author"]["date"].as_str().unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_commit_files(body: &Value) -> HashMap<String, GitStatus> {
    let mut map = HashMap::new();
    if let Some(files) = body["files"].as_array() {
        for file in files {
            let Some(name) = file["filename"].as_str() else {
                continue;
            };
            let status = match file["status"].as_str() {
                Some("modified") => GitStatus::Modified,
                Some("added") => GitStatus::Created,
                Some("removed") => GitStatus::Deleted,
                Some("renamed") => GitStatus::Modified,
                _ => continue,
            };
            map.insert(name.to_string(), status);
        }
    }
    map
}

fn parse_file_stats(body: &Value) -> Vec<FileStat> {
    body["files"]
        .as_array()
        .map(|files| {
            files
                .iter()
                .filter_map(|file| {
                    Some(FileStat {
                        file: file["filename"].as_str()?.to_string(),
                        added: file["additions"].as_u64().unwrap_or(0),
                        removed: file["deletions"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
