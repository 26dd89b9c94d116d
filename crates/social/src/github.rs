//! Read-only GitHub REST client used for project metrics display and the
//! freshness refresh.

use chrono::DateTime;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::warn;

use crate::SocialError;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "RateZilla-App";

#[derive(Clone, Debug)]
pub struct RepoData {
    pub stars: u64,
    pub forks: u64,
    pub last_update: String,
}

#[derive(Clone, Debug)]
pub struct OrgData {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub last_update: String,
    pub most_recent_repo: String,
    pub repo_count: usize,
}

/// Metrics merged into a project's social metrics during a refresh.
#[derive(Clone, Debug)]
pub struct RepoMetrics {
    pub stars: u64,
    pub forks: u64,
    pub last_update: Option<u64>,
    pub commit_count: u64,
}

#[derive(Deserialize)]
struct RepoResponse {
    stargazers_count: u64,
    forks_count: u64,
    updated_at: String,
}

#[derive(Deserialize)]
struct OrgRepoResponse {
    name: String,
    stargazers_count: u64,
    forks_count: u64,
    updated_at: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    date: Option<String>,
}

#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self { http, token }
    }

    async fn get(&self, url: &str) -> Result<Response, SocialError> {
        let mut request = self.http.get(url).header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .map_err(|e| SocialError::Upstream(e.to_string()))
    }

    pub async fn repo(&self, owner: &str, repo: &str) -> Result<RepoData, SocialError> {
        let response = self.get(&format!("{API_BASE}/repos/{owner}/{repo}")).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SocialError::NotFound("Repository not found".to_string()));
        }
        if !response.status().is_success() {
            return Err(SocialError::Upstream(format!(
                "GitHub API error: {}",
                response.status()
            )));
        }

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| SocialError::Decode(e.to_string()))?;
        Ok(RepoData {
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            last_update: repo.updated_at,
        })
    }

    /// Aggregates stars and forks across an organization's repositories
    /// (first hundred, most recently pushed first).
    pub async fn org(&self, org: &str) -> Result<OrgData, SocialError> {
        let response = self
            .get(&format!("{API_BASE}/orgs/{org}/repos?sort=updated&per_page=100"))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SocialError::NotFound("Organization not found".to_string()));
        }
        if !response.status().is_success() {
            return Err(SocialError::Upstream(format!(
                "GitHub API error: {}",
                response.status()
            )));
        }

        let mut repos: Vec<OrgRepoResponse> = response
            .json()
            .await
            .map_err(|e| SocialError::Decode(e.to_string()))?;
        if repos.is_empty() {
            return Err(SocialError::NotFound(
                "No repositories found for this organization".to_string(),
            ));
        }
        repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let stars = repos.iter().map(|r| r.stargazers_count).sum();
        let forks = repos.iter().map(|r| r.forks_count).sum();
        let most_recent = &repos[0];

        Ok(OrgData {
            name: org.to_string(),
            stars,
            forks,
            last_update: most_recent.updated_at.clone(),
            most_recent_repo: most_recent.name.clone(),
            repo_count: repos.len(),
        })
    }

    /// Fetches refreshed metrics for whatever a project's GitHub URL points at
    /// (a repository or an organization). Failures degrade to `None` so a
    /// metrics refresh can fall back to the caller-supplied values.
    pub async fn repo_metrics(&self, github_url: &str) -> Option<RepoMetrics> {
        let (owner, repo) = extract_owner_and_repo(github_url)?;

        let result = match &repo {
            Some(repo) => {
                let data = self.repo(&owner, repo).await;
                match data {
                    Ok(data) => {
                        let (last_commit, commit_count) = self.commit_info(&owner, repo).await;
                        Ok(RepoMetrics {
                            stars: data.stars,
                            forks: data.forks,
                            last_update: last_commit.or_else(|| rfc3339_to_unix(&data.last_update)),
                            commit_count,
                        })
                    }
                    Err(e) => Err(e),
                }
            }
            None => self.org(&owner).await.map(|data| RepoMetrics {
                stars: data.stars,
                forks: data.forks,
                last_update: rfc3339_to_unix(&data.last_update),
                commit_count: 0,
            }),
        };

        match result {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                warn!("GitHub metrics fetch failed for {github_url}: {e}");
                None
            }
        }
    }

    /// Latest commit timestamp and total commit count for the default branch.
    /// The count comes from the `Link` pagination header at one commit per
    /// page.
    async fn commit_info(&self, owner: &str, repo: &str) -> (Option<u64>, u64) {
        let response = match self
            .get(&format!("{API_BASE}/repos/{owner}/{repo}/commits?per_page=1"))
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("GitHub commits request for {owner}/{repo} returned {}", response.status());
                return (None, 0);
            }
            Err(e) => {
                warn!("GitHub commits request for {owner}/{repo} failed: {e}");
                return (None, 0);
            }
        };

        let commit_count = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(last_page_from_link_header)
            .unwrap_or(1);

        let commits: Vec<CommitResponse> = match response.json().await {
            Ok(commits) => commits,
            Err(e) => {
                warn!("GitHub commits decode for {owner}/{repo} failed: {e}");
                return (None, 0);
            }
        };

        let last_commit = commits
            .first()
            .and_then(|c| c.commit.author.as_ref())
            .and_then(|a| a.date.as_deref())
            .and_then(rfc3339_to_unix);

        (last_commit, commit_count)
    }
}

/// Accepts `https://github.com/owner`, `https://github.com/owner/repo`,
/// optionally with `.git` or trailing slashes. Returns the owner and, when
/// present, the repository name.
pub fn extract_owner_and_repo(github_url: &str) -> Option<(String, Option<String>)> {
    let rest = github_url.split("github.com/").nth(1)?;
    let mut parts = rest.split('/').filter(|s| !s.is_empty());

    let owner = parts.next()?.to_string();
    let repo = parts
        .next()
        .map(|r| r.trim_end_matches(".git").to_string())
        .filter(|r| !r.is_empty());
    Some((owner, repo))
}

/// Pulls the last page number out of a GitHub `Link` header, e.g.
/// `<...&page=347>; rel="last"`.
fn last_page_from_link_header(header: &str) -> Option<u64> {
    for part in header.split(',') {
        if !part.contains("rel=\"last\"") {
            continue;
        }
        let url = part.split('<').nth(1)?.split('>').next()?;
        for param in url.split(['?', '&']) {
            if let Some(page) = param.strip_prefix("page=") {
                return page.parse().ok();
            }
        }
    }
    None
}

fn rfc3339_to_unix(value: &str) -> Option<u64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp().max(0) as u64)
}
