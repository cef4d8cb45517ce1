//! GitHub panel: configured repositories, or the account profile

use super::profile::{field, Profile, ProfileWidget, RepoStats};
use super::Payload;
use ratatui::text::Line;
use reqwest::Url;
use serde::Deserialize;

pub type GitHubWidget = ProfileWidget<GitHubUser>;

/// Subset of `GET /user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
}

/// Subset of `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubRepo {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
}

impl Profile for GitHubUser {
    type Repo = GitHubRepo;

    const TITLE: &'static str = "GitHub";
    const DEFAULT_URL: &'static str = "https://api.github.com/user";
    const UNAUTHORIZED_HINT: &'static str = "Set GITHUB_TOKEN to load private data";

    fn auth_header(token: &str) -> (&'static str, String) {
        ("Authorization", format!("token {token}"))
    }

    fn into_payload(self) -> Payload {
        Payload::GitHub(self)
    }

    fn from_payload(payload: &Payload) -> Option<&Self> {
        match payload {
            Payload::GitHub(user) => Some(user),
            _ => None,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field("User", &self.login),
            field("Name", self.name.as_deref().unwrap_or("")),
            field("Repos", self.public_repos),
            field("Followers", self.followers),
        ]
    }

    /// `owner/name` only
    fn repo_url(api_base: &Url, repo: &str) -> Option<Url> {
        let (owner, name) = repo.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        let mut url = api_base.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["repos", owner, name]);
        Some(url)
    }

    fn repo_stats(name: &str, repo: GitHubRepo) -> RepoStats {
        RepoStats {
            name: name.to_string(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
        }
    }
}
