//! GitLab panel: configured projects, or the account profile

use super::profile::{field, Profile, ProfileWidget, RepoStats};
use super::Payload;
use ratatui::text::Line;
use reqwest::Url;
use serde::Deserialize;

pub type GitLabWidget = ProfileWidget<GitLabUser>;

/// Subset of `GET /api/v4/user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitLabUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_url: String,
}

/// Subset of `GET /projects/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabProject {
    #[serde(default)]
    pub star_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    /// Absent when the project has issues disabled
    #[serde(default)]
    pub open_issues_count: u64,
}

impl Profile for GitLabUser {
    type Repo = GitLabProject;

    const TITLE: &'static str = "GitLab";
    const DEFAULT_URL: &'static str = "https://gitlab.com/api/v4/user";
    const UNAUTHORIZED_HINT: &'static str = "Set GITLAB_TOKEN to load private data";

    fn auth_header(token: &str) -> (&'static str, String) {
        ("PRIVATE-TOKEN", token.to_string())
    }

    fn into_payload(self) -> Payload {
        Payload::GitLab(self)
    }

    fn from_payload(payload: &Payload) -> Option<&Self> {
        match payload {
            Payload::GitLab(user) => Some(user),
            _ => None,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field("User", &self.username),
            field("Name", &self.name),
            field("URL", &self.web_url),
        ]
    }

    /// Numeric id or full path; the path is sent as one encoded segment
    fn repo_url(api_base: &Url, repo: &str) -> Option<Url> {
        let id = repo.trim().trim_matches('/');
        if id.is_empty() {
            return None;
        }
        let mut url = api_base.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["projects", id]);
        Some(url)
    }

    fn repo_stats(name: &str, project: GitLabProject) -> RepoStats {
        RepoStats {
            name: name.to_string(),
            stars: project.star_count,
            forks: project.forks_count,
            open_issues: project.open_issues_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoConfig;
    use crate::tui::{DashEvent, WidgetId};
    use crate::widgets::Widget;
    use std::time::Duration;

    #[test]
    fn test_decode_and_render() {
        let user: GitLabUser = serde_json::from_str(
            r#"{"id":7,"username":"jdoe","name":"Jane Doe","web_url":"https://gitlab.com/jdoe"}"#,
        )
        .unwrap();

        let mut w = GitLabWidget::new(WidgetId(7), &RepoConfig::default(), Duration::from_secs(600));
        assert_eq!(w.url(), "https://gitlab.com/api/v4/user");
        w.update(&DashEvent::Fetched {
            widget: WidgetId(7),
            result: Ok(Payload::GitLab(user)),
        });

        let body = w.render(40, 6).to_string();
        assert!(body.starts_with("User: jdoe\nName: Jane Doe\nURL: https://gitlab.com/jdoe\nUpdated "));
    }

    #[test]
    fn test_foreign_payload_is_rejected() {
        let mut w = GitLabWidget::new(WidgetId(7), &RepoConfig::default(), Duration::from_secs(600));
        w.update(&DashEvent::Fetched {
            widget: WidgetId(7),
            result: Ok(Payload::Text("nope".to_string())),
        });
        assert!(w.render(40, 6).to_string().starts_with("Error: unexpected payload"));
    }

    #[test]
    fn test_project_urls_are_encoded() {
        let cfg = RepoConfig {
            repos: vec!["gitlab-org/gitlab".to_string(), "278964".to_string(), " ".to_string()],
            ..Default::default()
        };
        let w = GitLabWidget::new(WidgetId(7), &cfg, Duration::from_secs(600));
        let urls: Vec<String> = w
            .repo_urls()
            .unwrap()
            .into_iter()
            .map(|(_, url)| url.to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://gitlab.com/api/v4/projects/gitlab-org%2Fgitlab",
                "https://gitlab.com/api/v4/projects/278964",
            ]
        );
    }

    #[test]
    fn test_project_stats() {
        let project: GitLabProject =
            serde_json::from_str(r#"{"id":278964,"star_count":5000,"forks_count":10000}"#).unwrap();
        let stats = GitLabUser::repo_stats("gitlab-org/gitlab", project);
        assert_eq!(stats.stars, 5000);
        assert_eq!(stats.forks, 10000);
        assert_eq!(stats.open_issues, 0);
    }

    #[test]
    fn test_private_token_header() {
        assert_eq!(
            GitLabUser::auth_header("glpat-1"),
            ("PRIVATE-TOKEN", "glpat-1".to_string())
        );
    }
}
