//! Account and repository panels for repository hosts
//!
//! GitHub and GitLab panels differ only in endpoints, auth header and the
//! fields they show, so both are a [`ProfileWidget`] over a [`Profile`] type.
//! With repositories configured the panel shows their counters; otherwise it
//! falls back to the account profile.

use super::http::{self, ApiResponse};
use super::{error_line, style, updated_line, Payload, RefreshState, Widget};
use crate::config::RepoConfig;
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use futures::future::try_join_all;
use ratatui::text::{Line, Text};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, warn};

/// Counters for one configured repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStats {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
}

/// A user profile served by one hosting service
pub trait Profile: DeserializeOwned + Send + 'static {
    /// Panel title
    const TITLE: &'static str;
    /// Profile endpoint used when the config does not override it
    const DEFAULT_URL: &'static str;
    /// Shown when the service answers 401
    const UNAUTHORIZED_HINT: &'static str;

    /// Header carrying `token`
    fn auth_header(token: &str) -> (&'static str, String);

    fn into_payload(self) -> Payload;

    fn from_payload(payload: &Payload) -> Option<&Self>;

    /// Body lines for a loaded profile
    fn lines(&self) -> Vec<Line<'static>>;

    /// Repository document served by the host
    type Repo: DeserializeOwned + Send + 'static;

    /// Endpoint for one configured repository; `None` skips a malformed name
    fn repo_url(api_base: &Url, repo: &str) -> Option<Url>;

    fn repo_stats(name: &str, repo: Self::Repo) -> RepoStats;
}

/// API root the profile endpoint hangs off (`.../user` stripped)
fn api_base(profile_url: &str) -> Option<Url> {
    let base = profile_url.trim_end_matches('/');
    Url::parse(base.strip_suffix("/user").unwrap_or(base)).ok()
}

/// What the panel is currently showing
#[derive(Debug, Clone, PartialEq)]
enum Shown {
    Profile(Payload),
    Repos(Vec<RepoStats>),
    Notice(String),
}

pub struct ProfileWidget<P> {
    id: WidgetId,
    url: String,
    token: Option<String>,
    repos: Vec<String>,
    every: Duration,
    state: RefreshState<Shown>,
    client: Client,
    _profile: PhantomData<fn() -> P>,
}

impl<P: Profile> ProfileWidget<P> {
    pub fn new(id: WidgetId, cfg: &RepoConfig, every: Duration) -> Self {
        Self {
            id,
            url: cfg
                .api_url
                .clone()
                .unwrap_or_else(|| P::DEFAULT_URL.to_string()),
            token: cfg.token.clone().filter(|t| !t.is_empty()),
            repos: cfg.repos.clone(),
            every,
            state: RefreshState::default(),
            client: http::client(),
            _profile: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Repository endpoints, in configured order, malformed names skipped
    pub fn repo_urls(&self) -> Result<Vec<(String, Url)>, WidgetError> {
        let base = api_base(&self.url)
            .ok_or_else(|| WidgetError::Parse(format!("invalid API URL: {}", self.url)))?;
        Ok(self
            .repos
            .iter()
            .filter_map(|name| match P::repo_url(&base, name) {
                Some(url) => Some((name.trim().to_string(), url)),
                None => {
                    debug!("{}: skipping malformed repository {:?}", P::TITLE, name);
                    None
                }
            })
            .collect())
    }

    fn fetch(&self) -> Command {
        if self.repos.is_empty() {
            self.fetch_profile()
        } else {
            self.fetch_repos()
        }
    }

    fn fetch_profile(&self) -> Command {
        let client = self.client.clone();
        let url = self.url.clone();
        let auth = self.token.as_deref().map(P::auth_header);
        Command::fetch(self.id, async move {
            match http::get_json::<P>(&client, &url, auth).await? {
                ApiResponse::Body(profile) => Ok(profile.into_payload()),
                ApiResponse::Unauthorized => Ok(Payload::Notice(P::UNAUTHORIZED_HINT.to_string())),
            }
        })
    }

    /// All repositories are requested concurrently; the first failure wins
    fn fetch_repos(&self) -> Command {
        let client = self.client.clone();
        let auth = self.token.as_deref().map(P::auth_header);
        let targets = self.repo_urls();
        Command::fetch(self.id, async move {
            let requests = targets?.into_iter().map(|(name, url)| {
                let client = &client;
                let auth = auth.clone();
                async move {
                    let response = http::get_json::<P::Repo>(client, url.as_str(), auth).await?;
                    Ok::<_, WidgetError>((name, response))
                }
            });

            let mut stats = Vec::new();
            for (name, response) in try_join_all(requests).await? {
                match response {
                    ApiResponse::Body(repo) => stats.push(P::repo_stats(&name, repo)),
                    ApiResponse::Unauthorized => {
                        return Ok(Payload::Notice(P::UNAUTHORIZED_HINT.to_string()))
                    }
                }
            }
            Ok(Payload::Repos(stats))
        })
    }
}

impl<P: Profile> Widget for ProfileWidget<P> {
    fn title(&self) -> &str {
        P::TITLE
    }

    fn init(&self) -> Option<Command> {
        Some(self.fetch())
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        if event.tick_for(self.id).is_some() {
            return Some(self.fetch());
        }

        match event.fetched_for(self.id)? {
            Ok(Payload::Notice(message)) => self
                .state
                .succeed(Shown::Notice(message.clone()), chrono::Local::now()),
            Ok(Payload::Repos(stats)) => self
                .state
                .succeed(Shown::Repos(stats.clone()), chrono::Local::now()),
            Ok(payload) if P::from_payload(payload).is_some() => self
                .state
                .succeed(Shown::Profile(payload.clone()), chrono::Local::now()),
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("{} profile refresh failed: {}", P::TITLE, e);
                self.state.fail(e.clone());
            }
        }
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(error_line(err));
        }

        let mut lines = match self.state.value() {
            None if self.repos.is_empty() => {
                return Text::from(Line::styled("Loading profile...", style::muted()))
            }
            None => return Text::from(Line::styled("Loading repositories...", style::muted())),
            Some(Shown::Notice(message)) => return Text::from(message.clone()),
            Some(Shown::Repos(stats)) if stats.is_empty() => {
                return Text::from("No repositories configured")
            }
            Some(Shown::Repos(stats)) => repo_lines(stats),
            Some(Shown::Profile(payload)) => match P::from_payload(payload) {
                Some(profile) => profile.lines(),
                None => Vec::new(),
            },
        };
        if let Some(at) = self.state.updated() {
            lines.push(updated_line(at));
        }
        Text::from(lines)
    }
}

/// Name line plus counters per repository, blank line between entries
fn repo_lines(stats: &[RepoStats]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, repo) in stats.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(style::label(repo.name.clone())));
        lines.push(Line::from(format!(
            "★ {}  forks {}  issues {}",
            repo.stars, repo.forks, repo.open_issues
        )));
    }
    lines
}

/// `Label: value` line
pub(crate) fn field(label: &str, value: impl ToString) -> Line<'static> {
    Line::from(vec![
        style::label(format!("{label}: ")),
        value.to_string().into(),
    ])
}
