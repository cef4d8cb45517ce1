//! Dashboard configuration
//!
//! Configuration is a plain value object built once at startup and handed out
//! piecewise: each widget constructor receives only the section it needs.
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, `./tuidash.toml`, or the user config dir)
//! 3. `TUIDASH_*` environment variables (`__` separates nested keys)
//! 4. The conventional per-widget variables (`WTTR_LOCATION`, `GITHUB_TOKEN`,
//!    `WIDGET_HEIGHT_<TITLE>`, ...)

use crate::error::Result;
use crate::layout::{LayoutConfig, MAX_UNIT_HINT};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Prefix of the per-widget height-unit environment variables
pub const UNIT_HINT_PREFIX: &str = "WIDGET_HEIGHT_";

/// Normalize a widget title into its configuration key.
///
/// Every character outside ASCII letters and digits becomes `_`, and the
/// result is uppercased: `"Moon Phase"` becomes `"MOON_PHASE"`.
pub fn widget_key(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Environment variable carrying the height-unit override for a widget
pub fn widget_env_key(title: &str) -> String {
    format!("{}{}", UNIT_HINT_PREFIX, widget_key(title))
}

/// Parse a unit hint override; only positive integers are accepted, and
/// values above [`MAX_UNIT_HINT`] are capped
pub fn parse_unit_hint(raw: &str) -> Option<u16> {
    let units = raw.trim().parse::<u32>().ok().filter(|v| *v > 0)?;
    Some(u16::try_from(units).map_or(MAX_UNIT_HINT, |v| v.min(MAX_UNIT_HINT)))
}

/// wttr.in endpoint settings (used by the Weather and Moon Phase panels)
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WttrConfig {
    /// Location path segment; panel default applies when unset
    pub location: Option<String>,
    /// Raw query string; panel default applies when unset
    pub params: Option<String>,
}

/// Settings for a repository-hosting profile panel
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    /// Access token sent with the profile request
    pub token: Option<String>,
    /// Override of the profile endpoint; repository endpoints live beside it
    pub api_url: Option<String>,
    /// Repositories to show instead of the profile (`owner/name` or project id)
    pub repos: Vec<String>,
}

impl fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("repos", &self.repos)
            .finish()
    }
}

/// Document panel settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarkdownConfig {
    /// File to render; built-in welcome text when unset
    pub path: Option<PathBuf>,
}

/// Refresh cadence per widget, in seconds
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefreshIntervals {
    pub clock: u64,
    pub weather: u64,
    pub system: u64,
    pub ip: u64,
    pub github: u64,
    pub gitlab: u64,
    pub calendar: u64,
    pub smart: u64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            clock: 1,
            weather: 30 * 60,
            system: 5,
            ip: 60,
            github: 10 * 60,
            gitlab: 10 * 60,
            calendar: 60,
            smart: 5 * 60,
        }
    }
}

impl RefreshIntervals {
    /// Convert a configured cadence to a timer duration (minimum one second)
    pub fn every(secs: u64) -> Duration {
        Duration::from_secs(secs.max(1))
    }
}

/// Optional panels that are off unless configured
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtrasConfig {
    /// Show the month calendar panel
    pub calendar: bool,
    /// Show the disk and SMART drive panel
    pub smart: bool,
    /// Show a plain text file panel
    pub text_file: Option<PathBuf>,
}

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub weather: WttrConfig,
    pub moon: WttrConfig,
    pub github: RepoConfig,
    pub gitlab: RepoConfig,
    pub markdown: MarkdownConfig,
    pub refresh: RefreshIntervals,
    pub layout: LayoutConfig,
    pub extras: ExtrasConfig,
    /// Height units keyed by normalized widget title (see [`widget_key`])
    pub unit_hints: HashMap<String, u16>,
}

impl DashboardConfig {
    /// Load configuration from file and process environment.
    ///
    /// An explicit `path` must exist; the default locations are optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            None => {
                for candidate in default_config_paths() {
                    debug!("Checking optional config at {}", candidate.display());
                    builder = builder.add_source(File::from(candidate).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TUIDASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut cfg: DashboardConfig = builder.build()?.try_deserialize()?;
        cfg.normalize_unit_hints();
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply the conventional per-widget environment variables.
    ///
    /// `lookup` stands in for the process environment so callers (and tests)
    /// decide where values come from. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("WTTR_LOCATION") {
            self.weather.location = Some(v);
        }
        if let Some(v) = get("WTTR_PARAMS") {
            self.weather.params = Some(v);
        }
        if let Some(v) = get("WTTR_MOON_LOCATION") {
            self.moon.location = Some(v);
        }
        if let Some(v) = get("WTTR_MOON_PARAMS") {
            self.moon.params = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("GITLAB_TOKEN") {
            self.gitlab.token = Some(v);
        }
        if let Some(v) = get("GITHUB_REPOS") {
            self.github.repos = split_list(&v);
        }
        if let Some(v) = get("GITLAB_PROJECTS") {
            self.gitlab.repos = split_list(&v);
        }
        if let Some(v) = get("MARKDOWN_PATH") {
            self.markdown.path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("TEXT_VIEWER_PATH") {
            self.extras.text_file = Some(PathBuf::from(v));
        }
    }

    /// Resolve unit hints for the given titles.
    ///
    /// Each title gets 1 unless the file configuration or the
    /// `WIDGET_HEIGHT_<KEY>` variable provides a positive integer; the
    /// environment wins over the file.
    pub fn unit_hints_for<'a, I, F>(&self, titles: I, lookup: F) -> HashMap<String, u16>
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> Option<String>,
    {
        titles
            .into_iter()
            .map(|title| {
                let key = widget_key(title);
                let from_env = lookup(&widget_env_key(title)).and_then(|v| parse_unit_hint(&v));
                let from_file = self
                    .unit_hints
                    .get(&key)
                    .copied()
                    .filter(|v| *v > 0)
                    .map(|v| v.min(MAX_UNIT_HINT));
                (key, from_env.or(from_file).unwrap_or(1))
            })
            .collect()
    }

    /// File keys are case-insensitive; store them in [`widget_key`] form
    fn normalize_unit_hints(&mut self) {
        self.unit_hints = self
            .unit_hints
            .drain()
            .map(|(k, v)| (widget_key(&k), v))
            .collect();
    }
}

/// Comma-separated list, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Optional config file locations, lowest precedence first
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dirs) = ProjectDirs::from("", "", "tuidash") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths.push(PathBuf::from("tuidash.toml"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_widget_key_normalization() {
        assert_eq!(widget_key("Clock"), "CLOCK");
        assert_eq!(widget_key("Moon Phase"), "MOON_PHASE");
        assert_eq!(widget_key("IP Info"), "IP_INFO");
        assert_eq!(widget_env_key("Text-Viewer 2"), "WIDGET_HEIGHT_TEXT_VIEWER_2");
    }

    #[test]
    fn test_parse_unit_hint() {
        assert_eq!(parse_unit_hint("3"), Some(3));
        assert_eq!(parse_unit_hint(" 2 "), Some(2));
        assert_eq!(parse_unit_hint("0"), None);
        assert_eq!(parse_unit_hint("-1"), None);
        assert_eq!(parse_unit_hint("tall"), None);
        assert_eq!(parse_unit_hint("40000"), Some(MAX_UNIT_HINT));
        assert_eq!(parse_unit_hint("4000000000"), Some(MAX_UNIT_HINT));
        assert_eq!(parse_unit_hint("1000"), Some(1000));
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = DashboardConfig::default();
        cfg.apply_env_overrides(env_from(&[
            ("WTTR_LOCATION", "Lisbon"),
            ("WTTR_MOON_PARAMS", "format=%m"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("GITLAB_TOKEN", "   "),
            ("MARKDOWN_PATH", "/tmp/notes.md"),
            ("GITHUB_REPOS", "rust-lang/rust, ,tokio-rs/tokio"),
        ]));

        assert_eq!(cfg.weather.location.as_deref(), Some("Lisbon"));
        assert_eq!(cfg.weather.params, None);
        assert_eq!(cfg.moon.params.as_deref(), Some("format=%m"));
        assert_eq!(cfg.github.token.as_deref(), Some("ghp_x"));
        assert_eq!(cfg.gitlab.token, None);
        assert_eq!(cfg.markdown.path, Some(PathBuf::from("/tmp/notes.md")));
        assert_eq!(cfg.github.repos, vec!["rust-lang/rust", "tokio-rs/tokio"]);
        assert!(cfg.gitlab.repos.is_empty());
    }

    #[test]
    fn test_unit_hints_default_to_one() {
        let cfg = DashboardConfig::default();
        let hints = cfg.unit_hints_for(["Clock", "Weather"], env_from(&[]));
        assert_eq!(hints["CLOCK"], 1);
        assert_eq!(hints["WEATHER"], 1);
    }

    #[test]
    fn test_unit_hints_env_override_exact_key() {
        let cfg = DashboardConfig::default();
        let hints = cfg.unit_hints_for(
            ["Markdown", "Moon Phase", "System"],
            env_from(&[
                ("WIDGET_HEIGHT_MARKDOWN", "3"),
                ("WIDGET_HEIGHT_MOON_PHASE", "0"),
                ("WIDGET_HEIGHT_SYS", "4"),
            ]),
        );
        assert_eq!(hints["MARKDOWN"], 3);
        assert_eq!(hints["MOON_PHASE"], 1);
        assert_eq!(hints["SYSTEM"], 1);
    }

    #[test]
    fn test_unit_hints_env_beats_file() {
        let mut cfg = DashboardConfig::default();
        cfg.unit_hints.insert("GITHUB".to_string(), 2);
        cfg.unit_hints.insert("GITLAB".to_string(), 2);

        let hints = cfg.unit_hints_for(
            ["GitHub", "GitLab"],
            env_from(&[("WIDGET_HEIGHT_GITHUB", "5")]),
        );
        assert_eq!(hints["GITHUB"], 5);
        assert_eq!(hints["GITLAB"], 2);
    }

    #[test]
    fn test_default_refresh_intervals() {
        let refresh = RefreshIntervals::default();
        assert_eq!(refresh.clock, 1);
        assert_eq!(refresh.weather, 1800);
        assert_eq!(RefreshIntervals::every(0), Duration::from_secs(1));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[weather]
location = "Oslo"

[layout]
columns = 3

[github]
repos = ["rust-lang/rust"]

[extras]
calendar = true
smart = true

[unit_hints]
markdown = 2
"#
        )
        .unwrap();

        let cfg = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.weather.location.as_deref(), Some("Oslo"));
        assert_eq!(cfg.layout.columns, 3);
        assert_eq!(cfg.layout.narrow_width, LayoutConfig::default().narrow_width);
        assert!(cfg.extras.calendar);
        assert!(cfg.extras.smart);
        assert_eq!(cfg.github.repos, vec!["rust-lang/rust"]);
        assert_eq!(cfg.unit_hints.get("MARKDOWN"), Some(&2));
    }

    #[test]
    #[serial]
    fn test_environment_layer_beats_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[layout]\ngap = 1\n").unwrap();

        std::env::set_var("TUIDASH_LAYOUT__GAP", "4");
        let result = DashboardConfig::load(Some(file.path()));
        std::env::remove_var("TUIDASH_LAYOUT__GAP");

        assert_eq!(result.unwrap().layout.gap, 4);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = DashboardConfig::load(Some(Path::new("/nonexistent/tuidash.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_repo_config_debug_redacts_token() {
        let cfg = RepoConfig {
            token: Some("secret".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
