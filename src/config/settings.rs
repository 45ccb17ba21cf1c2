use serde::{Deserialize, Serialize};

pub const DEFAULT_GOTO_CMD: &str = "open";
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_SLACK_URL: &str = "https://slack.com/api";

/// Main configuration structure
///
/// Every field can come from the optional config file; `FERRET_*` environment
/// variables take precedence over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Command used to open a result link (`goto`)
    pub goto_cmd: String,

    pub answerhub: AnswerHubSettings,

    pub github: GitHubSettings,

    pub slack: SlackSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            goto_cmd: DEFAULT_GOTO_CMD.to_string(),
            answerhub: AnswerHubSettings::default(),
            github: GitHubSettings::default(),
            slack: SlackSettings::default(),
        }
    }
}

/// AnswerHub instance configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerHubSettings {
    /// Base URL; the provider is disabled while this is empty
    pub url: String,
    pub username: String,
    pub password: String,
}

/// GitHub (or GitHub Enterprise) API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub url: String,
    pub token: String,
    /// Restricts code search to this user's repositories
    pub search_user: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_GITHUB_URL.to_string(),
            token: String::new(),
            search_user: String::new(),
        }
    }
}

/// Slack Web API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackSettings {
    pub url: String,
    pub token: String,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SLACK_URL.to_string(),
            token: String::new(),
        }
    }
}

impl Settings {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Override fields from `FERRET_*` variables resolved through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("FERRET_GOTO_CMD") {
            self.goto_cmd = v;
        }
        if let Some(v) = get("FERRET_ANSWERHUB_URL") {
            self.answerhub.url = v;
        }
        if let Some(v) = get("FERRET_ANSWERHUB_USERNAME") {
            self.answerhub.username = v;
        }
        if let Some(v) = get("FERRET_ANSWERHUB_PASSWORD") {
            self.answerhub.password = v;
        }
        if let Some(v) = get("FERRET_GITHUB_URL") {
            self.github.url = v;
        }
        if let Some(v) = get("FERRET_GITHUB_TOKEN") {
            self.github.token = v;
        }
        if let Some(v) = get("FERRET_GITHUB_SEARCH_USER") {
            self.github.search_user = v;
        }
        if let Some(v) = get("FERRET_SLACK_TOKEN") {
            self.slack.token = v;
        }
    }
}
