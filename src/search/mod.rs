pub mod cancel;
pub mod http;
pub mod providers;
pub mod registry;

pub use cancel::CancelHandle;
pub use registry::{ProviderRegistry, RegistryError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Search provider abstraction - every backend adapter plugs in through this
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Static descriptor (name, title, priority, enabled)
    fn info(&self) -> &ProviderInfo;

    /// Perform a search, aborting when `cancel` fires
    async fn search(
        &self,
        cancel: &CancelHandle,
        request: &SearchRequest,
    ) -> Result<Vec<ResultItem>, SearchError>;
}

/// Provider descriptor, immutable after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Unique lowercase identifier, the registry key
    pub name: &'static str,
    /// Display label
    pub title: &'static str,
    /// Lower sorts earlier; ties broken by name
    pub priority: i64,
    /// Whether the required credentials/URL are configured
    pub enabled: bool,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Keyword plus the recognized options of the configuration bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    /// 1-based page index
    pub page: u32,
    /// Page size hint
    pub limit: u32,
    /// 1-based index of the result to open instead of printing
    pub goto: Option<i64>,
}

impl SearchRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            goto: None,
        }
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = positive_or(page, DEFAULT_PAGE);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = positive_or(limit, DEFAULT_LIMIT);
        self
    }

    pub fn with_goto(mut self, index: i64) -> Self {
        self.goto = Some(index);
        self
    }

    /// Build a request from a string configuration bag.
    ///
    /// Recognized keys are `page`, `limit` and `goto`; anything else is ignored.
    /// An unparseable `goto` is recorded as index 0, which never validates.
    pub fn from_options(keyword: impl Into<String>, options: &BTreeMap<String, String>) -> Self {
        let mut request = Self::new(keyword);
        if let Some(page) = options.get("page") {
            request = request.with_page(page.trim().parse().unwrap_or(0));
        }
        if let Some(limit) = options.get("limit") {
            request = request.with_limit(limit.trim().parse().unwrap_or(0));
        }
        if let Some(goto) = options.get("goto") {
            request = request.with_goto(goto.trim().parse().unwrap_or(0));
        }
        request
    }
}

fn positive_or(value: i64, default: u32) -> u32 {
    if value < 1 {
        return default;
    }
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Uniform search result record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    /// Short human-readable summary
    pub description: String,
    /// Absolute URL of the hit's canonical page
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl ResultItem {
    pub fn new(description: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            link: link.into(),
            title: None,
            date: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Search-related errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to prepare request: {0}")]
    RequestConstruction(String),

    #[error("failed to fetch search result: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad response: {status}")]
    BadStatus { status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("search cancelled")]
    Cancelled,

    #[error("provider {provider} is disabled. Set {hint} to enable it")]
    Disabled {
        provider: &'static str,
        hint: &'static str,
    },

    #[error("API error: {0}")]
    Api(String),
}

/// Failure taxonomy shared by every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    RequestConstruction,
    Registry,
    Transport,
    Protocol,
    Decode,
    Cancellation,
    Usage,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::RequestConstruction(_) => ErrorKind::RequestConstruction,
            SearchError::Disabled { .. } => ErrorKind::Configuration,
            SearchError::Transport(_) => ErrorKind::Transport,
            SearchError::BadStatus { .. } | SearchError::Api(_) => ErrorKind::Protocol,
            SearchError::Decode(_) => ErrorKind::Decode,
            SearchError::Cancelled => ErrorKind::Cancellation,
        }
    }
}

/// Take at most `max` characters of `text`, never splitting a UTF-8 sequence
pub(crate) fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
