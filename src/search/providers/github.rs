use super::{default_client, null_as_empty, trim_base_url};
use crate::config::settings::GitHubSettings;
use crate::config::Settings;
use crate::search::http::{decode, get_body, parse_url, query_escape};
use crate::search::{CancelHandle, Provider, ProviderInfo, ResultItem, SearchError, SearchRequest};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;

/// GitHub code search
///
/// FERRET_GITHUB_URL points at api.github.com or a GitHub Enterprise API root.
/// FERRET_GITHUB_TOKEN is sent as `Authorization: token …` and
/// FERRET_GITHUB_SEARCH_USER scopes the query with `user:`.
pub struct GitHubProvider {
    info: ProviderInfo,
    client: reqwest::Client,
    url: String,
    token: String,
    search_user: String,
}

impl GitHubProvider {
    pub fn new(settings: &GitHubSettings) -> Self {
        let url = trim_base_url(&settings.url);
        if settings.token.is_empty() {
            tracing::debug!("FERRET_GITHUB_TOKEN not set, github searches are unauthenticated");
        }

        Self {
            info: ProviderInfo {
                name: "github",
                title: "GitHub",
                priority: 2000,
                enabled: !url.is_empty(),
            },
            client: default_client(),
            url,
            token: settings.token.clone(),
            search_user: settings.search_user.clone(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.github)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/search/code?q={}",
            self.url,
            query_escape(&request.keyword)
        );
        if !self.search_user.is_empty() {
            url.push_str(&format!("+user:{}", query_escape(&self.search_user)));
        }
        url
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default, deserialize_with = "null_as_empty")]
    path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    html_url: String,
    #[serde(default)]
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default, deserialize_with = "null_as_empty")]
    full_name: String,
}

fn project(item: Item) -> ResultItem {
    let full_name = item
        .repository
        .map(|r| r.full_name)
        .unwrap_or_default();
    ResultItem::new(format!("{}: {}", full_name, item.path), item.html_url)
}

#[async_trait::async_trait]
impl Provider for GitHubProvider {
    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    async fn search(
        &self,
        cancel: &CancelHandle,
        request: &SearchRequest,
    ) -> Result<Vec<ResultItem>, SearchError> {
        if !self.info.enabled {
            return Err(SearchError::Disabled {
                provider: self.info.name,
                hint: "FERRET_GITHUB_URL",
            });
        }

        let url = parse_url(&self.search_url(request))?;
        let mut builder = self.client.get(url).header(ACCEPT, "application/json");
        if !self.token.is_empty() {
            builder = builder.header(AUTHORIZATION, format!("token {}", self.token));
        }

        let body = get_body(self.info.name, &self.client, builder, cancel).await?;
        let response: SearchResponse = decode(&body)?;

        let items: Vec<ResultItem> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(project)
            .collect();

        tracing::debug!(
            keyword = %request.keyword,
            result_count = items.len(),
            "github search completed"
        );

        Ok(items)
    }
}
