use super::{default_client, null_as_empty, trim_base_url};
use crate::config::settings::SlackSettings;
use crate::config::Settings;
use crate::search::http::{decode, get_body, parse_url, query_escape};
use crate::search::{
    take_chars, CancelHandle, Provider, ProviderInfo, ResultItem, SearchError, SearchRequest,
};
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;

/// Characters of message text kept after the `username: ` prefix
const MAX_TEXT_CHARS: usize = 120;

/// Slack message search via `search.all`
///
/// Requires FERRET_SLACK_TOKEN; the token travels as a query parameter.
pub struct SlackProvider {
    info: ProviderInfo,
    client: reqwest::Client,
    url: String,
    token: String,
}

impl SlackProvider {
    pub fn new(settings: &SlackSettings) -> Self {
        Self {
            info: ProviderInfo {
                name: "slack",
                title: "Slack",
                priority: 3000,
                enabled: !settings.token.is_empty(),
            },
            client: default_client(),
            url: trim_base_url(&settings.url),
            token: settings.token.clone(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.slack)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}/search.all?page={}&count=10&query={}&token={}",
            self.url,
            request.page,
            query_escape(&request.keyword),
            query_escape(&self.token)
        )
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Option<Messages>,
}

#[derive(Debug, Deserialize)]
struct Messages {
    #[serde(default)]
    matches: Option<Vec<Match>>,
}

#[derive(Debug, Deserialize)]
struct Match {
    #[serde(default, deserialize_with = "null_as_empty")]
    username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    permalink: String,
    #[serde(default)]
    ts: Option<String>,
}

fn project(m: Match) -> ResultItem {
    let description = format!("{}: {}", m.username, take_chars(&m.text, MAX_TEXT_CHARS));
    let mut item = ResultItem::new(description, m.permalink);
    if let Some(date) = m.ts.as_deref().and_then(parse_ts) {
        item = item.with_date(date);
    }
    item
}

/// Parse a Slack message timestamp such as `1508284197.000015`
fn parse_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = if frac.is_empty() {
        0
    } else {
        format!("{:0<6}", take_chars(frac, 6)).parse().ok()?
    };
    DateTime::<Utc>::from_timestamp(secs, micros * 1_000)
}

#[async_trait::async_trait]
impl Provider for SlackProvider {
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
                hint: "FERRET_SLACK_TOKEN",
            });
        }

        let url = parse_url(&self.search_url(request))?;
        let builder = self.client.get(url).header(ACCEPT, "application/json");

        let body = get_body(self.info.name, &self.client, builder, cancel).await?;
        let response: SearchResponse = decode(&body)?;

        if response.ok == Some(false) {
            let error = response.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!(error = %error, "slack api returned error");
            return Err(SearchError::Api(error));
        }

        let items: Vec<ResultItem> = response
            .messages
            .and_then(|m| m.matches)
            .unwrap_or_default()
            .into_iter()
            .map(project)
            .collect();

        tracing::debug!(
            keyword = %request.keyword,
            result_count = items.len(),
            "slack search completed"
        );

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(text: &str) -> Match {
        Match {
            username: "u".to_string(),
            text: text.to_string(),
            permalink: "https://s/p".to_string(),
            ts: None,
        }
    }

    #[test]
    fn test_projection() {
        let item = project(message("hello world"));
        assert_eq!(item, ResultItem::new("u: hello world", "https://s/p"));
    }

    #[test]
    fn test_long_text_capped() {
        let item = project(message(&"x".repeat(500)));
        assert_eq!(item.description, format!("u: {}", "x".repeat(120)));
    }

    #[test]
    fn test_ts_parsing() {
        assert_eq!(
            parse_ts("1508284197.000015"),
            Some(Utc.timestamp_opt(1_508_284_197, 15_000).unwrap())
        );
        assert_eq!(
            parse_ts("1508284197"),
            Some(Utc.timestamp_opt(1_508_284_197, 0).unwrap())
        );
        assert_eq!(parse_ts("yesterday"), None);
    }

    #[test]
    fn test_search_url() {
        let provider = SlackProvider::new(&SlackSettings {
            url: "https://slack.com/api".to_string(),
            token: "xoxp-1".to_string(),
        });
        let request = SearchRequest::new("deploy failed").with_page(2);
        assert_eq!(
            provider.search_url(&request),
            "https://slack.com/api/search.all?page=2&count=10&query=deploy+failed&token=xoxp-1"
        );
    }

    #[test]
    fn test_disabled_without_token() {
        let provider = SlackProvider::new(&SlackSettings::default());
        assert!(!provider.info().enabled);
    }
}
