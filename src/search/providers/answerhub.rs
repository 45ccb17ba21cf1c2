use super::{default_client, null_as_empty, trim_base_url};
use crate::config::settings::AnswerHubSettings;
use crate::config::Settings;
use crate::search::http::{decode, get_body, parse_url, query_escape};
use crate::search::{
    take_chars, CancelHandle, Provider, ProviderInfo, ResultItem, SearchError, SearchRequest,
};
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;

const MAX_DESCRIPTION_CHARS: usize = 255;
const TRUNCATED_CHARS: usize = 252;

/// AnswerHub question search
///
/// Requires FERRET_ANSWERHUB_URL; FERRET_ANSWERHUB_USERNAME and
/// FERRET_ANSWERHUB_PASSWORD enable HTTP Basic auth.
pub struct AnswerHubProvider {
    info: ProviderInfo,
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl AnswerHubProvider {
    pub fn new(settings: &AnswerHubSettings) -> Self {
        let url = trim_base_url(&settings.url);
        if url.is_empty() {
            tracing::debug!("FERRET_ANSWERHUB_URL not set, answerhub provider disabled");
        }

        Self {
            info: ProviderInfo {
                name: "answerhub",
                title: "AnswerHub",
                priority: 1000,
                enabled: !url.is_empty(),
            },
            client: default_client(),
            url,
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.answerhub)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}/services/v2/node.json?page={}&pageSize={}&q={}*",
            self.url,
            request.page,
            request.limit,
            query_escape(&request.keyword)
        )
    }

    fn project(&self, node: Node) -> ResultItem {
        let description = describe(&node.body, node.author.as_ref());
        let mut item = ResultItem::new(description, format!("{}/questions/{}/", self.url, node.id));
        if !node.title.is_empty() {
            item = item.with_title(node.title);
        }
        if let Some(date) = node.creation_date.and_then(DateTime::<Utc>::from_timestamp_millis) {
            item = item.with_date(date);
        }
        item
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    list: Option<Vec<Node>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    body: String,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    creation_date: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Author {
    #[serde(default, deserialize_with = "null_as_empty")]
    username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    realname: String,
}

/// Summarize a question body, falling back to its author when the body is blank
fn describe(body: &str, author: Option<&Author>) -> String {
    let body = body.trim();
    if body.chars().count() > MAX_DESCRIPTION_CHARS {
        return format!("{}...", take_chars(body, TRUNCATED_CHARS));
    }
    if !body.is_empty() {
        return body.to_string();
    }

    let (realname, username) = author
        .map(|a| (a.realname.as_str(), a.username.as_str()))
        .unwrap_or_default();
    if !realname.is_empty() {
        format!("Asked by {realname}")
    } else {
        format!("Asked by {username}")
    }
}

#[async_trait::async_trait]
impl Provider for AnswerHubProvider {
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
                hint: "FERRET_ANSWERHUB_URL",
            });
        }

        let url = parse_url(&self.search_url(request))?;
        let mut builder = self.client.get(url).header(ACCEPT, "application/json");
        if !self.username.is_empty() || !self.password.is_empty() {
            builder = builder.basic_auth(&self.username, Some(&self.password));
        }

        let body = get_body(self.info.name, &self.client, builder, cancel).await?;
        let response: SearchResponse = decode(&body)?;

        let items: Vec<ResultItem> = response
            .list
            .unwrap_or_default()
            .into_iter()
            .map(|node| self.project(node))
            .collect();

        tracing::debug!(
            keyword = %request.keyword,
            result_count = items.len(),
            "answerhub search completed"
        );

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn provider(url: &str) -> AnswerHubProvider {
        AnswerHubProvider::new(&AnswerHubSettings {
            url: url.to_string(),
            ..Default::default()
        })
    }

    fn author(realname: &str, username: &str) -> Author {
        Author {
            realname: realname.to_string(),
            username: username.to_string(),
        }
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "A".repeat(300);
        let description = describe(&body, Some(&author("", "u")));
        assert_eq!(description, format!("{}...", "A".repeat(252)));
        assert_eq!(description.chars().count(), 255);
    }

    #[test]
    fn test_body_at_cap_kept() {
        let body = format!("  {}  ", "b".repeat(255));
        assert_eq!(describe(&body, None), "b".repeat(255));
    }

    #[test]
    fn test_blank_body_falls_back_to_author() {
        assert_eq!(describe("   ", Some(&author("Jane Doe", "jd"))), "Asked by Jane Doe");
        assert_eq!(describe("", Some(&author("", "jd"))), "Asked by jd");
        assert_eq!(describe("\n", None), "Asked by ");
    }

    #[test]
    fn test_multibyte_truncation() {
        let body = "é".repeat(300);
        let description = describe(&body, None);
        assert_eq!(description, format!("{}...", "é".repeat(252)));
    }

    #[test]
    fn test_projection() {
        let provider = provider("https://answers.example.com/");
        let node = Node {
            id: 42,
            title: "Q".to_string(),
            body: "A".repeat(300),
            author: Some(author("", "u")),
            creation_date: Some(1_700_000_000_000),
        };

        let item = provider.project(node);
        assert_eq!(item.link, "https://answers.example.com/questions/42/");
        assert_eq!(item.title.as_deref(), Some("Q"));
        assert_eq!(item.description, format!("{}...", "A".repeat(252)));
        assert_eq!(
            item.date,
            Some(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
        );
    }

    #[test]
    fn test_search_url() {
        let provider = provider("https://answers.example.com");
        let request = SearchRequest::new("rust async").with_page(2).with_limit(5);
        assert_eq!(
            provider.search_url(&request),
            "https://answers.example.com/services/v2/node.json?page=2&pageSize=5&q=rust+async*"
        );
    }

    #[test]
    fn test_disabled_without_url() {
        let provider = provider("");
        assert!(!provider.info().enabled);
        assert_eq!(provider.info().priority, 1000);
    }

    #[test]
    fn test_null_fields_decode() {
        let response: SearchResponse =
            decode(br#"{"list":[{"id":1,"title":null,"body":null,"author":null}]}"#).unwrap();
        let nodes = response.list.unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].body.is_empty());
        assert!(nodes[0].author.is_none());
    }
}
