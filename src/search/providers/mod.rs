pub mod answerhub;
pub mod github;
pub mod slack;

pub use answerhub::AnswerHubProvider;
pub use github::GitHubProvider;
pub use slack::SlackProvider;

use serde::Deserialize;
use std::time::Duration;

/// HTTP client shared by the built-in adapters
pub(crate) fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("ferret/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build http client, using defaults");
            reqwest::Client::new()
        })
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Decode a string field that backends send as `null` as well as omit
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
