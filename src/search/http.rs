//! Cancellable HTTP round trip shared by all provider adapters.

use crate::logging::redact_secrets;
use crate::search::{take_chars, CancelHandle, SearchError};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Maximum number of body characters echoed into the debug log on a bad status
const ERROR_BODY_LOG_CHARS: usize = 512;

/// Send a GET built by `request` and read its body fully, racing both against `cancel`.
///
/// When the handle fires first the in-flight future is dropped, which closes
/// the underlying connection. A response arriving afterwards is never observed.
pub async fn get_body(
    provider: &str,
    client: &Client,
    request: RequestBuilder,
    cancel: &CancelHandle,
) -> Result<Bytes, SearchError> {
    let request = request
        .build()
        .map_err(|e| SearchError::RequestConstruction(e.without_url().to_string()))?;

    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    let url = redact_secrets(request.url().as_str());
    tracing::debug!(provider = %provider, url = %url, "sending search request");

    let round_trip = async {
        let response = client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, body))
    };

    let (status, body) = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(provider = %provider, url = %url, "search request cancelled");
            return Err(SearchError::Cancelled);
        }
        result = round_trip => result.map_err(|e| SearchError::Transport(e.without_url()))?,
    };

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        tracing::warn!(provider = %provider, status = %status, "search api returned error");
        tracing::debug!(
            provider = %provider,
            body = %redact_secrets(take_chars(&text, ERROR_BODY_LOG_CHARS)),
            "error response body"
        );
        return Err(SearchError::BadStatus {
            status: status.as_u16(),
        });
    }

    Ok(body)
}

/// Decode a JSON body; invalid UTF-8 inside strings is rejected by serde_json
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SearchError> {
    serde_json::from_slice(body).map_err(|e| SearchError::Decode(e.to_string()))
}

/// Form-style query escaping (space becomes `+`)
pub fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Parse a composed URL string, mapping failures to a request-construction error
pub fn parse_url(raw: &str) -> Result<reqwest::Url, SearchError> {
    reqwest::Url::parse(raw).map_err(|e| {
        SearchError::RequestConstruction(format!("invalid URL {}: {}", redact_secrets(raw), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_query_escape_matches_form_encoding() {
        assert_eq!(query_escape("hello world"), "hello+world");
        assert_eq!(query_escape("a&b=c"), "a%26b%3Dc");
        assert_eq!(query_escape("plain"), "plain");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let body = b"{\"name\":\"\xff\xfe\"}";
        let err = decode::<Sample>(body).unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn test_decode_ok() {
        let sample: Sample = decode(br#"{"name":"ferret"}"#).unwrap();
        assert_eq!(sample.name, "ferret");
    }

    #[test]
    fn test_parse_url_failure_is_request_construction() {
        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err, SearchError::RequestConstruction(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let client = Client::new();
        let cancel = CancelHandle::new();
        cancel.cancel();

        let request = client.get("http://127.0.0.1:9/never");
        let err = get_body("test", &client, request, &cancel).await.unwrap_err();
        assert!(matches!(err, SearchError::Cancelled));
    }
}
