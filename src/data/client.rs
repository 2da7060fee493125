//! Marvel API client
//!
//! Signs and sends requests to the `/comics` endpoint and decodes the JSON
//! body into a [`ComicsResponse`].

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

use super::signing::{timestamp_millis, SignedRequestParams};
use super::{ComicsResponse, Credentials};

/// Base URL for the Marvel public API
pub const MARVEL_API_BASE_URL: &str = "https://gateway.marvel.com/v1/public";

/// Environment variable holding the public key
pub const PUBLIC_KEY_ENV: &str = "MARVEL_PUBLIC_API_KEY";
/// Environment variable holding the private key
pub const PRIVATE_KEY_ENV: &str = "MARVEL_PRIVATE_API_KEY";
/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "MARVEL_API_BASE_URL";

/// Errors that can occur when fetching comics
///
/// Cloneable so a single failed request can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ComicsError {
    /// Connection, DNS, timeout or non-2xx HTTP status
    #[error("HTTP request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// Response body was not a valid comics response
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
}

impl From<reqwest::Error> for ComicsError {
    fn from(err: reqwest::Error) -> Self {
        ComicsError::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for ComicsError {
    fn from(err: serde_json::Error) -> Self {
        ComicsError::Decode(Arc::new(err))
    }
}

/// Something that can produce the latest comics list
#[async_trait]
pub trait ComicsSource: Send + Sync {
    async fn fetch_comics(&self) -> Result<ComicsResponse, ComicsError>;
}

/// Connection settings for [`ComicsClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without the `/comics` path
    pub base_url: String,
    pub credentials: Credentials,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: MARVEL_API_BASE_URL.to_string(),
            credentials: Credentials::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    /// Overrides the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads keys and base URL from the process environment
    ///
    /// Missing keys become empty strings; requests made with them are
    /// rejected by the service instead of failing here.
    pub fn from_env() -> Self {
        let credentials = Credentials::new(
            env::var(PUBLIC_KEY_ENV).unwrap_or_default(),
            env::var(PRIVATE_KEY_ENV).unwrap_or_default(),
        );
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| MARVEL_API_BASE_URL.to_string());
        Self::new(credentials).with_base_url(base_url)
    }

    /// Full URL of the comics endpoint
    pub fn comics_url(&self) -> String {
        format!("{}/comics", self.base_url.trim_end_matches('/'))
    }
}

/// Client for fetching comics from the Marvel API
#[derive(Debug, Clone)]
pub struct ComicsClient {
    client: Client,
    config: ClientConfig,
}

impl ComicsClient {
    /// Creates a client that sends JSON `Content-Type` and `Accept` headers
    pub fn new(config: ClientConfig) -> Result<Self, ComicsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a client around a preconfigured HTTP client
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the first page of comics
    ///
    /// # Returns
    /// * `Ok(ComicsResponse)` for any 2xx response, whatever its `code`
    /// * `Err(ComicsError::Transport)` if the request fails or the status is not 2xx
    /// * `Err(ComicsError::Decode)` if the body is not a comics response
    pub async fn fetch_comics(&self) -> Result<ComicsResponse, ComicsError> {
        let params = SignedRequestParams::new(timestamp_millis(), &self.config.credentials);
        let url = self.config.comics_url();

        tracing::debug!(url = %url, ts = %params.ts, "requesting comics");

        let text = match self.send(&url, &params).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "comics request failed");
                return Err(err.into());
            }
        };

        let response: ComicsResponse = serde_json::from_str(&text)?;
        tracing::debug!(
            code = response.code,
            count = response.data.count,
            "received comics response"
        );
        Ok(response)
    }

    async fn send(&self, url: &str, params: &SignedRequestParams) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .query(&params.as_query())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl ComicsSource for ComicsClient {
    async fn fetch_comics(&self) -> Result<ComicsResponse, ComicsError> {
        ComicsClient::fetch_comics(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sign;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves a single HTTP response and hands back the raw request head
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if n == 0 || buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{}/v1/public", addr), handle)
    }

    fn test_client(base_url: String) -> ComicsClient {
        let config = ClientConfig::new(Credentials::new("pub", "priv")).with_base_url(base_url);
        ComicsClient::new(config).unwrap()
    }

    fn query_params(request: &str) -> HashMap<String, String> {
        let request_line = request.lines().next().unwrap();
        let target = request_line.split_whitespace().nth(1).unwrap();
        let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config_points_at_marvel() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, MARVEL_API_BASE_URL);
        assert_eq!(config.comics_url(), "https://gateway.marvel.com/v1/public/comics");
        assert!(config.credentials.public_key.is_empty());
    }

    #[test]
    fn test_comics_url_tolerates_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:8080/v1/public/");
        assert_eq!(config.comics_url(), "http://localhost:8080/v1/public/comics");
    }

    #[test]
    fn test_error_messages() {
        let err: ComicsError = serde_json::from_str::<ComicsResponse>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, ComicsError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to parse JSON response"));
    }

    #[tokio::test]
    async fn test_fetch_sends_signed_request_to_comics_path() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"code":200,"status":"Ok","data":{"offset":0,"limit":20,"total":1,"count":1,"results":[{"id":1,"title":"Test Comic"}]}}"#,
        )
        .await;
        let client = test_client(base_url);

        let response = client.fetch_comics().await.expect("fetch should succeed");
        assert_eq!(response.code, 200);
        assert_eq!(response.data.results[0].title, "Test Comic");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1/public/comics?"));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("accept: application/json"));

        let params = query_params(&request);
        let ts = params.get("ts").expect("ts should be sent");
        assert!(ts.parse::<i64>().is_ok());
        assert_eq!(params.get("apikey").map(String::as_str), Some("pub"));
        assert_eq!(params.get("hash"), Some(&sign(ts, "pub", "priv")));
    }

    #[tokio::test]
    async fn test_fetch_returns_non_success_code_as_ok() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"code":404,"status":"Not Found"}"#).await;
        let client = test_client(base_url);

        let response = client.fetch_comics().await.expect("2xx should not be an error");
        assert_eq!(response.code, 404);
        assert!(!response.is_success());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status_to_transport_error() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"code":"InvalidCredentials","message":"The passed API key is invalid."}"#,
        )
        .await;
        let client = test_client(base_url);

        let err = client.fetch_comics().await.unwrap_err();
        match err {
            ComicsError::Transport(inner) => {
                assert_eq!(inner.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_maps_malformed_body_to_decode_error() {
        let (base_url, server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = test_client(base_url);

        let err = client.fetch_comics().await.unwrap_err();
        assert!(matches!(err, ComicsError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing is listening on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = test_client(format!("http://{}", addr));
        let err = client.fetch_comics().await.unwrap_err();
        assert!(matches!(err, ComicsError::Transport(_)));
    }
}
