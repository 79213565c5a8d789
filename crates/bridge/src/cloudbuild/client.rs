//! Cloud Build v1 REST client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::{METADATA_TOKEN_URL, TokenProvider};
use super::{BuildControl, BuildControlError, Completion, RemoteStatus};

/// Cloud Build API base URL.
const CLOUD_BUILD_API_BASE: &str = "https://cloudbuild.googleapis.com/v1";

/// Cloud Build API client.
///
/// Cheap to clone; clones share the HTTP client and token cache.
#[derive(Debug, Clone)]
pub struct CloudBuildClient {
    inner: Arc<CloudBuildClientInner>,
}

#[derive(Debug)]
struct CloudBuildClientInner {
    client: Client,
    api_base: String,
    tokens: TokenProvider,
}

/// Google API error body.
#[derive(Deserialize)]
struct ErrorBody {
    error: RemoteStatus,
}

impl CloudBuildClient {
    /// Create a client.
    ///
    /// Without a fixed token, tokens are fetched from the metadata server.
    #[must_use]
    pub fn new(access_token: Option<SecretString>) -> Self {
        let client = Client::new();
        let tokens = match access_token {
            Some(token) => TokenProvider::fixed(token),
            None => TokenProvider::metadata(client.clone(), METADATA_TOKEN_URL),
        };
        Self::with_parts(client, CLOUD_BUILD_API_BASE, tokens)
    }

    /// Create a client against another API root, such as a local mock server.
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>, access_token: SecretString) -> Self {
        Self::with_parts(
            Client::new(),
            api_base.into(),
            TokenProvider::fixed(access_token),
        )
    }

    fn with_parts(client: Client, api_base: impl Into<String>, tokens: TokenProvider) -> Self {
        Self {
            inner: Arc::new(CloudBuildClientInner {
                client,
                api_base: api_base.into().trim_end_matches('/').to_string(),
                tokens,
            }),
        }
    }

    /// API URL for `segments`, each percent-encoded as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BuildControlError> {
        let mut url = Url::parse(&self.inner.api_base)
            .map_err(|e| BuildControlError::Transport(format!("Invalid API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| BuildControlError::Transport("API base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    #[instrument(skip(self, body))]
    async fn post(&self, segments: &[&str], body: Value) -> Result<Completion, BuildControlError> {
        let url = self.endpoint(segments)?;
        let token = self.inner.tokens.access_token().await?;

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error.message)
                .filter(|message| !message.is_empty())
                .or_else(|| status.canonical_reason().map(String::from))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            warn!(status = status.as_u16(), message = %message, "Cloud Build API error");
            return Err(BuildControlError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "Cloud Build API call succeeded");

        if text.trim().is_empty() {
            return Ok(Completion::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| BuildControlError::Transport(format!("Invalid response body: {e}")))
    }
}

#[async_trait]
impl BuildControl for CloudBuildClient {
    async fn cancel_build(
        &self,
        project_id: &str,
        build_id: &str,
    ) -> Result<Completion, BuildControlError> {
        self.post(
            &["projects", project_id, "builds", &format!("{build_id}:cancel")],
            Value::Object(serde_json::Map::new()),
        )
        .await
    }

    async fn retry_build(
        &self,
        project_id: &str,
        build_id: &str,
    ) -> Result<Completion, BuildControlError> {
        self.post(
            &["projects", project_id, "builds", &format!("{build_id}:retry")],
            Value::Object(serde_json::Map::new()),
        )
        .await
    }

    async fn run_trigger(
        &self,
        project_id: &str,
        trigger_id: &str,
        branch: &str,
    ) -> Result<Completion, BuildControlError> {
        self.post(
            &["projects", project_id, "triggers", &format!("{trigger_id}:run")],
            serde_json::json!({ "branchName": branch }),
        )
        .await
    }
}
