//! OAuth access tokens for the Cloud Build API.
//!
//! A token comes either from configuration (`GCLOUD_ACCESS_TOKEN`, useful
//! locally with `gcloud auth print-access-token`) or from the metadata server
//! of the Cloud Run / GCE instance the bridge runs on.

use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::BuildControlError;

/// Default service account token endpoint on the metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh tokens this many seconds before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// A bearer token and its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: SecretString,
    /// Unix timestamp when the token expires. `None` never expires.
    pub expires_at: Option<i64>,
}

impl AccessToken {
    /// Check if the token expires within the given number of seconds.
    #[must_use]
    pub fn expires_within(&self, seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| chrono::Utc::now().timestamp() + seconds >= expires_at)
    }
}

/// Response from the metadata server token endpoint.
#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

/// Hands out access tokens, fetching and caching them as needed.
#[derive(Debug)]
pub struct TokenProvider {
    client: reqwest::Client,
    metadata_url: String,
    cache: RwLock<Option<AccessToken>>,
}

impl TokenProvider {
    /// Always use the given token.
    #[must_use]
    pub fn fixed(token: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            metadata_url: METADATA_TOKEN_URL.to_string(),
            cache: RwLock::new(Some(AccessToken {
                token,
                expires_at: None,
            })),
        }
    }

    /// Fetch tokens from a metadata server endpoint.
    #[must_use]
    pub fn metadata(client: reqwest::Client, metadata_url: impl Into<String>) -> Self {
        Self {
            client,
            metadata_url: metadata_url.into(),
            cache: RwLock::new(None),
        }
    }

    /// Current token, refreshed from the metadata server when close to expiry.
    ///
    /// # Errors
    ///
    /// Returns `BuildControlError::Auth` if the metadata server is unreachable
    /// or returns an unexpected response.
    pub async fn access_token(&self) -> Result<SecretString, BuildControlError> {
        if let Some(cached) = self.cache.read().await.as_ref()
            && !cached.expires_within(REFRESH_MARGIN_SECS)
        {
            return Ok(cached.token.clone());
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref()
            && !cached.expires_within(REFRESH_MARGIN_SECS)
        {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    #[instrument(skip(self), fields(url = %self.metadata_url))]
    async fn fetch(&self) -> Result<AccessToken, BuildControlError> {
        let now = chrono::Utc::now().timestamp();

        let response = self
            .client
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| BuildControlError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildControlError::Auth(format!(
                "metadata server returned HTTP {status}"
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| BuildControlError::Auth(e.to_string()))?;

        debug!(expires_in = body.expires_in, "Fetched access token");

        Ok(AccessToken {
            token: SecretString::from(body.access_token),
            expires_at: Some(now + body.expires_in),
        })
    }
}
