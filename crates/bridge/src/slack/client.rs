//! Slack Web API client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::error::SlackError;
use super::types::{ChatMessage, PostMessageResponse};

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Something that can post a message to Slack.
#[async_trait]
pub trait ChatPoster: Send + Sync {
    /// Post a message, returning Slack's `ok` flag.
    ///
    /// # Errors
    ///
    /// Returns error if the request could not be sent or the response could
    /// not be read. A response with `ok: false` is not an error.
    async fn post_message(&self, message: &ChatMessage) -> Result<bool, SlackError>;
}

/// Slack API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    bot_token: SecretString,
    api_base: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    #[must_use]
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base: SLACK_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root, such as a local mock server.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatPoster for SlackClient {
    #[instrument(skip(self, message), fields(channel = ?message.channel))]
    async fn post_message(&self, message: &ChatMessage) -> Result<bool, SlackError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .json(message)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        if result.ok {
            debug!(
                ts = ?result.ts,
                channel = ?result.channel,
                "Message posted to Slack"
            );
        } else {
            error!(
                error = ?result.error,
                "Slack API error posting message"
            );
        }

        Ok(result.ok)
    }
}
