//! Template expansion and interactive message edits.

use std::sync::Arc;

use slackbuild_core::MessageVariables;
use tracing::{debug, error, instrument, warn};

use super::client::ChatPoster;
use super::templates::{DEFAULT_TEMPLATE, TemplateError, TemplateSource};
use super::types::{Attachment, ChatMessage, Field};

/// Expand `${name}` placeholders.
///
/// Placeholders the lookup does not resolve, and malformed ones, are kept as
/// literal text.
pub fn substitute<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        let (before, tail) = rest.split_at(start);
        output.push_str(before);

        let placeholder = tail.get(2..).unwrap_or_default();
        match placeholder
            .split_once('}')
            .filter(|(name, _)| is_identifier(name))
        {
            Some((name, after)) => {
                match lookup(name) {
                    Some(value) => output.push_str(&value),
                    None => {
                        output.push_str("${");
                        output.push_str(name);
                        output.push('}');
                    }
                }
                rest = after;
            }
            // Not a placeholder: keep the `$` and rescan from the brace
            None => {
                output.push('$');
                rest = tail.get(1..).unwrap_or_default();
            }
        }
    }

    output.push_str(rest);
    output
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape a value for insertion inside a JSON string literal.
fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or_default()
        .to_string()
}

/// Renders build notifications from templates.
#[derive(Clone)]
pub struct MessageRenderer {
    templates: Arc<dyn TemplateSource>,
    channel: String,
}

impl std::fmt::Debug for MessageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRenderer")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl MessageRenderer {
    #[must_use]
    pub fn new(templates: Arc<dyn TemplateSource>, channel: impl Into<String>) -> Self {
        Self {
            templates,
            channel: channel.into(),
        }
    }

    /// Render a message from the named template.
    ///
    /// An empty name selects `default.json`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if the template does not exist, or
    /// `TemplateError::Invalid` if the expanded text is not a message.
    #[instrument(skip(self, variables), fields(build_id = %variables.build_id))]
    pub fn render(
        &self,
        variables: &MessageVariables,
        template_name: &str,
    ) -> Result<ChatMessage, TemplateError> {
        let name = if template_name.is_empty() {
            DEFAULT_TEMPLATE
        } else {
            template_name
        };
        let template = self.templates.load(name)?;

        let expanded = substitute(&template, |key| {
            let value = if key == "channel" {
                Some(self.channel.as_str())
            } else {
                variables.get(key)
            };
            value.map(json_escape)
        });

        let message = serde_json::from_str(&expanded).map_err(|source| TemplateError::Invalid {
            name: name.to_string(),
            source,
        })?;

        debug!(template = %name, "Rendered message");
        Ok(message)
    }

    /// Rewrite an interactive message to show the outcome of a button click.
    ///
    /// Buttons are removed and the last attachment's fields are replaced with
    /// a single line naming the user on success, or a warning on failure.
    #[must_use]
    pub fn edit_for_interaction(
        mut original: ChatMessage,
        success: bool,
        result_text: &str,
        actor_id: &str,
    ) -> ChatMessage {
        original.replace_original = true;

        for attachment in &mut original.attachments {
            if attachment.has_actions() {
                attachment.actions = Some(Vec::new());
            }
        }

        let value = if success {
            format!("<@{actor_id}> {result_text}")
        } else {
            format!(":warning: {result_text}")
        };

        if original.attachments.is_empty() {
            warn!("Interactive message had no attachments");
            original.attachments.push(Attachment::default());
        }
        if let Some(last) = original.attachments.last_mut() {
            last.fields = vec![Field::wide(value)];
        }

        original
    }
}

/// Post a message, reporting whether Slack accepted it.
pub async fn post(poster: &dyn ChatPoster, message: &ChatMessage) -> bool {
    match poster.post_message(message).await {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "Failed to post message to Slack");
            false
        }
    }
}
