//! Application state shared across handlers.
//!
//! Built once at startup and never mutated afterwards.

use std::sync::Arc;

use crate::build_event::TranslatorConfig;
use crate::cloudbuild::{BuildControl, CloudBuildClient};
use crate::config::BridgeConfig;
use crate::dispatch::DispatchConfig;
use crate::slack::{
    ChatPoster, DirectoryTemplates, MessageRenderer, SignatureVerifier, SlackClient,
    TemplateSource,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    verifier: SignatureVerifier,
    renderer: MessageRenderer,
    poster: Arc<dyn ChatPoster>,
    build_control: Arc<dyn BuildControl>,
    translator: TranslatorConfig,
    dispatch: DispatchConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("renderer", &self.inner.renderer)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state with the real Slack and Cloud Build clients.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let templates = Arc::new(DirectoryTemplates::new(config.templates_dir.clone()));
        let poster = Arc::new(SlackClient::new(config.slack.bot_token.clone()));
        let build_control = Arc::new(CloudBuildClient::new(config.gcloud.access_token.clone()));

        Self::with_clients(config, templates, poster, build_control)
    }

    /// Create state with caller-provided collaborators.
    #[must_use]
    pub fn with_clients(
        config: BridgeConfig,
        templates: Arc<dyn TemplateSource>,
        poster: Arc<dyn ChatPoster>,
        build_control: Arc<dyn BuildControl>,
    ) -> Self {
        let verifier = SignatureVerifier::new(
            config.slack.signing_secret.clone(),
            config.slack.max_content_length,
        );
        let renderer = MessageRenderer::new(templates, config.slack.channel.clone());
        let translator = TranslatorConfig {
            templates: config.slack.templates.clone(),
            github_url: config.github_url.clone(),
        };
        let dispatch = DispatchConfig {
            project_id: config.gcloud.project_id.clone(),
            triggers: config.gcloud.triggers.clone(),
        };

        Self {
            inner: Arc::new(AppStateInner {
                config,
                verifier,
                renderer,
                poster,
                build_control,
                translator,
                dispatch,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }

    #[must_use]
    pub fn renderer(&self) -> &MessageRenderer {
        &self.inner.renderer
    }

    #[must_use]
    pub fn poster(&self) -> &dyn ChatPoster {
        self.inner.poster.as_ref()
    }

    #[must_use]
    pub fn build_control(&self) -> &dyn BuildControl {
        self.inner.build_control.as_ref()
    }

    #[must_use]
    pub fn translator(&self) -> &TranslatorConfig {
        &self.inner.translator
    }

    #[must_use]
    pub fn dispatch(&self) -> &DispatchConfig {
        &self.inner.dispatch
    }
}
