//! `/builds` command dispatch.
//!
//! Every path ends in exactly one [`CommandResult`]; remote failures become
//! messages for the user rather than errors.

use std::collections::HashMap;

use slackbuild_core::{BAD_INPUT, Command, CommandArgs, CommandResult};
use tracing::{info, instrument, warn};

use crate::cloudbuild::{BuildControl, BuildControlError, Completion};

/// Cloud Build IDs are UUIDs.
const BUILD_ID_LEN: usize = 36;

const HELP: &str = "```\n\
/builds <command> [arguments]\n\
/builds retry <buildId>           Retry a failed build\n\
/builds cancel <buildId>          Cancel a build in progress\n\
/builds trigger <alias> <branch>  Run a configured trigger on a branch\n\
/builds help                      Show this message\n\
```";

/// Project and trigger aliases commands run against.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    pub project_id: String,
    /// Alias to Cloud Build trigger ID.
    pub triggers: HashMap<String, String>,
}

/// Run a command line and describe the outcome.
#[instrument(skip(control, config), fields(project = %config.project_id))]
pub async fn run(
    args: &CommandArgs,
    control: &dyn BuildControl,
    config: &DispatchConfig,
) -> CommandResult {
    let result = match Command::from_args(args) {
        Command::Cancel { build_id } => cancel(build_id.as_deref(), control, config).await,
        Command::Retry { build_id } => retry(build_id.as_deref(), control, config).await,
        Command::Trigger { alias, branch } => {
            trigger(alias.as_deref(), branch.as_deref(), control, config).await
        }
        Command::Help => CommandResult::ok(HELP),
        Command::Unknown => CommandResult::failed(BAD_INPUT),
    };

    info!(success = result.success, "Command finished");
    result
}

/// Validate a build ID argument, returning the failure to report if invalid.
fn check_build_id<'a>(
    build_id: Option<&'a str>,
    config: &DispatchConfig,
    usage: &str,
) -> Result<&'a str, CommandResult> {
    let build_id = build_id.unwrap_or_default();
    if config.project_id.is_empty() || build_id.is_empty() {
        return Err(CommandResult::failed(usage));
    }
    if !is_build_id(build_id) {
        return Err(CommandResult::failed("Invalid build ID"));
    }
    Ok(build_id)
}

/// A UUID-shaped ID: exactly 36 ASCII letters, digits or hyphens.
fn is_build_id(build_id: &str) -> bool {
    build_id.len() == BUILD_ID_LEN
        && build_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

async fn cancel(
    build_id: Option<&str>,
    control: &dyn BuildControl,
    config: &DispatchConfig,
) -> CommandResult {
    let build_id = match check_build_id(build_id, config, "Usage: cancel <buildId>") {
        Ok(id) => id,
        Err(result) => return result,
    };

    let outcome = control.cancel_build(&config.project_id, build_id).await;
    describe(outcome, "Build cancelled", || {
        format!("No build found in {} with ID {build_id}", config.project_id)
    })
}

async fn retry(
    build_id: Option<&str>,
    control: &dyn BuildControl,
    config: &DispatchConfig,
) -> CommandResult {
    let build_id = match check_build_id(build_id, config, "Usage: retry <buildId>") {
        Ok(id) => id,
        Err(result) => return result,
    };

    let outcome = control.retry_build(&config.project_id, build_id).await;
    describe(outcome, "Submitted retry request", || {
        format!("No build found in {} with ID {build_id}", config.project_id)
    })
}

async fn trigger(
    alias: Option<&str>,
    branch: Option<&str>,
    control: &dyn BuildControl,
    config: &DispatchConfig,
) -> CommandResult {
    const USAGE: &str = "Usage: trigger <alias> <branch>";

    let (Some(alias), Some(branch)) = (alias, branch) else {
        return CommandResult::failed(USAGE);
    };
    if config.project_id.is_empty() {
        return CommandResult::failed(USAGE);
    }
    let Some(trigger_id) = config.triggers.get(alias) else {
        warn!(alias, "Unknown trigger alias");
        return CommandResult::failed(USAGE);
    };

    let outcome = control
        .run_trigger(&config.project_id, trigger_id, branch)
        .await;
    describe(outcome, &format!("Triggered {alias} on branch {branch}"), || {
        format!(
            "No trigger found in {} with ID {trigger_id} and branch {branch}",
            config.project_id
        )
    })
}

fn describe(
    outcome: Result<Completion, BuildControlError>,
    success: &str,
    not_found: impl FnOnce() -> String,
) -> CommandResult {
    match outcome {
        Ok(completion) => match completion.failure() {
            Some(message) => CommandResult::failed(message),
            None => CommandResult::ok(success),
        },
        Err(e) if e.is_not_found() => CommandResult::failed(not_found()),
        Err(e) => {
            warn!(status = ?e.status(), error = %e, "Unhandled Cloud Build response");
            CommandResult::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::cloudbuild::RemoteStatus;
    use std::sync::Mutex;

    const BUILD_ID: &str = "e36544dc-82a1-cc63-bac7-a6b2d18d7ea6";

    /// Returns one canned outcome and records calls.
    struct Canned {
        outcome: Result<Completion, BuildControlError>,
        calls: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(outcome: Result<Completion, BuildControlError>) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok() -> Self {
            Self::new(Ok(Completion::default()))
        }

        fn http(status: u16, message: &str) -> Self {
            Self::new(Err(BuildControlError::Http {
                status,
                message: message.to_string(),
            }))
        }

        fn record(&self, call: String) -> Result<Completion, BuildControlError> {
            self.calls.lock().expect("lock").push(call);
            self.outcome.clone()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl BuildControl for Canned {
        async fn cancel_build(&self, project: &str, id: &str) -> Result<Completion, BuildControlError> {
            self.record(format!("cancel {project} {id}"))
        }

        async fn retry_build(&self, project: &str, id: &str) -> Result<Completion, BuildControlError> {
            self.record(format!("retry {project} {id}"))
        }

        async fn run_trigger(
            &self,
            project: &str,
            trigger: &str,
            branch: &str,
        ) -> Result<Completion, BuildControlError> {
            self.record(format!("trigger {project} {trigger} {branch}"))
        }
    }

    fn config() -> DispatchConfig {
        DispatchConfig {
            project_id: "p".to_string(),
            triggers: HashMap::from([("web".to_string(), "trigger-123".to_string())]),
        }
    }

    async fn run_text(text: &str, control: &Canned, config: &DispatchConfig) -> CommandResult {
        run(&CommandArgs::from_text(text), control, config).await
    }

    #[tokio::test]
    async fn test_empty_and_unknown_commands() {
        let control = Canned::ok();
        assert_eq!(run_text("", &control, &config()).await, CommandResult::failed(BAD_INPUT));
        assert_eq!(
            run_text("deploy prod", &control, &config()).await,
            CommandResult::failed(BAD_INPUT)
        );
        assert!(control.calls().is_empty());
    }

    #[tokio::test]
    async fn test_help() {
        let result = run_text("help", &Canned::ok(), &config()).await;
        assert!(result.success);
        for command in ["retry <buildId>", "cancel <buildId>", "trigger <alias> <branch>", "help"] {
            assert!(result.message.contains(command), "help mentions {command}");
        }
    }

    #[tokio::test]
    async fn test_usage_messages() {
        let control = Canned::ok();
        assert_eq!(
            run_text("retry", &control, &config()).await,
            CommandResult::failed("Usage: retry <buildId>")
        );
        assert_eq!(
            run_text("cancel", &control, &config()).await,
            CommandResult::failed("Usage: cancel <buildId>")
        );

        let no_project = DispatchConfig::default();
        assert_eq!(
            run_text(&format!("cancel {BUILD_ID}"), &control, &no_project).await,
            CommandResult::failed("Usage: cancel <buildId>")
        );
        assert!(control.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_build_id() {
        let control = Canned::ok();
        assert_eq!(
            run_text("retry e36544dc", &control, &config()).await,
            CommandResult::failed("Invalid build ID")
        );
        assert!(control.calls().is_empty());
    }

    #[tokio::test]
    async fn test_build_id_cannot_leave_project() {
        let control = Canned::ok();
        for text in [
            format!("cancel ../../other-project/builds/{BUILD_ID}"),
            format!("retry {BUILD_ID}/../x"),
            format!("cancel {BUILD_ID}0"),
            "retry e36544dc-82a1-cc63-bac7-a6b2d18d7%2F".to_string(),
        ] {
            assert_eq!(
                run_text(&text, &control, &config()).await,
                CommandResult::failed("Invalid build ID"),
                "{text}"
            );
        }
        assert!(control.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_and_retry_success() {
        let control = Canned::ok();
        assert_eq!(
            run_text(&format!("cancel {BUILD_ID}"), &control, &config()).await,
            CommandResult::ok("Build cancelled")
        );
        assert_eq!(
            run_text(&format!("RETRY {BUILD_ID}"), &control, &config()).await,
            CommandResult::ok("Submitted retry request")
        );
        assert_eq!(
            control.calls(),
            vec![format!("cancel p {BUILD_ID}"), format!("retry p {BUILD_ID}")]
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let control = Canned::http(404, "Requested entity was not found.");
        let result = run_text(&format!("cancel {BUILD_ID}"), &control, &config()).await;
        assert!(!result.success);
        assert!(result.message.contains(&format!("No build found in p with ID {BUILD_ID}")));

        let result = run_text("trigger web main", &control, &config()).await;
        assert_eq!(
            result,
            CommandResult::failed("No trigger found in p with ID trigger-123 and branch main")
        );
    }

    #[tokio::test]
    async fn test_remote_failure_is_verbatim() {
        let control = Canned::http(403, "The caller does not have permission");
        assert_eq!(
            run_text(&format!("retry {BUILD_ID}"), &control, &config()).await,
            CommandResult::failed("The caller does not have permission")
        );

        let control = Canned::new(Err(BuildControlError::Transport("connection refused".to_string())));
        assert_eq!(
            run_text(&format!("cancel {BUILD_ID}"), &control, &config()).await,
            CommandResult::failed("connection refused")
        );
    }

    #[tokio::test]
    async fn test_embedded_operation_error() {
        let control = Canned::new(Ok(Completion {
            done: true,
            error: Some(RemoteStatus {
                code: Some(9),
                message: Some("build is not in a retryable state".to_string()),
            }),
        }));
        assert_eq!(
            run_text(&format!("retry {BUILD_ID}"), &control, &config()).await,
            CommandResult::failed("build is not in a retryable state")
        );
    }

    #[tokio::test]
    async fn test_trigger() {
        let control = Canned::ok();
        assert_eq!(
            run_text("trigger web main", &control, &config()).await,
            CommandResult::ok("Triggered web on branch main")
        );
        assert_eq!(control.calls(), vec!["trigger p trigger-123 main".to_string()]);
    }

    #[tokio::test]
    async fn test_trigger_usage() {
        let control = Canned::ok();
        let usage = CommandResult::failed("Usage: trigger <alias> <branch>");

        assert_eq!(run_text("trigger unknownAlias main", &control, &config()).await, usage);
        assert_eq!(run_text("trigger web", &control, &config()).await, usage);
        assert_eq!(run_text("trigger", &control, &config()).await, usage);

        let no_project = DispatchConfig {
            project_id: String::new(),
            ..config()
        };
        assert_eq!(run_text("trigger web main", &control, &no_project).await, usage);
        assert!(control.calls().is_empty());
    }
}
