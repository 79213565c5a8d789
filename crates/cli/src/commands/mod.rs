//! CLI subcommands.

pub mod render;
pub mod sign;
pub mod translate;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid JSON of the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] slackbuild::slack::TemplateError),

    #[error(transparent)]
    Config(#[from] slackbuild::config::ConfigError),

    /// Writing output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
