//! slackbuild CLI - Developer tools for templates and webhook testing.
//!
//! # Usage
//!
//! ```bash
//! # Render a template with sample variables
//! slackbuild-cli render failure.json --dir crates/bridge/templates
//!
//! # Show what a saved notification would produce
//! slackbuild-cli translate notification.json --config config.yaml
//!
//! # Sign a request body for curl testing
//! slackbuild-cli sign --timestamp 1531420618 --body 'text=help'
//! ```
//!
//! # Commands
//!
//! - `render` - Render a message template
//! - `translate` - Translate a Cloud Build notification
//! - `sign` - Compute a Slack request signature

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "slackbuild-cli")]
#[command(author, version, about = "slackbuild developer tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a message template against sample build variables
    Render {
        /// Template file name; empty for the built-in default
        #[arg(default_value = "")]
        template: String,

        /// Template directory
        #[arg(short, long, default_value = "./templates")]
        dir: PathBuf,

        /// Value for `${channel}`
        #[arg(short, long, default_value = "#builds")]
        channel: String,
    },
    /// Translate a saved Cloud Build notification into message variables
    Translate {
        /// JSON file holding a push envelope or Pub/Sub message
        file: PathBuf,

        /// YAML config supplying templates and `github_url`
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute the Slack signature of a request body (uses `SLACK_SIGNING_SECRET`)
    Sign {
        /// `X-Slack-Request-Timestamp` value
        #[arg(short, long)]
        timestamp: String,

        /// Raw request body
        #[arg(short, long)]
        body: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Render {
            template,
            dir,
            channel,
        } => commands::render::run(&template, &dir, &channel, &mut out),
        Commands::Translate { file, config } => {
            commands::translate::run(&file, config.as_deref(), &mut out)
        }
        Commands::Sign { timestamp, body } => {
            let secret = commands::sign::secret_from_env()?;
            commands::sign::run(secret, &timestamp, &body, &mut out)
        }
    }
}
