// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clihost_core::{ArgValue, Arguments};
use clihost_processor::InvokeParams;
use clihost_response::ResponseFormat;

/// Exit code for usage / host-level errors (distinct from a finalized
/// Response's own `exitCode`, which this binary forwards as-is).
const EXIT_USAGE_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "clihost", version, about = "clihost command processor demo host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Emit the response as a single JSON document instead of console text.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a greeting.
    Greet {
        /// Name to greet.
        #[arg(long)]
        name: String,
    },
    /// Resolve the `main` profile and its `dep` dependency.
    ProfileDemo,
    /// Run a two-step chained handler.
    ChainDemo,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(clihost_cli::log_filter(cli.debug))
        .init();

    let format = if cli.json {
        ResponseFormat::Json
    } else {
        ResponseFormat::Default
    };

    let result = match cli.command {
        Commands::Greet { name } => run(vec!["greet".into()], format, |args| {
            args.set("name", ArgValue::String(name));
        })
        .await,
        Commands::ProfileDemo => run(vec!["profile-demo".into()], format, |_| {}).await,
        Commands::ChainDemo => run(vec!["chain-demo".into()], format, |_| {}).await,
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(EXIT_USAGE_ERROR);
        }
    }
}

async fn run(
    command_path: Vec<String>,
    format: ResponseFormat,
    fill_arguments: impl FnOnce(&mut Arguments),
) -> Result<i32> {
    let processor = clihost_cli::build_processor(command_path.clone(), format)
        .await
        .with_context(|| format!("unknown command: {}", command_path.join(" ")))?;

    let mut arguments = Arguments::new();
    fill_arguments(&mut arguments);

    let snapshot = processor
        .invoke(InvokeParams {
            arguments,
            format: Some(format),
            silent: format == ResponseFormat::Json,
            cancellation: None,
        })
        .await;

    if format != ResponseFormat::Json {
        if let Some(error) = &snapshot.error {
            eprintln!("{error}");
        }
    }

    Ok(snapshot.exit_code)
}
