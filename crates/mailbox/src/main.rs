//! `Mailbox` - webmail in the terminal
//!
//! Accounts live with a hosted identity provider, mail lives in a hosted
//! document store. Each subcommand performs one action and exits.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod render;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use commands::Context;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailbox=info,mailbox_core=info,mailbox_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.unwrap_or_else(settings::settings_path);
    debug!("Using settings at {:?}", settings_path);

    let result: anyhow::Result<()> = async {
        let ctx = Context::load(settings_path).await?;
        commands::run(ctx, cli.command).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e:#}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
