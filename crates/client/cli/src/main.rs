//! Command-line client for the park simulation runtime.
//!
//! Run with: `client-cli <command>`
mod commands;
mod world;

use anyhow::Result;
use clap::Parser;
use commands::{Demo, ReadActions, Replay};

/// Park simulation client
#[derive(Parser)]
#[command(name = "client-cli")]
#[command(about = "Drive and inspect the park simulation runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scripted session against a demo world and print its events
    Demo(Demo),

    /// Decode and list the records of an action log
    ReadActions(ReadActions),

    /// Replay an action log onto the demo world
    Replay(Replay),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Demo(cmd) => cmd.execute().await,
        Command::ReadActions(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
