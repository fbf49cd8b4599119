//! Read and inspect action log files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use game_core::{ActionRegistry, describe_action};
use runtime::ActionLogReader;

use super::OutputFormat;

/// Decode and list the records of an action log
#[derive(Parser)]
pub struct ReadActions {
    /// Path to an actions.log file
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "list")]
    format: OutputFormat,

    /// Limit number of records to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,
}

impl ReadActions {
    pub fn execute(self) -> Result<()> {
        let reader = ActionLogReader::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let registry = ActionRegistry::global();
        let limit = if self.limit == 0 { usize::MAX } else { self.limit };

        for record in reader.take(limit) {
            let record = record?;
            let decoded = registry.decode(&record.packet);
            let (name, description) = match decoded {
                Ok(mut action) => (
                    registry.name(action.action_type()).unwrap_or("unregistered"),
                    describe_action(action.as_mut())?,
                ),
                Err(error) => ("undecodable", error.to_string()),
            };

            match self.format {
                OutputFormat::List => {
                    println!("tick {:>6}  {name:<18} {description}", record.tick);
                }
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "tick": record.tick,
                        "action": name,
                        "fields": description,
                        "packet": hex::encode(&record.packet),
                    })
                ),
            }
        }
        Ok(())
    }
}
