//! Replay an action log onto the demo world or a saved snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use game_core::{ActionRegistry, RecordingUi};
use runtime::utils::hash::world_checksum;
use runtime::{ActionLogReader, FileStateRepository, StateRepository, replay};

use crate::world::demo_world;

/// Replay an action log and print the resulting checksum
#[derive(Parser)]
pub struct Replay {
    /// Path to an actions.log file
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Start from the latest snapshot in DIR, skipping records it already holds
    #[arg(short, long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let reader = ActionLogReader::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let (start_tick, mut world) = match &self.snapshot_dir {
            Some(dir) => {
                let Some((tick, world)) = FileStateRepository::new(dir)?.latest()? else {
                    bail!("no snapshots in {}", dir.display());
                };
                info!(tick, dir = %dir.display(), "Replaying from snapshot");
                (tick, world)
            }
            None => (0, demo_world()?),
        };
        let mut ui = RecordingUi::new();

        // A snapshot taken at tick N already holds every record from earlier ticks.
        let mut skipped = 0usize;
        let records = reader.filter(|record| match record {
            Ok(record) if record.tick < start_tick => {
                skipped += 1;
                false
            }
            _ => true,
        });

        let steps = replay(records, ActionRegistry::global(), &mut world, &mut ui)?;
        for step in &steps {
            let action = step
                .action_type
                .map_or_else(|| "?".to_string(), |action_type| action_type.to_string());
            println!(
                "tick {:>6}  action {action:<5} {}",
                step.tick,
                step.dispatch.phase.as_str()
            );
        }

        println!(
            "{} records ({skipped} skipped), {} redraws, {} intents",
            steps.len(),
            ui.invalidations.len(),
            ui.intents.len()
        );
        println!(
            "tick {} checksum {}",
            world.clock.tick,
            world_checksum(&world)?
        );
        Ok(())
    }
}
