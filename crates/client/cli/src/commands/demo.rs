//! Scripted session against the demo world.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::info;

use game_core::{
    BannerSetColourAction, BannerSetNameAction, GameAction, PauseToggleAction, PeerId,
    SignSetStyleAction, encode_action,
};
use runtime::{
    Event, FileStateRepository, NetworkEvent, Runtime, RuntimeConfig, RuntimeHandle,
    StateRepository, Topic,
};

use super::OutputFormat;
use crate::world::{LARGE_SIGN, WALL_SIGN, demo_world};

const GUEST: PeerId = PeerId(1);

/// Run a scripted session and print every event
#[derive(Parser)]
pub struct Demo {
    /// Write committed actions to DIR/actions.log (overrides PARK_ACTION_LOG_DIR)
    #[arg(short, long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Save a world snapshot to DIR after the first tick
    #[arg(short, long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "list")]
    format: OutputFormat,
}

struct Printer {
    receivers: Vec<broadcast::Receiver<Event>>,
    format: OutputFormat,
}

impl Printer {
    fn new(handle: &RuntimeHandle, format: OutputFormat) -> Self {
        Self {
            receivers: Topic::ALL.iter().map(|&topic| handle.subscribe(topic)).collect(),
            format,
        }
    }

    /// Prints everything published since the last call, topic by topic.
    fn flush(&mut self, step: &str) -> Result<()> {
        if matches!(self.format, OutputFormat::List) {
            println!("== {step}");
        }
        for rx in &mut self.receivers {
            while let Ok(event) = rx.try_recv() {
                match self.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string(&event)?),
                    OutputFormat::List => println!("  {}", render(&event)),
                }
            }
        }
        Ok(())
    }
}

fn render(event: &Event) -> String {
    match event {
        Event::Network(NetworkEvent::Broadcast { exclude, packet }) => match exclude {
            Some(peer) => format!("broadcast (except {peer}) {}", hex::encode(packet)),
            None => format!("broadcast {}", hex::encode(packet)),
        },
        other => format!("{other:?}"),
    }
}

fn packet(mut action: impl GameAction, network_id: u32) -> Result<Vec<u8>> {
    action.envelope_mut().network_id = network_id;
    encode_action(&mut action).context("failed to encode guest packet")
}

impl Demo {
    pub async fn execute(self) -> Result<()> {
        let mut config = RuntimeConfig::from_env()?;
        if let Some(dir) = self.log_dir {
            config.action_log_dir = Some(dir);
        }
        let protocol_version = config.protocol_version;

        let runtime = Runtime::builder()
            .config(config)
            .initial_world(demo_world()?)
            .build()
            .await?;
        let handle = runtime.handle();
        let mut printer = Printer::new(&handle, self.format);

        handle.connect_peer(GUEST, protocol_version, false).await?;

        let wall = i32::from(WALL_SIGN.0);
        let large = i32::from(LARGE_SIGN.0);

        handle
            .submit(Box::new(SignSetStyleAction::new(wall, 5, 2, false)))
            .await?;
        handle
            .submit(Box::new(SignSetStyleAction::new(large, 12, 4, true)))
            .await?;
        handle
            .submit(Box::new(BannerSetNameAction::new(wall, "Log Flume")))
            .await?;
        let report = handle.tick().await?;
        info!(tick = report.tick, committed = report.committed, "Local edits applied");
        printer.flush("local sign edits")?;

        if let Some(dir) = &self.snapshot_dir {
            let world = handle.query_world().await?;
            FileStateRepository::new(dir)?.save(world.clock.tick, &world)?;
            info!(tick = world.clock.tick, dir = %dir.display(), "Snapshot saved");
        }

        handle
            .receive_packet(GUEST, packet(BannerSetColourAction::new(large, 7), 100)?)
            .await?;
        handle.receive_packet(GUEST, vec![0xde, 0xad]).await?;
        handle
            .receive_packet(GUEST, packet(PauseToggleAction::default(), 101)?)
            .await?;
        handle.tick().await?;
        printer.flush("guest traffic")?;

        handle.submit(Box::new(PauseToggleAction::default())).await?;
        handle
            .submit(Box::new(BannerSetColourAction::new(wall, 9)))
            .await?;
        handle.tick().await?;
        printer.flush("paused")?;

        handle.submit(Box::new(PauseToggleAction::default())).await?;
        let report = handle.tick().await?;
        printer.flush("resumed")?;

        info!(tick = report.tick, checksum = %report.checksum, "Demo finished");

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }
}
