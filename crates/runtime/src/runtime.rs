//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use game_core::{ActionRegistry, GameConfig, WorldState};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::repository::FileActionLog;
use crate::workers::{Command, SimulationWorker};

/// File name of the committed action log inside `action_log_dir`.
pub const ACTION_LOG_FILE: &str = "actions.log";

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Version peers must present in [`RuntimeHandle::connect_peer`].
    pub protocol_version: u32,
    /// Directory for the committed action log. Logging is off when unset.
    pub action_log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            protocol_version: GameConfig::NETWORK_PROTOCOL_VERSION,
            action_log_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads overrides from `PARK_*` environment variables on top of the
    /// defaults.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `PARK_EVENT_BUFFER_SIZE` | `event_buffer_size` |
    /// | `PARK_COMMAND_BUFFER_SIZE` | `command_buffer_size` |
    /// | `PARK_PROTOCOL_VERSION` | `protocol_version` |
    /// | `PARK_ACTION_LOG_DIR` | `action_log_dir` |
    /// | `PARK_EDITOR_MODE` | `game_config.editor_mode` |
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(size) = parse_var("PARK_EVENT_BUFFER_SIZE")? {
            config.event_buffer_size = size;
        }
        if let Some(size) = parse_var("PARK_COMMAND_BUFFER_SIZE")? {
            config.command_buffer_size = size;
        }
        if let Some(version) = parse_var("PARK_PROTOCOL_VERSION")? {
            config.protocol_version = version;
        }
        if let Some(editor_mode) = parse_var("PARK_EDITOR_MODE")? {
            config.game_config.editor_mode = editor_mode;
        }
        if let Ok(dir) = env::var("PARK_ACTION_LOG_DIR")
            && !dir.is_empty()
        {
            config.action_log_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects buffer sizes the channels cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig {
                name: "event_buffer_size",
                value: "0".into(),
            });
        }
        if self.command_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig {
                name: "command_buffer_size",
                value: "0".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RuntimeError::InvalidConfig { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Main runtime that orchestrates the simulation
///
/// Runtime owns the worker task. [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every other clone of the handle is dropped too.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<WorldState>,
    registry: Option<&'static ActionRegistry>,
}

impl RuntimeBuilder {
    /// Size of the default world, in tiles.
    pub const DEFAULT_MAP_SIZE: u16 = 64;

    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            registry: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the initial world. Defaults to an empty
    /// [`DEFAULT_MAP_SIZE`](Self::DEFAULT_MAP_SIZE) square map.
    pub fn initial_world(mut self, world: WorldState) -> Self {
        self.world = Some(world);
        self
    }

    /// Decode packets with a custom registry instead of the built-in one.
    pub fn registry(mut self, registry: &'static ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        self.config.validate()?;

        let world = match self.world {
            Some(world) => world,
            None => WorldState::new(Self::DEFAULT_MAP_SIZE, Self::DEFAULT_MAP_SIZE)
                .map_err(RuntimeError::InitialWorld)?,
        };
        let registry = self.registry.unwrap_or_else(ActionRegistry::global);

        let action_log = match &self.config.action_log_dir {
            Some(dir) => {
                let log = FileActionLog::open_or_create(dir, ACTION_LOG_FILE)?;
                info!(path = %log.path().display(), "Action log opened");
                Some(log)
            }
            None => None,
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            world,
            self.config,
            registry,
            command_rx,
            event_bus,
            action_log,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
