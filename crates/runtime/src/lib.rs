//! Runtime orchestration for the deterministic park simulation.
//!
//! This crate wires together the action registry, the simulation worker, the
//! topic event bus, and repositories into a cohesive runtime API. Consumers
//! embed [`Runtime`] to queue actions, feed peer traffic, advance ticks, and
//! subscribe to events through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder, and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists committed actions and world snapshots
//! - [`replay`] rebuilds a world from the action log
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod replay;
pub mod repository;
pub mod runtime;
pub mod utils;

mod workers;

pub use api::{PendingDispatch, ReceiveOutcome, Result, RuntimeError, RuntimeHandle};
pub use events::{
    ActionRef, Event, EventBus, EventBusUi, GameStateEvent, NetworkEvent, TickReport, Topic,
    UiEvent,
};
pub use replay::{ReplayStep, replay};
pub use repository::{
    ActionLogReader, ActionLogRecord, FileActionLog, FileStateRepository, RepositoryError,
    StateRepository,
};
pub use runtime::{ACTION_LOG_FILE, Runtime, RuntimeBuilder, RuntimeConfig};
