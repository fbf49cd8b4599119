//! Deterministic action dispatch for a simulated park world.
//!
//! `game-core` defines the canonical rules (actions, engine, world state) and
//! exposes pure APIs that can be reused by both the runtime and offline tools.
//! All state mutation flows through [`engine::GameEngine`]; actions cross the
//! network as codec bytes and are rebuilt through [`action::ActionRegistry`].
pub mod action;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod ui;

pub use action::{
    ActionEnvelope, ActionErrorKind, ActionFlags, ActionRegistry, ActionResult, ActionStatus,
    ActionType, BannerSetColourAction, BannerSetNameAction, CommandFlags, ErrorDetail, GameAction,
    PauseToggleAction, RegistryError, SignSetStyleAction, StringId, describe_action, encode_action,
};
pub use codec::{CodecError, DataSerialiser};
pub use config::GameConfig;
pub use engine::{Dispatch, DispatchContext, DispatchPhase, GameEngine, Origin, PeerId};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    Banner, BannerIndex, BannerTable, CoordsXY, Direction, ElementRef, SimulationClock,
    StateError, TileCoords, TileElement, TileElementKind, TileMap, WorldState,
};
pub use ui::{Intent, IntentAction, IntentExtra, IntentValue, NullUi, RecordingUi, UiContext};
