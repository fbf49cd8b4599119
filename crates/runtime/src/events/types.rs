//! Event types for each topic.

use serde::Serialize;

use game_core::ui::Invalidation;
use game_core::{ActionResult, ActionStatus, ActionType, Intent, Origin, PeerId};

/// Identifies a dispatched action in events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRef {
    pub action_type: ActionType,
    /// Registry name, or `"unregistered"`.
    pub name: &'static str,
    pub network_id: u32,
    pub player_id: u8,
    pub origin: Origin,
    /// Tick during which the action was dispatched.
    pub tick: u64,
}

/// Summary of one simulation tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Clock value after the tick.
    pub tick: u64,
    /// Whether the clock moved (false while paused).
    pub advanced: bool,
    pub dispatched: usize,
    pub committed: usize,
    /// Hex SHA-256 of the world after the tick.
    pub checksum: String,
}

/// Dispatch outcomes and tick boundaries.
#[derive(Debug, Clone, Serialize)]
pub enum GameStateEvent {
    ActionCommitted {
        action: ActionRef,
        /// Field rendering from the logging serialiser.
        description: String,
    },
    /// Policy check or query failed; the world is unchanged.
    ActionRejected {
        action: ActionRef,
        result: ActionResult,
    },
    /// Execute reported failure.
    ActionFailed {
        action: ActionRef,
        result: ActionResult,
    },
    TickCompleted(TickReport),
}

/// Presentation side effects produced by `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UiEvent {
    Invalidate(Invalidation),
    Intent(Intent),
}

/// Outbound traffic for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NetworkEvent {
    /// Send a committed packet to every connected peer except `exclude`.
    Broadcast {
        exclude: Option<PeerId>,
        packet: Vec<u8>,
    },
    /// Tell a peer how its action ended.
    Acknowledge {
        peer: PeerId,
        network_id: u32,
        status: ActionStatus,
    },
    /// A peer tried to join with another protocol version.
    PeerRefused {
        peer: PeerId,
        protocol_version: u32,
    },
}
