//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and peer handling
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{GameError, PeerId, StateError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to create the initial world")]
    InitialWorld(#[source] StateError),

    #[error("{peer} speaks protocol {actual}, expected {expected}")]
    ProtocolMismatch {
        peer: PeerId,
        expected: u32,
        actual: u32,
    },

    #[error("{peer} is already connected")]
    PeerAlreadyConnected { peer: PeerId },

    #[error("packet from {peer}, which is not connected")]
    PeerNotConnected { peer: PeerId },

    #[error("invalid configuration value {name}={value}")]
    InvalidConfig { name: &'static str, value: String },
}

impl GameError for RuntimeError {
    fn severity(&self) -> game_core::ErrorSeverity {
        use game_core::ErrorSeverity;
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
            Self::Repository(_) => ErrorSeverity::Internal,
            Self::InitialWorld(error) => error.severity(),
            Self::ProtocolMismatch { .. }
            | Self::PeerAlreadyConnected { .. }
            | Self::PeerNotConnected { .. }
            | Self::InvalidConfig { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Repository(_) => "RUNTIME_REPOSITORY",
            Self::InitialWorld(_) => "RUNTIME_INITIAL_WORLD",
            Self::ProtocolMismatch { .. } => "RUNTIME_PROTOCOL_MISMATCH",
            Self::PeerAlreadyConnected { .. } => "RUNTIME_PEER_ALREADY_CONNECTED",
            Self::PeerNotConnected { .. } => "RUNTIME_PEER_NOT_CONNECTED",
            Self::InvalidConfig { .. } => "RUNTIME_INVALID_CONFIG",
        }
    }
}
