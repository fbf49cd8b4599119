//! Codec errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors raised while encoding or decoding an action stream.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CodecError {
    /// The stream ended before the field could be read.
    #[error("unexpected end of stream reading `{field}`: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// The bytes decoded to a value outside the field's domain.
    #[error("invalid value {value:#x} for `{field}`")]
    InvalidValue { field: &'static str, value: u64 },

    /// Bytes remain after the last declared field.
    #[error("{remaining} trailing bytes after the last field")]
    TrailingBytes { remaining: usize },

    /// The type tag does not name a registered action.
    #[error("unknown action type {0}")]
    UnknownActionType(u32),

    /// The operation is not available in the serialiser's current mode.
    #[error("serialiser is in {actual} mode, expected {expected}")]
    WrongMode {
        expected: &'static str,
        actual: &'static str,
    },
}

impl GameError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnexpectedEof { .. } | Self::InvalidValue { .. } | Self::TrailingBytes { .. } => {
                ErrorSeverity::Validation
            }
            Self::UnknownActionType(_) => ErrorSeverity::Fatal,
            Self::WrongMode { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnexpectedEof { .. } => "CODEC_UNEXPECTED_EOF",
            Self::InvalidValue { .. } => "CODEC_INVALID_VALUE",
            Self::TrailingBytes { .. } => "CODEC_TRAILING_BYTES",
            Self::UnknownActionType(_) => "CODEC_UNKNOWN_ACTION_TYPE",
            Self::WrongMode { .. } => "CODEC_WRONG_MODE",
        }
    }
}
