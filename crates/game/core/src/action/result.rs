//! Outcome of validating or executing an action.
//!
//! Expected failures are ordinary values: every `query` and `execute` returns
//! an [`ActionResult`] whose status is either success or one
//! [`ActionErrorKind`], paired with a localisable message identifier.

use crate::codec::CodecError;
use crate::error::{ErrorSeverity, GameError};

use super::ActionFlags;

/// Identifier of a localised message. Resolution to text happens in the
/// presentation layer; [`StringId::fallback_text`] covers logs and tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringId(pub u16);

impl StringId {
    /// No message. Never stored in a failed result.
    pub const NONE: Self = Self(0);
    pub const INVALID_PARAMETERS: Self = Self(1);
    pub const OBJECT_NOT_FOUND: Self = Self(2);
    pub const WRONG_OBJECT_KIND: Self = Self(3);
    pub const UNKNOWN_ERROR: Self = Self(4);
    pub const MALFORMED_PACKET: Self = Self(5);
    pub const NOT_ALLOWED_WHILE_PAUSED: Self = Self(6);
    pub const NOT_ALLOWED_HERE: Self = Self(7);
    pub const INSUFFICIENT_PERMISSION: Self = Self(8);
    pub const CANT_REPAINT_THIS: Self = Self(9);
    pub const CANT_RENAME_BANNER: Self = Self(10);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Untranslated English text for the identifier.
    pub const fn fallback_text(self) -> &'static str {
        match self {
            Self::NONE => "",
            Self::INVALID_PARAMETERS => "Invalid parameters",
            Self::OBJECT_NOT_FOUND => "Object not found",
            Self::WRONG_OBJECT_KIND => "Object is not of the expected kind",
            Self::UNKNOWN_ERROR => "Unknown error",
            Self::MALFORMED_PACKET => "Malformed action packet",
            Self::NOT_ALLOWED_WHILE_PAUSED => "Not allowed while the game is paused",
            Self::NOT_ALLOWED_HERE => "Not allowed outside the scenario editor",
            Self::INSUFFICIENT_PERMISSION => "Insufficient permission",
            Self::CANT_REPAINT_THIS => "Can't repaint this",
            Self::CANT_RENAME_BANNER => "Can't rename banner",
            _ => "Unrecognised message",
        }
    }
}

/// Reason an action was rejected or failed.
///
/// The set only grows: existing variants keep their meaning and code.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    thiserror::Error,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionErrorKind {
    #[error("invalid parameters")]
    InvalidParameters,
    #[error("target not found")]
    NotFound,
    #[error("target is of the wrong kind")]
    WrongKind,
    #[error("unknown failure")]
    Unknown,
    #[error("action could not be decoded")]
    DecodeFailure,
    #[error("not allowed while paused")]
    GamePaused,
    #[error("not allowed in this mode")]
    Disallowed,
    #[error("insufficient permission")]
    InsufficientPermission,
}

impl ActionErrorKind {
    /// Message used when a failure is created without one.
    pub const fn default_message(self) -> StringId {
        match self {
            Self::InvalidParameters => StringId::INVALID_PARAMETERS,
            Self::NotFound => StringId::OBJECT_NOT_FOUND,
            Self::WrongKind => StringId::WRONG_OBJECT_KIND,
            Self::Unknown => StringId::UNKNOWN_ERROR,
            Self::DecodeFailure => StringId::MALFORMED_PACKET,
            Self::GamePaused => StringId::NOT_ALLOWED_WHILE_PAUSED,
            Self::Disallowed => StringId::NOT_ALLOWED_HERE,
            Self::InsufficientPermission => StringId::INSUFFICIENT_PERMISSION,
        }
    }
}

impl GameError for ActionErrorKind {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::GamePaused => ErrorSeverity::Recoverable,
            Self::InvalidParameters
            | Self::NotFound
            | Self::WrongKind
            | Self::Disallowed
            | Self::InsufficientPermission => ErrorSeverity::Validation,
            Self::Unknown => ErrorSeverity::Internal,
            Self::DecodeFailure => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidParameters => "ACTION_INVALID_PARAMETERS",
            Self::NotFound => "ACTION_NOT_FOUND",
            Self::WrongKind => "ACTION_WRONG_KIND",
            Self::Unknown => "ACTION_UNKNOWN",
            Self::DecodeFailure => "ACTION_DECODE_FAILURE",
            Self::GamePaused => "ACTION_GAME_PAUSED",
            Self::Disallowed => "ACTION_DISALLOWED",
            Self::InsufficientPermission => "ACTION_INSUFFICIENT_PERMISSION",
        }
    }
}

/// Structured context attached to a failure for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorDetail {
    /// A parameter value that failed validation.
    Parameter { name: &'static str, value: i64 },
    /// The codec error behind a `DecodeFailure`.
    Decode(CodecError),
    /// Flags the current session lacks.
    MissingFlags(ActionFlags),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionStatus {
    Ok,
    Error(ActionErrorKind),
}

/// Result of `query` or `execute`. Immutable once returned.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionResult {
    status: ActionStatus,
    message: StringId,
    detail: Option<ErrorDetail>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            status: ActionStatus::Ok,
            message: StringId::NONE,
            detail: None,
        }
    }

    /// Creates a failure. `StringId::NONE` is replaced by the kind's default
    /// message.
    pub fn error(kind: ActionErrorKind, message: StringId) -> Self {
        let message = if message.is_none() {
            kind.default_message()
        } else {
            message
        };
        Self {
            status: ActionStatus::Error(kind),
            message,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ActionStatus::Ok
    }

    pub fn error_kind(&self) -> Option<ActionErrorKind> {
        match self.status {
            ActionStatus::Ok => None,
            ActionStatus::Error(kind) => Some(kind),
        }
    }

    pub fn message(&self) -> StringId {
        self.message
    }

    pub fn detail(&self) -> Option<&ErrorDetail> {
        self.detail.as_ref()
    }
}

impl Default for ActionResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<CodecError> for ActionResult {
    fn from(error: CodecError) -> Self {
        Self::error(ActionErrorKind::DecodeFailure, StringId::NONE)
            .with_detail(ErrorDetail::Decode(error))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_kind_has_a_meaningful_default_message() {
        for kind in ActionErrorKind::iter() {
            let result = ActionResult::error(kind, StringId::NONE);
            assert!(!result.message().is_none(), "{kind:?}");
            assert_ne!(result.message().fallback_text(), "Unrecognised message");
            assert_eq!(result.error_kind(), Some(kind));
        }
    }

    #[test]
    fn explicit_message_is_kept() {
        let result =
            ActionResult::error(ActionErrorKind::InvalidParameters, StringId::CANT_REPAINT_THIS);
        assert_eq!(result.message(), StringId::CANT_REPAINT_THIS);
        assert!(!result.is_ok());
    }

    #[test]
    fn error_codes_are_unique() {
        let mut codes: Vec<_> = ActionErrorKind::iter().map(|k| k.error_code()).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn codec_errors_become_decode_failures() {
        let result = ActionResult::from(CodecError::TrailingBytes { remaining: 2 });
        assert_eq!(result.error_kind(), Some(ActionErrorKind::DecodeFailure));
        assert!(matches!(result.detail(), Some(ErrorDetail::Decode(_))));
        assert_eq!(ActionErrorKind::DecodeFailure.as_ref(), "decode_failure");
    }
}
