//! Common error infrastructure for game-core.
//!
//! This module provides the shared classification trait implemented by every
//! error type in the crate. Expected action failures are *not* Rust errors:
//! they travel as [`ActionResult`](crate::action::ActionResult) values. The
//! types here describe failures of the framework itself (codec, registry) and
//! classify the result error kinds for logging and recovery.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error enum
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Stable Codes**: Every variant exposes a static code for logs and tests

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by their recoverability and expected handling:
/// - **Recoverable**: Temporary conditions that may succeed later or with other input
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry once conditions change.
    ///
    /// Examples: game paused, world changed between query and execute
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: banner index out of range, target of the wrong kind
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: the world store refused a mutation it had validated
    Internal,

    /// Fatal error - the session cannot continue.
    ///
    /// Examples: malformed stream from a peer running another protocol
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }
}

/// Common trait for all game-core errors.
///
/// This trait provides a uniform interface for error classification across
/// all error types in the crate.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    ///
    /// This is used for error handling strategies and logging priorities.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// This is useful for error categorization, metrics, and testing.
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
