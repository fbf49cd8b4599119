//! Dispatch state machine.

/// Stage an action has reached inside [`GameEngine`](super::GameEngine).
///
/// ```text
/// Received -> Validating -> Rejected
///                        -> Validated -> Executing -> Failed
///                                                  -> Committed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchPhase {
    Received,
    Validating,
    /// Policy check or `query` failed; `execute` was not called.
    Rejected,
    Validated,
    Executing,
    /// `execute` reported failure.
    Failed,
    Committed,
}

impl DispatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPhase::Received => "received",
            DispatchPhase::Validating => "validating",
            DispatchPhase::Rejected => "rejected",
            DispatchPhase::Validated => "validated",
            DispatchPhase::Executing => "executing",
            DispatchPhase::Failed => "failed",
            DispatchPhase::Committed => "committed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchPhase::Rejected | DispatchPhase::Failed | DispatchPhase::Committed
        )
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(&self, next: DispatchPhase) -> bool {
        use DispatchPhase::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Rejected)
                | (Validating, Validated)
                | (Validated, Executing)
                | (Executing, Failed)
                | (Executing, Committed)
        )
    }
}

impl core::fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
