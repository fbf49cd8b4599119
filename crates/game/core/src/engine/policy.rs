//! Flag policy applied before `query`.

use core::fmt;

use crate::action::{ActionErrorKind, ActionFlags, ActionResult, ErrorDetail, StringId};

/// Session-local identifier of a connected peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Where an action came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    Local,
    Remote(PeerId),
    Replay,
}

impl Origin {
    pub fn peer(&self) -> Option<PeerId> {
        match self {
            Origin::Remote(peer) => Some(*peer),
            Origin::Local | Origin::Replay => None,
        }
    }
}

/// Session facts the policy check needs besides the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchContext {
    pub origin: Origin,
    pub editor_mode: bool,
    /// Issuer may run `REQUIRES_PRIVILEGE` actions.
    pub privileged: bool,
}

impl DispatchContext {
    /// Local issuer with full privileges outside the editor.
    pub fn local() -> Self {
        Self {
            origin: Origin::Local,
            editor_mode: false,
            privileged: true,
        }
    }

    pub fn remote(peer: PeerId, privileged: bool) -> Self {
        Self {
            origin: Origin::Remote(peer),
            editor_mode: false,
            privileged,
        }
    }

    /// Replayed actions already passed policy when first committed.
    pub fn replay() -> Self {
        Self {
            origin: Origin::Replay,
            editor_mode: false,
            privileged: true,
        }
    }

    pub fn with_editor_mode(mut self, editor_mode: bool) -> Self {
        self.editor_mode = editor_mode;
        self
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::local()
    }
}

/// Checks action flags against session state. Returns the rejection, if any.
///
/// Order: pause, editor mode, privilege.
pub(super) fn check(flags: ActionFlags, paused: bool, ctx: &DispatchContext) -> Option<ActionResult> {
    let reject = |kind: ActionErrorKind, missing: ActionFlags| {
        Some(ActionResult::error(kind, StringId::NONE).with_detail(ErrorDetail::MissingFlags(missing)))
    };

    if paused && !flags.contains(ActionFlags::ALLOW_WHILE_PAUSED) {
        return reject(ActionErrorKind::GamePaused, ActionFlags::ALLOW_WHILE_PAUSED);
    }
    if flags.contains(ActionFlags::EDITOR_ONLY) && !ctx.editor_mode {
        return reject(ActionErrorKind::Disallowed, ActionFlags::EDITOR_ONLY);
    }
    if flags.contains(ActionFlags::REQUIRES_PRIVILEGE) && !ctx.privileged {
        return reject(
            ActionErrorKind::InsufficientPermission,
            ActionFlags::REQUIRES_PRIVILEGE,
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_is_checked_first() {
        let flags = ActionFlags::EDITOR_ONLY | ActionFlags::REQUIRES_PRIVILEGE;
        let ctx = DispatchContext::remote(PeerId(1), false);
        let result = check(flags, true, &ctx).unwrap();
        assert_eq!(result.error_kind(), Some(ActionErrorKind::GamePaused));
    }

    #[test]
    fn editor_only_outside_editor_is_disallowed() {
        let result = check(ActionFlags::EDITOR_ONLY, false, &DispatchContext::local()).unwrap();
        assert_eq!(result.error_kind(), Some(ActionErrorKind::Disallowed));

        let editor = DispatchContext::local().with_editor_mode(true);
        assert!(check(ActionFlags::EDITOR_ONLY, false, &editor).is_none());
    }

    #[test]
    fn privilege_is_required_when_flagged() {
        let ctx = DispatchContext::remote(PeerId(2), false);
        let result = check(ActionFlags::REQUIRES_PRIVILEGE, false, &ctx).unwrap();
        assert_eq!(
            result.error_kind(),
            Some(ActionErrorKind::InsufficientPermission)
        );
        assert_eq!(
            result.detail(),
            Some(&ErrorDetail::MissingFlags(ActionFlags::REQUIRES_PRIVILEGE))
        );
    }

    #[test]
    fn allow_while_paused_passes_the_pause_check() {
        assert!(check(ActionFlags::ALLOW_WHILE_PAUSED, true, &DispatchContext::local()).is_none());
    }
}
