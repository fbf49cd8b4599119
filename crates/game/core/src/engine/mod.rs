//! Two-phase action dispatch.
//!
//! The [`GameEngine`] is the only path by which actions reach the world. It
//! applies the flag policy, runs `query`, and calls `execute` only when both
//! succeed. Every dispatch ends in a terminal [`DispatchPhase`] and carries
//! the [`ActionResult`] that decided it.

mod phase;
mod policy;

pub use phase::DispatchPhase;
pub use policy::{DispatchContext, Origin, PeerId};

use crate::action::{ActionResult, ActionType, GameAction};
use crate::error::GameError;
use crate::state::WorldState;
use crate::ui::UiContext;

/// Terminal outcome of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dispatch {
    pub phase: DispatchPhase,
    pub result: ActionResult,
}

impl Dispatch {
    pub fn is_committed(&self) -> bool {
        self.phase == DispatchPhase::Committed
    }
}

/// Walks one action through the phase machine, tracing each step.
struct Tracker {
    action_type: ActionType,
    phase: DispatchPhase,
}

impl Tracker {
    fn new(action_type: ActionType) -> Self {
        tracing::debug!(action_type = %action_type, phase = "received", "dispatch");
        Self {
            action_type,
            phase: DispatchPhase::Received,
        }
    }

    fn advance(&mut self, next: DispatchPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal dispatch transition {} -> {}",
            self.phase,
            next
        );
        self.phase = next;
        tracing::debug!(action_type = %self.action_type, phase = %next, "dispatch");
    }

    fn finish(mut self, next: DispatchPhase, result: ActionResult) -> Dispatch {
        self.advance(next);
        if let Some(kind) = result.error_kind() {
            tracing::warn!(
                action_type = %self.action_type,
                phase = %next,
                code = kind.error_code(),
                severity = kind.severity().as_str(),
                "action {}: {kind}",
                next.as_str()
            );
        }
        Dispatch {
            phase: self.phase,
            result,
        }
    }
}

/// Dispatcher bound to a mutable world for the duration of a call sequence.
pub struct GameEngine<'a> {
    world: &'a mut WorldState,
}

impl<'a> GameEngine<'a> {
    pub fn new(world: &'a mut WorldState) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &WorldState {
        self.world
    }

    /// Runs the policy check and `query` without executing.
    pub fn query(&self, action: &dyn GameAction, ctx: &DispatchContext) -> ActionResult {
        if let Some(rejection) = policy::check(action.flags(), self.world.is_paused(), ctx) {
            return rejection;
        }
        action.query(self.world)
    }

    /// Dispatches an action to completion.
    ///
    /// `execute` runs only after the policy check and `query` both succeed.
    pub fn execute(
        &mut self,
        action: &dyn GameAction,
        ctx: &DispatchContext,
        ui: &mut dyn UiContext,
    ) -> Dispatch {
        let mut tracker = Tracker::new(action.action_type());
        tracker.advance(DispatchPhase::Validating);

        let validation = self.query(action, ctx);
        if !validation.is_ok() {
            return tracker.finish(DispatchPhase::Rejected, validation);
        }
        tracker.advance(DispatchPhase::Validated);

        tracker.advance(DispatchPhase::Executing);
        let result = action.execute(self.world, ui);
        if result.is_ok() {
            tracker.finish(DispatchPhase::Committed, result)
        } else {
            tracker.finish(DispatchPhase::Failed, result)
        }
    }
}

#[cfg(test)]
mod tests {
    use core::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::action::kinds::fixtures::{self, WALL_BANNER};
    use crate::action::{
        ActionEnvelope, ActionErrorKind, ActionFlags, ActionRegistry, BannerSetColourAction,
        BannerSetNameAction, CommandFlags, PauseToggleAction, SignSetStyleAction, StringId,
        encode_action,
    };
    use crate::codec::{CodecError, DataSerialiser};
    use crate::ui::{IntentAction, NullUi, RecordingUi};

    /// Counts calls and returns canned results.
    #[derive(Debug, Default)]
    struct Counting {
        envelope: ActionEnvelope,
        flags: ActionFlags,
        query_error: Option<ActionErrorKind>,
        execute_error: Option<ActionErrorKind>,
        queries: AtomicUsize,
        executes: AtomicUsize,
    }

    impl Counting {
        fn result(error: Option<ActionErrorKind>) -> ActionResult {
            error.map_or_else(ActionResult::ok, |kind| {
                ActionResult::error(kind, StringId::NONE)
            })
        }
    }

    impl GameAction for Counting {
        fn action_type(&self) -> ActionType {
            ActionType(9000)
        }

        fn envelope(&self) -> &ActionEnvelope {
            &self.envelope
        }

        fn envelope_mut(&mut self) -> &mut ActionEnvelope {
            &mut self.envelope
        }

        fn flags(&self) -> ActionFlags {
            self.flags
        }

        fn serialise_fields(&mut self, _stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
            Ok(())
        }

        fn query(&self, _world: &WorldState) -> ActionResult {
            self.queries.fetch_add(1, Ordering::Relaxed);
            Self::result(self.query_error)
        }

        fn execute(&self, _world: &mut WorldState, _ui: &mut dyn UiContext) -> ActionResult {
            self.executes.fetch_add(1, Ordering::Relaxed);
            Self::result(self.execute_error)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn world() -> WorldState {
        WorldState::new(4, 4).unwrap()
    }

    #[test]
    fn failed_query_never_executes() {
        let mut world = world();
        let counting = Counting {
            query_error: Some(ActionErrorKind::NotFound),
            ..Counting::default()
        };
        let dispatch =
            GameEngine::new(&mut world).execute(&counting, &DispatchContext::local(), &mut NullUi);

        assert_eq!(dispatch.phase, DispatchPhase::Rejected);
        assert_eq!(dispatch.result.error_kind(), Some(ActionErrorKind::NotFound));
        assert_eq!(counting.queries.load(Ordering::Relaxed), 1);
        assert_eq!(counting.executes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn failed_execute_ends_in_failed() {
        let mut world = world();
        let counting = Counting {
            execute_error: Some(ActionErrorKind::Unknown),
            ..Counting::default()
        };
        let dispatch =
            GameEngine::new(&mut world).execute(&counting, &DispatchContext::local(), &mut NullUi);
        assert_eq!(dispatch.phase, DispatchPhase::Failed);
        assert!(dispatch.phase.is_terminal());
        assert_eq!(counting.executes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn paused_world_rejects_without_querying() {
        let mut world = world();
        world.clock.paused = true;
        let counting = Counting::default();
        let dispatch =
            GameEngine::new(&mut world).execute(&counting, &DispatchContext::local(), &mut NullUi);

        assert_eq!(dispatch.phase, DispatchPhase::Rejected);
        assert_eq!(dispatch.result.error_kind(), Some(ActionErrorKind::GamePaused));
        assert_eq!(counting.queries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn allow_while_paused_is_still_queried() {
        let mut world = world();
        world.clock.paused = true;
        let counting = Counting {
            flags: ActionFlags::ALLOW_WHILE_PAUSED,
            ..Counting::default()
        };
        let dispatch =
            GameEngine::new(&mut world).execute(&counting, &DispatchContext::local(), &mut NullUi);

        assert!(dispatch.is_committed());
        assert_eq!(counting.queries.load(Ordering::Relaxed), 1);
        assert_eq!(counting.executes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unprivileged_peer_cannot_pause() {
        let mut world = world();
        let ctx = DispatchContext::remote(PeerId(4), false);
        let dispatch =
            GameEngine::new(&mut world).execute(&PauseToggleAction::default(), &ctx, &mut NullUi);
        assert_eq!(
            dispatch.result.error_kind(),
            Some(ActionErrorKind::InsufficientPermission)
        );
        assert!(!world.is_paused());
    }

    #[test]
    fn sign_style_with_negative_index_is_rejected() {
        let (mut world, _, _) = fixtures::signs();
        let before = world.clone();
        let mut ui = RecordingUi::new();
        let dispatch = GameEngine::new(&mut world).execute(
            &SignSetStyleAction::new(-1, 5, 2, false),
            &DispatchContext::local(),
            &mut ui,
        );

        assert_eq!(dispatch.phase, DispatchPhase::Rejected);
        assert_eq!(
            dispatch.result.error_kind(),
            Some(ActionErrorKind::InvalidParameters)
        );
        assert_eq!(world, before);
        assert!(ui.is_empty());
    }

    #[test]
    fn sign_style_on_a_wall_sign_commits() {
        let (mut world, wall, _) = fixtures::signs();
        let mut ui = RecordingUi::new();
        let dispatch = GameEngine::new(&mut world).execute(
            &SignSetStyleAction::new(i32::from(WALL_BANNER.0), 5, 2, false),
            &DispatchContext::local(),
            &mut ui,
        );

        assert!(dispatch.is_committed());
        let element = world.tiles.element(wall).unwrap().as_wall().unwrap();
        assert_eq!((element.primary_colour, element.secondary_colour), (5, 2));
        assert_eq!(ui.intents_of(IntentAction::UpdateBanner).count(), 1);
    }

    #[test]
    fn sign_style_is_allowed_while_paused() {
        let (mut world, _, _) = fixtures::signs();
        world.clock.paused = true;
        let dispatch = GameEngine::new(&mut world).execute(
            &SignSetStyleAction::new(i32::from(WALL_BANNER.0), 1, 2, false),
            &DispatchContext::local(),
            &mut NullUi,
        );
        assert!(dispatch.is_committed());
    }

    fn roundtrip<A: GameAction + Clone + PartialEq>(action: &A) -> bool {
        let bytes = encode_action(&mut action.clone()).unwrap();
        let decoded = ActionRegistry::global().decode(&bytes).unwrap();
        decoded.as_any().downcast_ref::<A>() == Some(action)
    }

    fn envelope() -> impl Strategy<Value = ActionEnvelope> {
        (any::<u32>(), any::<u8>(), 0u8..4).prop_map(|(network_id, player_id, bits)| {
            ActionEnvelope {
                network_id,
                player_id,
                command_flags: CommandFlags::from_bits_truncate(bits),
            }
        })
    }

    proptest! {
        #[test]
        fn sign_style_survives_the_wire(
            envelope in envelope(),
            banner_index in any::<i32>(),
            main_colour in any::<u8>(),
            text_colour in any::<u8>(),
            is_large in any::<bool>(),
        ) {
            let mut action = SignSetStyleAction::new(banner_index, main_colour, text_colour, is_large);
            action.envelope = envelope;
            prop_assert!(roundtrip(&action));
        }

        #[test]
        fn banner_actions_survive_the_wire(
            envelope in envelope(),
            banner_index in any::<i32>(),
            colour in any::<u8>(),
            name in any::<[u8; 32]>(),
        ) {
            let mut colour_action = BannerSetColourAction::new(banner_index, colour);
            colour_action.envelope = envelope;
            prop_assert!(roundtrip(&colour_action));

            let mut name_action = BannerSetNameAction::new(banner_index, "");
            name_action.envelope = envelope;
            name_action.name = name;
            prop_assert!(roundtrip(&name_action));
        }

        #[test]
        fn successful_query_implies_successful_execute(
            banner_index in -2i32..8,
            main_colour in any::<u8>(),
            text_colour in any::<u8>(),
            is_large in any::<bool>(),
        ) {
            let (mut world, _, _) = fixtures::signs();
            let action = SignSetStyleAction::new(banner_index, main_colour, text_colour, is_large);
            let before = world.clone();

            let queried = action.query(&world);
            prop_assert_eq!(&world, &before);

            let dispatch =
                GameEngine::new(&mut world).execute(&action, &DispatchContext::local(), &mut NullUi);
            prop_assert_eq!(queried.is_ok(), dispatch.is_committed());
            if !queried.is_ok() {
                prop_assert_eq!(world, before);
            }
        }
    }
}
