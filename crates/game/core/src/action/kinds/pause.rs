use core::any::Any;

use crate::action::{ActionEnvelope, ActionFlags, ActionResult, ActionType, GameAction};
use crate::codec::{CodecError, DataSerialiser};
use crate::state::WorldState;
use crate::ui::{Intent, IntentAction, IntentExtra, IntentValue, UiContext};

/// Pauses or resumes the simulation clock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PauseToggleAction {
    pub envelope: ActionEnvelope,
}

impl GameAction for PauseToggleAction {
    fn action_type(&self) -> ActionType {
        ActionType::PAUSE_TOGGLE
    }

    fn envelope(&self) -> &ActionEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut ActionEnvelope {
        &mut self.envelope
    }

    fn flags(&self) -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED | ActionFlags::REQUIRES_PRIVILEGE
    }

    fn serialise_fields(&mut self, _stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
        Ok(())
    }

    fn query(&self, _world: &WorldState) -> ActionResult {
        ActionResult::ok()
    }

    fn execute(&self, world: &mut WorldState, ui: &mut dyn UiContext) -> ActionResult {
        world.clock.paused = !world.clock.paused;
        tracing::info!(paused = world.clock.paused, tick = world.clock.tick, "pause toggled");

        ui.broadcast_intent(
            Intent::new(IntentAction::PauseStateChanged)
                .put_extra(IntentExtra::Paused, IntentValue::Bool(world.clock.paused)),
        );
        ActionResult::ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
