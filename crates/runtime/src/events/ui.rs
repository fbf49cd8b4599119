//! UI seam that forwards side effects onto the bus.

use game_core::ui::Invalidation;
use game_core::{CoordsXY, Intent, UiContext};

use super::{Event, EventBus, UiEvent};

/// [`UiContext`] that publishes every call on [`Topic::Ui`](super::Topic::Ui).
pub struct EventBusUi<'a> {
    bus: &'a EventBus,
}

impl<'a> EventBusUi<'a> {
    pub fn new(bus: &'a EventBus) -> Self {
        Self { bus }
    }
}

impl UiContext for EventBusUi<'_> {
    fn invalidate_tile(&mut self, coords: CoordsXY, low_z: i32, high_z: i32) {
        self.bus.publish(Event::Ui(UiEvent::Invalidate(Invalidation {
            coords,
            low_z,
            high_z,
        })));
    }

    fn broadcast_intent(&mut self, intent: Intent) {
        self.bus.publish(Event::Ui(UiEvent::Intent(intent)));
    }
}
