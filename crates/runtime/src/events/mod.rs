//! Topic-based event bus for runtime events.
//!
//! This module provides a flexible event system where events are published to
//! specific topics, and consumers can subscribe only to the topics they need.

mod bus;
mod types;
mod ui;

pub use bus::{Event, EventBus, Topic};
pub use types::{ActionRef, GameStateEvent, NetworkEvent, TickReport, UiEvent};
pub use ui::EventBusUi;
