//! Topic-based event bus implementation.

use serde::Serialize;
use tokio::sync::broadcast;

use super::types::{GameStateEvent, NetworkEvent, UiEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub enum Topic {
    /// Dispatch outcomes and tick reports
    GameState,
    /// Redraw regions and intents
    Ui,
    /// Packets and acknowledgements for peers
    Network,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::GameState, Topic::Ui, Topic::Network];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize)]
pub enum Event {
    GameState(GameStateEvent),
    Ui(UiEvent),
    Network(NetworkEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::GameState(_) => Topic::GameState,
            Event::Ui(_) => Topic::Ui,
            Event::Network(_) => Topic::Network,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    game_state: broadcast::Sender<Event>,
    ui: broadcast::Sender<Event>,
    network: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            game_state: broadcast::channel(capacity).0,
            ui: broadcast::channel(capacity).0,
            network: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::GameState => &self.game_state,
            Topic::Ui => &self.ui,
            Topic::Network => &self.network,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
