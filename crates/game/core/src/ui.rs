//! Presentation seam used by `execute`.
//!
//! Actions never talk to rendering or windows directly. They mark world
//! regions for redraw and broadcast intents; whoever hosts the engine decides
//! what to do with them.

use std::collections::BTreeMap;

use crate::state::CoordsXY;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntentAction {
    /// Banner windows showing the given index should refresh.
    UpdateBanner,
    PauseStateChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntentExtra {
    BannerIndex,
    Paused,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntentValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

/// Fire-and-forget notification for UI listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intent {
    pub action: IntentAction,
    pub extras: BTreeMap<IntentExtra, IntentValue>,
}

impl Intent {
    pub fn new(action: IntentAction) -> Self {
        Self {
            action,
            extras: BTreeMap::new(),
        }
    }

    pub fn put_extra(mut self, key: IntentExtra, value: IntentValue) -> Self {
        self.extras.insert(key, value);
        self
    }

    pub fn extra(&self, key: IntentExtra) -> Option<&IntentValue> {
        self.extras.get(&key)
    }
}

/// Side-effect sink available to `execute` only.
pub trait UiContext {
    /// Marks the vertical span `low_z..=high_z` above a world position for
    /// redraw. Speculative calls are harmless.
    fn invalidate_tile(&mut self, coords: CoordsXY, low_z: i32, high_z: i32);

    fn broadcast_intent(&mut self, intent: Intent);
}

/// Discards every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullUi;

impl UiContext for NullUi {
    fn invalidate_tile(&mut self, _coords: CoordsXY, _low_z: i32, _high_z: i32) {}

    fn broadcast_intent(&mut self, _intent: Intent) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Invalidation {
    pub coords: CoordsXY,
    pub low_z: i32,
    pub high_z: i32,
}

/// Collects every call in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingUi {
    pub invalidations: Vec<Invalidation>,
    pub intents: Vec<Intent>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.invalidations.is_empty() && self.intents.is_empty()
    }

    pub fn intents_of(&self, action: IntentAction) -> impl Iterator<Item = &Intent> {
        self.intents
            .iter()
            .filter(move |intent| intent.action == action)
    }
}

impl UiContext for RecordingUi {
    fn invalidate_tile(&mut self, coords: CoordsXY, low_z: i32, high_z: i32) {
        self.invalidations.push(Invalidation {
            coords,
            low_z,
            high_z,
        });
    }

    fn broadcast_intent(&mut self, intent: Intent) {
        self.intents.push(intent);
    }
}
