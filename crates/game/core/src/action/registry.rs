//! Lookup from action type tags to constructors.
//!
//! A peer receiving bytes it did not author needs to know which concrete
//! action to build before it can read the fields. The registry maps each
//! [`ActionType`] to a factory producing a default-initialised instance that
//! the decoder then fills in.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::codec::{CodecError, DataSerialiser};

use super::kinds::{BannerSetColourAction, BannerSetNameAction, PauseToggleAction, SignSetStyleAction};
use super::{ActionType, GameAction, serialise_body};

/// Constructor for a default-initialised action.
pub type ActionFactory = fn() -> Box<dyn GameAction>;

#[derive(Clone, Copy, Debug)]
pub struct RegistryEntry {
    pub action_type: ActionType,
    pub name: &'static str,
    pub factory: ActionFactory,
}

impl RegistryEntry {
    pub fn of<A: GameAction + Default>(action_type: ActionType, name: &'static str) -> Self {
        Self {
            action_type,
            name,
            factory: create_default::<A>,
        }
    }
}

fn create_default<A: GameAction + Default>() -> Box<dyn GameAction> {
    Box::new(A::default())
}

fn builtin_entries() -> [RegistryEntry; 4] {
    [
        RegistryEntry::of::<BannerSetColourAction>(ActionType::BANNER_SET_COLOUR, "banner_set_colour"),
        RegistryEntry::of::<BannerSetNameAction>(ActionType::BANNER_SET_NAME, "banner_set_name"),
        RegistryEntry::of::<SignSetStyleAction>(ActionType::SIGN_SET_STYLE, "sign_set_style"),
        RegistryEntry::of::<PauseToggleAction>(ActionType::PAUSE_TOGGLE, "pause_toggle"),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("action type {action_type} is already registered as `{existing}`")]
    Duplicate {
        action_type: ActionType,
        existing: &'static str,
    },
}

/// Immutable table of known action types.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    entries: BTreeMap<ActionType, RegistryEntry>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Registry holding every built-in action.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries()
                .into_iter()
                .map(|entry| (entry.action_type, entry))
                .collect(),
        }
    }

    /// Process-wide built-in registry, populated on first use.
    pub fn global() -> &'static ActionRegistry {
        static GLOBAL: OnceLock<ActionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::builtin)
    }

    pub fn contains(&self, action_type: ActionType) -> bool {
        self.entries.contains_key(&action_type)
    }

    pub fn name(&self, action_type: ActionType) -> Option<&'static str> {
        self.entries.get(&action_type).map(|entry| entry.name)
    }

    /// Creates a default-initialised action of the given type.
    pub fn create(&self, action_type: ActionType) -> Option<Box<dyn GameAction>> {
        self.entries
            .get(&action_type)
            .map(|entry| (entry.factory)())
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Rebuilds an action from its wire bytes.
    ///
    /// The whole buffer must be consumed.
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn GameAction>, CodecError> {
        let mut stream = DataSerialiser::reader(bytes);
        let mut action_type = ActionType(0);
        stream.tag("action_type", &mut action_type)?;

        let mut action = self
            .create(action_type)
            .ok_or(CodecError::UnknownActionType(action_type.0))?;
        serialise_body(action.as_mut(), &mut stream)?;
        stream.finish()?;
        Ok(action)
    }
}

#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    entries: BTreeMap<ActionType, RegistryEntry>,
}

impl ActionRegistryBuilder {
    pub fn register(mut self, entry: RegistryEntry) -> Result<Self, RegistryError> {
        if let Some(existing) = self.entries.get(&entry.action_type) {
            return Err(RegistryError::Duplicate {
                action_type: entry.action_type,
                existing: existing.name,
            });
        }
        self.entries.insert(entry.action_type, entry);
        Ok(self)
    }

    /// Registers every built-in action.
    pub fn with_builtins(self) -> Result<Self, RegistryError> {
        builtin_entries()
            .into_iter()
            .try_fold(self, |builder, entry| builder.register(entry))
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            entries: self.entries,
        }
    }
}
