//! Action contract and shared serialisation.
//!
//! Every player command is a self-describing [`GameAction`]: it validates
//! itself against the world with [`GameAction::query`], applies itself with
//! [`GameAction::execute`], and describes its fields once for writing,
//! reading and logging through [`GameAction::serialise_fields`]. Dispatch
//! lives in [`crate::engine`]; reconstruction from bytes lives in
//! [`registry`].
pub mod kinds;
pub mod registry;
mod result;

use core::any::Any;
use core::fmt;

use bitflags::bitflags;

use crate::codec::{ByteReader, CodecError, DataSerialiser, Field};
use crate::state::WorldState;
use crate::ui::UiContext;

pub use kinds::{BannerSetColourAction, BannerSetNameAction, PauseToggleAction, SignSetStyleAction};
pub use registry::{ActionRegistry, RegistryEntry, RegistryError};
pub use result::{ActionErrorKind, ActionResult, ActionStatus, ErrorDetail, StringId};

/// Stable numeric tag written at the start of every encoded action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionType(pub u32);

impl ActionType {
    pub const BANNER_SET_COLOUR: Self = Self(10);
    pub const BANNER_SET_NAME: Self = Self(11);
    pub const SIGN_SET_STYLE: Self = Self(12);
    pub const PAUSE_TOGGLE: Self = Self(40);
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Field for ActionType {
    fn write(&self, out: &mut Vec<u8>) {
        self.0.write(out);
    }

    fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError> {
        u32::read(input, field).map(Self)
    }
}

bitflags! {
    /// Static capabilities of an action type, checked before `query`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u16 {
        /// May run while the simulation is paused.
        const ALLOW_WHILE_PAUSED = 1 << 0;
        /// Affects only the issuing client; never forwarded to peers.
        const CLIENT_ONLY        = 1 << 1;
        /// Only valid in the scenario editor.
        const EDITOR_ONLY        = 1 << 2;
        /// Requires a privileged issuer (host or admin).
        const REQUIRES_PRIVILEGE = 1 << 3;
    }
}

bitflags! {
    /// Per-instance flags carried in the envelope.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CommandFlags: u8 {
        /// Local preview; never forwarded or logged.
        const GHOST  = 1 << 0;
        /// Re-applied from an action log; never forwarded.
        const REPLAY = 1 << 1;
    }
}

impl Field for CommandFlags {
    fn write(&self, out: &mut Vec<u8>) {
        self.bits().write(out);
    }

    fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError> {
        let bits = u8::read(input, field)?;
        Self::from_bits(bits).ok_or(CodecError::InvalidValue {
            field,
            value: u64::from(bits),
        })
    }
}

/// Fields shared by every action, serialised before the concrete fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionEnvelope {
    /// Session-unique id assigned by the issuing peer.
    pub network_id: u32,
    pub player_id: u8,
    pub command_flags: CommandFlags,
}

impl ActionEnvelope {
    pub fn serialise(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
        stream.tag("network_id", &mut self.network_id)?;
        stream.tag("command_flags", &mut self.command_flags)?;
        stream.tag("player_id", &mut self.player_id)
    }

    pub fn is_ghost(&self) -> bool {
        self.command_flags.contains(CommandFlags::GHOST)
    }
}

/// Contract implemented by every concrete action.
///
/// `query` only sees a shared borrow of the world and no UI seam, so
/// validation cannot have side effects. `execute` is only called after a
/// successful `query` on the same world and must check everything it needs
/// before the first mutation.
pub trait GameAction: fmt::Debug + Send + Sync + 'static {
    fn action_type(&self) -> ActionType;

    fn envelope(&self) -> &ActionEnvelope;

    fn envelope_mut(&mut self) -> &mut ActionEnvelope;

    fn flags(&self) -> ActionFlags {
        ActionFlags::empty()
    }

    /// Tags the concrete fields in wire order.
    fn serialise_fields(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError>;

    fn query(&self, world: &WorldState) -> ActionResult;

    fn execute(&self, world: &mut WorldState, ui: &mut dyn UiContext) -> ActionResult;

    fn as_any(&self) -> &dyn Any;
}

/// Serialises the envelope then the concrete fields. The type tag is handled
/// by the caller since decoding needs it before the action exists.
pub fn serialise_body(
    action: &mut dyn GameAction,
    stream: &mut DataSerialiser<'_>,
) -> Result<(), CodecError> {
    action.envelope_mut().serialise(stream)?;
    action.serialise_fields(stream)
}

/// Serialises a complete action: type tag, envelope, fields.
pub fn serialise_action(
    action: &mut dyn GameAction,
    stream: &mut DataSerialiser<'_>,
) -> Result<(), CodecError> {
    let mut action_type = action.action_type();
    stream.tag("action_type", &mut action_type)?;
    serialise_body(action, stream)
}

/// Encodes an action into its wire bytes.
pub fn encode_action(action: &mut dyn GameAction) -> Result<Vec<u8>, CodecError> {
    let mut stream = DataSerialiser::writer();
    serialise_action(action, &mut stream)?;
    stream.into_bytes()
}

/// Renders an action's fields for diagnostics.
pub fn describe_action(action: &mut dyn GameAction) -> Result<String, CodecError> {
    let mut stream = DataSerialiser::logger();
    serialise_action(action, &mut stream)?;
    stream.into_log()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_layout_is_fixed() {
        let mut envelope = ActionEnvelope {
            network_id: 0x0102_0304,
            player_id: 9,
            command_flags: CommandFlags::REPLAY,
        };
        let mut stream = DataSerialiser::writer();
        envelope.serialise(&mut stream).unwrap();
        assert_eq!(hex::encode(stream.into_bytes().unwrap()), "040302010209");
    }

    #[test]
    fn unknown_command_flag_bits_are_rejected() {
        let mut reader = ByteReader::new(&[0x80]);
        let err = CommandFlags::read(&mut reader, "command_flags").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidValue {
                field: "command_flags",
                value: 0x80
            }
        );
    }
}
