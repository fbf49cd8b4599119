/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Whether the session runs in scenario-editor mode.
    /// Actions flagged `EDITOR_ONLY` are rejected outside of it.
    pub editor_mode: bool,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Number of slots in the banner table.
    pub const MAX_BANNERS: usize = 250;
    /// Highest valid palette colour index.
    pub const MAX_COLOUR: u8 = 31;
    /// Fixed size of banner text on the wire and in the banner table.
    pub const BANNER_TEXT_LEN: usize = 32;
    /// Upper bound for either map dimension, in tiles.
    pub const MAX_MAP_SIZE: u16 = 256;

    /// Version of the action wire envelope. Peers must agree on it before
    /// exchanging packets.
    pub const NETWORK_PROTOCOL_VERSION: u32 = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_EDITOR_MODE: bool = false;

    pub fn new() -> Self {
        Self {
            editor_mode: Self::DEFAULT_EDITOR_MODE,
        }
    }

    pub fn editor() -> Self {
        Self { editor_mode: true }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
