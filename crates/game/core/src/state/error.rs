//! State management errors.
//!
//! Errors raised while building or editing the world store directly. Action
//! validation never produces these; it reports through `ActionResult`.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{BannerIndex, TileCoords};

/// Errors that occur during world state construction and editing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// Requested map exceeds the supported size.
    #[error("map size {width}x{height} exceeds the maximum of {max}")]
    MapTooLarge { width: u16, height: u16, max: u16 },

    /// Tile is outside the map.
    #[error("tile {tile} is out of bounds (map size: {width}x{height})")]
    TileOutOfBounds {
        tile: TileCoords,
        width: u16,
        height: u16,
    },

    /// Banner index is past the end of the table.
    #[error("{index} is outside the banner table (max: {max})")]
    BannerIndexOutOfRange { index: BannerIndex, max: usize },

    /// Banner slot already holds a banner.
    #[error("banner slot {index} is already in use")]
    BannerSlotOccupied { index: BannerIndex },

    /// All banner slots are in use.
    #[error("banner table is full (max: {max})")]
    BannerTableFull { max: usize },
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        use StateError::*;
        match self {
            MapTooLarge { .. } | TileOutOfBounds { .. } => ErrorSeverity::Validation,
            BannerIndexOutOfRange { .. }
            | BannerSlotOccupied { .. }
            | BannerTableFull { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use StateError::*;
        match self {
            MapTooLarge { .. } => "STATE_MAP_TOO_LARGE",
            TileOutOfBounds { .. } => "STATE_TILE_OUT_OF_BOUNDS",
            BannerIndexOutOfRange { .. } => "STATE_BANNER_INDEX_OUT_OF_RANGE",
            BannerSlotOccupied { .. } => "STATE_BANNER_SLOT_OCCUPIED",
            BannerTableFull { .. } => "STATE_BANNER_TABLE_FULL",
        }
    }
}
