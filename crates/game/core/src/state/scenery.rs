//! Loaded scenery object definitions.

use super::{ObjectEntryIndex, TileCoords};

/// Wall object definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallEntry {
    pub name: String,
    /// Scrolling text mode; `None` for walls that cannot carry a sign.
    pub scrolling_mode: Option<u8>,
}

impl WallEntry {
    pub fn has_scrolling_text(&self) -> bool {
        self.scrolling_mode.is_some()
    }
}

/// One tile of a large scenery footprint, relative to sequence 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LargeSceneryTile {
    pub offset: TileCoords,
    /// Height offset in height steps.
    pub z_offset: u8,
}

/// Multi-tile scenery object definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LargeSceneryEntry {
    pub name: String,
    pub tiles: Vec<LargeSceneryTile>,
    pub scrolling_mode: Option<u8>,
}

/// Object tables referenced by tile elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneryObjects {
    walls: Vec<WallEntry>,
    large: Vec<LargeSceneryEntry>,
}

impl SceneryObjects {
    pub fn add_wall(&mut self, entry: WallEntry) -> ObjectEntryIndex {
        self.walls.push(entry);
        ObjectEntryIndex((self.walls.len() - 1) as u16)
    }

    pub fn add_large_scenery(&mut self, entry: LargeSceneryEntry) -> ObjectEntryIndex {
        self.large.push(entry);
        ObjectEntryIndex((self.large.len() - 1) as u16)
    }

    pub fn wall(&self, index: ObjectEntryIndex) -> Option<&WallEntry> {
        self.walls.get(usize::from(index.0))
    }

    pub fn large_scenery(&self, index: ObjectEntryIndex) -> Option<&LargeSceneryEntry> {
        self.large.get(usize::from(index.0))
    }
}
