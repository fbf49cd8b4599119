use std::fmt;

use crate::config::GameConfig;

/// World units per tile along x and y.
pub const COORDS_XY_STEP: i32 = 32;
/// World units per height step along z.
pub const COORDS_Z_STEP: i32 = 8;

/// Index into the banner table.
///
/// Construction through [`BannerIndex::from_raw`] guarantees the index is
/// inside the table; wire values are signed so that sentinel values such as
/// `-1` can be rejected instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerIndex(pub u16);

impl BannerIndex {
    /// Validates a raw wire value against the table size.
    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw < 0 || raw as usize >= GameConfig::MAX_BANNERS {
            return None;
        }
        Some(Self(raw as u16))
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BannerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "banner#{}", self.0)
    }
}

/// Index into one of the loaded scenery object tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectEntryIndex(pub u16);

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoords {
    pub x: i32,
    pub y: i32,
}

impl TileCoords {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the world coordinates of the tile's corner.
    pub const fn to_world(self) -> CoordsXY {
        CoordsXY {
            x: self.x * COORDS_XY_STEP,
            y: self.y * COORDS_XY_STEP,
        }
    }

    /// Offsets this tile by a rotated footprint delta.
    pub const fn offset(self, delta: TileCoords) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

impl fmt::Display for TileCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position in world units (32 per tile).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXY {
    pub x: i32,
    pub y: i32,
}

impl CoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn to_tile(self) -> TileCoords {
        TileCoords {
            x: self.x.div_euclid(COORDS_XY_STEP),
            y: self.y.div_euclid(COORDS_XY_STEP),
        }
    }
}

/// Quarter-turn orientation of a placed element (0..=3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction(u8);

impl Direction {
    pub const NORTH: Self = Self(0);
    pub const EAST: Self = Self(1);
    pub const SOUTH: Self = Self(2);
    pub const WEST: Self = Self(3);

    /// Wraps any value into the four quarter turns.
    pub const fn new(raw: u8) -> Self {
        Self(raw & 3)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Rotates a footprint delta clockwise by this many quarter turns.
    pub const fn rotate(self, delta: TileCoords) -> TileCoords {
        match self.0 {
            0 => TileCoords::new(delta.x, delta.y),
            1 => TileCoords::new(delta.y, -delta.x),
            2 => TileCoords::new(-delta.x, -delta.y),
            _ => TileCoords::new(-delta.y, delta.x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_index_rejects_sentinels_and_overflow() {
        assert_eq!(BannerIndex::from_raw(-1), None);
        assert_eq!(BannerIndex::from_raw(GameConfig::MAX_BANNERS as i32), None);
        assert_eq!(BannerIndex::from_raw(0), Some(BannerIndex(0)));
        assert_eq!(
            BannerIndex::from_raw(GameConfig::MAX_BANNERS as i32 - 1),
            Some(BannerIndex(GameConfig::MAX_BANNERS as u16 - 1))
        );
    }

    #[test]
    fn rotation_is_a_quarter_turn_cycle() {
        let delta = TileCoords::new(1, 2);
        let mut rotated = delta;
        for _ in 0..4 {
            rotated = Direction::EAST.rotate(rotated);
        }
        assert_eq!(rotated, delta);
        assert_eq!(Direction::SOUTH.rotate(delta), TileCoords::new(-1, -2));
    }

    #[test]
    fn world_and_tile_coordinates_convert() {
        let tile = TileCoords::new(3, 4);
        assert_eq!(tile.to_world(), CoordsXY::new(96, 128));
        assert_eq!(CoordsXY::new(100, 159).to_tile(), tile);
    }
}
