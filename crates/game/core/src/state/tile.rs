//! Tile grid and the elements stacked on each tile.

use crate::config::GameConfig;

use super::{BannerIndex, COORDS_Z_STEP, Direction, ObjectEntryIndex, StateError, TileCoords};

/// Category of a tile element, used when an action expects a specific kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileElementType {
    Surface,
    Path,
    Wall,
    LargeScenery,
    Banner,
}

/// Wall segment, optionally carrying a scrolling sign.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallElement {
    pub entry: ObjectEntryIndex,
    pub primary_colour: u8,
    pub secondary_colour: u8,
    pub banner_index: Option<BannerIndex>,
}

/// One tile-sized segment of a multi-tile scenery object.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LargeSceneryElement {
    pub entry: ObjectEntryIndex,
    /// Position of this segment in the entry's footprint.
    pub sequence: u8,
    pub primary_colour: u8,
    pub secondary_colour: u8,
    pub banner_index: Option<BannerIndex>,
}

/// Free-standing banner on a path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerElement {
    pub banner_index: BannerIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileElementKind {
    Surface,
    Path,
    Wall(WallElement),
    LargeScenery(LargeSceneryElement),
    Banner(BannerElement),
}

/// A single element in a tile's stack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileElement {
    /// Bottom of the element, in height steps.
    pub base_height: u8,
    /// Top of the element, in height steps.
    pub clearance_height: u8,
    pub direction: Direction,
    pub kind: TileElementKind,
}

impl TileElement {
    pub fn new(base_height: u8, clearance_height: u8, direction: Direction, kind: TileElementKind) -> Self {
        Self {
            base_height,
            clearance_height,
            direction,
            kind,
        }
    }

    pub fn surface() -> Self {
        Self::new(0, 2, Direction::NORTH, TileElementKind::Surface)
    }

    pub fn element_type(&self) -> TileElementType {
        match self.kind {
            TileElementKind::Surface => TileElementType::Surface,
            TileElementKind::Path => TileElementType::Path,
            TileElementKind::Wall(_) => TileElementType::Wall,
            TileElementKind::LargeScenery(_) => TileElementType::LargeScenery,
            TileElementKind::Banner(_) => TileElementType::Banner,
        }
    }

    /// Banner attached to this element, if any.
    pub fn banner_index(&self) -> Option<BannerIndex> {
        match &self.kind {
            TileElementKind::Wall(wall) => wall.banner_index,
            TileElementKind::LargeScenery(scenery) => scenery.banner_index,
            TileElementKind::Banner(banner) => Some(banner.banner_index),
            TileElementKind::Surface | TileElementKind::Path => None,
        }
    }

    pub fn as_wall(&self) -> Option<&WallElement> {
        match &self.kind {
            TileElementKind::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    pub fn as_wall_mut(&mut self) -> Option<&mut WallElement> {
        match &mut self.kind {
            TileElementKind::Wall(wall) => Some(wall),
            _ => None,
        }
    }

    pub fn as_large_scenery(&self) -> Option<&LargeSceneryElement> {
        match &self.kind {
            TileElementKind::LargeScenery(scenery) => Some(scenery),
            _ => None,
        }
    }

    pub fn as_large_scenery_mut(&mut self) -> Option<&mut LargeSceneryElement> {
        match &mut self.kind {
            TileElementKind::LargeScenery(scenery) => Some(scenery),
            _ => None,
        }
    }

    /// Bottom of the element in world units.
    pub fn base_z(&self) -> i32 {
        i32::from(self.base_height) * COORDS_Z_STEP
    }

    /// Top of the element in world units.
    pub fn clearance_z(&self) -> i32 {
        i32::from(self.clearance_height) * COORDS_Z_STEP
    }
}

/// Locates an element by tile and stack position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementRef {
    pub tile: TileCoords,
    pub index: usize,
}

/// Rectangular grid of element stacks.
///
/// Every in-bounds tile starts with a single surface element. Lookups outside
/// the map return empty results rather than errors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    width: u16,
    height: u16,
    tiles: Vec<Vec<TileElement>>,
}

impl TileMap {
    pub fn new(width: u16, height: u16) -> Result<Self, StateError> {
        let max = GameConfig::MAX_MAP_SIZE;
        if width > max || height > max {
            return Err(StateError::MapTooLarge { width, height, max });
        }

        let count = usize::from(width) * usize::from(height);
        Ok(Self {
            width,
            height,
            tiles: vec![vec![TileElement::surface()]; count],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, tile: TileCoords) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < i32::from(self.width) && tile.y < i32::from(self.height)
    }

    fn slot(&self, tile: TileCoords) -> Option<usize> {
        self.contains(tile)
            .then(|| tile.y as usize * usize::from(self.width) + tile.x as usize)
    }

    /// Elements stacked on a tile, bottom first. Empty outside the map.
    pub fn elements_at(&self, tile: TileCoords) -> &[TileElement] {
        match self.slot(tile) {
            Some(slot) => &self.tiles[slot],
            None => &[],
        }
    }

    pub fn element(&self, at: ElementRef) -> Option<&TileElement> {
        self.elements_at(at.tile).get(at.index)
    }

    pub fn element_mut(&mut self, at: ElementRef) -> Option<&mut TileElement> {
        let slot = self.slot(at.tile)?;
        self.tiles[slot].get_mut(at.index)
    }

    /// Pushes an element on top of a tile's stack.
    pub fn push_element(&mut self, tile: TileCoords, element: TileElement) -> Result<ElementRef, StateError> {
        let slot = self.slot(tile).ok_or(StateError::TileOutOfBounds {
            tile,
            width: self.width,
            height: self.height,
        })?;

        let stack = &mut self.tiles[slot];
        stack.push(element);
        Ok(ElementRef {
            tile,
            index: stack.len() - 1,
        })
    }
}
