//! Authoritative world state.
//!
//! This module owns the data structures that actions read during query and
//! mutate during execute: the tile grid, the banner table, loaded scenery
//! definitions and the simulation clock. Runtime layers clone or query this
//! state but mutate it exclusively through the engine.
mod banner;
mod common;
mod error;
mod scenery;
mod tile;

pub use banner::{Banner, BannerTable, BannerText, decode_text, encode_text};
pub use common::{
    BannerIndex, COORDS_XY_STEP, COORDS_Z_STEP, CoordsXY, Direction, ObjectEntryIndex, TileCoords,
};
pub use error::StateError;
pub use scenery::{LargeSceneryEntry, LargeSceneryTile, SceneryObjects, WallEntry};
pub use tile::{
    BannerElement, ElementRef, LargeSceneryElement, TileElement, TileElementKind,
    TileElementType, TileMap, WallElement,
};

/// Simulation tick counter and pause state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationClock {
    /// Number of ticks simulated so far.
    pub tick: u64,
    /// While paused the tick counter does not advance and only actions that
    /// allow it may run.
    pub paused: bool,
}

impl SimulationClock {
    /// Advances one tick unless paused. Returns whether the clock moved.
    pub fn advance(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.tick += 1;
        true
    }
}

/// Canonical snapshot of the deterministic world.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub tiles: TileMap,
    pub banners: BannerTable,
    pub scenery: SceneryObjects,
    pub clock: SimulationClock,
}

impl WorldState {
    /// Creates an empty world of the given size in tiles.
    pub fn new(width: u16, height: u16) -> Result<Self, StateError> {
        Ok(Self {
            tiles: TileMap::new(width, height)?,
            banners: BannerTable::new(),
            scenery: SceneryObjects::default(),
            clock: SimulationClock::default(),
        })
    }

    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    pub fn banner(&self, index: BannerIndex) -> Option<&Banner> {
        self.banners.get(index)
    }

    /// Finds the element on the banner's tile that displays the banner.
    pub fn banner_tile_element(&self, index: BannerIndex) -> Option<(ElementRef, &TileElement)> {
        let banner = self.banners.get(index)?;
        self.tiles
            .elements_at(banner.position)
            .iter()
            .enumerate()
            .find(|(_, element)| element.banner_index() == Some(index))
            .map(|(i, element)| {
                (
                    ElementRef {
                        tile: banner.position,
                        index: i,
                    },
                    element,
                )
            })
    }

    /// Scans every element on `tile` and returns the first wall that carries
    /// scrolling text for `index`.
    pub fn find_scrolling_wall(&self, tile: TileCoords, index: BannerIndex) -> Option<ElementRef> {
        self.tiles
            .elements_at(tile)
            .iter()
            .position(|element| {
                let Some(wall) = element.as_wall() else {
                    return false;
                };
                let scrolls = self
                    .scenery
                    .wall(wall.entry)
                    .is_some_and(WallEntry::has_scrolling_text);
                scrolls && wall.banner_index == Some(index)
            })
            .map(|i| ElementRef { tile, index: i })
    }

    /// Locates every segment of the large scenery object that `segment`
    /// belongs to.
    ///
    /// Returns `None` if `segment` is not large scenery or if any segment of
    /// the footprint is missing from the map.
    pub fn large_sign_segments(&self, segment: ElementRef) -> Option<Vec<ElementRef>> {
        let element = self.tiles.element(segment)?;
        let scenery = element.as_large_scenery()?;
        let entry = self.scenery.large_scenery(scenery.entry)?;
        let direction = element.direction;

        let own = entry.tiles.get(usize::from(scenery.sequence))?;
        let origin_tile = TileCoords::new(
            segment.tile.x - direction.rotate(own.offset).x,
            segment.tile.y - direction.rotate(own.offset).y,
        );
        let origin_height = element.base_height.checked_sub(own.z_offset)?;

        entry
            .tiles
            .iter()
            .enumerate()
            .map(|(sequence, part)| {
                let tile = origin_tile.offset(direction.rotate(part.offset));
                let base_height = origin_height.checked_add(part.z_offset)?;
                self.find_large_segment(tile, scenery.entry, sequence, direction, base_height)
            })
            .collect()
    }

    fn find_large_segment(
        &self,
        tile: TileCoords,
        entry: ObjectEntryIndex,
        sequence: usize,
        direction: Direction,
        base_height: u8,
    ) -> Option<ElementRef> {
        self.tiles
            .elements_at(tile)
            .iter()
            .position(|element| {
                element.direction == direction
                    && element.base_height == base_height
                    && element.as_large_scenery().is_some_and(|scenery| {
                        scenery.entry == entry && usize::from(scenery.sequence) == sequence
                    })
            })
            .map(|index| ElementRef { tile, index })
    }

    /// Recolours every segment of a large scenery sign.
    ///
    /// All segments are located before any is modified; if one is missing
    /// nothing changes and `None` is returned. On success the recoloured
    /// segments are returned so callers can invalidate them.
    pub fn sign_set_colour(
        &mut self,
        segment: ElementRef,
        main_colour: u8,
        text_colour: u8,
    ) -> Option<Vec<ElementRef>> {
        let segments = self.large_sign_segments(segment)?;

        for &at in &segments {
            if let Some(scenery) = self
                .tiles
                .element_mut(at)
                .and_then(TileElement::as_large_scenery_mut)
            {
                scenery.primary_colour = main_colour;
                scenery.secondary_colour = text_colour;
            }
        }

        Some(segments)
    }
}
