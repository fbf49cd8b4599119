//! Demo world shared by the commands.

use anyhow::{Context, Result};

use game_core::state::{
    Banner, LargeSceneryElement, LargeSceneryEntry, LargeSceneryTile, WallElement, WallEntry,
    encode_text,
};
use game_core::{BannerIndex, Direction, TileCoords, TileElement, TileElementKind, WorldState};

pub const WALL_SIGN: BannerIndex = BannerIndex(0);
pub const LARGE_SIGN: BannerIndex = BannerIndex(1);

const WALL_TILE: TileCoords = TileCoords::new(4, 4);
const LARGE_ORIGIN: TileCoords = TileCoords::new(10, 6);

/// A 16x16 map with one scrolling wall sign and one 3x1 large sign.
pub fn demo_world() -> Result<WorldState> {
    let mut world = WorldState::new(16, 16)?;

    let wall_entry = world.scenery.add_wall(WallEntry {
        name: "Scrolling Sign Wall".into(),
        scrolling_mode: Some(0),
    });
    world.tiles.push_element(
        WALL_TILE,
        TileElement::new(
            2,
            6,
            Direction::NORTH,
            TileElementKind::Wall(WallElement {
                entry: wall_entry,
                primary_colour: 0,
                secondary_colour: 0,
                banner_index: Some(WALL_SIGN),
            }),
        ),
    )?;
    let mut banner = Banner::new(WALL_TILE);
    banner.text = encode_text("Entrance");
    world.banners.insert(WALL_SIGN, banner)?;

    let footprint: Vec<LargeSceneryTile> = (0..3)
        .map(|x| LargeSceneryTile {
            offset: TileCoords::new(x, 0),
            z_offset: 0,
        })
        .collect();
    let large_entry = world.scenery.add_large_scenery(LargeSceneryEntry {
        name: "3D Sign".into(),
        tiles: footprint.clone(),
        scrolling_mode: Some(1),
    });
    let direction = Direction::EAST;
    for (sequence, part) in footprint.iter().enumerate() {
        let sequence = u8::try_from(sequence).context("footprint too large")?;
        world.tiles.push_element(
            LARGE_ORIGIN.offset(direction.rotate(part.offset)),
            TileElement::new(
                2 + part.z_offset,
                12,
                direction,
                TileElementKind::LargeScenery(LargeSceneryElement {
                    entry: large_entry,
                    sequence,
                    primary_colour: 0,
                    secondary_colour: 0,
                    banner_index: Some(LARGE_SIGN),
                }),
            ),
        )?;
    }
    world.banners.insert(LARGE_SIGN, Banner::new(LARGE_ORIGIN))?;

    Ok(world)
}
