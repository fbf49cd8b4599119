use core::any::Any;

use crate::action::{
    ActionEnvelope, ActionErrorKind, ActionFlags, ActionResult, ActionType, GameAction, StringId,
};
use crate::codec::{CodecError, DataSerialiser};
use crate::state::{BannerIndex, ElementRef, TileCoords, TileElementType, WorldState};
use crate::ui::UiContext;

use super::{BannerLookupError, invalidate_element, resolve_banner, update_banner_intent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
enum SignStyleError {
    #[error(transparent)]
    Banner(#[from] BannerLookupError),

    #[error("no tile element displays {0}")]
    ElementMissing(BannerIndex),

    #[error("{index} is displayed by a {found:?} element, not large scenery")]
    NotLargeScenery {
        index: BannerIndex,
        found: TileElementType,
    },

    #[error("large sign for {0} is missing segments")]
    SegmentsMissing(BannerIndex),

    #[error("no scrolling wall on {tile} displays {index}")]
    WallMissing { index: BannerIndex, tile: TileCoords },
}

impl From<SignStyleError> for ActionResult {
    fn from(error: SignStyleError) -> Self {
        let message = StringId::CANT_REPAINT_THIS;
        match error {
            SignStyleError::Banner(lookup) => lookup.into_result(message),
            SignStyleError::NotLargeScenery { .. } => {
                ActionResult::error(ActionErrorKind::WrongKind, message)
            }
            SignStyleError::ElementMissing(_)
            | SignStyleError::SegmentsMissing(_)
            | SignStyleError::WallMissing { .. } => {
                ActionResult::error(ActionErrorKind::NotFound, message)
            }
        }
    }
}

/// Element a sign style applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
enum SignTarget {
    Large { index: BannerIndex, segment: ElementRef },
    Wall { index: BannerIndex, wall: ElementRef },
}

/// Sets the main and text colour of a banner-backed sign.
///
/// Large signs span several tiles and every segment is recoloured together.
/// Small signs are walls with scrolling text; only the wall on the banner's
/// tile that carries the banner is touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignSetStyleAction {
    pub envelope: ActionEnvelope,
    pub banner_index: i32,
    pub main_colour: u8,
    pub text_colour: u8,
    pub is_large: bool,
}

impl SignSetStyleAction {
    pub fn new(banner_index: i32, main_colour: u8, text_colour: u8, is_large: bool) -> Self {
        Self {
            envelope: ActionEnvelope::default(),
            banner_index,
            main_colour,
            text_colour,
            is_large,
        }
    }

    fn resolve(&self, world: &WorldState) -> Result<SignTarget, SignStyleError> {
        let index = resolve_banner(world, self.banner_index)?;

        if self.is_large {
            let (segment, element) = world
                .banner_tile_element(index)
                .ok_or(SignStyleError::ElementMissing(index))?;
            let found = element.element_type();
            if found != TileElementType::LargeScenery {
                return Err(SignStyleError::NotLargeScenery { index, found });
            }
            if world.large_sign_segments(segment).is_none() {
                return Err(SignStyleError::SegmentsMissing(index));
            }
            Ok(SignTarget::Large { index, segment })
        } else {
            let tile = world
                .banner(index)
                .map(|banner| banner.position)
                .ok_or(BannerLookupError::Missing(index))?;
            let wall = world
                .find_scrolling_wall(tile, index)
                .ok_or(SignStyleError::WallMissing { index, tile })?;
            Ok(SignTarget::Wall { index, wall })
        }
    }
}

impl GameAction for SignSetStyleAction {
    fn action_type(&self) -> ActionType {
        ActionType::SIGN_SET_STYLE
    }

    fn envelope(&self) -> &ActionEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut ActionEnvelope {
        &mut self.envelope
    }

    fn flags(&self) -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn serialise_fields(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
        stream.tag("banner_index", &mut self.banner_index)?;
        stream.tag("main_colour", &mut self.main_colour)?;
        stream.tag("text_colour", &mut self.text_colour)?;
        stream.tag("is_large", &mut self.is_large)
    }

    fn query(&self, world: &WorldState) -> ActionResult {
        match self.resolve(world) {
            Ok(_) => ActionResult::ok(),
            Err(error) => error.into(),
        }
    }

    fn execute(&self, world: &mut WorldState, ui: &mut dyn UiContext) -> ActionResult {
        let target = match self.resolve(world) {
            Ok(target) => target,
            Err(error) => return error.into(),
        };

        let index = match target {
            SignTarget::Large { index, segment } => {
                let Some(segments) =
                    world.sign_set_colour(segment, self.main_colour, self.text_colour)
                else {
                    tracing::warn!(%index, "large sign segments vanished during recolour");
                    return ActionResult::error(ActionErrorKind::Unknown, StringId::CANT_REPAINT_THIS);
                };
                for at in segments {
                    if let Some(element) = world.tiles.element(at) {
                        invalidate_element(ui, at.tile, element);
                    }
                }
                index
            }
            SignTarget::Wall { index, wall } => {
                let Some(element) = world.tiles.element_mut(wall) else {
                    return ActionResult::error(ActionErrorKind::Unknown, StringId::CANT_REPAINT_THIS);
                };
                let Some(wall_element) = element.as_wall_mut() else {
                    tracing::warn!(%index, "sign wall changed kind during recolour");
                    return ActionResult::error(ActionErrorKind::Unknown, StringId::CANT_REPAINT_THIS);
                };
                wall_element.primary_colour = self.main_colour;
                wall_element.secondary_colour = self.text_colour;
                invalidate_element(ui, wall.tile, element);
                index
            }
        };

        ui.broadcast_intent(update_banner_intent(index));
        ActionResult::ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
