use core::any::Any;

use crate::action::{
    ActionEnvelope, ActionErrorKind, ActionResult, ActionType, ErrorDetail, GameAction, StringId,
};
use crate::codec::{CodecError, DataSerialiser};
use crate::config::GameConfig;
use crate::state::{BannerIndex, BannerText, WorldState, decode_text, encode_text};
use crate::ui::UiContext;

use super::{invalidate_element, resolve_banner, update_banner_intent};

fn refresh_banner(world: &WorldState, index: BannerIndex, ui: &mut dyn UiContext) {
    if let Some((at, element)) = world.banner_tile_element(index) {
        invalidate_element(ui, at.tile, element);
    }
    ui.broadcast_intent(update_banner_intent(index));
}

/// Sets the background colour of a banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerSetColourAction {
    pub envelope: ActionEnvelope,
    pub banner_index: i32,
    pub colour: u8,
}

impl BannerSetColourAction {
    pub fn new(banner_index: i32, colour: u8) -> Self {
        Self {
            envelope: ActionEnvelope::default(),
            banner_index,
            colour,
        }
    }

    fn resolve(&self, world: &WorldState) -> Result<BannerIndex, ActionResult> {
        let index = resolve_banner(world, self.banner_index)
            .map_err(|error| error.into_result(StringId::NONE))?;
        if self.colour > GameConfig::MAX_COLOUR {
            return Err(
                ActionResult::error(ActionErrorKind::InvalidParameters, StringId::NONE)
                    .with_detail(ErrorDetail::Parameter {
                        name: "colour",
                        value: i64::from(self.colour),
                    }),
            );
        }
        Ok(index)
    }
}

impl GameAction for BannerSetColourAction {
    fn action_type(&self) -> ActionType {
        ActionType::BANNER_SET_COLOUR
    }

    fn envelope(&self) -> &ActionEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut ActionEnvelope {
        &mut self.envelope
    }

    fn serialise_fields(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
        stream.tag("banner_index", &mut self.banner_index)?;
        stream.tag("colour", &mut self.colour)
    }

    fn query(&self, world: &WorldState) -> ActionResult {
        self.resolve(world).map_or_else(|error| error, |_| ActionResult::ok())
    }

    fn execute(&self, world: &mut WorldState, ui: &mut dyn UiContext) -> ActionResult {
        let index = match self.resolve(world) {
            Ok(index) => index,
            Err(error) => return error,
        };
        let Some(banner) = world.banners.get_mut(index) else {
            return ActionResult::error(ActionErrorKind::Unknown, StringId::NONE);
        };
        banner.colour = self.colour;

        refresh_banner(world, index, ui);
        ActionResult::ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replaces a banner's text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerSetNameAction {
    pub envelope: ActionEnvelope,
    pub banner_index: i32,
    /// NUL-padded UTF-8.
    pub name: BannerText,
}

impl BannerSetNameAction {
    /// Text longer than the banner width is truncated.
    pub fn new(banner_index: i32, name: &str) -> Self {
        Self {
            envelope: ActionEnvelope::default(),
            banner_index,
            name: encode_text(name),
        }
    }

    fn resolve(&self, world: &WorldState) -> Result<BannerIndex, ActionResult> {
        let index = resolve_banner(world, self.banner_index)
            .map_err(|error| error.into_result(StringId::CANT_RENAME_BANNER))?;
        if decode_text(&self.name).is_none() {
            return Err(ActionResult::error(
                ActionErrorKind::InvalidParameters,
                StringId::CANT_RENAME_BANNER,
            ));
        }
        Ok(index)
    }
}

impl GameAction for BannerSetNameAction {
    fn action_type(&self) -> ActionType {
        ActionType::BANNER_SET_NAME
    }

    fn envelope(&self) -> &ActionEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut ActionEnvelope {
        &mut self.envelope
    }

    fn serialise_fields(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
        stream.tag("banner_index", &mut self.banner_index)?;
        stream.tag("name", &mut self.name)
    }

    fn query(&self, world: &WorldState) -> ActionResult {
        self.resolve(world).map_or_else(|error| error, |_| ActionResult::ok())
    }

    fn execute(&self, world: &mut WorldState, ui: &mut dyn UiContext) -> ActionResult {
        let index = match self.resolve(world) {
            Ok(index) => index,
            Err(error) => return error,
        };
        let Some(banner) = world.banners.get_mut(index) else {
            return ActionResult::error(ActionErrorKind::Unknown, StringId::CANT_RENAME_BANNER);
        };
        banner.text = self.name;

        refresh_banner(world, index, ui);
        ActionResult::ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::kinds::fixtures::{self, WALL_BANNER};
    use crate::ui::{IntentAction, RecordingUi};

    #[test]
    fn colour_is_applied_and_the_tile_invalidated() {
        let (mut world, _, _) = fixtures::signs();
        let mut ui = RecordingUi::new();
        let result = BannerSetColourAction::new(3, 14).execute(&mut world, &mut ui);

        assert!(result.is_ok());
        assert_eq!(world.banner(WALL_BANNER).unwrap().colour, 14);
        assert_eq!(ui.invalidations.len(), 1);
        assert_eq!(ui.intents_of(IntentAction::UpdateBanner).count(), 1);
    }

    #[test]
    fn colour_outside_the_palette_is_rejected() {
        let (world, _, _) = fixtures::signs();
        let result = BannerSetColourAction::new(3, GameConfig::MAX_COLOUR + 1).query(&world);
        assert_eq!(result.error_kind(), Some(ActionErrorKind::InvalidParameters));
        assert_eq!(
            result.detail(),
            Some(&ErrorDetail::Parameter {
                name: "colour",
                value: 32
            })
        );
        assert_eq!(result.message(), StringId::INVALID_PARAMETERS);
    }

    #[test]
    fn name_is_stored() {
        let (mut world, _, _) = fixtures::signs();
        let action = BannerSetNameAction::new(3, "Log Flume");
        assert!(action.execute(&mut world, &mut RecordingUi::new()).is_ok());
        assert_eq!(world.banner(WALL_BANNER).unwrap().text(), Some("Log Flume"));
    }

    #[test]
    fn invalid_utf8_name_is_rejected() {
        let (world, _, _) = fixtures::signs();
        let mut action = BannerSetNameAction::new(3, "");
        action.name[0] = 0xFF;
        let result = action.query(&world);
        assert_eq!(result.error_kind(), Some(ActionErrorKind::InvalidParameters));
        assert_eq!(result.message(), StringId::CANT_RENAME_BANNER);
    }

    #[test]
    fn missing_banner_is_not_found() {
        let (world, _, _) = fixtures::signs();
        let result = BannerSetNameAction::new(42, "x").query(&world);
        assert_eq!(result.error_kind(), Some(ActionErrorKind::NotFound));
    }
}
