//! Concrete actions.
//!
//! Each action resolves its target during `query` into a small typed value,
//! and `execute` resolves it again against the live world before touching
//! anything, so a world that changed in between fails cleanly.
mod banner;
mod pause;
mod sign;

pub use banner::{BannerSetColourAction, BannerSetNameAction};
pub use pause::PauseToggleAction;
pub use sign::SignSetStyleAction;

use crate::state::{BannerIndex, TileElement, TileCoords, WorldState};
use crate::ui::{Intent, IntentAction, IntentExtra, IntentValue, UiContext};

use super::{ActionErrorKind, ActionResult, ErrorDetail, StringId};

/// Failure to resolve a wire banner index to a live banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum BannerLookupError {
    #[error("banner index {0} is out of range")]
    OutOfRange(i32),
    #[error("{0} is not in use")]
    Missing(BannerIndex),
}

impl BannerLookupError {
    pub(crate) fn into_result(self, message: StringId) -> ActionResult {
        match self {
            Self::OutOfRange(raw) => ActionResult::error(ActionErrorKind::InvalidParameters, message)
                .with_detail(ErrorDetail::Parameter {
                    name: "banner_index",
                    value: i64::from(raw),
                }),
            Self::Missing(_) => ActionResult::error(ActionErrorKind::NotFound, message),
        }
    }
}

/// Validates `raw` against the table size and checks the slot is in use.
pub(crate) fn resolve_banner(world: &WorldState, raw: i32) -> Result<BannerIndex, BannerLookupError> {
    let index = BannerIndex::from_raw(raw).ok_or_else(|| {
        tracing::warn!(banner_index = raw, "invalid banner index");
        BannerLookupError::OutOfRange(raw)
    })?;
    world
        .banner(index)
        .map(|_| index)
        .ok_or(BannerLookupError::Missing(index))
}

pub(crate) fn invalidate_element(ui: &mut dyn UiContext, tile: TileCoords, element: &TileElement) {
    ui.invalidate_tile(tile.to_world(), element.base_z(), element.clearance_z());
}

pub(crate) fn update_banner_intent(index: BannerIndex) -> Intent {
    Intent::new(IntentAction::UpdateBanner)
        .put_extra(IntentExtra::BannerIndex, IntentValue::Int(i64::from(index.0)))
}
