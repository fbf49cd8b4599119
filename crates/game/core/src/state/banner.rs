//! Banner table.

use crate::config::GameConfig;

use super::{BannerIndex, StateError, TileCoords};

/// Fixed-size, NUL-padded banner text as stored on the wire.
pub type BannerText = [u8; GameConfig::BANNER_TEXT_LEN];

/// Text and colour data shared by every element that displays a banner.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Banner {
    /// Tile the banner's element lives on.
    pub position: TileCoords,
    pub colour: u8,
    pub text_colour: u8,
    pub text: BannerText,
}

impl Banner {
    pub fn new(position: TileCoords) -> Self {
        Self {
            position,
            colour: 0,
            text_colour: 0,
            text: [0; GameConfig::BANNER_TEXT_LEN],
        }
    }

    /// Banner text up to the first NUL, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        decode_text(&self.text)
    }
}

/// Decodes NUL-padded text, returning `None` for invalid UTF-8.
pub fn decode_text(raw: &BannerText) -> Option<&str> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    core::str::from_utf8(&raw[..end]).ok()
}

/// Encodes text into the fixed banner width, truncating at a character
/// boundary when it does not fit.
pub fn encode_text(text: &str) -> BannerText {
    let mut raw = [0; GameConfig::BANNER_TEXT_LEN];
    let mut end = text.len().min(raw.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].copy_from_slice(&text.as_bytes()[..end]);
    raw
}

/// Slot table of banners addressed by [`BannerIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerTable {
    slots: Vec<Option<Banner>>,
}

impl BannerTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; GameConfig::MAX_BANNERS],
        }
    }

    pub fn get(&self, index: BannerIndex) -> Option<&Banner> {
        self.slots.get(index.as_usize()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: BannerIndex) -> Option<&mut Banner> {
        self.slots.get_mut(index.as_usize()).and_then(Option::as_mut)
    }

    /// Places a banner in a specific slot.
    pub fn insert(&mut self, index: BannerIndex, banner: Banner) -> Result<(), StateError> {
        let slot = self
            .slots
            .get_mut(index.as_usize())
            .ok_or(StateError::BannerIndexOutOfRange {
                index,
                max: GameConfig::MAX_BANNERS,
            })?;
        if slot.is_some() {
            return Err(StateError::BannerSlotOccupied { index });
        }
        *slot = Some(banner);
        Ok(())
    }

    /// Iterates over occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (BannerIndex, &Banner)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|banner| (BannerIndex(i as u16), banner)))
    }
}

impl Default for BannerTable {
    fn default() -> Self {
        Self::new()
    }
}
