//! Shadow texture unit layout
//!
//! Shadow maps occupy the topmost of the texture units available to a
//! material. Every consumer derives the reserved units from here.

use std::ops::Range;

use super::{keys, SECTION};
use crate::settings::SettingsProvider;

/// Texture units available to a material.
pub const MAX_TEXTURE_UNITS: i32 = 8;

/// Texture units reserved for the shadow maps of one light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowUnitLayout {
    num_shadow_maps: i32,
}

impl ShadowUnitLayout {
    /// Layout for `num_shadow_maps` shadow maps per light.
    pub fn new(num_shadow_maps: i32) -> Self {
        Self { num_shadow_maps }
    }

    /// Layout for the configured number of shadow maps.
    pub fn from_settings<P: SettingsProvider + ?Sized>(settings: &P) -> Self {
        Self::new(settings.get_int(SECTION, keys::NUMBER_OF_SHADOW_MAPS))
    }

    /// Shadow maps per light.
    pub fn num_shadow_maps(&self) -> i32 {
        self.num_shadow_maps
    }

    /// First texture unit holding a shadow map.
    pub fn base_texture_unit(&self) -> i32 {
        MAX_TEXTURE_UNITS.saturating_sub(self.num_shadow_maps)
    }

    /// Texture units holding shadow maps, `[base, MAX_TEXTURE_UNITS)`.
    pub fn texture_units(&self) -> Range<i32> {
        self.base_texture_unit()..MAX_TEXTURE_UNITS
    }

    /// Shadow map indices as seen by shaders, `[0, num_shadow_maps)`.
    pub fn shadow_map_indices(&self) -> Range<i32> {
        0..self.num_shadow_maps.max(0)
    }
}
