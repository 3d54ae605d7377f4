//! Per-state-set shadow suppression
//!
//! Binds an "always lit" depth texture over every shadow map unit of a state
//! set so nothing rendered with it is ever shadowed.

use std::rc::Rc;

use super::layout::ShadowUnitLayout;
use crate::core::{DepthImage, ShadowTexture, StateMode};
use crate::scene::StateSet;
use crate::settings::SettingsProvider;

/// A 1x1 depth texture at infinite depth whose comparison always passes.
pub fn fake_shadow_map_texture() -> ShadowTexture {
    let image = DepthImage::filled(1, 1, f32::INFINITY);
    let mut texture = ShadowTexture::new(image, Some("fake shadow map"));
    texture.set_shadow_comparison(true);
    texture.set_shadow_compare_func(wgpu::CompareFunction::Always);
    texture
}

/// Make `state_set` render as if nothing shadows it.
///
/// The fake texture is bound with override and protection on every unit of
/// the configured layout, whether or not shadows are enabled.
pub fn disable_shadows_for_state_set<P: SettingsProvider + ?Sized>(
    settings: &P,
    state_set: &mut StateSet,
) {
    let layout = ShadowUnitLayout::from_settings(settings);
    let texture = Rc::new(fake_shadow_map_texture());
    let mode = StateMode::ON | StateMode::OVERRIDE | StateMode::PROTECTED;

    for unit in layout.texture_units() {
        match u32::try_from(unit) {
            Ok(unit) => state_set.set_texture_attribute_and_modes(unit, Rc::clone(&texture), mode),
            Err(_) => tracing::warn!("Skipping fake shadow map on invalid texture unit {}", unit),
        }
    }
}
