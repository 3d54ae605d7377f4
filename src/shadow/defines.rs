//! Shader define generation
//!
//! Preprocessor symbols selecting shadow-aware or shadow-free shader variants.

use super::layout::ShadowUnitLayout;
use super::settings::ShadowSettings;
use crate::shader::DefineMap;

/// `1` when shadows are rendered.
pub const SHADOWS_ENABLED: &str = "shadows_enabled";
/// Comma separated shadow map indices, e.g. `0,1,2`.
pub const SHADOW_TEXTURE_UNIT_LIST: &str = "shadow_texture_unit_list";
/// `1` when shadow maps may overlap.
pub const SHADOW_MAPS_OVERLAP: &str = "shadowMapsOverlap";
/// `1` when fragments are tinted by their shadow map.
pub const USE_SHADOW_DEBUG_OVERLAY: &str = "useShadowDebugOverlay";

/// Defines for shaders compiled with shadows off.
pub fn shadows_disabled_defines() -> DefineMap {
    let mut defines = DefineMap::new();
    defines.insert(SHADOWS_ENABLED.to_string(), "0".to_string());
    defines.insert(SHADOW_TEXTURE_UNIT_LIST.to_string(), String::new());
    defines.insert(SHADOW_MAPS_OVERLAP.to_string(), "0".to_string());
    defines.insert(USE_SHADOW_DEBUG_OVERLAY.to_string(), "0".to_string());
    defines
}

/// Defines for shaders compiled against `settings`.
pub fn shadows_enabled_defines(settings: &ShadowSettings, debug_overlay: bool) -> DefineMap {
    let layout = ShadowUnitLayout::new(settings.num_shadow_maps_per_light);

    let mut defines = DefineMap::new();
    defines.insert(SHADOWS_ENABLED.to_string(), "1".to_string());
    defines.insert(SHADOW_TEXTURE_UNIT_LIST.to_string(), texture_unit_list(&layout));
    defines.insert(
        SHADOW_MAPS_OVERLAP.to_string(),
        flag(settings.multiple_shadow_map_hint.allows_overlap()),
    );
    defines.insert(USE_SHADOW_DEBUG_OVERLAY.to_string(), flag(debug_overlay));
    defines
}

fn texture_unit_list(layout: &ShadowUnitLayout) -> String {
    layout
        .shadow_map_indices()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_string()
}
