//! Shadow mapping configuration
//!
//! Translates the `[Shadows]` settings section into parameters for a
//! shadowed scene and its technique, and produces the shader defines that
//! match them.
//!
//! # Texture units
//!
//! Shadow maps occupy the topmost texture units: with `N` shadow maps per
//! light, units `[8 - N, 8)` are reserved. [`ShadowUnitLayout`] is the only
//! place this is derived.

mod defines;
mod layout;
mod manager;
mod scene;
mod settings;
mod suppress;
mod technique;

pub use defines::{
    shadows_disabled_defines, shadows_enabled_defines, SHADOWS_ENABLED, SHADOW_MAPS_OVERLAP,
    SHADOW_TEXTURE_UNIT_LIST, USE_SHADOW_DEBUG_OVERLAY,
};
pub use layout::{ShadowUnitLayout, MAX_TEXTURE_UNITS};
pub use manager::{ShadowManager, ShadowMode};
pub use scene::{ShadowedScene, SharedShadowedScene};
pub use settings::{ComputeNearFarMode, MultipleShadowMapHint, ShadowSettings};
pub use suppress::{disable_shadows_for_state_set, fake_shadow_map_texture};
pub use technique::{CascadedShadowTechnique, ShadowTechnique};

/// Settings section holding every shadow key.
pub const SECTION: &str = "Shadows";

/// Keys of the `[Shadows]` section.
pub mod keys {
    pub const ENABLE_SHADOWS: &str = "enable shadows";
    pub const NUMBER_OF_SHADOW_MAPS: &str = "number of shadow maps";
    pub const MINIMUM_LISPSM_NEAR_FAR_RATIO: &str = "minimum lispsm near far ratio";
    pub const COMPUTE_TIGHT_SCENE_BOUNDS: &str = "compute tight scene bounds";
    pub const SHADOW_MAP_RESOLUTION: &str = "shadow map resolution";
    pub const SPLIT_POINT_UNIFORM_LOGARITHMIC_RATIO: &str = "split point uniform logarithmic ratio";
    pub const SPLIT_POINT_BIAS: &str = "split point bias";
    pub const ALLOW_SHADOW_MAP_OVERLAP: &str = "allow shadow map overlap";
    pub const ENABLE_DEBUG_HUD: &str = "enable debug hud";
    pub const ENABLE_DEBUG_OVERLAY: &str = "enable debug overlay";
    pub const ENABLE_INDOOR_SHADOWS: &str = "enable indoor shadows";
}
