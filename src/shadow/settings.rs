//! Shadow settings
//!
//! The companion settings object of a shadowed scene.

use std::fmt;

use glam::UVec2;

use crate::scene::NODE_MASK_ALL;

/// How the shadow maps of one light divide the view frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultipleShadowMapHint {
    /// Disjoint depth ranges, one shadow map each.
    #[default]
    ParallelSplit,
    /// Nested depth ranges; shadow maps may overlap.
    Cascaded,
}

impl MultipleShadowMapHint {
    /// Whether shadow maps may overlap.
    pub fn allows_overlap(self) -> bool {
        self == MultipleShadowMapHint::Cascaded
    }
}

impl fmt::Display for MultipleShadowMapHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultipleShadowMapHint::ParallelSplit => f.write_str("parallel-split"),
            MultipleShadowMapHint::Cascaded => f.write_str("cascaded"),
        }
    }
}

/// How the shadow camera computes its near and far planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeNearFarMode {
    /// Use the planes as given.
    DoNotCompute,
    /// Fit the planes to bounding volumes.
    #[default]
    UsingBoundingVolumes,
    /// Fit the planes to individual primitives. Tighter, but slower.
    UsingPrimitives,
}

/// Parameters shared by the shadow technique and the shadowed scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSettings {
    /// Index of the light casting shadows, or -1 for none.
    pub light_num: i32,
    /// Traversal mask of nodes that receive shadows.
    pub receives_shadow_traversal_mask: u32,
    /// Traversal mask of nodes that cast shadows.
    pub casts_shadow_traversal_mask: u32,
    /// Shadow maps per light.
    pub num_shadow_maps_per_light: i32,
    /// First texture unit holding a shadow map.
    pub base_shadow_texture_unit: i32,
    /// Lower bound of the light-space near/far ratio.
    pub minimum_shadow_map_near_far_ratio: f32,
    /// Near/far computation used by the shadow camera.
    pub compute_near_far_mode_override: ComputeNearFarMode,
    /// Shadow map size in texels.
    pub texture_size: UVec2,
    /// How multiple shadow maps split the frustum.
    pub multiple_shadow_map_hint: MultipleShadowMapHint,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            light_num: -1,
            receives_shadow_traversal_mask: NODE_MASK_ALL,
            casts_shadow_traversal_mask: NODE_MASK_ALL,
            num_shadow_maps_per_light: 1,
            base_shadow_texture_unit: 1,
            minimum_shadow_map_near_far_ratio: 0.05,
            compute_near_far_mode_override: ComputeNearFarMode::default(),
            texture_size: UVec2::splat(2048),
            multiple_shadow_map_hint: MultipleShadowMapHint::default(),
        }
    }
}
