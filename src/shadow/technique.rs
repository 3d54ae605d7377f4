//! Shadow techniques
//!
//! The object that renders shadow maps for a shadowed scene. This crate only
//! parameterizes it; split computation and rendering live behind the trait.

use std::fmt;

/// A shadow rendering technique.
pub trait ShadowTechnique: fmt::Debug {
    /// Start rendering shadows.
    fn enable_shadows(&mut self);

    /// Stop rendering shadows. Receivers render fully lit.
    fn disable_shadows(&mut self);

    /// Whether shadows are rendered.
    fn shadows_enabled(&self) -> bool;

    /// Show shadow map contents on screen.
    fn enable_debug_hud(&mut self);

    /// Hide the debug display.
    fn disable_debug_hud(&mut self);

    /// Whether the debug display is shown.
    fn debug_hud_enabled(&self) -> bool;

    /// Blend between uniform (0.0) and logarithmic (1.0) split points.
    fn set_split_point_uniform_logarithmic_ratio(&mut self, ratio: f32);

    /// Get the split point blend ratio.
    fn split_point_uniform_logarithmic_ratio(&self) -> f32;

    /// Offset added to every split point.
    fn set_split_point_delta_bias(&mut self, bias: f32);

    /// Get the split point offset.
    fn split_point_delta_bias(&self) -> f32;
}

/// Cascaded shadow map technique state.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadedShadowTechnique {
    enabled: bool,
    debug_hud: bool,
    split_point_uniform_logarithmic_ratio: f32,
    split_point_delta_bias: f32,
}

impl Default for CascadedShadowTechnique {
    fn default() -> Self {
        Self {
            enabled: false,
            debug_hud: false,
            split_point_uniform_logarithmic_ratio: 0.5,
            split_point_delta_bias: 0.0,
        }
    }
}

impl CascadedShadowTechnique {
    /// Create a disabled technique.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShadowTechnique for CascadedShadowTechnique {
    fn enable_shadows(&mut self) {
        if !self.enabled {
            tracing::info!("Shadows enabled");
        }
        self.enabled = true;
    }

    fn disable_shadows(&mut self) {
        if self.enabled {
            tracing::info!("Shadows disabled");
        }
        self.enabled = false;
    }

    fn shadows_enabled(&self) -> bool {
        self.enabled
    }

    fn enable_debug_hud(&mut self) {
        self.debug_hud = true;
    }

    fn disable_debug_hud(&mut self) {
        self.debug_hud = false;
    }

    fn debug_hud_enabled(&self) -> bool {
        self.debug_hud
    }

    fn set_split_point_uniform_logarithmic_ratio(&mut self, ratio: f32) {
        self.split_point_uniform_logarithmic_ratio = ratio;
    }

    fn split_point_uniform_logarithmic_ratio(&self) -> f32 {
        self.split_point_uniform_logarithmic_ratio
    }

    fn set_split_point_delta_bias(&mut self, bias: f32) {
        self.split_point_delta_bias = bias;
    }

    fn split_point_delta_bias(&self) -> f32 {
        self.split_point_delta_bias
    }
}
