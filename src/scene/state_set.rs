//! State sets
//!
//! Bundles of render state attached to scene nodes. Only texture attributes
//! are modelled.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::core::{ShadowTexture, StateMode};

/// A texture bound to a texture unit.
#[derive(Debug, Clone)]
pub struct TextureBinding {
    /// The bound texture. Shared between every unit it is bound to.
    pub texture: Rc<ShadowTexture>,
    /// How the binding combines with ancestor bindings.
    pub mode: StateMode,
}

/// Render state attached to a scene node.
#[derive(Debug, Clone, Default)]
pub struct StateSet {
    textures: BTreeMap<u32, TextureBinding>,
}

impl StateSet {
    /// Create an empty state set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `texture` on `unit`, replacing any previous binding.
    pub fn set_texture_attribute_and_modes(
        &mut self,
        unit: u32,
        texture: Rc<ShadowTexture>,
        mode: StateMode,
    ) {
        self.textures.insert(unit, TextureBinding { texture, mode });
    }

    /// Remove the binding on `unit`.
    pub fn remove_texture_attribute(&mut self, unit: u32) -> Option<TextureBinding> {
        self.textures.remove(&unit)
    }

    /// Get the binding on `unit`.
    pub fn texture_attribute(&self, unit: u32) -> Option<&TextureBinding> {
        self.textures.get(&unit)
    }

    /// Units with a binding, ascending.
    pub fn texture_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.textures.keys().copied()
    }

    /// Resolve the binding on `unit` given the binding inherited from ancestors.
    ///
    /// An inherited override wins unless the local binding is protected.
    pub fn effective_texture<'a>(
        &'a self,
        unit: u32,
        inherited: Option<&'a TextureBinding>,
    ) -> Option<&'a TextureBinding> {
        let local = self.textures.get(&unit);
        match (inherited, local) {
            (Some(parent), Some(local)) if parent.mode.overrides() && !local.mode.is_protected() => {
                Some(parent)
            }
            (_, Some(local)) => Some(local),
            (parent, None) => parent,
        }
    }
}
