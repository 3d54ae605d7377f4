//! Shadowed scene node

use std::cell::RefCell;
use std::rc::Rc;

use super::settings::ShadowSettings;
use super::technique::ShadowTechnique;
use crate::scene::Node;

/// A shadowed scene shared between its parent group and its manager.
pub type SharedShadowedScene = Rc<RefCell<ShadowedScene>>;

/// Scene node that renders its children with a shadow technique.
#[derive(Debug)]
pub struct ShadowedScene {
    technique: Box<dyn ShadowTechnique>,
    settings: ShadowSettings,
    children: Vec<Node>,
}

impl ShadowedScene {
    /// Create a shadowed scene driven by `technique`.
    pub fn new(technique: Box<dyn ShadowTechnique>) -> Self {
        Self {
            technique,
            settings: ShadowSettings::default(),
            children: Vec::new(),
        }
    }

    /// Wrap the scene for sharing.
    pub fn into_shared(self) -> SharedShadowedScene {
        Rc::new(RefCell::new(self))
    }

    /// Get the technique.
    pub fn technique(&self) -> &dyn ShadowTechnique {
        self.technique.as_ref()
    }

    /// Get the technique mutably.
    pub fn technique_mut(&mut self) -> &mut dyn ShadowTechnique {
        self.technique.as_mut()
    }

    /// Replace the technique.
    pub fn set_shadow_technique(&mut self, technique: Box<dyn ShadowTechnique>) {
        self.technique = technique;
    }

    /// Get the shadow settings.
    pub fn shadow_settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// Get the shadow settings mutably.
    pub fn shadow_settings_mut(&mut self) -> &mut ShadowSettings {
        &mut self.settings
    }

    /// Append a child rendered with shadows.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get the children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}
