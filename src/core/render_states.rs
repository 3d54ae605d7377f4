//! Render state modes
//!
//! Flags controlling how a state attribute participates in state inheritance.

bitflags::bitflags! {
    /// How an attribute bound on a state set combines with its ancestors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateMode: u32 {
        /// The attribute is enabled.
        const ON = 1 << 0;
        /// The attribute replaces the same attribute on descendants.
        const OVERRIDE = 1 << 1;
        /// The attribute cannot be replaced by an ancestor's override.
        const PROTECTED = 1 << 2;
    }
}

impl StateMode {
    /// Whether this binding wins over a descendant binding.
    pub fn overrides(self) -> bool {
        self.contains(StateMode::OVERRIDE)
    }

    /// Whether this binding resists an ancestor's override.
    pub fn is_protected(self) -> bool {
        self.contains(StateMode::PROTECTED)
    }
}

impl Default for StateMode {
    fn default() -> Self {
        StateMode::ON
    }
}
