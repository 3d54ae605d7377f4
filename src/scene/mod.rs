//! Scene graph
//!
//! A minimal group hierarchy: the attachment points a shadowed scene wraps
//! around, and the state sets that receive texture overrides. Nodes are
//! shared the way scene graphs share them, by reference counting.

mod state_set;

pub use state_set::{StateSet, TextureBinding};

use std::cell::RefCell;
use std::rc::Rc;

use crate::shadow::SharedShadowedScene;

/// Node mask that matches every traversal.
pub const NODE_MASK_ALL: u32 = !0;

/// A group shared between its parents and its owner.
pub type SharedGroup = Rc<RefCell<Group>>;

/// A child of a [`Group`].
#[derive(Debug, Clone)]
pub enum Node {
    /// A plain group.
    Group(SharedGroup),
    /// A shadowed scene wrapping its own children.
    ShadowedScene(SharedShadowedScene),
}

impl Node {
    /// Get the group, if this node is one.
    pub fn as_group(&self) -> Option<&SharedGroup> {
        match self {
            Node::Group(group) => Some(group),
            Node::ShadowedScene(_) => None,
        }
    }

    /// Get the shadowed scene, if this node is one.
    pub fn as_shadowed_scene(&self) -> Option<&SharedShadowedScene> {
        match self {
            Node::ShadowedScene(scene) => Some(scene),
            Node::Group(_) => None,
        }
    }
}

/// A named node with children and optional render state.
#[derive(Debug)]
pub struct Group {
    name: String,
    node_mask: u32,
    state_set: Option<StateSet>,
    children: Vec<Node>,
}

impl Group {
    /// Create an empty group visible to every traversal.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_mask: NODE_MASK_ALL,
            state_set: None,
            children: Vec::new(),
        }
    }

    /// Wrap the group for sharing.
    pub fn into_shared(self) -> SharedGroup {
        Rc::new(RefCell::new(self))
    }

    /// Get the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the node mask.
    pub fn node_mask(&self) -> u32 {
        self.node_mask
    }

    /// Set the node mask tested against traversal masks.
    pub fn set_node_mask(&mut self, mask: u32) {
        self.node_mask = mask;
    }

    /// Whether a traversal with `traversal_mask` visits this group.
    pub fn is_visible_to(&self, traversal_mask: u32) -> bool {
        self.node_mask & traversal_mask != 0
    }

    /// Append a child.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get the children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Get the state set, if one was created.
    pub fn state_set(&self) -> Option<&StateSet> {
        self.state_set.as_ref()
    }

    /// Get the state set, creating an empty one first if needed.
    pub fn get_or_create_state_set(&mut self) -> &mut StateSet {
        self.state_set.get_or_insert_with(StateSet::new)
    }
}
