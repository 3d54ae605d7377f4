//! Core rendering abstractions
//!
//! Texture data and render state types shared by the scene graph and the
//! shadow module.

pub mod render_states;
pub mod texture;

pub use render_states::StateMode;
pub use texture::{DepthImage, GpuShadowTexture, ShadowTexture};
