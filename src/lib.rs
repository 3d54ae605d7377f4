//! Umbra
//!
//! Cascaded shadow configuration for wgpu renderers.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **settings** - Sectioned settings store loaded from TOML
//! 2. **core** - Depth textures and render state modes
//! 3. **scene** - Group hierarchy and state sets
//! 4. **shadow** - Shadowed scene, technique parameters, indoor/outdoor modes
//! 5. **shader** - Shader defines, template expansion and variant cache
//!
//! # Example
//!
//! ```
//! use umbra::{Group, Settings, ShaderManager, ShadowManager, SHADOW_RECEIVER_TEMPLATE};
//!
//! let settings = Settings::from_user_toml("[Shadows]\n\"enable shadows\" = true")?;
//! let scene_root = Group::new("scene root").into_shared();
//! let mut root = Group::new("root");
//! let mut shadows = ShadowManager::new(settings, scene_root, &mut root, 0x1, 0x2);
//!
//! let mut shaders = ShaderManager::new();
//! shaders.set_global_defines(shadows.shadow_defines());
//! let source = shaders.get_shader("receiver", SHADOW_RECEIVER_TEMPLATE, &Default::default())?;
//! assert!(source.contains("fn sample_shadow_map_0("));
//!
//! shadows.enable_indoor_mode();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod scene;
pub mod settings;
pub mod shader;
pub mod shadow;

// Re-export commonly used types
pub use crate::core::{DepthImage, GpuShadowTexture, ShadowTexture, StateMode};

pub use scene::{Group, Node, SharedGroup, StateSet, TextureBinding};

pub use settings::{Settings, SettingsChanges, SettingsError, SettingsProvider};

pub use shader::{DefineMap, ShaderError, ShaderManager, SHADOW_RECEIVER_TEMPLATE};

pub use shadow::{
    disable_shadows_for_state_set, CascadedShadowTechnique, MultipleShadowMapHint,
    ShadowManager, ShadowMode, ShadowSettings, ShadowTechnique, ShadowUnitLayout, ShadowedScene,
};

// Re-export glam for convenience
pub use glam;
