//! Shader manager
//!
//! Expands shader templates with preprocessor defines and caches the
//! resulting variants. Variants are keyed by shader name and the full define
//! map, so any change to the defines yields a new variant.

mod preprocess;

pub use preprocess::preprocess;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

/// Preprocessor defines, ordered so they can key shader variants.
pub type DefineMap = BTreeMap<String, String>;

/// Template for materials that receive shadows.
pub const SHADOW_RECEIVER_TEMPLATE: &str = include_str!("../shaders/shadow_receiver.wgsl");

/// Errors from shader template expansion.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("line {line}: undefined define '{name}'")]
    UndefinedDefine { name: String, line: usize },

    #[error("line {line}: @foreach without matching @endforeach")]
    UnterminatedForeach { line: usize },

    #[error("line {line}: malformed @foreach block")]
    MalformedForeach { line: usize },
}

/// Result type for shader operations.
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Caches expanded shader variants.
#[derive(Debug, Default)]
pub struct ShaderManager {
    global_defines: DefineMap,
    variants: HashMap<(String, DefineMap), Arc<str>>,
}

impl ShaderManager {
    /// Create a manager with no global defines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the defines applied to every shader.
    ///
    /// Cached variants are dropped when the defines change.
    pub fn set_global_defines(&mut self, defines: DefineMap) {
        if defines == self.global_defines {
            return;
        }
        tracing::debug!(
            "Global shader defines changed, dropping {} cached variants",
            self.variants.len()
        );
        self.global_defines = defines;
        self.variants.clear();
    }

    /// Get the defines applied to every shader.
    pub fn global_defines(&self) -> &DefineMap {
        &self.global_defines
    }

    /// Get the variant of `template` for `defines`, expanding it on first use.
    ///
    /// `defines` are layered over the global defines.
    pub fn get_shader(
        &mut self,
        name: &str,
        template: &str,
        defines: &DefineMap,
    ) -> ShaderResult<Arc<str>> {
        let mut merged = self.global_defines.clone();
        merged.extend(defines.iter().map(|(k, v)| (k.clone(), v.clone())));

        let key = (name.to_string(), merged);
        if let Some(source) = self.variants.get(&key) {
            return Ok(Arc::clone(source));
        }

        let source: Arc<str> = preprocess(template, &key.1)?.into();
        tracing::debug!("Expanded shader '{}' ({} defines)", name, key.1.len());
        self.variants.insert(key, Arc::clone(&source));
        Ok(source)
    }

    /// Number of cached variants.
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}
