//! Settings store
//!
//! Sectioned key/value settings loaded from TOML documents.
//!
//! The embedded default document declares every known key together with its
//! type. User documents overlay the defaults:
//!
//! ```toml
//! [Shadows]
//! "enable shadows" = true
//! "number of shadow maps" = 3
//! "shadow map resolution" = 2048
//! ```
//!
//! Consumers read settings through [`SettingsProvider`], which is injected
//! rather than reached through a global.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// The built-in default settings document.
pub const DEFAULT_SETTINGS: &str = include_str!("settings-default.toml");

/// Errors from loading or querying settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("setting '{key}' not found in section [{section}]")]
    Missing { section: String, key: String },

    #[error("setting '{key}' in section [{section}] expects {expected}, found {found}")]
    TypeMismatch {
        section: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("setting '{key}' in section [{section}] is out of range: {value}")]
    OutOfRange {
        section: String,
        key: String,
        value: i64,
    },
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// `(section, key)` pairs changed since the last [`Settings::take_changes`].
pub type SettingsChanges = BTreeSet<(String, String)>;

/// A single setting value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl SettingValue {
    /// Name of the value's type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "integer",
            SettingValue::Float(_) => "float",
        }
    }

    /// Convert `value` to the type of `self`, if the two are compatible.
    ///
    /// Integers widen to floats; nothing else converts.
    fn coerce(&self, value: SettingValue) -> Option<SettingValue> {
        match (self, value) {
            (SettingValue::Bool(_), SettingValue::Bool(_))
            | (SettingValue::Int(_), SettingValue::Int(_))
            | (SettingValue::Float(_), SettingValue::Float(_)) => Some(value),
            (SettingValue::Float(_), SettingValue::Int(i)) => Some(SettingValue::Float(i as f64)),
            _ => None,
        }
    }
}

type Section = BTreeMap<String, SettingValue>;
type Document = BTreeMap<String, Section>;

/// Read-only access to typed settings.
///
/// Reads never fail. Implementations report missing or mistyped keys through
/// their own logging and return a zero value.
pub trait SettingsProvider {
    /// Read a boolean setting.
    fn get_bool(&self, section: &str, key: &str) -> bool;
    /// Read an integer setting.
    fn get_int(&self, section: &str, key: &str) -> i32;
    /// Read a floating point setting.
    fn get_float(&self, section: &str, key: &str) -> f32;
}

/// Settings store with defaults, user overrides and change tracking.
#[derive(Debug, Clone)]
pub struct Settings {
    defaults: Document,
    values: Document,
    changes: SettingsChanges,
}

impl Settings {
    /// Create a store holding the built-in defaults.
    pub fn new() -> SettingsResult<Self> {
        Self::from_defaults(DEFAULT_SETTINGS)
    }

    /// Create a store from a custom defaults document.
    pub fn from_defaults(defaults: &str) -> SettingsResult<Self> {
        let defaults: Document = toml::from_str(defaults)?;
        Ok(Self {
            values: defaults.clone(),
            defaults,
            changes: SettingsChanges::new(),
        })
    }

    /// Create a store from the built-in defaults overlaid with a user document.
    pub fn from_user_toml(user: &str) -> SettingsResult<Self> {
        let mut settings = Self::new()?;
        settings.apply_user_toml(user)?;
        Ok(settings)
    }

    /// Create a store from the built-in defaults overlaid with a user file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_user_toml(&content)?;
        tracing::info!("Loaded user settings from {}", path.display());
        Ok(settings)
    }

    /// Overlay a user document on the current values.
    ///
    /// Overlaying does not count as a change. On error the store is left
    /// untouched.
    pub fn apply_user_toml(&mut self, user: &str) -> SettingsResult<()> {
        let mut user: Document = toml::from_str(user)?;
        for (section, entries) in user.iter_mut() {
            for (key, value) in entries.iter_mut() {
                match self.default_value(section, key) {
                    Some(default) => *value = Self::check_type(section, key, default, *value)?,
                    None => tracing::warn!("Unknown setting '{}' in section [{}]", key, section),
                }
            }
        }

        for (section, entries) in user {
            self.values.entry(section).or_default().extend(entries);
        }
        Ok(())
    }

    /// Get a setting value.
    pub fn value(&self, section: &str, key: &str) -> SettingsResult<SettingValue> {
        self.values
            .get(section)
            .and_then(|entries| entries.get(key))
            .copied()
            .ok_or_else(|| SettingsError::Missing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Get a boolean setting.
    pub fn try_get_bool(&self, section: &str, key: &str) -> SettingsResult<bool> {
        match self.value(section, key)? {
            SettingValue::Bool(b) => Ok(b),
            other => Err(Self::mismatch(section, key, "bool", other)),
        }
    }

    /// Get an integer setting.
    pub fn try_get_int(&self, section: &str, key: &str) -> SettingsResult<i32> {
        match self.value(section, key)? {
            SettingValue::Int(i) => i32::try_from(i).map_err(|_| SettingsError::OutOfRange {
                section: section.to_string(),
                key: key.to_string(),
                value: i,
            }),
            other => Err(Self::mismatch(section, key, "integer", other)),
        }
    }

    /// Get a floating point setting. Integer values are widened.
    pub fn try_get_float(&self, section: &str, key: &str) -> SettingsResult<f32> {
        match self.value(section, key)? {
            SettingValue::Float(f) => Ok(f as f32),
            SettingValue::Int(i) => Ok(i as f32),
            other => Err(Self::mismatch(section, key, "float", other)),
        }
    }

    /// Set a boolean setting.
    pub fn set_bool(&mut self, section: &str, key: &str, value: bool) -> SettingsResult<()> {
        self.set_value(section, key, SettingValue::Bool(value))
    }

    /// Set an integer setting.
    pub fn set_int(&mut self, section: &str, key: &str, value: i32) -> SettingsResult<()> {
        self.set_value(section, key, SettingValue::Int(value.into()))
    }

    /// Set a floating point setting.
    pub fn set_float(&mut self, section: &str, key: &str, value: f32) -> SettingsResult<()> {
        self.set_value(section, key, SettingValue::Float(value.into()))
    }

    /// Set a value, recording a change if it differs from the current one.
    pub fn set_value(
        &mut self,
        section: &str,
        key: &str,
        value: SettingValue,
    ) -> SettingsResult<()> {
        let value = match self.default_value(section, key) {
            Some(default) => Self::check_type(section, key, default, value)?,
            None => value,
        };

        let entries = self.values.entry(section.to_string()).or_default();
        if entries.get(key) == Some(&value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value);
        self.changes.insert((section.to_string(), key.to_string()));
        tracing::debug!("Setting [{}] '{}' changed to {:?}", section, key, value);
        Ok(())
    }

    /// Whether any setting changed since the last [`Settings::take_changes`].
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Drain the recorded changes.
    pub fn take_changes(&mut self) -> SettingsChanges {
        std::mem::take(&mut self.changes)
    }

    fn default_value(&self, section: &str, key: &str) -> Option<SettingValue> {
        self.defaults
            .get(section)
            .and_then(|entries| entries.get(key))
            .copied()
    }

    fn check_type(
        section: &str,
        key: &str,
        default: SettingValue,
        value: SettingValue,
    ) -> SettingsResult<SettingValue> {
        default
            .coerce(value)
            .ok_or_else(|| Self::mismatch(section, key, default.kind(), value))
    }

    fn mismatch(section: &str, key: &str, expected: &'static str, found: SettingValue) -> SettingsError {
        SettingsError::TypeMismatch {
            section: section.to_string(),
            key: key.to_string(),
            expected,
            found: found.kind(),
        }
    }
}

impl SettingsProvider for Settings {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        self.try_get_bool(section, key).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            false
        })
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        self.try_get_int(section, key).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            0
        })
    }

    fn get_float(&self, section: &str, key: &str) -> f32 {
        self.try_get_float(section, key).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            0.0
        })
    }
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for &P {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        (**self).get_bool(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        (**self).get_int(section, key)
    }

    fn get_float(&self, section: &str, key: &str) -> f32 {
        (**self).get_float(section, key)
    }
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for Rc<P> {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        (**self).get_bool(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        (**self).get_int(section, key)
    }

    fn get_float(&self, section: &str, key: &str) -> f32 {
        (**self).get_float(section, key)
    }
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for Arc<P> {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        (**self).get_bool(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        (**self).get_int(section, key)
    }

    fn get_float(&self, section: &str, key: &str) -> f32 {
        (**self).get_float(section, key)
    }
}

// Lets a manager observe a store the application keeps mutating.
impl<P: SettingsProvider + ?Sized> SettingsProvider for RefCell<P> {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        self.borrow().get_bool(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        self.borrow().get_int(section, key)
    }

    fn get_float(&self, section: &str, key: &str) -> f32 {
        self.borrow().get_float(section, key)
    }
}
