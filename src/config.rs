//! # Configuration
//!
//! YAML configuration for the view engine, the email service, the descriptor
//! cache and the async coroutine stack, with environment overrides.
//!
//! ```yaml
//! views:
//!   directory: ./views
//!   extension: j2
//! mail:
//!   template_dir: mail
//! descriptors:
//!   cache: true
//! runtime:
//!   stack_size: 0x10000
//! ```
//!
//! Every section and field is optional. `MONORAIL_VIEWS_DIR` overrides
//! `views.directory` and `MONORAIL_STACK_SIZE` overrides `runtime.stack_size`.
//! Stack sizes accept decimal (`65536`) or hexadecimal (`0x10000`).

use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MonoRailError;
use crate::handler::DEFAULT_ASYNC_STACK_SIZE;
use crate::mail::EMAIL_TEMPLATE_PATH;
use crate::views::DEFAULT_TEMPLATE_EXTENSION;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonoRailConfig {
    pub views: ViewsConfig,
    pub mail: MailConfig,
    pub descriptors: DescriptorConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub directory: PathBuf,
    pub extension: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("views"),
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub template_dir: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            template_dir: EMAIL_TEMPLATE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DescriptorConfig {
    /// Cache descriptors per controller type
    pub cache: bool,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self { cache: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Stack size in bytes for async begin-phase coroutines
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_ASYNC_STACK_SIZE,
        }
    }
}

/// Parse a byte count written in decimal or `0x`-prefixed hexadecimal.
pub fn parse_stack_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn deserialize_stack_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size '{s}'"))),
    }
}

impl MonoRailConfig {
    /// Parse YAML text. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// [`MonoRailError::Config`] on malformed YAML or invalid values.
    pub fn from_yaml_str(text: &str) -> Result<Self, MonoRailError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| MonoRailError::Config(e.to_string()))
    }

    /// Load a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// [`MonoRailError::Config`] when the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self, MonoRailError> {
        let text = fs::read_to_string(path)
            .map_err(|e| MonoRailError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Apply `MONORAIL_VIEWS_DIR` and `MONORAIL_STACK_SIZE`. An unparseable
    /// stack size leaves the configured value in place.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MONORAIL_VIEWS_DIR").filter(|d| !d.is_empty()) {
            self.views.directory = PathBuf::from(dir);
        }
        if let Some(size) = lookup("MONORAIL_STACK_SIZE").as_deref().and_then(parse_stack_size) {
            self.runtime.stack_size = size;
        }
    }
}
