//! Options file for the command line
//!
//! The CLI reads rendering options from a TOML file; flags given on the
//! command line override it.
//!
//! ```toml
//! strict = true
//! minify = false
//! language = "en"
//! direction = "ltr"
//! include_root = "templates"
//!
//! [limits]
//! max_input_size = 1048576
//! max_nesting_depth = 100
//! max_include_depth = 50
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::include::FileSystemIncludeResolver;
use crate::RenderConfig;

/// Errors that can occur when loading or parsing an options file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Rendering options, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub strict: Option<bool>,
    pub minify: Option<bool>,
    pub language: Option<String>,
    pub direction: Option<String>,
    /// Directory `mj-include` paths are resolved against
    pub include_root: Option<PathBuf>,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    pub max_input_size: Option<usize>,
    pub max_nesting_depth: Option<usize>,
    pub max_include_depth: Option<usize>,
}

impl ConfigFile {
    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load options from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Layer the options that are set over `config`
    pub fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(strict) = self.strict {
            config = config.with_strict(strict);
        }
        if let Some(minify) = self.minify {
            config = config.with_css_minify(minify);
        }
        if let Some(language) = &self.language {
            config = config.with_language(language.clone());
        }
        if let Some(direction) = &self.direction {
            config = config.with_direction(direction.clone());
        }
        if let Some(root) = &self.include_root {
            config = config.with_include_resolver(FileSystemIncludeResolver::new(root));
        }
        if let Some(size) = self.limits.max_input_size {
            config.limits.max_input_size = size;
        }
        if let Some(depth) = self.limits.max_nesting_depth {
            config.limits.max_nesting_depth = depth;
        }
        if let Some(depth) = self.limits.max_include_depth {
            config = config.with_max_include_depth(depth);
        }
        config
    }
}
