//! Generator settings (`wikiscribe.toml`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialog::{DEFAULT_MAX_DEPTH, RenderOptions, ResolverOptions};
use crate::error::{Error, Result};

/// Config file name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "wikiscribe.toml";

fn default_locale() -> String {
    "EN".to_string()
}

fn default_base_depth() -> usize {
    1
}

fn default_max_branch_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_voice_kind() -> String {
    "Dialog".to_string()
}

/// Transcript generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScribeConfig {
    /// Output locale code (`EN`, `DE`, ...)
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Indentation of a section's top-level lines
    #[serde(default = "default_base_depth")]
    pub base_depth: usize,
    /// Nesting budget for divergence points
    #[serde(default = "default_max_branch_depth")]
    pub max_branch_depth: usize,
    /// Voice item kind for dialogue lines
    #[serde(default = "default_voice_kind")]
    pub voice_kind: String,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            base_depth: default_base_depth(),
            max_branch_depth: default_max_branch_depth(),
            voice_kind: default_voice_kind(),
        }
    }
}

impl ScribeConfig {
    /// Default config location (`<config dir>/Wikiscribe/wikiscribe.toml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("Wikiscribe").join(CONFIG_FILE_NAME))
    }

    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from an explicit path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `path` if given, else the default location, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Using config {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            locale: self.locale.clone(),
            voice_kind: self.voice_kind.clone(),
        }
    }

    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_depth: self.max_branch_depth,
        }
    }
}
