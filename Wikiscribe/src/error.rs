//! Error types for `Wikiscribe`

use std::path::PathBuf;

use thiserror::Error;

use crate::dialog::NodeId;

/// The error type for `Wikiscribe` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Store Errors ====================
    /// The dialogue store failed to answer a lookup.
    #[error("dialogue store error: {message}")]
    Store {
        /// Description of the store failure.
        message: String,
    },

    /// Two records in a store source share the same id.
    #[error("duplicate dialogue id {id}")]
    DuplicateNode {
        /// The repeated id.
        id: NodeId,
    },

    // ==================== Collaborator Errors ====================
    /// Text normalization rejected its input.
    #[error("text normalization failed for {locale}: {message}")]
    Normalization {
        /// Locale code the text was normalized for.
        locale: String,
        /// The error message.
        message: String,
    },

    /// A gendered placeholder key has no entry in the manual text map.
    #[error("manual text map has no entry for '{key}'")]
    PlaceholderNotFound {
        /// The missing text map key.
        key: String,
    },

    // ==================== Resolution Errors ====================
    /// Branch nesting went deeper than the configured budget.
    #[error("dialogue branch nesting exceeded {depth} levels")]
    DepthLimitExceeded {
        /// The configured maximum depth.
        depth: usize,
    },

    // ==================== Parsing / Config Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML config parsing error.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A config file was requested explicitly but does not exist.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// The missing config path.
        path: PathBuf,
    },
}

impl Error {
    /// Shorthand for a [`Error::Store`] failure.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store { message: message.into() }
    }
}

/// A specialized Result type for `Wikiscribe` operations.
pub type Result<T> = std::result::Result<T, Error>;
