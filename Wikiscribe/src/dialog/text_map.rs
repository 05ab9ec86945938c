//! Manual text map lookups for gendered placeholders
//!
//! Dialogue text carries tokens like `{PLAYERAVATAR#SEXPRO[INFO_MALE_PRONOUN_HE|INFO_FEMALE_PRONOUN_SHE]}`.
//! Both keys point into the manual text map; the renderer turns the pair into
//! an `{{MC|m=..|f=..}}` template.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Both renderings of a gendered placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderedText {
    pub male: String,
    pub female: String,
}

/// Resolves the text behind gendered placeholder keys
#[async_trait]
pub trait PlaceholderLookup: Send + Sync {
    async fn resolve_gendered_placeholder(&self, male_key: &str, female_key: &str) -> Result<GenderedText>;
}

/// In-memory manual text map
#[derive(Debug, Clone, Default)]
pub struct ManualTextMap {
    entries: HashMap<String, String>,
}

impl ManualTextMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat `{"KEY": "text"}` object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let map = Self::from_json(&content)?;
        tracing::info!("Loaded {} manual text map entries", map.len());
        Ok(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| Error::PlaceholderNotFound { key: key.to_string() })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PlaceholderLookup for ManualTextMap {
    async fn resolve_gendered_placeholder(&self, male_key: &str, female_key: &str) -> Result<GenderedText> {
        Ok(GenderedText {
            male: self.require(male_key)?,
            female: self.require(female_key)?,
        })
    }
}
