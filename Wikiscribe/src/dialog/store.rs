//! Dialogue record store
//!
//! The resolver only ever talks to a [`DialogueStore`]. [`MemoryStore`] is the
//! in-process arena: every record keyed by id, loaded once from a JSON dump of
//! the game's dialogue table.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::types::{DialogueNode, NodeId, SpeakerRole};
use crate::error::{Error, Result};

/// Source of dialogue records
#[async_trait]
pub trait DialogueStore: Send + Sync {
    /// Look up a single record. `Ok(None)` means the id doesn't resolve.
    async fn lookup_node(&self, id: NodeId) -> Result<Option<DialogueNode>>;

    /// Look up many records at once.
    ///
    /// Unresolved ids and records without text are dropped. The result keeps
    /// the order of `ids`.
    async fn lookup_nodes_bulk(&self, ids: &[NodeId]) -> Result<Vec<DialogueNode>>;
}

/// `TalkRole` object of a raw dialogue record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTalkRole {
    #[serde(rename = "Type", default)]
    pub role_type: Option<String>,
    /// Numeric NPC id or, for some gadgets, a literal name
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// Dialogue record as it appears in the extracted game table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDialogueRecord {
    pub id: NodeId,
    #[serde(default)]
    pub talk_role: Option<RawTalkRole>,
    #[serde(default)]
    pub talk_role_name_text: Option<String>,
    #[serde(default)]
    pub talk_content_text: Option<String>,
    #[serde(default)]
    pub next_dialogs: Vec<NodeId>,
    #[serde(default)]
    pub talk_show_type: Option<String>,
}

impl From<RawDialogueRecord> for DialogueNode {
    fn from(raw: RawDialogueRecord) -> Self {
        let role = raw.talk_role.unwrap_or_default();
        let role_ref = role.id.as_ref().and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            // Numeric 0 means "no role", the string "0" is a real id
            serde_json::Value::Number(n) if n.as_u64() == Some(0) => None,
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let tag = role.role_type.unwrap_or_default();

        DialogueNode {
            id: raw.id,
            speaker_role: SpeakerRole::from_talk_role(
                &tag,
                role_ref.as_deref(),
                raw.talk_role_name_text.as_deref(),
            ),
            text: raw.talk_content_text.filter(|t| !t.is_empty()),
            successor_ids: raw.next_dialogs,
            is_forced_choice: raw.talk_show_type.as_deref() == Some("TALK_SHOW_FORCE_SELECT"),
        }
    }
}

/// Id-keyed arena of dialogue records
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<NodeId, DialogueNode>,
}

impl MemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from nodes, rejecting duplicate ids
    pub fn from_nodes(nodes: impl IntoIterator<Item = DialogueNode>) -> Result<Self> {
        let mut store = Self::new();
        for node in nodes {
            store.insert(node)?;
        }
        Ok(store)
    }

    /// Parse a JSON array of raw game records
    pub fn from_records_json(json: &str) -> Result<Self> {
        let records: Vec<RawDialogueRecord> = serde_json::from_str(json)?;
        Self::from_nodes(records.into_iter().map(DialogueNode::from))
    }

    /// Load a JSON array of raw game records from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_records_json(&content)?;
        tracing::info!("Loaded {} dialogue records from {}", store.len(), path.as_ref().display());
        Ok(store)
    }

    /// Insert a node
    pub fn insert(&mut self, node: DialogueNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode { id: node.id });
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&DialogueNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl DialogueStore for MemoryStore {
    async fn lookup_node(&self, id: NodeId) -> Result<Option<DialogueNode>> {
        Ok(self.nodes.get(&id).cloned())
    }

    async fn lookup_nodes_bulk(&self, ids: &[NodeId]) -> Result<Vec<DialogueNode>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|node| node.has_text())
            .cloned()
            .collect())
    }
}
