//! Dialogue data types
//!
//! `DialogueNode` is the immutable record owned by a [`DialogueStore`](super::DialogueStore).
//! `ResolvedNode` and `ResolvedBranch` are the resolver's output and live only
//! for one resolve/render pass.

use serde::{Deserialize, Serialize};

/// Numeric id of a dialogue record
pub type NodeId = u64;

/// Who speaks a dialogue line
///
/// Closed set of roles the renderer knows how to format. Anything the data
/// carries that isn't recognised lands in [`SpeakerRole::Other`] with its raw tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum SpeakerRole {
    /// Named NPC
    Npc(String),
    /// Named gadget (interactable object)
    Gadget(String),
    /// The player character
    #[default]
    Player,
    /// The player's twin
    MateAvatar,
    /// Narration shown on a black screen
    BlackScreen,
    /// Unrecognised role tag
    Other(String),
}

impl SpeakerRole {
    /// Map a game-data `TalkRole.Type` tag to a role.
    ///
    /// `name` is the speaker's display name and `role_ref` the raw `TalkRole.Id`
    /// (`None` when the record has no id or a numeric zero). A speaking role
    /// that isn't player, black screen or wiki-custom but has no role id is the
    /// player talking.
    #[must_use]
    pub fn from_talk_role(tag: &str, role_ref: Option<&str>, name: Option<&str>) -> Self {
        let role_ref = role_ref.filter(|r| !r.is_empty());

        if is_black_screen_tag(tag) {
            return SpeakerRole::BlackScreen;
        }
        if tag != "TALK_ROLE_PLAYER" && tag != "TALK_ROLE_WIKI_CUSTOM" && role_ref.is_none() {
            return SpeakerRole::Player;
        }

        // Non-numeric role ids double as the display name
        let display = || {
            name.filter(|n| !n.is_empty())
                .or_else(|| role_ref.filter(|r| r.parse::<u64>().is_err()))
                .unwrap_or_default()
                .to_string()
        };

        match tag {
            "TALK_ROLE_NPC" => SpeakerRole::Npc(display()),
            "TALK_ROLE_GADGET" => SpeakerRole::Gadget(display()),
            "TALK_ROLE_PLAYER" => SpeakerRole::Player,
            "TALK_ROLE_MATE_AVATAR" => SpeakerRole::MateAvatar,
            other => SpeakerRole::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_player(&self) -> bool {
        matches!(self, SpeakerRole::Player)
    }
}

fn is_black_screen_tag(tag: &str) -> bool {
    matches!(
        tag,
        "TALK_ROLE_BLACK_SCREEN"
            | "TALK_ROLE_CONSEQUENT_BLACK_SCREEN"
            | "TALK_ROLE_NEED_CLICK_BLACK_SCREEN"
            | "TALK_ROLE_CONSEQUENT_NEED_CLICK_BLACK_SCREEN"
    )
}

/// A single dialogue record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Unique identifier
    pub id: NodeId,
    /// Who speaks this line
    pub speaker_role: SpeakerRole,
    /// Localized text (absent for routing-only nodes)
    #[serde(default)]
    pub text: Option<String>,
    /// Successor ids in data order
    #[serde(default)]
    pub successor_ids: Vec<NodeId>,
    /// Player option the game forces the player to pick from
    #[serde(default)]
    pub is_forced_choice: bool,
}

impl DialogueNode {
    #[must_use]
    pub fn new(id: NodeId, speaker_role: SpeakerRole) -> Self {
        Self {
            id,
            speaker_role,
            ..Default::default()
        }
    }

    /// Builder-style text setter
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder-style successor setter
    #[must_use]
    pub fn with_successors(mut self, successor_ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.successor_ids = successor_ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn forced_choice(mut self) -> Self {
        self.is_forced_choice = true;
        self
    }

    /// Check if this node has a visible line
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A node placed in a resolved branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNode {
    pub node: DialogueNode,
    /// Re-encountered on the same path; closes a loop
    pub is_cycle_terminator: bool,
    /// Divergent options hanging off this node
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<ResolvedBranch>,
}

impl ResolvedNode {
    #[must_use]
    pub fn new(node: DialogueNode) -> Self {
        Self {
            node,
            is_cycle_terminator: false,
            branches: Vec::new(),
        }
    }

    #[must_use]
    pub fn cycle_terminator(node: DialogueNode) -> Self {
        Self {
            node,
            is_cycle_terminator: true,
            branches: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node.id
    }
}

/// Ordered run of resolved nodes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedBranch {
    pub nodes: Vec<ResolvedNode>,
}

impl ResolvedBranch {
    #[must_use]
    pub fn new(nodes: Vec<ResolvedNode>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Id of the branch head
    #[must_use]
    pub fn first_id(&self) -> Option<NodeId> {
        self.nodes.first().map(ResolvedNode::id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&ResolvedNode> {
        self.nodes.first()
    }

    /// Index of the first occurrence of `id`
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Top-level ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(ResolvedNode::id).collect()
    }

    /// Keep only the nodes strictly before the first occurrence of `id`.
    pub fn truncate_before(&mut self, id: NodeId) {
        if let Some(pos) = self.position(id) {
            self.nodes.truncate(pos);
        }
    }
}
