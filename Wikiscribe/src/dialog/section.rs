//! Section assembly: root ids in, rendered transcript sections out

use std::collections::HashSet;

use futures_util::future::join_all;

use super::normalize::TextNormalizer;
use super::renderer::WikitextRenderer;
use super::resolver::DialogueResolver;
use super::store::DialogueStore;
use super::text_map::PlaceholderLookup;
use super::types::{NodeId, ResolvedBranch};
use super::voice::VoiceLookup;
use crate::config::ScribeConfig;
use crate::error::Result;

/// One rendered conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSection {
    /// Anchor id, `Dialogue_<root>`
    pub id: String,
    pub root_id: NodeId,
    /// Indentation the section was rendered at
    pub depth: usize,
    pub wikitext: String,
}

/// Outcome for a single root
///
/// A failure only affects its own section.
#[derive(Debug)]
pub struct SectionResult {
    pub root_id: NodeId,
    /// `Ok(None)` when the root has no dialogue
    pub outcome: Result<Option<DialogueSection>>,
}

/// Ties the store and text collaborators together
pub struct DialogueScribe<'a, S: DialogueStore + ?Sized> {
    store: &'a S,
    normalizer: &'a dyn TextNormalizer,
    voice: &'a dyn VoiceLookup,
    placeholders: &'a dyn PlaceholderLookup,
    config: ScribeConfig,
}

impl<'a, S: DialogueStore + ?Sized> DialogueScribe<'a, S> {
    pub fn new(
        store: &'a S,
        normalizer: &'a dyn TextNormalizer,
        voice: &'a dyn VoiceLookup,
        placeholders: &'a dyn PlaceholderLookup,
    ) -> Self {
        Self {
            store,
            normalizer,
            voice,
            placeholders,
            config: ScribeConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ScribeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// Resolve the graph below `root_id`
    pub async fn resolve(&self, root_id: NodeId) -> Result<ResolvedBranch> {
        DialogueResolver::new(self.store)
            .with_options(self.config.resolver_options())
            .resolve(root_id, &HashSet::new())
            .await
    }

    fn renderer(&self) -> WikitextRenderer<'a> {
        WikitextRenderer::new(self.normalizer, self.voice, self.placeholders)
            .with_options(self.config.render_options())
    }

    /// Render an already resolved branch at `depth`
    pub async fn render(&self, branch: &ResolvedBranch, depth: usize) -> Result<String> {
        self.renderer().render_root(branch, depth).await
    }

    /// Resolve and render one root.
    ///
    /// A conversation opening with a player option starts one level deeper so
    /// its `{{DIcon}}` lines up under the section's speech lines. A voiced
    /// player line is spoken text and keeps the base depth.
    pub async fn generate_section(&self, root_id: NodeId) -> Result<Option<DialogueSection>> {
        let branch = self.resolve(root_id).await?;
        let Some(first) = branch.first() else {
            return Ok(None);
        };

        let mut depth = self.config.base_depth;
        if self.renderer().is_player_option(&first.node) {
            depth += 1;
        }

        let wikitext = self.render(&branch, depth).await?;
        Ok(Some(DialogueSection {
            id: format!("Dialogue_{root_id}"),
            root_id,
            depth,
            wikitext,
        }))
    }

    /// Generate a section per root, in root order.
    pub async fn generate_sections(&self, root_ids: &[NodeId]) -> Vec<SectionResult> {
        let outcomes = join_all(root_ids.iter().map(|&id| self.generate_section(id))).await;

        root_ids
            .iter()
            .zip(outcomes)
            .map(|(&root_id, outcome)| {
                if let Err(ref e) = outcome {
                    tracing::warn!("Dialogue section {} failed: {}", root_id, e);
                }
                SectionResult { root_id, outcome }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::normalize::WikiTextNormalizer;
    use crate::dialog::store::MemoryStore;
    use crate::dialog::text_map::ManualTextMap;
    use crate::dialog::types::{DialogueNode, SpeakerRole};
    use crate::dialog::voice::{VoiceCache, VoiceItem};

    fn store() -> MemoryStore {
        MemoryStore::from_nodes([
            DialogueNode::new(1, SpeakerRole::Player).with_text("Excuse me.").with_successors([2]),
            DialogueNode::new(2, SpeakerRole::Npc("Katheryne".to_string())).with_text("Ad astra abyssosque!"),
            DialogueNode::new(5, SpeakerRole::Npc("Paimon".to_string()))
                .with_text("{PLAYERAVATAR#SEXPRO[INFO_MALE_PRONOUN_HE|INFO_FEMALE_PRONOUN_SHE]}"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_player_first_section_is_deeper() {
        let store = store();
        let (voice, map) = (VoiceCache::new(), ManualTextMap::new());
        let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &map);

        let section = scribe.generate_section(1).await.unwrap().unwrap();
        assert_eq!(section.id, "Dialogue_1");
        assert_eq!(section.depth, 2);
        assert_eq!(
            section.wikitext,
            ":{{DIcon}} Excuse me.\n::'''Katheryne:''' Ad astra abyssosque!"
        );
    }

    #[tokio::test]
    async fn test_voiced_player_first_section_keeps_base_depth() {
        let store = store();
        let mut voice = VoiceCache::new();
        voice.insert("Dialog", 1, VoiceItem::new("vo_excuse.ogg", None));
        let map = ManualTextMap::new();
        let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &map);

        let section = scribe.generate_section(1).await.unwrap().unwrap();
        assert_eq!(section.depth, 1);
        assert_eq!(
            section.wikitext,
            ":{{A|vo_excuse.ogg}} '''(Traveler):''' Excuse me.\n:'''Katheryne:''' Ad astra abyssosque!"
        );
    }

    #[tokio::test]
    async fn test_failures_stay_in_their_section() {
        let store = store();
        let (voice, map) = (VoiceCache::new(), ManualTextMap::new());
        let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &map);

        let results = scribe.generate_sections(&[2, 5, 99]).await;
        assert_eq!(results.iter().map(|r| r.root_id).collect::<Vec<_>>(), vec![2, 5, 99]);
        assert!(matches!(results[0].outcome, Ok(Some(_))));
        assert!(results[1].outcome.is_err());
        assert!(matches!(results[2].outcome, Ok(None)));
    }
}
