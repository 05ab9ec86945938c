//! Wikitext rendering of resolved dialogue
//!
//! Output is colon-indented wiki markup: one line per spoken node, `{{DIcon}}`
//! for player options, nested options one level deeper than the line they hang
//! off, and `;(Return to option selection)` where a path loops back.

use std::collections::HashSet;

use futures_util::future::{BoxFuture, FutureExt, try_join_all};
use lazy_static::lazy_static;
use regex::Regex;

use super::normalize::TextNormalizer;
use super::text_map::PlaceholderLookup;
use super::types::{DialogueNode, NodeId, ResolvedBranch, ResolvedNode, SpeakerRole};
use super::voice::VoiceLookup;
use crate::error::Result;

/// Marker emitted where a path loops back to an earlier choice
pub const RETURN_MARKER: &str = ";(Return to option selection)";

/// Line emitted for speakers the renderer can't attribute
pub const UNKNOWN_SPEAKER: &str = "Cutscene_Character_Replace_me";

lazy_static! {
    static ref GENDERED_PLACEHOLDER: Regex =
        Regex::new(r"\{(MATEAVATAR|PLAYERAVATAR)#SEXPRO\[(.*?)\|(.*?)\]\}").expect("valid regex");
}

/// Settings shared by every line of a render pass
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Locale handed to the text normalizer
    pub locale: String,
    /// Voice item kind used for dialogue lines
    pub voice_kind: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locale: "EN".to_string(),
            voice_kind: "Dialog".to_string(),
        }
    }
}

/// Renders [`ResolvedBranch`] trees to wikitext
pub struct WikitextRenderer<'a> {
    normalizer: &'a dyn TextNormalizer,
    voice: &'a dyn VoiceLookup,
    placeholders: &'a dyn PlaceholderLookup,
    options: RenderOptions,
}

fn indent(depth: usize) -> String {
    ":".repeat(depth)
}

impl<'a> WikitextRenderer<'a> {
    pub fn new(
        normalizer: &'a dyn TextNormalizer,
        voice: &'a dyn VoiceLookup,
        placeholders: &'a dyn PlaceholderLookup,
    ) -> Self {
        Self {
            normalizer,
            voice,
            placeholders,
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether `node` renders as a `{{DIcon}}` option.
    ///
    /// Only unvoiced player lines are options; a voiced player line is spoken
    /// as `(Traveler)` even when the game shows it as a forced choice.
    pub fn is_player_option(&self, node: &DialogueNode) -> bool {
        node.speaker_role.is_player()
            && self
                .voice
                .voice_prefix(
                    &self.options.voice_kind,
                    node.id,
                    node.text.as_deref().unwrap_or_default(),
                    &node.speaker_role,
                )
                .is_none()
    }

    /// Render a top-level branch at `depth`.
    ///
    /// The branch's own head counts as rendered, so an option that loops
    /// straight back to it is skipped.
    pub async fn render_root(&self, branch: &ResolvedBranch, depth: usize) -> Result<String> {
        let rendered: HashSet<NodeId> = branch.first_id().into_iter().collect();
        self.render(branch, depth, None, false, &rendered).await
    }

    /// Render `branch` at `depth`.
    ///
    /// `originator` is the node the branch hangs off and
    /// `originator_is_first_of_own_branch` whether that node opened its own
    /// branch. `rendered_first_ids` holds heads of branches already rendered by
    /// ancestors; siblings starting with one of those are skipped.
    pub fn render<'r>(
        &'r self,
        branch: &'r ResolvedBranch,
        depth: usize,
        originator: Option<&'r ResolvedNode>,
        originator_is_first_of_own_branch: bool,
        rendered_first_ids: &'r HashSet<NodeId>,
    ) -> BoxFuture<'r, Result<String>> {
        async move {
            let mut out = String::new();
            let mut depth = depth;
            let mut chained_options = 0usize;
            let mut previous: Option<(&ResolvedNode, bool)> = None;

            for (i, resolved) in branch.nodes.iter().enumerate() {
                let node = &resolved.node;
                let is_player = node.speaker_role.is_player();

                let dicon_depth = if i == 0 && is_player {
                    let originator_is_player = originator.is_some_and(|o| o.node.speaker_role.is_player());
                    if originator_is_player && !originator_is_first_of_own_branch {
                        // Follow-up option: the whole branch moves one level in
                        depth += 1;
                        depth - 1
                    } else {
                        depth.saturating_sub(1).max(1)
                    }
                } else {
                    depth
                };
                let dicon_prefix = indent(dicon_depth);
                let prefix = indent(depth);

                let text = match node.text.as_deref().filter(|t| !t.is_empty()) {
                    Some(raw) => {
                        let normalized = self.normalizer.normalize_text(raw, &self.options.locale)?;
                        self.substitute_placeholders(&normalized).await?
                    }
                    None => String::new(),
                };

                let vo = self
                    .voice
                    .voice_prefix(&self.options.voice_kind, node.id, &text, &node.speaker_role);
                let is_option = is_player && vo.is_none();

                let chained = previous.is_some_and(|(prev, prev_is_option)| {
                    prev_is_option && is_option && leads_only_into(prev, node.id)
                });
                chained_options = if chained { chained_options + 1 } else { 0 };

                let vo = vo.unwrap_or_default();

                if resolved.is_cycle_terminator {
                    let marker_prefix = if is_player {
                        dicon_prefix.clone()
                    } else {
                        indent(dicon_depth.saturating_sub(1))
                    };
                    out.push_str(&format!("\n{marker_prefix}{RETURN_MARKER}"));
                } else if text.is_empty() {
                    if let SpeakerRole::Other(tag) = &node.speaker_role {
                        tracing::warn!("Dialogue {} has unknown role '{}' and no text", node.id, tag);
                    }
                } else {
                    match &node.speaker_role {
                        SpeakerRole::BlackScreen => {
                            out.push_str(&format!("\n\n{prefix}'''{text}'''\n"));
                        }
                        SpeakerRole::Player if !is_option => {
                            out.push_str(&format!("\n{dicon_prefix}{vo}'''(Traveler):''' {text}"));
                        }
                        SpeakerRole::Player => {
                            let chain = indent(chained_options);
                            out.push_str(&format!("\n{dicon_prefix}{chain}{{{{DIcon}}}} {text}"));
                        }
                        SpeakerRole::Npc(name) | SpeakerRole::Gadget(name) => {
                            let name = self.normalizer.normalize_text(name, &self.options.locale)?;
                            out.push_str(&format!("\n{prefix}{vo}'''{name}:''' {text}"));
                        }
                        SpeakerRole::MateAvatar => {
                            out.push_str(&format!("\n{prefix}{vo}'''(Traveler's Sibling):''' {text}"));
                        }
                        SpeakerRole::Other(tag) => {
                            tracing::warn!(
                                "Dialogue {} has unknown role '{}', needs a speaker filled in",
                                node.id,
                                tag
                            );
                            out.push_str(&format!("\n{prefix}'''{UNKNOWN_SPEAKER}''' {text}"));
                        }
                    }
                }

                if !resolved.branches.is_empty() {
                    let mut child_first_ids = rendered_first_ids.clone();
                    child_first_ids.extend(resolved.branches.iter().filter_map(ResolvedBranch::first_id));

                    let mut excluded = 0usize;
                    let mut included = Vec::new();
                    for sibling in &resolved.branches {
                        let Some(first_id) = sibling.first_id() else {
                            continue;
                        };
                        if rendered_first_ids.contains(&first_id) {
                            excluded += 1;
                        } else {
                            included.push(sibling);
                        }
                    }

                    let child_first_ids = &child_first_ids;
                    let rendered = try_join_all(included.iter().map(|sibling| {
                        self.render(sibling, depth + 1, Some(resolved), i == 0, child_first_ids)
                    }))
                    .await?;

                    for sibling in &rendered {
                        out.push('\n');
                        out.push_str(sibling);
                    }
                    if rendered.is_empty() && excluded > 0 {
                        out.push_str(&format!("\n{dicon_prefix}{RETURN_MARKER}"));
                    }
                }

                previous = Some((resolved, is_option));
            }

            Ok(out.trim().to_string())
        }
        .boxed()
    }

    /// Replace every gendered placeholder in `text` with an `{{MC}}` template.
    ///
    /// All matches are looked up first, concurrently, and the line is rebuilt
    /// in a single pass afterwards.
    pub async fn substitute_placeholders(&self, text: &str) -> Result<String> {
        if !text.contains("SEXPRO") {
            return Ok(text.to_string());
        }

        let matches: Vec<_> = GENDERED_PLACEHOLDER.captures_iter(text).collect();
        let lookups = matches.iter().map(|caps| {
            let (first, second) = (&caps[2], &caps[3]);
            let (male_key, female_key) = if first.contains("FEMALE") {
                (second, first)
            } else {
                (first, second)
            };
            self.placeholders.resolve_gendered_placeholder(male_key, female_key)
        });
        let resolved = try_join_all(lookups).await?;

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (caps, gendered) in matches.iter().zip(resolved) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let mate = if &caps[1] == "MATEAVATAR" { "|mc=1" } else { "" };
            out.push_str(&text[last..whole.start()]);
            out.push_str(&format!("{{{{MC|m={}|f={}{mate}}}}}", gendered.male, gendered.female));
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Whether `prev` continues straight into `next_id` rather than offering it as
/// one of several parallel options.
fn leads_only_into(prev: &ResolvedNode, next_id: NodeId) -> bool {
    let single_successor = prev.node.successor_ids.len() == 1;
    let all_heads_player = !prev.branches.is_empty()
        && prev
            .branches
            .iter()
            .filter_map(ResolvedBranch::first)
            .all(|head| head.node.speaker_role.is_player());

    (single_successor || all_heads_player) && prev.node.successor_ids.contains(&next_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::normalize::WikiTextNormalizer;
    use crate::dialog::text_map::ManualTextMap;
    use crate::dialog::voice::{VoiceCache, VoiceItem};
    use pretty_assertions::assert_eq;

    fn text_map() -> ManualTextMap {
        let mut map = ManualTextMap::new();
        map.insert("INFO_MALE_PRONOUN_HE", "he");
        map.insert("INFO_FEMALE_PRONOUN_SHE", "she");
        map.insert("INFO_MALE_PRONOUN_BROTHER", "brother");
        map.insert("INFO_FEMALE_PRONOUN_SISTER", "sister");
        map
    }

    fn line(node: DialogueNode) -> ResolvedNode {
        ResolvedNode::new(node)
    }

    fn npc(id: NodeId, text: &str) -> DialogueNode {
        DialogueNode::new(id, SpeakerRole::Npc("Paimon".to_string())).with_text(text)
    }

    fn player(id: NodeId, text: &str) -> DialogueNode {
        DialogueNode::new(id, SpeakerRole::Player).with_text(text)
    }

    async fn render_with(voice: &VoiceCache, branch: &ResolvedBranch, depth: usize) -> String {
        let map = text_map();
        let renderer = WikitextRenderer::new(&WikiTextNormalizer, voice, &map);
        renderer.render_root(branch, depth).await.unwrap()
    }

    #[tokio::test]
    async fn test_role_lines() {
        let branch = ResolvedBranch::new(vec![
            line(npc(1, "Hello")),
            line(DialogueNode::new(2, SpeakerRole::Gadget("Stone".to_string())).with_text("...")),
            line(DialogueNode::new(3, SpeakerRole::MateAvatar).with_text("Brother!")),
            line(DialogueNode::new(4, SpeakerRole::BlackScreen).with_text("Time passes")),
            line(DialogueNode::new(5, SpeakerRole::Other("TALK_ROLE_X".to_string())).with_text("Hm")),
            line(DialogueNode::new(6, SpeakerRole::Other("TALK_ROLE_X".to_string()))),
        ]);
        let out = render_with(&VoiceCache::new(), &branch, 1).await;
        assert_eq!(
            out,
            ":'''Paimon:''' Hello\n\
             :'''Stone:''' ...\n\
             :'''(Traveler's Sibling):''' Brother!\n\
             \n\
             :'''Time passes'''\n\
             \n\
             :'''Cutscene_Character_Replace_me''' Hm"
        );
    }

    #[tokio::test]
    async fn test_voiced_player_line() {
        let mut voice = VoiceCache::new();
        voice.insert("Dialog", 2, VoiceItem::new("vo_traveler.ogg", None));
        voice.insert("Dialog", 1, VoiceItem::new("vo_paimon.ogg", None));

        let branch = ResolvedBranch::new(vec![line(npc(1, "Hello")), line(player(2, "Hi there"))]);
        let out = render_with(&voice, &branch, 1).await;
        assert_eq!(
            out,
            ":{{A|vo_paimon.ogg}} '''Paimon:''' Hello\n:{{A|vo_traveler.ogg}} '''(Traveler):''' Hi there"
        );
    }

    #[tokio::test]
    async fn test_voiced_forced_choice_is_spoken() {
        let mut voice = VoiceCache::new();
        voice.insert("Dialog", 2, VoiceItem::new("vo_t.ogg", None));
        let branch = ResolvedBranch::new(vec![
            line(npc(1, "Hello").with_successors([2])),
            line(player(2, "Voiced pick").forced_choice()),
        ]);
        assert_eq!(
            render_with(&voice, &branch, 1).await,
            ":'''Paimon:''' Hello\n:{{A|vo_t.ogg}} '''(Traveler):''' Voiced pick"
        );
    }

    #[tokio::test]
    async fn test_unvoiced_forced_choice_is_option() {
        let branch = ResolvedBranch::new(vec![line(player(2, "Pick me").forced_choice())]);
        assert_eq!(render_with(&VoiceCache::new(), &branch, 2).await, ":{{DIcon}} Pick me");
    }

    #[test]
    fn test_is_player_option() {
        let mut voice = VoiceCache::new();
        voice.insert("Dialog", 2, VoiceItem::new("vo_t.ogg", None));
        let map = text_map();
        let renderer = WikitextRenderer::new(&WikiTextNormalizer, &voice, &map);

        assert!(renderer.is_player_option(&player(1, "Quiet")));
        assert!(!renderer.is_player_option(&player(2, "Voiced").forced_choice()));
        assert!(!renderer.is_player_option(&npc(3, "Not a player")));
    }

    #[tokio::test]
    async fn test_chained_player_options() {
        let branch = ResolvedBranch::new(vec![
            line(npc(1, "Blah blah blah").with_successors([2])),
            line(player(2, "Paimon, you're weird").with_successors([3])),
            line(player(3, "And you're emergency food too").with_successors([4])),
            line(npc(4, "Hey!")),
        ]);
        let out = render_with(&VoiceCache::new(), &branch, 1).await;
        assert_eq!(
            out,
            ":'''Paimon:''' Blah blah blah\n\
             :{{DIcon}} Paimon, you're weird\n\
             ::{{DIcon}} And you're emergency food too\n\
             :'''Paimon:''' Hey!"
        );
    }

    #[tokio::test]
    async fn test_player_cycle_terminator_marker() {
        let branch = ResolvedBranch::new(vec![ResolvedNode::cycle_terminator(player(2, "Again"))]);
        assert_eq!(
            render_with(&VoiceCache::new(), &branch, 3).await,
            "::;(Return to option selection)"
        );
    }

    #[tokio::test]
    async fn test_npc_cycle_terminator_marker() {
        let branch = ResolvedBranch::new(vec![ResolvedNode::cycle_terminator(npc(1, "Hub"))]);
        assert_eq!(
            render_with(&VoiceCache::new(), &branch, 3).await,
            "::;(Return to option selection)"
        );
    }

    #[tokio::test]
    async fn test_gendered_placeholders() {
        let map = text_map();
        let voice = VoiceCache::new();
        let renderer = WikitextRenderer::new(&WikiTextNormalizer, &voice, &map);

        let out = renderer
            .substitute_placeholders(
                "Is {PLAYERAVATAR#SEXPRO[INFO_FEMALE_PRONOUN_SHE|INFO_MALE_PRONOUN_HE]} your \
                 {MATEAVATAR#SEXPRO[INFO_MALE_PRONOUN_BROTHER|INFO_FEMALE_PRONOUN_SISTER]}?",
            )
            .await
            .unwrap();
        assert_eq!(out, "Is {{MC|m=he|f=she}} your {{MC|m=brother|f=sister|mc=1}}?");

        assert_eq!(renderer.substitute_placeholders("Plain").await.unwrap(), "Plain");
    }

    #[tokio::test]
    async fn test_missing_placeholder_propagates() {
        let map = ManualTextMap::new();
        let voice = VoiceCache::new();
        let renderer = WikitextRenderer::new(&WikiTextNormalizer, &voice, &map);
        let branch = ResolvedBranch::new(vec![line(npc(1, "{PLAYERAVATAR#SEXPRO[A|B]}"))]);
        assert!(renderer.render_root(&branch, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_all_siblings_already_rendered() {
        let mut hub = line(npc(1, "Pick one"));
        hub.branches = vec![
            ResolvedBranch::new(vec![line(player(2, "A"))]),
            ResolvedBranch::new(vec![line(player(3, "B"))]),
        ];
        let branch = ResolvedBranch::new(vec![hub]);

        let map = text_map();
        let voice = VoiceCache::new();
        let renderer = WikitextRenderer::new(&WikiTextNormalizer, &voice, &map);
        let rendered: HashSet<NodeId> = [2, 3].into_iter().collect();
        let out = renderer.render(&branch, 1, None, false, &rendered).await.unwrap();
        assert_eq!(out, ":'''Paimon:''' Pick one\n:;(Return to option selection)");
    }
}
