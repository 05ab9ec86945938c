//! Voice-over prefix lookup
//!
//! Voice files are indexed by `"{kind}_{id}"` (e.g. `Dialog_7010101`), the same
//! key the extracted voice table uses.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::types::{NodeId, SpeakerRole};
use crate::error::Result;

/// Provides the `{{A|...}}` audio prefix for a line
pub trait VoiceLookup: Send + Sync {
    /// `None` when the line has no voice-over.
    fn voice_prefix(&self, kind: &str, id: NodeId, text: &str, role: &SpeakerRole) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum VoiceGender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// One voice file attached to a line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceItem {
    pub file_name: String,
    #[serde(default)]
    pub gender: Option<VoiceGender>,
}

impl VoiceItem {
    #[must_use]
    pub fn new(file_name: impl Into<String>, gender: Option<VoiceGender>) -> Self {
        Self {
            file_name: file_name.into(),
            gender,
        }
    }
}

/// In-memory voice item index
#[derive(Debug, Clone)]
pub struct VoiceCache {
    /// Voice items indexed by `{kind}_{id}`
    items: HashMap<String, Vec<VoiceItem>>,
    /// Hide duplicate files in comments unless the line is gendered
    comment_out_dupes: bool,
}

impl Default for VoiceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceCache {
    /// Create a new empty cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            comment_out_dupes: true,
        }
    }

    /// Emit every file inline, never as comments
    #[must_use]
    pub fn without_dupe_comments(mut self) -> Self {
        self.comment_out_dupes = false;
        self
    }

    /// Parse `{"Dialog_1": [{"fileName": "..", "gender": "M"}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let items: HashMap<String, Vec<VoiceItem>> = serde_json::from_str(json)?;
        Ok(Self {
            items,
            ..Self::new()
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let cache = Self::from_json(&content)?;
        tracing::info!("Loaded voice items for {} lines", cache.len());
        Ok(cache)
    }

    pub fn insert(&mut self, kind: &str, id: NodeId, item: VoiceItem) {
        self.items.entry(format!("{kind}_{id}")).or_default().push(item);
    }

    #[must_use]
    pub fn get(&self, kind: &str, id: NodeId) -> Option<&[VoiceItem]> {
        self.items.get(&format!("{kind}_{id}")).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl VoiceLookup for VoiceCache {
    fn voice_prefix(&self, kind: &str, id: NodeId, text: &str, role: &SpeakerRole) -> Option<String> {
        let items = self.get(kind, id)?;

        let male = items.iter().find(|v| v.gender == Some(VoiceGender::Male));
        let female = items.iter().find(|v| v.gender == Some(VoiceGender::Female));
        let ungendered = items.iter().filter(|v| v.gender.is_none());

        let tags: Vec<String> = male
            .into_iter()
            .chain(female)
            .chain(ungendered)
            .map(|v| format!("{{{{A|{}}}}}", v.file_name))
            .collect();

        let (first, rest) = tags.split_first()?;

        // Gendered lines keep both recordings visible
        let show_all = !self.comment_out_dupes
            || text.to_ascii_lowercase().contains("{{mc")
            || matches!(role, SpeakerRole::Player | SpeakerRole::MateAvatar);

        let prefix = if show_all {
            tags.join(" ")
        } else {
            let hidden: String = rest.iter().map(|t| format!("<!--{t}-->")).collect();
            format!("{first}{hidden}")
        };
        Some(format!("{prefix} "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> VoiceCache {
        let mut cache = VoiceCache::new();
        cache.insert("Dialog", 1, VoiceItem::new("vo_paimon_1.ogg", None));
        cache.insert("Dialog", 2, VoiceItem::new("vo_f.ogg", Some(VoiceGender::Female)));
        cache.insert("Dialog", 2, VoiceItem::new("vo_m.ogg", Some(VoiceGender::Male)));
        cache
    }

    #[test]
    fn test_single_file() {
        let npc = SpeakerRole::Npc("Paimon".to_string());
        assert_eq!(
            cache().voice_prefix("Dialog", 1, "Hi", &npc),
            Some("{{A|vo_paimon_1.ogg}} ".to_string())
        );
        assert_eq!(cache().voice_prefix("Dialog", 3, "Hi", &npc), None);
        assert_eq!(cache().voice_prefix("Reminder", 1, "Hi", &npc), None);
    }

    #[test]
    fn test_gendered_files_ordering() {
        let npc = SpeakerRole::Npc("Paimon".to_string());
        assert_eq!(
            cache().voice_prefix("Dialog", 2, "Hi", &npc),
            Some("{{A|vo_m.ogg}}<!--{{A|vo_f.ogg}}--> ".to_string())
        );
        assert_eq!(
            cache().voice_prefix("Dialog", 2, "Hi", &SpeakerRole::Player),
            Some("{{A|vo_m.ogg}} {{A|vo_f.ogg}} ".to_string())
        );
        assert_eq!(
            cache().voice_prefix("Dialog", 2, "{{MC|m=he|f=she}}", &npc),
            Some("{{A|vo_m.ogg}} {{A|vo_f.ogg}} ".to_string())
        );
    }

    #[test]
    fn test_dupes_inline_when_requested() {
        let npc = SpeakerRole::Npc("Paimon".to_string());
        assert_eq!(
            cache().without_dupe_comments().voice_prefix("Dialog", 2, "Hi", &npc),
            Some("{{A|vo_m.ogg}} {{A|vo_f.ogg}} ".to_string())
        );
    }

    #[test]
    fn test_json_load() {
        let cache = VoiceCache::from_json(
            r#"{"Dialog_5": [{"fileName": "a.ogg", "gender": "F"}, {"fileName": "b.ogg"}]}"#,
        )
        .unwrap();
        assert_eq!(cache.get("Dialog", 5).map(<[VoiceItem]>::len), Some(2));
    }
}
