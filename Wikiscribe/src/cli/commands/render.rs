//! CLI command for rendering dialogue sections

use std::path::Path;

use crate::config::ScribeConfig;
use crate::dialog::{DialogueScribe, ManualTextMap, MemoryStore, NodeId, VoiceCache, WikiTextNormalizer};

/// Optional side files for a render
pub struct RenderSources<'a> {
    pub voice: Option<&'a Path>,
    pub show_dupes: bool,
    pub text_map: Option<&'a Path>,
    pub config: Option<&'a Path>,
}

pub async fn execute(
    store_path: &Path,
    sources: RenderSources<'_>,
    locale: Option<&str>,
    depth: Option<usize>,
    roots: &[NodeId],
) -> anyhow::Result<()> {
    let mut config = ScribeConfig::discover(sources.config)?;
    if let Some(locale) = locale {
        config.locale = locale.to_string();
    }
    if let Some(depth) = depth {
        config.base_depth = depth;
    }

    let store = MemoryStore::load(store_path)?;
    let mut voice = match sources.voice {
        Some(path) => VoiceCache::load(path)?,
        None => VoiceCache::new(),
    };
    if sources.show_dupes {
        voice = voice.without_dupe_comments();
    }
    let text_map = match sources.text_map {
        Some(path) => ManualTextMap::load(path)?,
        None => ManualTextMap::new(),
    };

    let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &text_map).with_config(config);
    tracing::info!(
        "Rendering {} dialogue roots (locale {}, depth {})",
        roots.len(),
        scribe.config().locale,
        scribe.config().base_depth
    );

    let mut failed = 0usize;
    for result in scribe.generate_sections(roots).await {
        match result.outcome {
            Ok(Some(section)) => {
                println!("<!-- {} -->", section.id);
                println!("{}", section.wikitext);
                println!();
            }
            Ok(None) => {
                tracing::warn!("No dialogue found for root {}", result.root_id);
            }
            Err(e) => {
                failed += 1;
                println!("<!-- Dialogue_{}: generation failed: {} -->", result.root_id, e);
                println!();
            }
        }
    }

    if failed == roots.len() && failed > 0 {
        anyhow::bail!("all {failed} dialogue sections failed");
    }
    Ok(())
}
