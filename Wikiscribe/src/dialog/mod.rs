//! Dialogue graph resolution and wikitext rendering
//!
//! Dialogue is stored as flat records linked by id. A conversation is read by
//! starting at a root id and following successor links; several successors
//! mean the player (or a condition) picks one, and the options usually join up
//! again a few lines later.
//!
//! # Overview
//!
//! - [`DialogueStore`] looks records up by id ([`MemoryStore`] keeps them in memory)
//! - [`DialogueResolver`] folds the graph into a [`ResolvedBranch`] tree
//! - [`WikitextRenderer`] turns that tree into indented wikitext
//! - [`DialogueScribe`] does both for a list of roots
//!
//! # Usage
//!
//! ```no_run
//! use wikiscribe::dialog::{DialogueScribe, ManualTextMap, MemoryStore, VoiceCache, WikiTextNormalizer};
//!
//! # async fn run() -> wikiscribe::Result<()> {
//! let store = MemoryStore::load("DialogExcelConfigData.json")?;
//! let voice = VoiceCache::load("voice_items.json")?;
//! let text_map = ManualTextMap::load("ManualTextMap.json")?;
//!
//! let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &text_map);
//! if let Some(section) = scribe.generate_section(7010101).await? {
//!     println!("{}", section.wikitext);
//! }
//! # Ok(())
//! # }
//! ```

mod types;
mod store;
mod resolver;
mod renderer;
mod normalize;
mod voice;
mod text_map;
mod section;

pub use types::*;
pub use store::{DialogueStore, MemoryStore, RawDialogueRecord, RawTalkRole};
pub use resolver::{DialogueResolver, ResolverOptions, SeenSet, DEFAULT_MAX_DEPTH, find_rejoin};
pub use renderer::{RenderOptions, WikitextRenderer, RETURN_MARKER, UNKNOWN_SPEAKER};
pub use normalize::{TextNormalizer, WikiTextNormalizer, traveler_placeholder};
pub use voice::{VoiceCache, VoiceGender, VoiceItem, VoiceLookup};
pub use text_map::{GenderedText, ManualTextMap, PlaceholderLookup};
pub use section::{DialogueScribe, DialogueSection, SectionResult};
