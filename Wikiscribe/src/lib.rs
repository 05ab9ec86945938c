//! # Wikiscribe
//!
//! Rebuilds wiki transcripts from branching game dialogue.
//!
//! Dialogue tables store every line as a flat record pointing at its
//! successors. Wikiscribe walks those links from a root line, folds options
//! that rejoin back into a single path, marks loops, and renders the result
//! as nested wikitext with speaker names, voice-over tags and `{{DIcon}}`
//! player options.
//!
//! ## Quick Start
//!
//! ```
//! use wikiscribe::prelude::*;
//!
//! # tokio_test_block(async {
//! let store = MemoryStore::from_nodes([
//!     DialogueNode::new(1, SpeakerRole::Npc("Paimon".into())).with_text("Hello").with_successors([2]),
//!     DialogueNode::new(2, SpeakerRole::Player).with_text("Hi!"),
//! ])?;
//! let (voice, text_map) = (VoiceCache::new(), ManualTextMap::new());
//!
//! let scribe = DialogueScribe::new(&store, &WikiTextNormalizer, &voice, &text_map);
//! let section = scribe.generate_section(1).await?.expect("root exists");
//! assert_eq!(section.wikitext, ":'''Paimon:''' Hello\n:{{DIcon}} Hi!");
//! # Ok::<(), wikiscribe::Error>(())
//! # });
//! # fn tokio_test_block<F: std::future::Future<Output = wikiscribe::Result<()>>>(f: F) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f).unwrap();
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `wikiscribe` command-line binary

pub mod error;
pub mod config;
pub mod dialog;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::config::ScribeConfig;
    pub use crate::dialog::{
        DialogueNode, SpeakerRole, NodeId, ResolvedNode, ResolvedBranch,
        DialogueStore, MemoryStore,
        DialogueResolver, ResolverOptions, SeenSet,
        WikitextRenderer, RenderOptions,
        TextNormalizer, WikiTextNormalizer,
        VoiceLookup, VoiceCache, VoiceItem,
        PlaceholderLookup, ManualTextMap, GenderedText,
        DialogueScribe, DialogueSection, SectionResult,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
