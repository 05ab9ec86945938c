//! CLI command for dumping a resolved branch tree

use std::collections::HashSet;
use std::path::Path;

use crate::config::ScribeConfig;
use crate::dialog::{DialogueResolver, MemoryStore, NodeId};

pub async fn execute(store_path: &Path, config: Option<&Path>, root: NodeId) -> anyhow::Result<()> {
    let config = ScribeConfig::discover(config)?;
    let store = MemoryStore::load(store_path)?;

    let branch = DialogueResolver::new(&store)
        .with_options(config.resolver_options())
        .resolve(root, &HashSet::new())
        .await?;

    if branch.is_empty() {
        println!("No dialogue found for root {root}");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&branch)?);
    Ok(())
}
