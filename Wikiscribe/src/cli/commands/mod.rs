use clap::Subcommand;
use std::path::PathBuf;

use crate::dialog::NodeId;

pub mod inspect;
pub mod render;

#[derive(Subcommand)]
pub enum Commands {
    /// Render dialogue roots as wikitext
    Render {
        /// Dialogue records (JSON array of game dialogue rows)
        #[arg(short, long)]
        store: PathBuf,

        /// Voice items (JSON object keyed by `<kind>_<id>`)
        #[arg(long)]
        voice: Option<PathBuf>,

        /// Show every voice file inline instead of commenting out duplicates
        #[arg(long)]
        show_dupes: bool,

        /// Manual text map for gendered placeholders (JSON object)
        #[arg(long = "text-map")]
        text_map: Option<PathBuf>,

        /// Config file (defaults to the platform config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output locale, overrides the config
        #[arg(short, long)]
        locale: Option<String>,

        /// Base indentation depth, overrides the config
        #[arg(short, long)]
        depth: Option<usize>,

        /// Root dialogue ids, one section each
        #[arg(required = true)]
        roots: Vec<NodeId>,
    },

    /// Print the resolved branch tree of a root as JSON
    Inspect {
        /// Dialogue records (JSON array of game dialogue rows)
        #[arg(short, long)]
        store: PathBuf,

        /// Config file (defaults to the platform config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root dialogue id
        root: NodeId,
    },
}

impl Commands {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Render {
                store,
                voice,
                show_dupes,
                text_map,
                config,
                locale,
                depth,
                roots,
            } => {
                render::execute(
                    store,
                    render::RenderSources {
                        voice: voice.as_deref(),
                        show_dupes: *show_dupes,
                        text_map: text_map.as_deref(),
                        config: config.as_deref(),
                    },
                    locale.as_deref(),
                    *depth,
                    roots,
                )
                .await
            }
            Commands::Inspect { store, config, root } => {
                inspect::execute(store, config.as_deref(), *root).await
            }
        }
    }
}
