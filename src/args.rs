use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Component, Path, PathBuf};

use crate::config::{IndexerConfig, DEFAULT_MANIFEST_NAME, DEFAULT_ROOT};

#[derive(Debug, Parser)]
#[command(name = "img-index")]
#[command(about = "Write an index.json manifest of image files into every directory of a tree")]
pub struct Args {
    /// Root image directory (created if missing)
    #[arg(default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// File name of the manifest written into each directory
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    pub manifest_name: String,

    /// Image extension to list; repeat to replace the default set
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Send progress through the logger instead of printing it
    #[arg(long)]
    pub log: bool,
}

impl Args {
    /// Validate the arguments and turn them into an indexer configuration
    pub fn into_config(self) -> Result<IndexerConfig> {
        if !is_bare_file_name(&self.manifest_name) {
            bail!(
                "Manifest name must be a plain file name, got: {:?}",
                self.manifest_name
            );
        }

        let mut config = IndexerConfig::new(self.root).with_manifest_name(self.manifest_name);

        if !self.extensions.is_empty() {
            config = config.with_extensions(&self.extensions);
            if config.extensions.is_empty() {
                bail!("At least one non-empty extension must be given with --ext");
            }
        }

        Ok(config)
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('/')
        && !name.contains('\\')
}
