//! CLI command implementations.

pub mod build;
pub mod check;
pub mod note;
pub mod search;
pub mod serve;

pub use build::build_site;
pub use check::check_content;
pub use note::show_note;
pub use search::{list_notes, search_notes};
pub use serve::serve;

use anyhow::{Context, Result};
use notegen_core::{Config, NoteIndex};
use std::path::Path;

/// Load the config (or defaults when the file is absent)
pub fn load_config(config_path: &Path) -> Result<Config> {
    tracing::debug!("Loading config from {:?}", config_path);
    Config::load_or_default(config_path).context("Failed to load configuration")
}

/// Load the config and index its content root
pub fn load_index(config_path: &Path) -> Result<(Config, NoteIndex)> {
    let config = load_config(config_path)?;
    let content_dir = config.content_dir();
    let index = NoteIndex::build(&content_dir, &config.index_options())
        .with_context(|| format!("Failed to index {:?}", content_dir))?;
    Ok((config, index))
}
