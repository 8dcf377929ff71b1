//! Fetch a single note in structured form.

use super::load_index;
use crate::api::{self, note_metadata, note_to_payload};
use crate::NoteFormat;
use anyhow::{Context, Result};
use std::path::Path;

/// Fetch a single note and print it in the requested format.
pub fn show_note(
    config_path: &Path,
    url: &str,
    format: NoteFormat,
    related: Option<usize>,
) -> Result<()> {
    let (config, index) = load_index(config_path)?;
    let query = index.query();

    let note = query
        .get_by_url(url)
        .with_context(|| format!("Note '{}' not found", url))?;

    match format {
        NoteFormat::Json => {
            let limit = related.unwrap_or(config.related_limit);
            let payload = api::envelope("note.full", note_to_payload(&query, note, limit));
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        NoteFormat::Html => {
            println!("{}", note.content_html);
        }
        NoteFormat::Metadata => {
            let yaml = serde_yaml::to_string(&note_metadata(note))
                .context("Failed to serialize metadata")?;
            println!("---\n{}---", yaml);
        }
    }

    Ok(())
}
