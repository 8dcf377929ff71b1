//! Search and list commands.

use super::load_index;
use crate::api::{self, ListData, NoteSummary, SearchData};
use anyhow::{Context, Result};
use notegen_core::{FilterParams, Note, NoteFilter};
use std::path::Path;

/// Print notes whose title, body or tags contain `query`
pub fn search_notes(config_path: &Path, query: &str, limit: usize, json: bool) -> Result<()> {
    let (_config, index) = load_index(config_path)?;
    let results = index.query().search(query);
    let total = results.len();

    if json {
        let payload = api::envelope(
            "search.results",
            SearchData {
                query: query.to_string(),
                limit,
                total,
                results: results.into_iter().take(limit).map(NoteSummary::from).collect(),
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for '{}'", query);
        return Ok(());
    }

    println!("Found {} notes for '{}':\n", total, query);
    for note in results.iter().take(limit) {
        print_note_line(note);
    }
    if total > limit {
        println!("\n  ... and {} more results", total - limit);
    }

    Ok(())
}

/// Print notes matching every given criterion, newest first
pub fn list_notes(config_path: &Path, params: &FilterParams, json: bool) -> Result<()> {
    let filter = NoteFilter::from_params(params).context("Invalid filter")?;
    let (_config, index) = load_index(config_path)?;
    let notes = index.query().filter(&filter);

    if json {
        let payload = api::envelope(
            "notes.list",
            ListData {
                total: notes.len(),
                notes: notes.into_iter().map(NoteSummary::from).collect(),
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No matching notes");
        return Ok(());
    }
    for note in notes {
        print_note_line(note);
    }
    Ok(())
}

fn print_note_line(note: &Note) {
    let tags = if note.tags.is_empty() {
        String::new()
    } else {
        format!(" #{}", note.tags.join(" #"))
    };
    println!("{}  [{}] {}{}", note.date_string(), note.category, note.title, tags);
    println!("  {}", note.url);
}
