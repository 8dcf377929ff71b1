//! JSON payloads shared by the query commands and the server APIs.

use notegen_core::{Diagnostic, Note, NoteQuery};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

pub const SCHEMA_VERSION: &str = "notegen-v1";

/// Standard envelope for machine-consumable responses.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub schema_version: &'static str,
    pub kind: &'static str,
    pub data: T,
}

pub fn envelope<T>(kind: &'static str, data: T) -> Envelope<T> {
    Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        data,
    }
}

#[derive(Serialize)]
pub struct NoteSummary {
    pub url: String,
    pub title: String,
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl From<&Note> for NoteSummary {
    fn from(note: &Note) -> Self {
        Self {
            url: note.url.clone(),
            title: note.title.clone(),
            date: note.date_string(),
            category: note.category.clone(),
            tags: note.tags.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SearchData {
    pub query: String,
    pub limit: usize,
    pub total: usize,
    pub results: Vec<NoteSummary>,
}

#[derive(Serialize)]
pub struct ListData {
    pub total: usize,
    pub notes: Vec<NoteSummary>,
}

#[derive(Serialize)]
pub struct RelatedData {
    pub url: String,
    pub title: String,
    pub score: usize,
}

#[derive(Serialize)]
pub struct NoteData {
    #[serde(flatten)]
    pub summary: NoteSummary,
    pub metadata: Mapping,
    pub content_html: String,
    pub toc_html: Option<String>,
    pub related: Vec<RelatedData>,
    pub previous: Option<String>,
    pub next: Option<String>,
}

#[derive(Serialize)]
pub struct CheckData<'a> {
    pub notes: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: &'a [Diagnostic],
}

pub fn note_to_payload(query: &NoteQuery<'_>, note: &Note, related_limit: usize) -> NoteData {
    let neighbors = query.neighbors(note);
    NoteData {
        summary: NoteSummary::from(note),
        metadata: note_metadata(note),
        content_html: note.content_html.clone(),
        toc_html: note.toc_html.clone(),
        related: query
            .related(note, related_limit)
            .into_iter()
            .map(|r| RelatedData {
                url: r.note.url.clone(),
                title: r.note.title.clone(),
                score: r.score,
            })
            .collect(),
        previous: neighbors.previous.map(|n| n.url.clone()),
        next: neighbors.next.map(|n| n.url.clone()),
    }
}

/// Normalized fields followed by any extra front matter keys
pub fn note_metadata(note: &Note) -> Mapping {
    let mut mapping = Mapping::new();
    mapping.insert("title".into(), note.title.clone().into());
    mapping.insert("date".into(), note.date_string().into());
    mapping.insert("category".into(), note.category.clone().into());
    mapping.insert(
        "tags".into(),
        Value::Sequence(note.tags.iter().cloned().map(Value::from).collect()),
    );
    for (key, value) in &note.raw_metadata {
        mapping.insert(key.clone(), value.clone());
    }
    mapping
}
