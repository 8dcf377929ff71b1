//! Content model structs for notes and index diagnostics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Category assigned to notes whose metadata doesn't name one
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// A single parsed note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Backing markdown file
    pub source_path: PathBuf,

    /// Site-relative URL, e.g. "/math/limits"
    pub url: String,

    /// Display title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    pub category: String,

    /// Lower-cased, trimmed, de-duplicated tags in source order
    pub tags: Vec<String>,

    /// Rendered HTML content
    pub content_html: String,

    /// Table of contents HTML
    pub toc_html: Option<String>,

    /// Plain text of the rendered body, used for searching
    pub body_text: String,

    /// Front-matter keys other than title/date/category/tags
    pub raw_metadata: serde_yaml::Mapping,
}

impl Note {
    /// Canonical `YYYY-MM-DD` form of the note date
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// URL without the leading slash, used as the lookup key
    pub fn url_key(&self) -> &str {
        self.url.trim_start_matches('/')
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Number of tags this note shares with `other`
    pub fn shared_tag_count(&self, other: &Note) -> usize {
        let mine: HashSet<&str> = self.tags.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = other.tags.iter().map(String::as_str).collect();
        mine.intersection(&theirs).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// A problem found while indexing; the offending file is left out of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub source_path: PathBuf,
}
