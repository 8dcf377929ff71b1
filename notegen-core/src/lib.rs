//! # notegen-core
//!
//! Core library for the notegen static site generator.
//!
//! This crate parses markdown notes with YAML front matter, builds an
//! immutable index over a content root and answers read-only queries
//! (listings, search, filters, related notes and navigation) against it.

pub mod config;
pub mod frontmatter;
pub mod index;
pub mod library;
pub mod markdown;
pub mod metadata;
pub mod models;
pub mod parser;
pub mod query;
pub mod route;
pub mod slug;

pub use config::{Config, ConfigError};
pub use index::{IndexError, IndexOptions, NoteIndex};
pub use library::NoteLibrary;
pub use markdown::{highlight_css, MarkdownRenderer};
pub use metadata::ContentValidationError;
pub use models::{Diagnostic, DiagnosticSeverity, Note};
pub use parser::{NoteParser, ParseError};
pub use query::{
    FilterParams, IndexStats, Neighbors, NoteFilter, NoteGroup, NoteQuery, QueryError,
    RelatedNote, DEFAULT_RELATED_LIMIT,
};
pub use route::Route;
pub use slug::slugify;
