//! Turns one markdown file into a [`Note`].

use crate::frontmatter::{split_frontmatter, FrontmatterError};
use crate::markdown::MarkdownRenderer;
use crate::metadata::{normalize_metadata, ContentValidationError};
use crate::models::{Note, DEFAULT_CATEGORY};
use chrono::{Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Frontmatter error in {}: {source}", .path.display())]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error(transparent)]
    Validation(#[from] ContentValidationError),

    #[error("{} is not inside the content root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Parses markdown files that live under a content root
pub struct NoteParser {
    root: PathBuf,
    renderer: MarkdownRenderer,
}

impl NoteParser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            renderer: MarkdownRenderer::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read, validate and render a single note.
    ///
    /// Missing `title`, `date` and `category` are filled with the file name,
    /// today's date and "uncategorized"; explicit but malformed values fail.
    pub fn parse(&self, path: &Path) -> Result<Note, ParseError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ParseError::NotFound(path.to_path_buf())
            } else {
                ParseError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let url = url_for(&self.root, path).ok_or_else(|| ParseError::OutsideRoot {
            path: path.to_path_buf(),
            root: self.root.clone(),
        })?;

        self.parse_str(path, url, &content, Local::now().date_naive())
    }

    /// Build a note from already loaded source text
    fn parse_str(
        &self,
        path: &Path,
        url: String,
        content: &str,
        today: NaiveDate,
    ) -> Result<Note, ParseError> {
        let (raw, body) = split_frontmatter(content).map_err(|source| ParseError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = normalize_metadata(&raw, path)?;

        let title = metadata.title.unwrap_or_else(|| {
            path.file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string())
        });

        let rendered = self.renderer.render(&body);

        Ok(Note {
            source_path: path.to_path_buf(),
            url,
            title,
            date: metadata.date.unwrap_or(today),
            category: metadata
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: metadata.tags,
            content_html: rendered.html,
            toc_html: rendered.toc_html,
            body_text: rendered.text,
            raw_metadata: metadata.extra,
        })
    }
}

/// Site URL for a file under `root`: relative path, extension stripped,
/// forward slashes, one leading slash.
///
/// ```
/// use notegen_core::parser::url_for;
/// use std::path::Path;
///
/// let url = url_for(Path::new("content"), Path::new("content/math/limits.md"));
/// assert_eq!(url.as_deref(), Some("/math/limits"));
/// ```
pub fn url_for(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let stripped = rel.with_extension("");

    let segments: Vec<String> = stripped
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return None;
    }
    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn parse_text(name: &str, content: &str) -> Result<Note, ParseError> {
        let parser = NoteParser::new("content");
        let path = Path::new("content").join(name);
        let url = url_for(parser.root(), &path).unwrap();
        parser.parse_str(&path, url, content, today())
    }

    #[test]
    fn test_full_note() {
        let note = parse_text(
            "limits.md",
            "---\ntitle: Limits\ndate: 2024-02-01\ncategory: math\ntags: x, Y\nsource: lecture 3\n---\n# Limits\n\nEpsilon.\n",
        )
        .unwrap();

        assert_eq!(note.url, "/limits");
        assert_eq!(note.title, "Limits");
        assert_eq!(note.date_string(), "2024-02-01");
        assert_eq!(note.category, "math");
        assert_eq!(note.tags, vec!["x", "y"]);
        assert!(note.content_html.contains("<h1 id=\"limits\">Limits</h1>"));
        assert!(note.body_text.contains("Epsilon."));
        assert_eq!(
            note.raw_metadata.get("source").and_then(|v| v.as_str()),
            Some("lecture 3")
        );
    }

    #[test]
    fn test_defaults_are_filled() {
        let note = parse_text("scratch.md", "No metadata at all.").unwrap();
        assert_eq!(note.title, "scratch.md");
        assert_eq!(note.date, today());
        assert_eq!(note.category, "uncategorized");
        assert!(note.tags.is_empty());
        assert!(note.raw_metadata.is_empty());
    }

    #[test]
    fn test_malformed_date_is_a_validation_error() {
        let err = parse_text("c.md", "---\ndate: not-a-date\n---\nBody").unwrap_err();
        match err {
            ParseError::Validation(e) => assert_eq!(e.field, "date"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_broken_yaml_is_a_frontmatter_error() {
        let err = parse_text("c.md", "---\ntitle: [oops\n---\nBody").unwrap_err();
        assert!(matches!(err, ParseError::Frontmatter { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let parser = NoteParser::new(dir.path());
        let err = parser.parse(&dir.path().join("ghost.md")).unwrap_err();
        assert!(matches!(err, ParseError::NotFound(_)));
    }

    #[test]
    fn test_parse_from_disk() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("physics");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("waves.md"), "---\ntitle: Waves\n---\nBody").unwrap();

        let parser = NoteParser::new(dir.path());
        let note = parser.parse(&sub.join("waves.md")).unwrap();
        assert_eq!(note.url, "/physics/waves");
        assert_eq!(note.source_path, sub.join("waves.md"));
    }

    #[test]
    fn test_url_for() {
        let root = Path::new("/site/content");
        assert_eq!(
            url_for(root, Path::new("/site/content/a.md")).as_deref(),
            Some("/a")
        );
        assert_eq!(
            url_for(root, Path::new("/site/content/x/y/v1.2.md")).as_deref(),
            Some("/x/y/v1.2")
        );
        assert_eq!(url_for(root, Path::new("/elsewhere/a.md")), None);
    }
}
