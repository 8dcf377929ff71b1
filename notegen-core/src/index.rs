//! The content index: every note under a content root, sorted and grouped.

use crate::models::{Diagnostic, DiagnosticSeverity, Note};
use crate::parser::{NoteParser, ParseError};
use crate::query::NoteQuery;
use crate::slug::unique_slug;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Content root not found: {}", .0.display())]
    ContentRootMissing(PathBuf),

    #[error("Content root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Content root {} is unreadable: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Knobs for discovering notes
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Regexes matched against forward-slash paths relative to the root
    pub ignore_patterns: Vec<String>,
}

/// A named bucket of notes (a category or a tag), members in index order
#[derive(Debug, Clone)]
pub(crate) struct GroupEntry {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) members: Vec<usize>,
}

/// Groups in first-seen order with name and slug lookups
#[derive(Debug, Clone)]
pub(crate) struct Groups {
    fallback_slug: &'static str,
    entries: Vec<GroupEntry>,
    by_name: HashMap<String, usize>,
    by_slug: HashMap<String, usize>,
    taken_slugs: HashSet<String>,
}

impl Groups {
    fn new(fallback_slug: &'static str) -> Self {
        Self {
            fallback_slug,
            entries: Vec::new(),
            by_name: HashMap::new(),
            by_slug: HashMap::new(),
            taken_slugs: HashSet::new(),
        }
    }

    fn add(&mut self, name: &str, note_idx: usize) {
        let pos = match self.by_name.get(name) {
            Some(&pos) => pos,
            None => {
                let slug = unique_slug(name, self.fallback_slug, &mut self.taken_slugs);
                let pos = self.entries.len();
                self.entries.push(GroupEntry {
                    name: name.to_string(),
                    slug: slug.clone(),
                    members: Vec::new(),
                });
                self.by_name.insert(name.to_string(), pos);
                self.by_slug.insert(slug, pos);
                pos
            }
        };
        self.entries[pos].members.push(note_idx);
    }

    pub(crate) fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    pub(crate) fn by_name(&self, name: &str) -> Option<&GroupEntry> {
        self.by_name.get(name).map(|&pos| &self.entries[pos])
    }

    pub(crate) fn by_slug(&self, slug: &str) -> Option<&GroupEntry> {
        self.by_slug.get(slug).map(|&pos| &self.entries[pos])
    }
}

/// Immutable snapshot of the content tree.
///
/// Notes are sorted by date, newest first; notes sharing a date keep their
/// discovery order (sorted relative path). Category and tag groups list
/// their members in that same order.
#[derive(Debug, Clone)]
pub struct NoteIndex {
    root: PathBuf,
    notes: Vec<Note>,
    categories: Groups,
    tags: Groups,
    by_url: HashMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl NoteIndex {
    /// Walk `root` and index every markdown file below it.
    ///
    /// Only a missing or unreadable root is an error. Files that fail to
    /// parse are logged, recorded as diagnostics and left out.
    pub fn build(root: impl AsRef<Path>, options: &IndexOptions) -> Result<Self, IndexError> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(IndexError::ContentRootMissing(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|source| IndexError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut diagnostics = Vec::new();
        let files = discover_markdown_files(root, options, &mut diagnostics);
        tracing::info!("Found {} markdown files in {:?}", files.len(), root);

        let parser = NoteParser::new(root);
        let mut notes = Vec::with_capacity(files.len());

        for path in &files {
            match parser.parse(path) {
                Ok(note) => {
                    tracing::debug!("Parsed {} -> {}", path.display(), note.url);
                    notes.push(note);
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    diagnostics.push(Diagnostic {
                        code: parse_error_code(&err).to_string(),
                        message: err.to_string(),
                        severity: DiagnosticSeverity::Error,
                        source_path: path.clone(),
                    });
                }
            }
        }

        let index = Self::from_notes(root, notes, diagnostics);
        let stats = index.query().stats();
        tracing::info!(
            "Indexed {} notes ({} categories, {} tags, {} skipped)",
            stats.notes,
            stats.categories,
            stats.tags,
            stats.diagnostics
        );
        Ok(index)
    }

    /// Assemble an index from notes given in discovery order.
    ///
    /// A note whose url is already taken by an earlier one is dropped with a
    /// diagnostic.
    pub fn from_notes(
        root: impl Into<PathBuf>,
        notes: Vec<Note>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut notes: Vec<Note> = notes
            .into_iter()
            .filter(|note| {
                if seen.insert(note.url_key().to_string()) {
                    return true;
                }
                tracing::warn!(
                    "Duplicate url {} from {}",
                    note.url,
                    note.source_path.display()
                );
                diagnostics.push(Diagnostic {
                    code: "note.duplicate_url".to_string(),
                    message: format!("url {} is already used by another note", note.url),
                    severity: DiagnosticSeverity::Error,
                    source_path: note.source_path.clone(),
                });
                false
            })
            .collect();

        // Stable: equal dates keep discovery order
        notes.sort_by(|a, b| b.date.cmp(&a.date));

        let mut categories = Groups::new("category");
        let mut tags = Groups::new("tag");
        let mut by_url = HashMap::with_capacity(notes.len());

        for (idx, note) in notes.iter().enumerate() {
            by_url.insert(note.url_key().to_string(), idx);
            categories.add(&note.category, idx);
            for tag in &note.tags {
                tags.add(tag, idx);
            }
        }

        Self {
            root: root.into(),
            notes,
            categories,
            tags,
            by_url,
            diagnostics,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All notes, newest first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Files that were left out of the index and why
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Read-only query interface over this snapshot
    pub fn query(&self) -> NoteQuery<'_> {
        NoteQuery::new(self)
    }

    pub(crate) fn categories(&self) -> &Groups {
        &self.categories
    }

    pub(crate) fn tags(&self) -> &Groups {
        &self.tags
    }

    pub(crate) fn position_of_url(&self, key: &str) -> Option<usize> {
        self.by_url.get(key).copied()
    }
}

fn parse_error_code(err: &ParseError) -> &'static str {
    match err {
        ParseError::NotFound(_) => "note.not_found",
        ParseError::Io { .. } => "note.io",
        ParseError::Frontmatter { .. } => "note.frontmatter",
        ParseError::Validation(_) => "note.invalid_metadata",
        ParseError::OutsideRoot { .. } => "note.outside_root",
    }
}

/// Markdown files under `root` in sorted path order
fn discover_markdown_files(
    root: &Path,
    options: &IndexOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    let ignore_patterns = compile_ignore_patterns(&options.ignore_patterns);
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Failed to read directory entry: {}", err);
                diagnostics.push(Diagnostic {
                    code: "walk.error".to_string(),
                    message: err.to_string(),
                    severity: DiagnosticSeverity::Warning,
                    source_path: err.path().map(Path::to_path_buf).unwrap_or_default(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        let rel = relative_slash_path(root, entry.path());
        if should_ignore(&rel, &ignore_patterns) {
            tracing::debug!("Ignoring {} due to ignore_patterns", rel);
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    files
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn compile_ignore_patterns(patterns: &[String]) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat, err),
        }
    }
    compiled
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn note_src(date: &str, category: &str, tags: &str) -> String {
        format!("---\ndate: {date}\ncategory: {category}\ntags: {tags}\n---\nBody\n")
    }

    fn urls(index: &NoteIndex) -> Vec<&str> {
        index.notes().iter().map(|n| n.url.as_str()).collect()
    }

    fn sample_tree() -> TempDir {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.md", &note_src("2024-02-01", "math", "x,y"));
        write(dir.path(), "b.md", &note_src("2024-01-01", "math", "y"));
        dir
    }

    #[test]
    fn test_sorted_newest_first() {
        let dir = sample_tree();
        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(urls(&index), vec!["/a", "/b"]);
        assert!(index.diagnostics().is_empty());
    }

    #[test]
    fn test_untitled_note_is_named_after_its_file() {
        let dir = tempdir().unwrap();
        write(dir.path(), "scratch.md", "---\ndate: 2024-03-03\n---\nJust a date\n");

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(index.notes()[0].title, "scratch.md");
        assert_eq!(index.notes()[0].url, "/scratch");
    }

    #[test]
    fn test_build_counts_match_stats() {
        let dir = sample_tree();
        write(dir.path(), "broken.md", "---\ndate: [1]\n---\nBody\n");

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        let stats = index.query().stats();
        assert_eq!(
            (stats.notes, stats.categories, stats.tags, stats.diagnostics),
            (2, 1, 2, 1)
        );
    }

    #[test]
    fn test_equal_dates_keep_path_order() {
        let dir = tempdir().unwrap();
        for name in ["zeta.md", "alpha.md", "sub/mid.md", "beta.md"] {
            write(dir.path(), name, &note_src("2024-05-05", "misc", "t"));
        }
        write(dir.path(), "newer.md", &note_src("2024-06-01", "misc", "t"));

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(
            urls(&index),
            vec!["/newer", "/alpha", "/beta", "/sub/mid", "/zeta"]
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dir = sample_tree();
        write(dir.path(), "c/d.md", &note_src("2024-01-01", "physics", "y,z"));

        let first = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        let second = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();

        assert_eq!(first.notes(), second.notes());
        let names = |i: &NoteIndex| -> Vec<(String, Vec<usize>)> {
            i.tags()
                .entries()
                .iter()
                .map(|g| (g.name.clone(), g.members.clone()))
                .collect()
        };
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let dir = sample_tree();
        write(dir.path(), "c.md", "---\ndate: not-a-date\n---\nBody\n");

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(urls(&index), vec!["/a", "/b"]);
        assert_eq!(index.diagnostics().len(), 1);
        assert_eq!(index.diagnostics()[0].code, "note.invalid_metadata");
        assert!(index.diagnostics()[0].source_path.ends_with("c.md"));
    }

    #[test]
    fn test_only_md_files_are_indexed() {
        let dir = sample_tree();
        write(dir.path(), "notes.txt", "plain");
        write(dir.path(), "upper.MD", "shouting");
        write(dir.path(), "dir.md/inner.txt", "not a note");

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = sample_tree();
        write(dir.path(), "drafts/wip.md", &note_src("2024-03-01", "math", "x"));

        let options = IndexOptions {
            ignore_patterns: vec!["^drafts/".to_string(), "([".to_string()],
        };
        let index = NoteIndex::build(dir.path(), &options).unwrap();
        assert_eq!(urls(&index), vec!["/a", "/b"]);
    }

    #[test]
    fn test_groups_follow_index_order() {
        let dir = sample_tree();
        write(dir.path(), "e.md", &note_src("2024-03-01", "Physics", "x"));

        let index = NoteIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        let cats: Vec<(&str, &[usize])> = index
            .categories()
            .entries()
            .iter()
            .map(|g| (g.name.as_str(), g.members.as_slice()))
            .collect();
        assert_eq!(cats, vec![("Physics", &[0][..]), ("math", &[1, 2][..])]);
        assert_eq!(index.categories().by_slug("physics").unwrap().name, "Physics");
        assert_eq!(index.tags().by_name("x").unwrap().members, vec![0, 1]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let err = NoteIndex::build(dir.path().join("nope"), &IndexOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::ContentRootMissing(_)));

        write(dir.path(), "file.md", "x");
        let err = NoteIndex::build(dir.path().join("file.md"), &IndexOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::NotADirectory(_)));
    }

    #[test]
    fn test_duplicate_urls_keep_first() {
        let dup = |title: &str| Note {
            title: title.to_string(),
            ..sample_note()
        };

        let index = NoteIndex::from_notes("content", vec![dup("first"), dup("second")], vec![]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.notes()[0].title, "first");
        assert_eq!(index.diagnostics()[0].code, "note.duplicate_url");
    }

    fn sample_note() -> Note {
        Note {
            source_path: PathBuf::from("content/same.md"),
            url: "/same".to_string(),
            title: String::new(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            category: "misc".to_string(),
            tags: vec![],
            content_html: String::new(),
            toc_html: None,
            body_text: String::new(),
            raw_metadata: serde_yaml::Mapping::new(),
        }
    }
}
