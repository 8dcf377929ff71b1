//! Read-only queries over a built [`NoteIndex`].
//!
//! Nothing here touches the file system and nothing fails for a missing note,
//! category or tag: absence is an empty or `None` result.

use crate::index::{GroupEntry, NoteIndex};
use crate::metadata::parse_date;
use crate::models::Note;
use crate::route::Route;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of related notes returned when the caller has no preference
pub const DEFAULT_RELATED_LIMIT: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid {field} date '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
}

/// A category or tag with its notes in index order
#[derive(Debug, Clone, Serialize)]
pub struct NoteGroup<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub notes: Vec<&'a Note>,
}

/// A note scored against another one by shared category and tags
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelatedNote<'a> {
    pub note: &'a Note,
    pub score: usize,
}

/// Notes before and after a note in index order
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Neighbors<'a> {
    /// The next newer note
    pub previous: Option<&'a Note>,
    /// The next older note
    pub next: Option<&'a Note>,
}

/// Counts for logging and status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub notes: usize,
    pub categories: usize,
    pub tags: usize,
    pub diagnostics: usize,
}

/// Criteria for [`NoteQuery::filter`]; every criterion that is set must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Filter criteria as text, e.g. from a query string or the command line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl NoteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Build a filter from text criteria. Blank values are treated as unset.
    pub fn from_params(params: &FilterParams) -> Result<Self, QueryError> {
        Ok(Self {
            category: non_blank(params.category.as_deref()).map(str::to_string),
            tag: non_blank(params.tag.as_deref()).map(str::to_string),
            date_from: parse_bound("from", params.from.as_deref())?,
            date_to: parse_bound("to", params.to.as_deref())?,
        })
    }

    fn matches(&self, note: &Note) -> bool {
        if let Some(category) = &self.category {
            if note.category.to_lowercase() != category.trim().to_lowercase() {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !note.has_tag(&tag.trim().to_lowercase()) {
                return false;
            }
        }
        if self.date_from.is_some_and(|from| note.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| note.date > to) {
            return false;
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, QueryError> {
    match non_blank(value) {
        None => Ok(None),
        Some(text) => parse_date(text)
            .map(Some)
            .ok_or_else(|| QueryError::InvalidDate {
                field,
                value: text.to_string(),
            }),
    }
}

/// Borrowed query interface; cheap to create from [`NoteIndex::query`]
#[derive(Debug, Clone, Copy)]
pub struct NoteQuery<'a> {
    index: &'a NoteIndex,
}

impl<'a> NoteQuery<'a> {
    pub fn new(index: &'a NoteIndex) -> Self {
        Self { index }
    }

    /// Every note, newest first
    pub fn all_notes(&self) -> &'a [Note] {
        self.index.notes()
    }

    /// Categories in first-seen order
    pub fn categories(&self) -> Vec<NoteGroup<'a>> {
        self.index
            .categories()
            .entries()
            .iter()
            .map(|g| self.group(g))
            .collect()
    }

    /// Tags in first-seen order; a note appears under each of its tags
    pub fn tags(&self) -> Vec<NoteGroup<'a>> {
        self.index
            .tags()
            .entries()
            .iter()
            .map(|g| self.group(g))
            .collect()
    }

    /// Notes of a category, by its exact name
    pub fn category(&self, name: &str) -> Option<NoteGroup<'a>> {
        self.index.categories().by_name(name).map(|g| self.group(g))
    }

    /// Notes carrying a tag; the tag is normalized like note tags are
    pub fn tag(&self, name: &str) -> Option<NoteGroup<'a>> {
        self.index
            .tags()
            .by_name(&name.trim().to_lowercase())
            .map(|g| self.group(g))
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<NoteGroup<'a>> {
        self.index.categories().by_slug(slug).map(|g| self.group(g))
    }

    pub fn tag_by_slug(&self, slug: &str) -> Option<NoteGroup<'a>> {
        self.index.tags().by_slug(slug).map(|g| self.group(g))
    }

    /// Slug of the route page for a category name
    pub fn category_slug(&self, name: &str) -> Option<&'a str> {
        self.index
            .categories()
            .by_name(name)
            .map(|g| g.slug.as_str())
    }

    /// Slug of the route page for a tag, normalized like [`Self::tag`]
    pub fn tag_slug(&self, tag: &str) -> Option<&'a str> {
        self.index
            .tags()
            .by_name(&tag.trim().to_lowercase())
            .map(|g| g.slug.as_str())
    }

    /// Look a note up by url; surrounding slashes are ignored
    pub fn get_by_url(&self, url: &str) -> Option<&'a Note> {
        let key = url.trim().trim_matches('/');
        self.index
            .position_of_url(key)
            .map(|idx| &self.all_notes()[idx])
    }

    /// Case-insensitive substring match on title, body text and tags.
    /// The empty query matches every note.
    pub fn search(&self, query: &str) -> Vec<&'a Note> {
        let needle = query.to_lowercase();
        self.all_notes()
            .iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.body_text.to_lowercase().contains(&needle)
                    || note.tags.iter().any(|t| t.contains(&needle))
            })
            .collect()
    }

    /// Notes matching every criterion set on `filter`, in index order
    pub fn filter(&self, filter: &NoteFilter) -> Vec<&'a Note> {
        self.all_notes()
            .iter()
            .filter(|note| filter.matches(note))
            .collect()
    }

    /// Notes related to `note`: one point for the same category plus one per
    /// shared tag. Unrelated notes are left out; ties keep index order.
    pub fn related(&self, note: &Note, limit: usize) -> Vec<RelatedNote<'a>> {
        let mut scored: Vec<RelatedNote<'a>> = self
            .all_notes()
            .iter()
            .filter(|other| other.url != note.url)
            .filter_map(|other| {
                let same_category = usize::from(other.category == note.category);
                let score = same_category + note.shared_tag_count(other);
                (score > 0).then_some(RelatedNote { note: other, score })
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    /// Previous (newer) and next (older) notes around `note`
    pub fn neighbors(&self, note: &Note) -> Neighbors<'a> {
        let notes = self.all_notes();
        match self.index.position_of_url(note.url_key()) {
            Some(idx) => Neighbors {
                previous: idx.checked_sub(1).map(|prev| &notes[prev]),
                next: notes.get(idx + 1),
            },
            None => Neighbors::default(),
        }
    }

    /// Every page a static export has to produce
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = vec![Route::Index, Route::Categories, Route::Tags];
        routes.extend(self.all_notes().iter().map(|n| Route::note(&n.url)));
        routes.extend(
            self.index
                .categories()
                .entries()
                .iter()
                .map(|g| Route::Category(g.slug.clone())),
        );
        routes.extend(
            self.index
                .tags()
                .entries()
                .iter()
                .map(|g| Route::Tag(g.slug.clone())),
        );
        routes
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            notes: self.index.len(),
            categories: self.index.categories().entries().len(),
            tags: self.index.tags().entries().len(),
            diagnostics: self.index.diagnostics().len(),
        }
    }

    fn group(&self, entry: &'a GroupEntry) -> NoteGroup<'a> {
        let notes = self.all_notes();
        NoteGroup {
            name: &entry.name,
            slug: &entry.slug,
            notes: entry.members.iter().map(|&idx| &notes[idx]).collect(),
        }
    }
}
