//! Askama template definitions.

use askama::Template;

/// A link to a tag or category page
#[derive(Debug, Clone)]
pub struct GroupLink {
    pub name: String,
    pub url: String,
}

/// A note as shown in listings
#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub url: String,
    pub title: String,
    pub date: String,
    pub category: GroupLink,
    pub tags: Vec<GroupLink>,
}

/// A related note with its score
#[derive(Debug, Clone)]
pub struct RelatedEntry {
    pub url: String,
    pub title: String,
    pub score: usize,
}

/// Previous/next navigation target
#[derive(Debug, Clone)]
pub struct NavLink {
    pub url: String,
    pub title: String,
}

/// A category or tag with its note count
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub name: String,
    pub url: String,
    pub count: usize,
}

/// Home page: every note, newest first
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    // Site metadata
    pub site_title: String,
    pub site_description: String,
    pub site_author: String,
    pub year: i32,
    pub base_url: String,

    pub notes: Vec<NoteEntry>,
    pub categories: Vec<GroupSummary>,
}

/// A single note page
#[derive(Template)]
#[template(path = "note.html")]
pub struct NoteTemplate {
    // Site metadata
    pub site_title: String,
    pub site_author: String,
    pub year: i32,
    pub base_url: String,

    // Page metadata
    pub title: String,
    pub date: String,
    pub category: GroupLink,
    pub tags: Vec<GroupLink>,

    // Content
    pub content: String,
    pub toc_html: Option<String>,

    // Navigation
    pub related: Vec<RelatedEntry>,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// Notes of one category or tag
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub site_title: String,
    pub site_author: String,
    pub year: i32,
    pub base_url: String,

    /// "Category" or "Tag"
    pub kind: String,
    pub name: String,
    pub notes: Vec<NoteEntry>,
}

/// Overview of all categories or all tags
#[derive(Template)]
#[template(path = "groups.html")]
pub struct GroupsTemplate {
    pub site_title: String,
    pub site_author: String,
    pub year: i32,
    pub base_url: String,

    pub heading: String,
    pub groups: Vec<GroupSummary>,
}

/// 404 error page template
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub site_title: String,
    pub site_author: String,
    pub year: i32,
    pub base_url: String,
}
