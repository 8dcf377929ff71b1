//! Turns routes into HTML pages.

use crate::templates::{
    GroupLink, GroupSummary, GroupsTemplate, IndexTemplate, ListingTemplate, NavLink,
    NoteEntry, NoteTemplate, NotFoundTemplate, RelatedEntry,
};
use askama::Template;
use chrono::Datelike;
use notegen_core::config::SiteConfig;
use notegen_core::{Config, Note, NoteGroup, NoteQuery, Route, DEFAULT_RELATED_LIMIT};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render {page}: {source}")]
    Template {
        page: String,
        #[source]
        source: askama::Error,
    },
}

/// Renders every page of a site from a query snapshot
#[derive(Debug, Clone)]
pub struct SiteRenderer {
    site: SiteConfig,
    base_url: String,
    related_limit: usize,
    year: i32,
}

impl SiteRenderer {
    /// `base_url` must carry a leading and trailing slash
    pub fn new(site: SiteConfig, base_url: impl Into<String>) -> Self {
        Self {
            site,
            base_url: base_url.into(),
            related_limit: DEFAULT_RELATED_LIMIT,
            year: chrono::Local::now().year(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.site.clone(), config.normalized_base_url())
            .with_related_limit(config.related_limit)
    }

    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render one page. `Ok(None)` means the route names a note, category
    /// or tag that is not in the index.
    pub fn render_route(
        &self,
        query: &NoteQuery<'_>,
        route: &Route,
    ) -> Result<Option<String>, RenderError> {
        let page = route.output_rel_path();
        let html = match route {
            Route::Index => Some(self.index_page(query).render()),
            Route::Categories => {
                Some(self.groups_page("Categories", query.categories(), Route::Category).render())
            }
            Route::Tags => Some(self.groups_page("Tags", query.tags(), Route::Tag).render()),
            Route::Note(key) => query
                .get_by_url(key)
                .map(|note| self.note_page(query, note).render()),
            Route::Category(slug) => query
                .category_by_slug(slug)
                .map(|group| self.listing_page(query, "Category", &group).render()),
            Route::Tag(slug) => query
                .tag_by_slug(slug)
                .map(|group| self.listing_page(query, "Tag", &group).render()),
        };

        if html.is_none() {
            tracing::debug!("No page for {:?}", route);
        }
        html.transpose()
            .map_err(|source| RenderError::Template { page, source })
    }

    pub fn render_not_found(&self) -> Result<String, RenderError> {
        NotFoundTemplate {
            site_title: self.site.title.clone(),
            site_author: self.site.author.clone(),
            year: self.year,
            base_url: self.base_url.clone(),
        }
        .render()
        .map_err(|source| RenderError::Template {
            page: "404.html".to_string(),
            source,
        })
    }

    fn index_page(&self, query: &NoteQuery<'_>) -> IndexTemplate {
        IndexTemplate {
            site_title: self.site.title.clone(),
            site_description: self.site.description.clone(),
            site_author: self.site.author.clone(),
            year: self.year,
            base_url: self.base_url.clone(),
            notes: query
                .all_notes()
                .iter()
                .map(|n| self.note_entry(query, n))
                .collect(),
            categories: self.summaries(query.categories(), Route::Category),
        }
    }

    fn note_page(&self, query: &NoteQuery<'_>, note: &Note) -> NoteTemplate {
        let neighbors = query.neighbors(note);
        let related = query
            .related(note, self.related_limit)
            .into_iter()
            .map(|r| RelatedEntry {
                url: self.note_href(r.note),
                title: r.note.title.clone(),
                score: r.score,
            })
            .collect();

        NoteTemplate {
            site_title: self.site.title.clone(),
            site_author: self.site.author.clone(),
            year: self.year,
            base_url: self.base_url.clone(),
            title: note.title.clone(),
            date: note.date_string(),
            category: self.category_link(query, &note.category),
            tags: self.tag_links(query, note),
            content: note.content_html.clone(),
            toc_html: note.toc_html.clone(),
            related,
            previous: neighbors.previous.map(|n| self.nav_link(n)),
            next: neighbors.next.map(|n| self.nav_link(n)),
        }
    }

    fn listing_page(
        &self,
        query: &NoteQuery<'_>,
        kind: &str,
        group: &NoteGroup<'_>,
    ) -> ListingTemplate {
        ListingTemplate {
            site_title: self.site.title.clone(),
            site_author: self.site.author.clone(),
            year: self.year,
            base_url: self.base_url.clone(),
            kind: kind.to_string(),
            name: group.name.to_string(),
            notes: group
                .notes
                .iter()
                .map(|n| self.note_entry(query, n))
                .collect(),
        }
    }

    fn groups_page(
        &self,
        heading: &str,
        groups: Vec<NoteGroup<'_>>,
        route: fn(String) -> Route,
    ) -> GroupsTemplate {
        GroupsTemplate {
            site_title: self.site.title.clone(),
            site_author: self.site.author.clone(),
            year: self.year,
            base_url: self.base_url.clone(),
            heading: heading.to_string(),
            groups: self.summaries(groups, route),
        }
    }

    fn summaries(
        &self,
        groups: Vec<NoteGroup<'_>>,
        route: fn(String) -> Route,
    ) -> Vec<GroupSummary> {
        groups
            .into_iter()
            .map(|g| GroupSummary {
                name: g.name.to_string(),
                url: route(g.slug.to_string()).href(&self.base_url),
                count: g.notes.len(),
            })
            .collect()
    }

    fn note_entry(&self, query: &NoteQuery<'_>, note: &Note) -> NoteEntry {
        NoteEntry {
            url: self.note_href(note),
            title: note.title.clone(),
            date: note.date_string(),
            category: self.category_link(query, &note.category),
            tags: self.tag_links(query, note),
        }
    }

    fn note_href(&self, note: &Note) -> String {
        Route::note(&note.url).href(&self.base_url)
    }

    fn nav_link(&self, note: &Note) -> NavLink {
        NavLink {
            url: self.note_href(note),
            title: note.title.clone(),
        }
    }

    fn category_link(&self, query: &NoteQuery<'_>, category: &str) -> GroupLink {
        let slug = query.category_slug(category).unwrap_or_default();
        GroupLink {
            name: category.to_string(),
            url: Route::Category(slug.to_string()).href(&self.base_url),
        }
    }

    fn tag_links(&self, query: &NoteQuery<'_>, note: &Note) -> Vec<GroupLink> {
        note.tags
            .iter()
            .map(|tag| GroupLink {
                name: tag.clone(),
                url: Route::Tag(query.tag_slug(tag).unwrap_or_default().to_string())
                    .href(&self.base_url),
            })
            .collect()
    }
}
