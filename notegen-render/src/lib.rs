//! # notegen-render
//!
//! HTML rendering for notegen sites.
//!
//! Pages are Askama templates filled from a [`notegen_core::NoteQuery`];
//! [`SiteRenderer`] maps each [`notegen_core::Route`] to its page.

pub mod site;
pub mod templates;

pub use site::{RenderError, SiteRenderer};
pub use templates::{
    GroupLink, GroupSummary, GroupsTemplate, IndexTemplate, ListingTemplate, NavLink,
    NoteEntry, NoteTemplate, NotFoundTemplate, RelatedEntry,
};
