//! Markdown rendering: tables, fenced code, heading ids and a `[TOC]` marker.

pub mod highlight;

use crate::slug::unique_slug;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;

pub use highlight::{highlight_css, HighlightTransformer};

/// Paragraph text that is replaced by the table of contents
pub const TOC_MARKER: &str = "[TOC]";

#[derive(Debug, Clone)]
struct TocItem {
    level: u32,
    title: String,
    id: String,
}

/// Output of rendering one markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc_html: Option<String>,
    /// Plain text of `html`
    pub text: String,
}

/// Markdown renderer with the extensions notes rely on
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Render a markdown body. Pure: the same input always yields the same output.
    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        let headings = collect_headings(&events);
        let events = attach_heading_ids(events, &headings);

        let toc_html = if headings.is_empty() {
            None
        } else {
            Some(render_toc(&headings))
        };
        let events = replace_toc_markers(events, toc_html.as_deref());

        let events = HighlightTransformer::new().transform(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        let text = html_to_text(&html_output);

        RenderedMarkdown {
            html: html_output,
            toc_html,
            text,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_headings(events: &[Event]) -> Vec<TocItem> {
    let mut toc = Vec::new();
    let mut taken = HashSet::new();
    let mut current: Option<(u32, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((*level as u32, id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, title)) = current.as_mut() {
                    title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit_id, title)) = current.take() {
                    let id = match explicit_id {
                        Some(id) => {
                            taken.insert(id.clone());
                            id
                        }
                        None => unique_slug(&title, "section", &mut taken),
                    };
                    toc.push(TocItem { level, title, id });
                }
            }
            _ => {}
        }
    }

    toc
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[TocItem]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();

    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let item = heading_iter.next();
                let id = id.or_else(|| item.map(|h| CowStr::from(h.id.clone())));
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        })
        .collect()
}

/// Swap every paragraph reading exactly `[TOC]` for the rendered contents
fn replace_toc_markers<'a>(events: Vec<Event<'a>>, toc_html: Option<&str>) -> Vec<Event<'a>> {
    let mut result = Vec::with_capacity(events.len());
    let mut skip_until: Option<usize> = None;

    for idx in 0..events.len() {
        if let Some(end) = skip_until {
            if idx <= end {
                continue;
            }
            skip_until = None;
        }

        if matches!(events[idx], Event::Start(Tag::Paragraph)) {
            if let Some(end) = toc_marker_end(&events, idx) {
                if let Some(toc) = toc_html {
                    result.push(Event::Html(CowStr::from(format!("{}\n", toc))));
                }
                skip_until = Some(end);
                continue;
            }
        }

        result.push(events[idx].clone());
    }

    result
}

/// Index of the paragraph end if the paragraph at `start` is a TOC marker
fn toc_marker_end(events: &[Event], start: usize) -> Option<usize> {
    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

fn render_toc(headings: &[TocItem]) -> String {
    let mut html = String::from(r#"<nav class="toc"><ul class="toc-list">"#);
    for h in headings {
        html.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            h.level,
            html_escape(&h.id),
            html_escape(&h.title)
        ));
    }
    html.push_str("</ul></nav>");
    html
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "hr", "li", "ul", "ol", "pre", "blockquote", "table", "tr", "td", "th",
    "h1", "h2", "h3", "h4", "h5", "h6", "nav", "section",
];

/// Strip tags from rendered HTML, keeping word boundaries between blocks
pub fn html_to_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name: String = tag
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                if BLOCK_TAGS.contains(&name.as_str()) {
                    result.push(' ');
                }
            }
            _ if in_tag => tag.push(ch),
            _ => result.push(ch),
        }
    }

    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
