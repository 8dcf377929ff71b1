//! Code syntax highlighting using syntect.
//!
//! Fenced code blocks with a language are turned into class-annotated HTML so
//! the look lives in a stylesheet ([`highlight_css`]) rather than inline styles.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        theme_set
            .themes
            .get("InspiredGitHub")
            .or_else(|| theme_set.themes.get("base16-ocean.light"))
            .cloned()
            .unwrap_or_default()
    })
}

/// Stylesheet matching the classes emitted for highlighted code blocks
pub fn highlight_css() -> Result<String, syntect::Error> {
    css_for_theme_with_class_style(theme(), CLASS_STYLE)
}

/// Transformer for syntax highlighting code blocks
pub struct HighlightTransformer;

impl HighlightTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Replace fenced code blocks that name a language with highlighted HTML.
    /// Unlabelled and indented blocks pass through untouched.
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                    if code_lang.is_none() && language_token(info).is_some() =>
                {
                    code_lang = language_token(info).map(str::to_string);
                    code_content.clear();
                }
                Event::Text(text) if code_lang.is_some() => {
                    code_content.push_str(&text);
                }
                Event::End(TagEnd::CodeBlock) if code_lang.is_some() => {
                    if let Some(lang) = code_lang.take() {
                        let highlighted = self.highlight_code(&code_content, &lang);
                        result.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                other => result.push(other),
            }
        }

        result
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let ss = syntax_set();
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, ss, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!("Highlighting {} failed: {}", lang, err);
                return plain_code_block(code, lang);
            }
        }

        format!(
            "<pre class=\"code\"><code class=\"language-{}\">{}</code></pre>\n",
            html_escape(lang),
            generator.finalize()
        )
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of a fence info string ("rust ignore" -> "rust")
fn language_token(info: &str) -> Option<&str> {
    info.split_whitespace().next().filter(|s| !s.is_empty())
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        "<pre class=\"code\"><code class=\"language-{}\">{}</code></pre>\n",
        html_escape(lang),
        html_escape(code)
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
