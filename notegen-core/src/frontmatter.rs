//! Frontmatter splitting for markdown files.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?sm)\A---[ \t]*\r?\n(.*?)^---[ \t\r]*$\n?(.*)\z")
            .expect("frontmatter regex is valid")
    })
}

/// Split a document into its frontmatter mapping and markdown body.
///
/// The block must open on the first line with `---` and close with another
/// `---` line. Without a block the whole document is body and the mapping is
/// empty; an empty block is an empty mapping.
///
/// # Example
///
/// ```
/// use notegen_core::frontmatter::split_frontmatter;
///
/// let content = "---\ntitle: Limits\ncategory: math\n---\n# Limits\n";
///
/// let (meta, body) = split_frontmatter(content).unwrap();
/// assert_eq!(meta.get("title").and_then(|v| v.as_str()), Some("Limits"));
/// assert_eq!(body, "# Limits\n");
/// ```
pub fn split_frontmatter(content: &str) -> Result<(Mapping, String), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Mapping::new(), content.to_string()));
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let metadata = if yaml.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        }
    };

    Ok((metadata, body.to_string()))
}
