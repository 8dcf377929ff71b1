//! URL-safe slugs for heading anchors and category/tag routes.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

fn hyphen_runs() -> &'static Regex {
    HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").expect("hyphen regex is valid"))
}

/// Convert a string to a URL-safe slug
///
/// Lowercases, turns whitespace and underscores into hyphens, drops
/// punctuation (unicode letters are kept) and trims stray hyphens.
///
/// # Examples
///
/// ```
/// use notegen_core::slugify;
///
/// assert_eq!(slugify("Linear Algebra"), "linear-algebra");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| match g {
            " " | "_" | "\t" | "\n" | "/" => Some("-"),
            _ => {
                let c = g.chars().next()?;
                (c.is_alphanumeric() || c == '-').then_some(g)
            }
        })
        .collect::<String>();

    hyphen_runs()
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Slugify `input`, suffixing `-2`, `-3`, ... until it isn't in `taken`.
///
/// Names that slugify to nothing (e.g. "!!!") use `fallback` as the base.
pub fn unique_slug(input: &str, fallback: &str, taken: &mut HashSet<String>) -> String {
    let mut base = slugify(input);
    if base.is_empty() {
        base = fallback.to_string();
    }

    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Node.js Tips"), "nodejs-tips");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("hello_world"), "hello-world");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(slugify("Café"), "café");
        assert_eq!(slugify("Álgebra Lineal"), "álgebra-lineal");
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(slugify("  Hello    World  "), "hello-world");
        assert_eq!(slugify("-Leading / Trailing-"), "leading-trailing");
    }

    #[test]
    fn test_empty_and_special_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_unique_slug() {
        let mut taken = HashSet::new();
        assert_eq!(unique_slug("C++", "group", &mut taken), "c");
        assert_eq!(unique_slug("C", "group", &mut taken), "c-2");
        assert_eq!(unique_slug("c#", "group", &mut taken), "c-3");
        assert_eq!(unique_slug("???", "group", &mut taken), "group");
        assert_eq!(unique_slug("!!", "group", &mut taken), "group-2");
    }
}
