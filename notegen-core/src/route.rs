//! Pages of the generated site and their output paths.

use serde::Serialize;

/// One page of the site.
///
/// Note routes carry the note url without its leading slash; category and
/// tag routes carry the group slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum Route {
    Index,
    Categories,
    Tags,
    Note(String),
    Category(String),
    Tag(String),
}

impl Route {
    /// Route for a note url such as "/math/limits"
    pub fn note(url: &str) -> Self {
        Route::Note(url.trim_matches('/').to_string())
    }

    /// File the page is written to, relative to the output directory
    pub fn output_rel_path(&self) -> String {
        match self {
            Route::Index => "index.html".to_string(),
            Route::Categories => "categories.html".to_string(),
            Route::Tags => "tags.html".to_string(),
            Route::Note(key) => format!("notes/{}.html", key),
            Route::Category(slug) => format!("category/{}.html", slug),
            Route::Tag(slug) => format!("tag/{}.html", slug),
        }
    }

    /// Link to the page under `base_url` (which must end with a slash).
    ///
    /// Each path segment is percent-encoded, so a note file such as
    /// `C# basics.md` links to `notes/C%23%20basics.html`.
    pub fn href(&self, base_url: &str) -> String {
        match self {
            Route::Index => base_url.to_string(),
            other => {
                let rel = other.output_rel_path();
                let encoded: Vec<_> = rel.split('/').map(urlencoding::encode).collect();
                format!("{}{}", base_url, encoded.join("/"))
            }
        }
    }

    /// Map a request path back to a route.
    ///
    /// Accepts paths with or without a leading slash and `.html` suffix.
    ///
    /// ```
    /// use notegen_core::Route;
    ///
    /// assert_eq!(Route::parse("/"), Some(Route::Index));
    /// assert_eq!(Route::parse("/tag/rust.html"), Some(Route::Tag("rust".into())));
    /// assert_eq!(Route::parse("notes/math/limits"), Some(Route::Note("math/limits".into())));
    /// assert_eq!(Route::parse("/favicon.ico"), None);
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim().trim_matches('/');
        let path = path.strip_suffix(".html").unwrap_or(path);

        match path {
            "" | "index" => return Some(Route::Index),
            "categories" => return Some(Route::Categories),
            "tags" => return Some(Route::Tags),
            _ => {}
        }

        let (prefix, rest) = path.split_once('/')?;
        let rest = rest.trim_matches('/');
        if rest.is_empty() {
            return None;
        }

        match prefix {
            "notes" => Some(Route::Note(rest.to_string())),
            "category" if !rest.contains('/') => Some(Route::Category(rest.to_string())),
            "tag" if !rest.contains('/') => Some(Route::Tag(rest.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        assert_eq!(Route::Index.output_rel_path(), "index.html");
        assert_eq!(Route::note("/a/b").output_rel_path(), "notes/a/b.html");
        assert_eq!(Route::Category("math".into()).output_rel_path(), "category/math.html");
        assert_eq!(Route::Tag("x".into()).output_rel_path(), "tag/x.html");
    }

    #[test]
    fn test_parse_inverts_output_path() {
        let routes = [
            Route::Index,
            Route::Categories,
            Route::Tags,
            Route::note("/math/limits"),
            Route::note("/v1.2"),
            Route::Category("linear-algebra".into()),
            Route::Tag("rust".into()),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.output_rel_path()), Some(route.clone()));
            assert_eq!(Route::parse(&route.href("/")), Some(route));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_paths() {
        assert_eq!(Route::parse("/static/style.css"), None);
        assert_eq!(Route::parse("/notes/"), None);
        assert_eq!(Route::parse("/tag/a/b"), None);
    }

    #[test]
    fn test_href_with_base() {
        assert_eq!(Route::Index.href("/blog/"), "/blog/");
        assert_eq!(Route::Tags.href("/blog/"), "/blog/tags.html");
    }

    #[test]
    fn test_href_percent_encodes_note_names() {
        let route = Route::note("/langs/C# basics?");
        assert_eq!(route.output_rel_path(), "notes/langs/C# basics?.html");
        assert_eq!(route.href("/"), "/notes/langs/C%23%20basics%3F.html");

        // the server sees the decoded request path
        assert_eq!(Route::parse("notes/langs/C# basics?.html"), Some(route));
    }
}
