//! Validation and normalization of note frontmatter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical date format used in frontmatter and filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const RECOGNIZED_KEYS: [&str; 4] = ["title", "date", "category", "tags"];

/// An explicitly declared metadata value has the wrong shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} in {}: {message}", .path.display())]
pub struct ContentValidationError {
    pub path: PathBuf,
    pub field: String,
    pub message: String,
}

impl ContentValidationError {
    pub fn new(path: &Path, field: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Recognized metadata after validation; `None` means the key was absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteMetadata {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub extra: Mapping,
}

/// Validate the recognized keys of a frontmatter mapping.
///
/// Absent (or null) keys are left as `None` so the caller can fill defaults;
/// present keys of the wrong shape are rejected.
pub fn normalize_metadata(
    raw: &Mapping,
    path: &Path,
) -> Result<NoteMetadata, ContentValidationError> {
    let title = match raw.get("title") {
        Some(value) => text_field(value, "title", path)?,
        None => None,
    };

    let category = match raw.get("category") {
        Some(value) => text_field(value, "category", path)?,
        None => None,
    };

    let date = match raw.get("date") {
        Some(Value::Null) | None => None,
        Some(Value::String(s)) => Some(parse_date_value(s).ok_or_else(|| {
            ContentValidationError::new(path, "date", format!("'{}' is not a YYYY-MM-DD date", s))
        })?),
        Some(other) => {
            return Err(ContentValidationError::new(
                path,
                "date",
                format!("expected a YYYY-MM-DD date, found {}", describe(other)),
            ))
        }
    };

    let tags = match raw.get("tags") {
        Some(value) => normalize_tags(value, path)?,
        None => Vec::new(),
    };

    let extra = raw
        .iter()
        .filter(|(key, _)| {
            key.as_str()
                .map_or(true, |k| !RECOGNIZED_KEYS.contains(&k))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(NoteMetadata {
        title,
        date,
        category,
        tags,
        extra,
    })
}

/// Parse a `YYYY-MM-DD` date.
///
/// ```
/// use notegen_core::metadata::parse_date;
///
/// assert!(parse_date("2024-01-31").is_some());
/// assert!(parse_date("not-a-date").is_none());
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Accept a plain date or a full timestamp, keeping only the calendar date
fn parse_date_value(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    parse_date(s)
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn text_field(
    value: &Value,
    field: &str,
    path: &Path,
) -> Result<Option<String>, ContentValidationError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(ContentValidationError::new(
                path,
                field,
                format!("expected text, found {}", describe(other)),
            ))
        }
    };

    // Blank values fall back to the default like missing ones
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn normalize_tags(value: &Value, path: &Path) -> Result<Vec<String>, ContentValidationError> {
    let raw: Vec<String> = match value {
        Value::Null => Vec::new(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Null => {}
                    Value::String(s) => out.push(s.clone()),
                    Value::Number(n) => out.push(n.to_string()),
                    Value::Bool(b) => out.push(b.to_string()),
                    other => {
                        return Err(ContentValidationError::new(
                            path,
                            "tags",
                            format!("tag entries must be text, found {}", describe(other)),
                        ))
                    }
                }
            }
            out
        }
        other => {
            return Err(ContentValidationError::new(
                path,
                "tags",
                format!(
                    "expected a list or comma-separated string, found {}",
                    describe(other)
                ),
            ))
        }
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn normalize(yaml: &str) -> Result<NoteMetadata, ContentValidationError> {
        normalize_metadata(&mapping(yaml), Path::new("content/test.md"))
    }

    #[test]
    fn test_full_metadata() {
        let meta = normalize(
            "title: Limits\ndate: 2024-02-01\ncategory: math\ntags: [Calculus, ' Analysis ']\n",
        )
        .unwrap();

        assert_eq!(meta.title.as_deref(), Some("Limits"));
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(meta.category.as_deref(), Some("math"));
        assert_eq!(meta.tags, vec!["calculus", "analysis"]);
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let meta = normalize("author: Ada\n").unwrap();
        assert_eq!(meta.title, None);
        assert_eq!(meta.date, None);
        assert_eq!(meta.category, None);
        assert!(meta.tags.is_empty());
        assert_eq!(
            meta.extra.get("author").and_then(Value::as_str),
            Some("Ada")
        );
    }

    #[test]
    fn test_comma_separated_tags() {
        let meta = normalize("tags: 'X, y ,, Rust,x'\n").unwrap();
        assert_eq!(meta.tags, vec!["x", "y", "rust"]);
    }

    #[test]
    fn test_timestamp_is_truncated_to_date() {
        let meta = normalize("date: 2024-03-05T10:30:00+02:00\n").unwrap();
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 5));

        let meta = normalize("date: '2024-03-05 10:30:00'\n").unwrap();
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = normalize("date: not-a-date\n").unwrap_err();
        assert_eq!(err.field, "date");
        assert_eq!(err.path, PathBuf::from("content/test.md"));

        let err = normalize("date: 20240101\n").unwrap_err();
        assert_eq!(err.field, "date");

        assert!(normalize("date: 2024-02-30\n").is_err());
    }

    #[test]
    fn test_malformed_title_and_category() {
        assert_eq!(normalize("title: [a, b]\n").unwrap_err().field, "title");
        assert_eq!(
            normalize("category: {a: 1}\n").unwrap_err().field,
            "category"
        );
        assert_eq!(normalize("tags: {a: 1}\n").unwrap_err().field, "tags");
    }

    #[test]
    fn test_scalar_titles_are_stringified() {
        let meta = normalize("title: 42\ncategory: ''\n").unwrap();
        assert_eq!(meta.title.as_deref(), Some("42"));
        assert_eq!(meta.category, None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2024-01-31 "), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(parse_date("31/01/2024"), None);
    }
}
