//! Stylesheets embedded into the binary.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir, DirEntry};
use std::fs;
use std::path::Path;

// Embedded at compile time so it's available after cargo install
static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Path of the generated syntax highlighting stylesheet
pub const HIGHLIGHT_CSS: &str = "highlight.css";

/// Write every embedded asset below `dest`, keeping relative paths
pub fn write_static_assets(dest: &Path) -> Result<usize> {
    let mut written = 0;
    for entry in STATIC_ASSETS.entries() {
        written += extract_entry(entry, dest)?;
    }
    Ok(written)
}

fn extract_entry(entry: &DirEntry, dest: &Path) -> Result<usize> {
    match entry {
        DirEntry::Dir(dir) => {
            let mut written = 0;
            for sub_entry in dir.entries() {
                written += extract_entry(sub_entry, dest)?;
            }
            Ok(written)
        }
        DirEntry::File(file) => {
            let target = dest.join(file.path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file.contents())
                .with_context(|| format!("Failed to write embedded asset to {:?}", target))?;
            Ok(1)
        }
    }
}

/// Embedded asset at a site-relative path such as "static/style.css"
pub fn static_file(path: &str) -> Option<&'static [u8]> {
    STATIC_ASSETS.get_file(path).map(|f| f.contents())
}

/// Syntax highlighting CSS for the classes the markdown renderer emits
pub fn highlight_css() -> Result<String> {
    notegen_core::highlight_css().context("Failed to generate highlight.css")
}

pub fn content_type_for_path(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}
