//! Static export: every route rendered to a file under the output directory.

use super::load_config;
use crate::assets;
use anyhow::{bail, Context, Result};
use notegen_core::{Config, NoteIndex, Route};
use notegen_render::SiteRenderer;
use std::fs;
use std::path::Path;

/// Outcome of a static export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub failures: usize,
}

/// Build the static site described by the config file
pub fn build_site(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let summary = build_site_with_config(&config)?;
    if summary.failures > 0 {
        bail!("{} of {} pages failed to build", summary.failures, summary.pages + summary.failures);
    }
    Ok(())
}

/// Index the content root and write every page, the 404 page and assets.
///
/// A page that fails to render or write is logged and counted; the export
/// carries on with the remaining pages.
pub fn build_site_with_config(config: &Config) -> Result<BuildSummary> {
    tracing::info!("Building site: {}", config.site.title);

    let content_dir = config.content_dir();
    let index = NoteIndex::build(&content_dir, &config.index_options())
        .with_context(|| format!("Failed to index {:?}", content_dir))?;

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let renderer = SiteRenderer::from_config(config);
    let query = index.query();
    let mut summary = BuildSummary {
        pages: 0,
        failures: 0,
    };

    for route in query.routes() {
        match render_page(&renderer, &index, &route, &output_dir) {
            Ok(()) => summary.pages += 1,
            Err(err) => {
                tracing::error!("Failed to build {}: {:#}", route.output_rel_path(), err);
                summary.failures += 1;
            }
        }
    }

    let not_found = renderer
        .render_not_found()
        .context("Failed to render 404 page")?;
    write_output(&output_dir.join("404.html"), &not_found)?;

    let assets = assets::write_static_assets(&output_dir)?;
    write_output(&output_dir.join(assets::HIGHLIGHT_CSS), &assets::highlight_css()?)?;
    tracing::debug!("Wrote {} static assets", assets);

    for diagnostic in index.diagnostics() {
        tracing::warn!("{}: {}", diagnostic.code, diagnostic.message);
    }

    tracing::info!("✓ Built {} pages from {} notes", summary.pages, index.len());
    tracing::info!("✓ Output written to {:?}", output_dir);

    Ok(summary)
}

fn render_page(
    renderer: &SiteRenderer,
    index: &NoteIndex,
    route: &Route,
    output_dir: &Path,
) -> Result<()> {
    let html = renderer
        .render_route(&index.query(), route)?
        .with_context(|| format!("Nothing to render for {:?}", route))?;
    write_output(&output_dir.join(route.output_rel_path()), &html)?;
    tracing::debug!("Rendered: {}", route.output_rel_path());
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
