//! Serve the site straight from the in-memory index, with JSON APIs.

use super::load_config;
use crate::api::{self, ListData, NoteSummary, SearchData};
use crate::assets;
use anyhow::{Context, Result};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notegen_core::{FilterParams, NoteFilter, NoteLibrary, Route};
use notegen_render::SiteRenderer;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    library: Arc<NoteLibrary>,
    renderer: Arc<SiteRenderer>,
    related_limit: usize,
}

/// Start the server, optionally rebuilding the index on content changes
pub async fn serve(config_path: &Path, port: Option<u16>, watch: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let port = port.unwrap_or(config.server.port);
    let content_dir = config.content_dir();

    let library = NoteLibrary::open(&content_dir, config.index_options())
        .with_context(|| format!("Failed to index {:?}", content_dir))?;
    let library = Arc::new(library);

    // Keep the watcher alive for as long as the server runs
    let _watcher = if watch {
        Some(watch_content(library.clone())?)
    } else {
        None
    };

    let state = AppState {
        library,
        renderer: Arc::new(SiteRenderer::from_config(&config)),
        related_limit: config.related_limit,
    };
    let app = router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let site_url = format!("http://{}{}", addr, config.normalized_base_url());
    tracing::info!("Serving {} at {}", config.site.title, site_url);
    println!("\nServing at {}", site_url);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(api_search))
        .route("/api/notes", get(api_notes))
        .route("/api/note/{*url}", get(api_note))
        .route("/", get(serve_root))
        .route("/{*path}", get(serve_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch the content root and refresh the library after each burst of events
fn watch_content(library: Arc<NoteLibrary>) -> Result<RecommendedWatcher> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize file watcher")?;

    watcher
        .watch(library.root(), RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", library.root()))?;
    tracing::info!("Watching {:?} for changes", library.root());

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Ok(_ev) => {
                    // Debounce a bit by draining pending events
                    while rx.try_recv().is_ok() {}
                    tracing::info!("Change detected, rebuilding index...");
                    let res = tokio::task::spawn_blocking({
                        let library = library.clone();
                        move || library.refresh()
                    })
                    .await;

                    match res {
                        Ok(Ok(index)) => tracing::info!("Rebuild complete: {} notes", index.len()),
                        Ok(Err(e)) => tracing::error!("Rebuild failed: {}", e),
                        Err(e) => tracing::error!("Rebuild task panicked: {}", e),
                    }
                }
                Err(err) => tracing::warn!("Watcher error: {}", err),
            }
        }
    });

    Ok(watcher)
}

async fn serve_root(State(state): State<AppState>) -> Response {
    render_path(&state, "")
}

async fn serve_path(State(state): State<AppState>, AxumPath(path): AxumPath<String>) -> Response {
    render_path(&state, &path)
}

/// Resolve a request path below the base url to an asset or a page
fn render_path(state: &AppState, path: &str) -> Response {
    let base = state.renderer.base_url().trim_start_matches('/');
    let Some(rel) = strip_base(path, base) else {
        return not_found(state);
    };

    if rel == assets::HIGHLIGHT_CSS {
        return match assets::highlight_css() {
            Ok(css) => ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response(),
            Err(err) => internal_error(err),
        };
    }
    if let Some(bytes) = assets::static_file(rel) {
        return ([(header::CONTENT_TYPE, assets::content_type_for_path(rel))], bytes)
            .into_response();
    }

    let Some(route) = Route::parse(rel) else {
        return not_found(state);
    };

    let index = state.library.snapshot();
    match state.renderer.render_route(&index.query(), &route) {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => not_found(state),
        Err(err) => internal_error(err),
    }
}

/// `base` is the base url without its leading slash, e.g. "" or "blog/"
fn strip_base<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return Some(path);
    }
    if path == base.trim_end_matches('/') {
        return Some("");
    }
    path.strip_prefix(base)
}

fn not_found(state: &AppState) -> Response {
    match state.renderer.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    tracing::error!("Request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

// ---- API handlers ----

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

async fn api_search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(10);

    let index = state.library.snapshot();
    let results = index.query().search(&query);
    let total = results.len();

    let payload = api::envelope(
        "search.results",
        SearchData {
            query,
            limit,
            total,
            results: results.into_iter().take(limit).map(NoteSummary::from).collect(),
        },
    );
    Json(payload).into_response()
}

async fn api_notes(State(state): State<AppState>, Query(params): Query<FilterParams>) -> Response {
    let filter = match NoteFilter::from_params(&params) {
        Ok(filter) => filter,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    let index = state.library.snapshot();
    let notes = index.query().filter(&filter);
    let payload = api::envelope(
        "notes.list",
        ListData {
            total: notes.len(),
            notes: notes.into_iter().map(NoteSummary::from).collect(),
        },
    );
    Json(payload).into_response()
}

async fn api_note(State(state): State<AppState>, AxumPath(url): AxumPath<String>) -> Response {
    let index = state.library.snapshot();
    let query = index.query();
    match query.get_by_url(&url) {
        Some(note) => {
            let payload = api::envelope(
                "note.full",
                api::note_to_payload(&query, note, state.related_limit),
            );
            match serde_json::to_string(&payload) {
                Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
                Err(err) => internal_error(err),
            }
        }
        None => (StatusCode::NOT_FOUND, format!("Note '{}' not found", url)).into_response(),
    }
}
