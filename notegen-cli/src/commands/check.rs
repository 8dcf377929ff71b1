//! Report content problems without writing any output.

use super::load_index;
use crate::api::{self, CheckData};
use anyhow::{bail, Result};
use notegen_core::DiagnosticSeverity;
use std::path::Path;

/// Index the content root and list the files that were left out.
///
/// Fails when any diagnostic was recorded, so scripts can gate on it.
pub fn check_content(config_path: &Path, json: bool) -> Result<()> {
    let (_config, index) = load_index(config_path)?;

    let diagnostics = index.diagnostics();
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    if json {
        let payload = api::envelope(
            "check.report",
            CheckData {
                notes: index.len(),
                errors,
                warnings,
                diagnostics,
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Check complete: {} notes, {} errors, {} warnings",
            index.len(),
            errors,
            warnings
        );
        for diag in diagnostics {
            println!(
                "- {:?} {} ({}): {}",
                diag.severity,
                diag.code,
                diag.source_path.display(),
                diag.message
            );
        }
    }

    if !diagnostics.is_empty() {
        bail!("{} files could not be indexed", diagnostics.len());
    }
    Ok(())
}
