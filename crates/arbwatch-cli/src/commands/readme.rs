//! `arbwatch readme`: render, update, and validate the status README.

use std::path::Path;

use arbwatch_content::placeholders::{self, Report};
use arbwatch_content::readme::{self, HistoryMap, RenderOptions, catalog_ids};
use arbwatch_core::{HistoryStore, catalog};

use super::AppContext;
use crate::cli::ReadmeAction;
use crate::error::{Error, Result};

/// Dispatch a `readme` subcommand.
pub fn run(ctx: &AppContext, action: ReadmeAction) -> Result<()> {
    match action {
        ReadmeAction::Generate { output, template } => {
            let count = generate(&ctx.history_store(), &output, template)?;
            println!("Wrote {} ({count} variants with history)", output.display());
            Ok(())
        }
        ReadmeAction::Update { file } => {
            let path = file.unwrap_or_else(|| ctx.config.paths.readme.clone());
            let count = update(&ctx.history_store(), &path)?;
            println!("Updated {count} variants in {}", path.display());
            Ok(())
        }
        ReadmeAction::Check { file, catalog } => {
            let path = file.unwrap_or_else(|| ctx.config.paths.readme.clone());
            let report = check(&path, catalog)?;
            print!("{}", format_report(&report));
            if report.is_ok() {
                Ok(())
            } else {
                Err(Error::failed(format!(
                    "{} placeholder violations in {}",
                    report.violations.len(),
                    path.display()
                )))
            }
        }
    }
}

/// Load every history file, or nothing when the directory is absent.
fn load_histories(store: &HistoryStore) -> Result<HistoryMap> {
    if store.exists() {
        Ok(store.load_all()?)
    } else {
        Ok(HistoryMap::new())
    }
}

/// Render the README into `output`. Returns the number of variants with
/// history. Outside template mode the history directory must exist.
pub fn generate(store: &HistoryStore, output: &Path, template: bool) -> Result<usize> {
    if !template && !store.exists() {
        return Err(Error::failed(format!(
            "History directory not found: {}",
            store.dir().display()
        )));
    }
    let histories = load_histories(store)?;
    log::info!("Loaded {} history files", histories.len());

    let text = readme::render(
        catalog::devices(),
        &histories,
        RenderOptions {
            all_variants: template,
        },
    );
    std::fs::write(output, text).map_err(|e| Error::io_with_path(e, output))?;
    Ok(histories.len())
}

/// Rewrite the markers of `path` in place. Returns the number of ids
/// touched.
pub fn update(store: &HistoryStore, path: &Path) -> Result<usize> {
    let document = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let histories = load_histories(store)?;
    let (next, count) = readme::update(&document, &histories)?;
    if next != document {
        std::fs::write(path, next).map_err(|e| Error::io_with_path(e, path))?;
    } else {
        log::info!("{} already up to date", path.display());
    }
    Ok(count)
}

/// Validate the placeholder contract of `path`. With `require_catalog`
/// every catalog variant must have a full marker set.
pub fn check(path: &Path, require_catalog: bool) -> Result<Report> {
    let document = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let expected = if require_catalog {
        catalog_ids(catalog::devices())
    } else {
        Vec::new()
    };
    Ok(placeholders::validate(&document, &expected))
}

/// Human-readable report.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    for violation in &report.violations {
        out.push_str(&format!("{violation}\n"));
    }
    out.push_str(&format!(
        "Checked {} ids: {} violations\n",
        report.ids.len(),
        report.violations.len()
    ));
    out
}
