//! Tabular persistence for product catalogs.
//!
//! Products come in as CSV rows (`name`, `short_description`, `description`,
//! `categories`); enhanced descriptions go out as `name,enhanced_description`
//! rows. Each finished run also leaves a JSON [`RunManifest`] beside its output.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use descenhancer_shared::{EnhancedDescription, EnhancerError, ProductRecord, Result, RunManifest};
use tracing::{debug, info, instrument};

/// Columns a catalog must carry for category selection to work.
const REQUIRED_COLUMNS: [&str; 2] = ["name", "categories"];

/// Header row of the output file.
const OUTPUT_COLUMNS: [&str; 2] = ["name", "enhanced_description"];

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Load every product row from the CSV file at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    let file = File::open(path).map_err(|e| EnhancerError::io(path, e))?;

    let products = read_products(file).map_err(|e| match e {
        EnhancerError::Catalog(msg) => {
            EnhancerError::Catalog(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;

    info!(count = products.len(), "loaded product catalog");
    Ok(products)
}

/// Parse product rows from any CSV source, in file order.
pub fn read_products<R: Read>(reader: R) -> Result<Vec<ProductRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| EnhancerError::Catalog(format!("failed to read header row: {e}")))?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(EnhancerError::Catalog(format!(
                "missing required column '{column}'"
            )));
        }
    }

    let mut products = Vec::new();
    for row in rdr.deserialize::<ProductRecord>() {
        let record = row.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "?".into());
            EnhancerError::Catalog(format!("bad row at line {line}: {e}"))
        })?;
        products.push(record);
    }

    debug!(count = products.len(), "parsed product rows");
    Ok(products)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write enhanced descriptions to `path`, creating parent directories.
///
/// An existing file is replaced.
#[instrument(skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_enhanced(path: &Path, rows: &[EnhancedDescription]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| EnhancerError::io(path, e))?;
    write_enhanced_to(file, rows)?;
    info!("wrote enhanced descriptions");
    Ok(())
}

/// Serialize enhanced descriptions as CSV into `writer`.
///
/// The header row is always written, even for an empty batch.
pub fn write_enhanced_to<W: Write>(writer: W, rows: &[EnhancedDescription]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(OUTPUT_COLUMNS)
        .map_err(|e| EnhancerError::Catalog(format!("failed to write header: {e}")))?;
    for row in rows {
        wtr.serialize(row).map_err(|e| {
            EnhancerError::Catalog(format!("failed to write row for '{}': {e}", row.name))
        })?;
    }

    wtr.flush()
        .map_err(|e| EnhancerError::Catalog(format!("failed to flush output: {e}")))
}

/// Path of the run manifest that accompanies an output file
/// (`enhanced_products.csv` → `enhanced_products.run.json`).
pub fn manifest_path_for(output: &Path) -> PathBuf {
    output.with_extension("run.json")
}

/// Write a run manifest as pretty-printed JSON.
pub fn write_run_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| EnhancerError::Catalog(format!("failed to serialize run manifest: {e}")))?;
    std::fs::write(path, json).map_err(|e| EnhancerError::io(path, e))?;
    debug!(path = %path.display(), run = %manifest.id, "wrote run manifest");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| EnhancerError::io(parent, e))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
