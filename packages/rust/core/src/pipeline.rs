//! End-to-end enhancement run: scope → selected records → batch → CSV + manifest.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use descenhancer_shared::{
    CURRENT_SCHEMA_VERSION, EnhancedDescription, ProductRecord, Result, RunId, RunManifest,
    Scope,
};

use crate::enhance::{self, DescriptionGenerator, EnhanceProgress};
use crate::scope;

/// Configuration for an enhancement run.
#[derive(Debug, Clone)]
pub struct EnhanceConfig {
    /// Catalog the records came from (recorded in the manifest).
    pub products_path: PathBuf,
    /// CSV file receiving the enhanced descriptions.
    pub output_path: PathBuf,
    /// Model name (recorded in the manifest).
    pub model: String,
    /// Tool version string.
    pub tool_version: String,
}

/// The records a run will touch, fixed before the operator confirms.
#[derive(Debug, Clone)]
pub struct EnhancePlan<'a> {
    pub scope: Scope,
    pub records: Vec<&'a ProductRecord>,
}

impl<'a> EnhancePlan<'a> {
    /// Select the records covered by `scope`, preserving catalog order.
    pub fn new(records: &'a [ProductRecord], scope: Scope) -> Self {
        let selected = scope::select(records, &scope);
        Self {
            scope,
            records: selected,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a finished run.
#[derive(Debug)]
pub struct EnhanceResult {
    pub run_id: RunId,
    pub scope: Scope,
    /// Number of descriptions written.
    pub record_count: usize,
    pub output_path: PathBuf,
    pub manifest_path: PathBuf,
    /// The rows written, in plan order.
    pub descriptions: Vec<EnhancedDescription>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each product is sent for generation.
    fn product_started(&self, name: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, result: &EnhanceResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn product_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &EnhanceResult) {}
}

/// Run a confirmed plan.
///
/// 1. Generate descriptions (fail-fast)
/// 2. Write the output CSV
/// 3. Write the run manifest beside it
///
/// Nothing is written unless every record in the plan succeeded.
#[instrument(skip_all, fields(scope = %plan.scope, records = plan.len()))]
pub async fn enhance<G: DescriptionGenerator>(
    config: &EnhanceConfig,
    plan: &EnhancePlan<'_>,
    generator: &G,
    progress: &dyn ProgressReporter,
) -> Result<EnhanceResult> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();

    info!(%run_id, output = %config.output_path.display(), "starting enhancement run");

    // --- Phase 1: Generate ---
    progress.phase("Generating descriptions");
    let enhance_progress = PipelineEnhanceProgress { inner: progress };
    let rows = enhance::run_batch(&plan.records, generator, &enhance_progress).await?;

    // --- Phase 2: Persist ---
    progress.phase("Writing results");
    descenhancer_catalog::write_enhanced(&config.output_path, &rows)?;

    let manifest_path = descenhancer_catalog::manifest_path_for(&config.output_path);
    let manifest = RunManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        id: run_id.clone(),
        scope: plan.scope.clone(),
        source_path: config.products_path.display().to_string(),
        output_path: config.output_path.display().to_string(),
        model: config.model.clone(),
        record_count: rows.len(),
        tool_version: config.tool_version.clone(),
        started_at,
        finished_at: Utc::now(),
    };
    descenhancer_catalog::write_run_manifest(&manifest_path, &manifest)?;

    let result = EnhanceResult {
        run_id,
        scope: plan.scope.clone(),
        record_count: rows.len(),
        output_path: config.output_path.clone(),
        manifest_path,
        descriptions: rows,
        elapsed: start.elapsed(),
    };

    info!(
        run_id = %result.run_id,
        records = result.record_count,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "enhancement run complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Adapter forwarding batch progress to the pipeline's reporter.
struct PipelineEnhanceProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl EnhanceProgress for PipelineEnhanceProgress<'_> {
    fn record_started(&self, current: usize, total: usize, name: &str) {
        self.inner.product_started(name, current, total);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
