//! Batch description enhancement.
//!
//! Sends each selected product to a [`DescriptionGenerator`], one at a time and
//! in catalog order, and collects the replacement descriptions. The first
//! failure aborts the batch.

use std::future::Future;

use tracing::{debug, error, info, instrument};

use descenhancer_shared::{EnhancedDescription, ProductRecord, Result};

// ---------------------------------------------------------------------------
// Generator capability
// ---------------------------------------------------------------------------

/// Produces a new long-form description for a product.
///
/// Implemented by the HTTP client in `descenhancer-generation`, and by any
/// `Fn(&ProductRecord) -> Result<String>` closure.
pub trait DescriptionGenerator {
    fn generate(&self, product: &ProductRecord) -> impl Future<Output = Result<String>> + Send;
}

impl<F> DescriptionGenerator for F
where
    F: Fn(&ProductRecord) -> Result<String> + Sync,
{
    async fn generate(&self, product: &ProductRecord) -> Result<String> {
        self(product)
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Enhance every record, strictly in order.
///
/// A generator error is logged and returned as-is; records after the failing
/// one are never sent.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn run_batch<G: DescriptionGenerator>(
    records: &[&ProductRecord],
    generator: &G,
    progress: &dyn EnhanceProgress,
) -> Result<Vec<EnhancedDescription>> {
    let total = records.len();
    let mut results = Vec::with_capacity(total);

    for (i, product) in records.iter().enumerate() {
        progress.record_started(i + 1, total, &product.name);

        let enhanced = match generator.generate(product).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    product = %product.name,
                    position = i + 1,
                    error = %e,
                    "enhancement failed, aborting batch"
                );
                return Err(e);
            }
        };

        info!(product = %product.name, chars = enhanced.len(), "description enhanced");
        debug!(product = %product.name, description = %enhanced, "generated text");
        results.push(EnhancedDescription {
            name: product.name.clone(),
            enhanced_description: enhanced,
        });
    }

    info!(enhanced = results.len(), "batch complete");
    Ok(results)
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for batch enhancement.
pub trait EnhanceProgress: Send + Sync {
    /// Called before each record is sent to the generator.
    fn record_started(&self, current: usize, total: usize, name: &str);
}

/// No-op enhancement progress.
pub struct SilentEnhanceProgress;

impl EnhanceProgress for SilentEnhanceProgress {
    fn record_started(&self, _current: usize, _total: usize, _name: &str) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
