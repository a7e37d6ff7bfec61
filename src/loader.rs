//! Chunked bulk loading.

use tracing::info;

use crate::{Backend, Config, Entry, MetricsSink};

/// Splits a load into batches of at most `batch_size` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkLoader {
    batch_size: usize,
}

/// What one [`BulkLoader::load`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub entries: usize,
    pub batches: usize,
}

impl BulkLoader {
    /// `0` means one batch for the whole load.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.load_batch_size)
    }

    /// Feed `entries` to `backend` in order, one sink record per batch.
    pub fn load(
        &self,
        backend: &mut dyn Backend,
        entries: &[Entry],
        sink: &mut dyn MetricsSink,
    ) -> LoadSummary {
        let mut summary = LoadSummary::default();
        if entries.is_empty() {
            return summary;
        }
        let chunk = match self.batch_size {
            0 => entries.len(),
            n => n,
        };
        for batch in entries.chunks(chunk) {
            summary.entries += backend.bulk_load(batch, sink);
            summary.batches += 1;
        }
        info!(
            backend = %backend.kind(),
            entries = summary.entries,
            batches = summary.batches,
            "bulk load finished"
        );
        summary
    }
}

impl Default for BulkLoader {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
