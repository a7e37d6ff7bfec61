//! In-memory performance journals.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use echt::{BackendKind, LoadRecord, MetricsSink, ResolveKind, ResolveRecord};
use tracing::info;

/// One bulk-load batch, with running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRow {
    pub cumulative_batch_size: usize,
    pub batch_size: usize,
    pub started: SystemTime,
    pub finished: SystemTime,
    pub duration: Duration,
    pub cumulative_duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRow {
    pub count: usize,
    pub duration: Duration,
}

/// Collects load and resolve measurements for one backend.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    backend: Option<BackendKind>,
    load: Vec<LoadRow>,
    resolve: BTreeMap<ResolveKind, Vec<ResolveRow>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend of the first recorded measurement.
    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    pub fn load_rows(&self) -> &[LoadRow] {
        &self.load
    }

    pub fn resolve_rows(&self, kind: ResolveKind) -> &[ResolveRow] {
        self.resolve.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_loaded(&self) -> usize {
        self.load.last().map_or(0, |row| row.cumulative_batch_size)
    }

    pub fn total_load_duration(&self) -> Duration {
        self.load.last().map_or(Duration::ZERO, |row| row.cumulative_duration)
    }

    /// Queries resolved and time spent, summed over every batch of `kind`.
    pub fn total_resolved(&self, kind: ResolveKind) -> (usize, Duration) {
        self.resolve_rows(kind)
            .iter()
            .fold((0, Duration::ZERO), |(count, duration), row| {
                (count + row.count, duration + row.duration)
            })
    }

    pub fn clear_resolves(&mut self) {
        self.resolve.clear();
    }

    pub fn log_summary(&self) {
        let backend = self.backend.map_or("unknown", BackendKind::name);
        info!(
            backend,
            records = self.total_loaded(),
            batches = self.load.len(),
            duration = ?self.total_load_duration(),
            "load totals"
        );
        for kind in ResolveKind::ALL {
            let (count, duration) = self.total_resolved(kind);
            if count > 0 {
                info!(backend, kind = kind.label(), count, duration = ?duration, "resolve totals");
            }
        }
    }
}

impl MetricsSink for Journal {
    fn record_load(&mut self, record: LoadRecord) {
        self.backend.get_or_insert(record.backend);
        let duration = record.duration();
        let row = LoadRow {
            cumulative_batch_size: self.total_loaded() + record.batch_size,
            batch_size: record.batch_size,
            started: record.started,
            finished: record.finished,
            duration,
            cumulative_duration: self.total_load_duration() + duration,
        };
        self.load.push(row);
    }

    fn record_resolve(&mut self, record: ResolveRecord) {
        self.backend.get_or_insert(record.backend);
        self.resolve.entry(record.kind).or_default().push(ResolveRow {
            count: record.count,
            duration: record.elapsed,
        });
    }
}
