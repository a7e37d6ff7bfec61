//! Where load and lookup measurements go.
//!
//! The structures only report facts; storing, aggregating and rendering them
//! is up to the sink.

use std::time::{Duration, SystemTime};

use crate::BackendKind;

/// One bulk-load batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRecord {
    pub backend: BackendKind,
    pub batch_size: usize,
    pub started: SystemTime,
    pub finished: SystemTime,
}

impl LoadRecord {
    /// Wall-clock time between start and finish; zero if the clock stepped back.
    pub fn duration(&self) -> Duration {
        self.finished
            .duration_since(self.started)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolveKind {
    /// Exact lookups of stored names.
    GetPositive,
    /// Exact lookups of names that are not stored.
    GetNegative,
    /// Prefix lookups expected to match.
    LpmPositive,
    /// Prefix lookups expected to miss.
    LpmNegative,
}

impl ResolveKind {
    pub const ALL: [ResolveKind; 4] = [
        ResolveKind::GetPositive,
        ResolveKind::GetNegative,
        ResolveKind::LpmPositive,
        ResolveKind::LpmNegative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResolveKind::GetPositive => "get_positive",
            ResolveKind::GetNegative => "get_negative",
            ResolveKind::LpmPositive => "lpm_positive",
            ResolveKind::LpmNegative => "lpm_negative",
        }
    }
}

/// A batch of lookups of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRecord {
    pub backend: BackendKind,
    pub kind: ResolveKind,
    pub count: usize,
    pub elapsed: Duration,
}

pub trait MetricsSink {
    fn record_load(&mut self, record: LoadRecord);

    fn record_resolve(&mut self, record: ResolveRecord);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_load(&mut self, _record: LoadRecord) {}

    fn record_resolve(&mut self, _record: ResolveRecord) {}
}

impl<T: MetricsSink + ?Sized> MetricsSink for &mut T {
    fn record_load(&mut self, record: LoadRecord) {
        (**self).record_load(record)
    }

    fn record_resolve(&mut self, record: ResolveRecord) {
        (**self).record_resolve(record)
    }
}
