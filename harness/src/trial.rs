//! Load-then-resolve trials over one or more backends.

use std::time::{Duration, Instant, SystemTime};

use echt::{
    Backend, BackendKind, BulkLoader, Config, LoadSummary, MetricsSink, Name, NoopSink,
    ResolveKind, ResolveRecord, TrieStats, Value,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::{Dataset, Journal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialConfig {
    pub load_batch_size: usize,
    /// One round of get and LPM batches runs per size.
    pub resolving_batch_sizes: Vec<usize>,
    pub root_capacity: usize,
    /// Seeds query sampling.
    pub seed: u64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            load_batch_size: 10_000,
            resolving_batch_sizes: vec![100, 1_000, 10_000],
            root_capacity: 0,
            seed: 42,
        }
    }
}

impl TrialConfig {
    fn backend_config(&self, kind: BackendKind) -> Config {
        Config {
            backend: kind,
            root_capacity: self.root_capacity,
            load_batch_size: self.load_batch_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrialReport {
    pub backend: BackendKind,
    pub dataset_size: usize,
    pub load: LoadSummary,
    pub stats: TrieStats,
    pub approximate_size: usize,
    pub depth: usize,
    /// Positive queries that missed plus negative queries that hit.
    pub unexpected: usize,
    pub journal: Journal,
    pub started: SystemTime,
    pub elapsed: Duration,
}

/// One backend, one dataset.
#[derive(Debug, Clone, Copy)]
pub struct Trial<'a> {
    kind: BackendKind,
    dataset: &'a Dataset,
    config: &'a TrialConfig,
}

impl<'a> Trial<'a> {
    pub fn new(kind: BackendKind, dataset: &'a Dataset, config: &'a TrialConfig) -> Self {
        Self {
            kind,
            dataset,
            config,
        }
    }

    pub fn run(&self) -> TrialReport {
        let started = SystemTime::now();
        let clock = Instant::now();

        let backend_config = self.config.backend_config(self.kind);
        let mut backend = backend_config.build();
        let mut journal = Journal::new();

        let load = BulkLoader::from_config(&backend_config).load(
            backend.as_mut(),
            self.dataset.entries(),
            &mut journal,
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut unexpected = 0;
        for &size in &self.config.resolving_batch_sizes {
            let positives = self.dataset.sample(size, &mut rng);
            let negatives = self.dataset.negatives(size, &mut rng);
            let extended = self.dataset.lpm_queries(size, &mut rng);

            let hits = resolve(backend.as_ref(), ResolveKind::GetPositive, &positives, &mut journal);
            unexpected += positives.len() - hits;
            unexpected += resolve(backend.as_ref(), ResolveKind::GetNegative, &negatives, &mut journal);
            let hits = resolve(backend.as_ref(), ResolveKind::LpmPositive, &extended, &mut journal);
            unexpected += extended.len() - hits;
            unexpected += resolve(backend.as_ref(), ResolveKind::LpmNegative, &negatives, &mut journal);
        }

        let report = TrialReport {
            backend: self.kind,
            dataset_size: self.dataset.len(),
            load,
            stats: backend.stats(),
            approximate_size: backend.approximate_size(),
            depth: backend.depth(),
            unexpected,
            journal,
            started,
            elapsed: clock.elapsed(),
        };
        info!(
            backend = %report.backend,
            entries = report.dataset_size,
            nodes = report.stats.total_nodes,
            components = report.stats.total_components,
            size = report.approximate_size,
            unexpected = report.unexpected,
            elapsed = ?report.elapsed,
            "trial finished"
        );
        report
    }
}

/// Time one batch of lookups of `kind`. Returns how many found something.
fn resolve(
    backend: &dyn Backend,
    kind: ResolveKind,
    queries: &[Name],
    sink: &mut dyn MetricsSink,
) -> usize {
    let clock = Instant::now();
    let hits = match kind {
        ResolveKind::GetPositive | ResolveKind::GetNegative => {
            queries.iter().filter(|q| backend.get(q).is_some()).count()
        }
        ResolveKind::LpmPositive | ResolveKind::LpmNegative => queries
            .iter()
            .filter(|q| backend.longest_prefix_match(q).is_some())
            .count(),
    };
    let elapsed = clock.elapsed();
    debug!(backend = %backend.kind(), kind = kind.label(), count = queries.len(), hits, "resolved batch");
    sink.record_resolve(ResolveRecord {
        backend: backend.kind(),
        kind,
        count: queries.len(),
        elapsed,
    });
    hits
}

/// Run the same trial for every kind in `kinds`.
pub fn compare(kinds: &[BackendKind], dataset: &Dataset, config: &TrialConfig) -> Vec<TrialReport> {
    kinds
        .iter()
        .map(|&kind| Trial::new(kind, dataset, config).run())
        .collect()
}

/// Two backends answered a query differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{left} and {right} disagree on {operation} {query}")]
pub struct Disagreement {
    pub query: Name,
    pub operation: &'static str,
    pub left: BackendKind,
    pub right: BackendKind,
}

type Answers = (Option<Vec<Value>>, Option<(Name, Vec<Value>)>);

fn answers(backend: &dyn Backend, query: &Name) -> Answers {
    let exact = backend.get(query).map(|v| v.as_slice().to_vec());
    let prefix = backend
        .longest_prefix_match(query)
        .map(|hit| (hit.prefix, hit.values.as_slice().to_vec()));
    (exact, prefix)
}

/// Load `dataset` into every kind and check they all answer `queries` the same
/// way, for both exact and prefix lookups. Returns the number of queries checked.
pub fn verify_agreement(
    kinds: &[BackendKind],
    dataset: &Dataset,
    queries: &[Name],
) -> Result<usize, Disagreement> {
    let backends: Vec<Box<dyn Backend>> = kinds
        .iter()
        .map(|&kind| {
            let mut backend = kind.build(&Config {
                backend: kind,
                ..Config::default()
            });
            backend.bulk_load(dataset.entries(), &mut NoopSink);
            backend
        })
        .collect();

    let Some((reference, rest)) = backends.split_first() else {
        return Ok(0);
    };
    for query in queries {
        let (exact, prefix) = answers(reference.as_ref(), query);
        for other in rest {
            let (other_exact, other_prefix) = answers(other.as_ref(), query);
            let operation = if other_exact != exact {
                "get"
            } else if other_prefix != prefix {
                "lpm"
            } else {
                continue;
            };
            return Err(Disagreement {
                query: query.clone(),
                operation,
                left: reference.kind(),
                right: other.kind(),
            });
        }
    }
    Ok(queries.len())
}
