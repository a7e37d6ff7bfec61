//! Synthetic hierarchical name datasets and query sampling.
//!
//! Names look like `/org12/dept3/host7` and map to hosting networks such as
//! `/AS17`. Generation is seeded, so a spec always yields the same dataset.

use std::collections::HashSet;

use echt::{Component, Entry, Name, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Component stems per level; deeper levels reuse the last one.
const LEVELS: &[&str] = &["org", "dept", "host", "svc", "node"];

/// Never produced by the generator, so prefixing it makes a name miss.
const FOREIGN_COMPONENT: &str = "_foreign";

/// Never produced by the generator, so appending it makes an exact lookup miss
/// while leaving the original name as the longest stored prefix.
const EXTRA_COMPONENT: &str = "_extra";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Number of distinct names to generate.
    pub size: usize,
    /// Distinct first components.
    pub orgs: usize,
    /// Distinct components at every level below the first.
    pub fanout: usize,
    /// Maximum components per name.
    pub max_depth: usize,
    /// Maximum values per name; every name gets at least one.
    pub max_values: usize,
    /// Size of the value pool.
    pub networks: usize,
    pub seed: u64,
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self {
            size: 10_000,
            orgs: 64,
            fanout: 16,
            max_depth: 5,
            max_values: 3,
            networks: 256,
            seed: 0x5eed,
        }
    }
}

/// An ordered list of entries with distinct names.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entries: Vec<Entry>,
}

impl Dataset {
    /// Generate `spec.size` distinct names. A spec whose name space is too
    /// small for the requested size yields fewer entries.
    pub fn synthetic(spec: DatasetSpec) -> Self {
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let mut seen: HashSet<Name> = HashSet::with_capacity(spec.size);
        let mut entries = Vec::with_capacity(spec.size);

        let max_depth = spec.max_depth.max(1);
        let budget = spec.size.saturating_mul(16).max(64);
        let mut attempts = 0;
        while entries.len() < spec.size && attempts < budget {
            attempts += 1;

            let depth = rng.gen_range(1..=max_depth);
            let mut name = Name::new();
            for level in 0..depth {
                let stem = LEVELS[level.min(LEVELS.len() - 1)];
                let width = if level == 0 { spec.orgs } else { spec.fanout };
                name.push(format!("{stem}{}", rng.gen_range(0..width.max(1))));
            }
            if !seen.insert(name.clone()) {
                continue;
            }

            let count = rng.gen_range(1..=spec.max_values.max(1));
            let mut values: Vec<Value> = Vec::with_capacity(count);
            for _ in 0..count {
                let value = Value::from(format!("/AS{}", rng.gen_range(0..spec.networks.max(1))));
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            entries.push(Entry::new(name, values));
        }

        if entries.len() < spec.size {
            warn!(
                requested = spec.size,
                generated = entries.len(),
                "name space exhausted before reaching the requested dataset size"
            );
        }
        info!(size = entries.len(), seed = spec.seed, "generated synthetic dataset");
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> + '_ {
        self.entries.iter().map(|entry| &entry.name)
    }

    /// `count` stored names, drawn with replacement.
    pub fn sample<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Name> {
        (0..count)
            .filter_map(|_| self.entries.choose(rng))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// `count` names that are neither stored nor extend a stored name.
    pub fn negatives<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Name> {
        let foreign = Name::from_components([FOREIGN_COMPONENT]);
        self.sample(count, rng)
            .into_iter()
            .map(|name| foreign.join(&name))
            .collect()
    }

    /// `count` names one component longer than a stored name.
    pub fn lpm_queries<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Name> {
        self.sample(count, rng)
            .into_iter()
            .map(|name| name.with_component(Component::from(EXTRA_COMPONENT)))
            .collect()
    }
}
