//! A backend behind a read-write lock, for use from several threads.

use echt::{
    answer, respond, Backend, BackendKind, BulkLoader, Config, EchtResult, Entry, LoadSummary,
    MetricsSink, Name, Removal, Reply, Request, TrieStats, Value,
};
use parking_lot::RwLock;

/// Owned result of a longest-prefix lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMatch {
    pub prefix: Name,
    pub values: Vec<Value>,
}

/// Concurrent readers, one writer at a time.
///
/// Lookups hand back owned copies so no reference into the structure outlives
/// the lock.
pub struct SharedBackend {
    inner: RwLock<Box<dyn Backend>>,
}

impl SharedBackend {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            inner: RwLock::new(backend),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.build())
    }

    pub fn kind(&self) -> BackendKind {
        self.inner.read().kind()
    }

    pub fn add(&self, key: &Name, values: &[Value]) {
        self.inner.write().add(key, values);
    }

    pub fn set(&self, key: &Name, values: &[Value]) {
        self.inner.write().set(key, values);
    }

    pub fn get(&self, key: &Name) -> Option<Vec<Value>> {
        let inner = self.inner.read();
        inner.get(key).map(|values| values.as_slice().to_vec())
    }

    pub fn longest_prefix_match(&self, key: &Name) -> Option<OwnedMatch> {
        let inner = self.inner.read();
        inner.longest_prefix_match(key).map(|hit| OwnedMatch {
            prefix: hit.prefix,
            values: hit.values.as_slice().to_vec(),
        })
    }

    pub fn remove(&self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<Vec<Value>>> {
        let mut inner = self.inner.write();
        let rest = inner.remove(key, removal)?;
        Ok(rest.map(|values| values.as_slice().to_vec()))
    }

    pub fn is_entry(&self, key: &Name) -> bool {
        self.inner.read().is_entry(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TrieStats {
        self.inner.read().stats()
    }

    pub fn approximate_size(&self) -> usize {
        self.inner.read().approximate_size()
    }

    /// Holds the write lock for the whole load.
    pub fn load(
        &self,
        loader: &BulkLoader,
        entries: &[Entry],
        sink: &mut dyn MetricsSink,
    ) -> LoadSummary {
        let mut inner = self.inner.write();
        loader.load(&mut **inner, entries, sink)
    }

    /// Answer a request, taking the write lock only for mutations.
    pub fn dispatch(&self, request: Request) -> EchtResult<Reply> {
        if request.is_mutation() {
            let mut inner = self.inner.write();
            respond(&mut **inner, request)
        } else {
            let inner = self.inner.read();
            answer(&**inner, request)
        }
    }

    pub fn into_inner(self) -> Box<dyn Backend> {
        self.inner.into_inner()
    }
}

impl std::fmt::Debug for SharedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBackend")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echt::{NoopSink, Operation};
    use std::sync::Arc;
    use std::thread;

    fn name(uri: &str) -> Name {
        Name::parse(uri).unwrap()
    }

    #[test]
    fn test_basic_operations() {
        let shared = SharedBackend::from_config(&Config::default());
        assert!(shared.is_empty());

        shared.add(&name("/om/edu"), &[Value::from("/AS1")]);
        shared.add(&name("/om/edu/squ"), &[Value::from("/AS2")]);

        assert_eq!(shared.get(&name("/om/edu")), Some(vec![Value::from("/AS1")]));
        assert_eq!(
            shared.longest_prefix_match(&name("/om/edu/squ/www")),
            Some(OwnedMatch {
                prefix: name("/om/edu/squ"),
                values: vec![Value::from("/AS2")],
            })
        );
        assert!(!shared.is_entry(&name("/om")));
        assert_eq!(
            shared.remove(&name("/om/edu"), Removal::All),
            Ok(Some(Vec::new()))
        );
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_dispatch() {
        let shared = SharedBackend::from_config(&Config {
            backend: BackendKind::Text,
            ..Config::default()
        });
        let reply = shared
            .dispatch(Request::add(name("/a/b"), vec![Value::from("x")]))
            .unwrap();
        assert!(matches!(reply, Reply::Values { .. }));

        let reply = shared
            .dispatch(Request::new(name("/a/b"), Operation::IsEntry))
            .unwrap();
        assert_eq!(reply, Reply::Entry(true));
        assert_eq!(shared.kind(), BackendKind::Text);
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedBackend::from_config(&Config::default()));
        let entries: Vec<Entry> = (0..1_000)
            .map(|i| Entry::new(name(&format!("/site{}/page{i}", i % 10)), [Value::from("/AS1")]))
            .collect();
        let summary = shared.load(&BulkLoader::new(100), &entries, &mut NoopSink);
        assert_eq!(summary.batches, 10);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut hits = 0usize;
                    for i in (t..1_000).step_by(4) {
                        let query = name(&format!("/site{}/page{i}/extra", i % 10));
                        if shared.longest_prefix_match(&query).is_some() {
                            hits += 1;
                        }
                    }
                    hits
                })
            })
            .collect();

        let hits: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(hits, 1_000);

        let backend = Arc::try_unwrap(shared).unwrap().into_inner();
        assert_eq!(backend.len(), 1_000);
    }
}
