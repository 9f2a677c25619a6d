use parking_lot::Mutex;
use propbind_source::{ConfigSource, SettableSource};
use std::sync::Arc;

/// Wraps a source and records every key looked up through it.
#[derive(Clone)]
pub struct CountingSource {
    inner: Arc<dyn ConfigSource>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl CountingSource {
    pub fn new(inner: impl ConfigSource + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Keys looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    /// How many times `key` was looked up.
    pub fn count(&self, key: &str) -> usize {
        self.lookups
            .lock()
            .iter()
            .filter(|seen| seen.as_str() == key)
            .count()
    }

    pub fn total(&self) -> usize {
        self.lookups.lock().len()
    }

    pub fn reset(&self) {
        self.lookups.lock().clear();
    }
}

impl ConfigSource for CountingSource {
    fn get(&self, key: &str) -> Option<String> {
        self.lookups.lock().push(key.to_string());
        self.inner.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

/// A settable source preloaded with `pairs`.
pub fn settable_from<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> SettableSource
where
    K: Into<String>,
    V: ToString,
{
    let source = SettableSource::new();
    for (key, value) in pairs {
        source.set_property(key, value);
    }
    source
}
