use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host-provided key-value persistence blob, kept across surface recreation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bundle {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Moves the engine's serialized surface state in and out of a [`Bundle`]
/// without looking inside it.
#[derive(Debug, Clone, Copy)]
pub struct StateStore {
    key: &'static str,
}

impl StateStore {
    pub const SURFACE_KEY: &'static str = "webshell.surface";

    pub fn new() -> Self {
        Self {
            key: Self::SURFACE_KEY,
        }
    }

    pub fn save(&self, bundle: &mut Bundle, blob: Vec<u8>) {
        bundle.put(self.key, blob);
    }

    pub fn load<'a>(&self, bundle: &'a Bundle) -> Option<&'a [u8]> {
        bundle.get(self.key).filter(|blob| !blob.is_empty())
    }

    pub fn clear(&self, bundle: &mut Bundle) {
        bundle.remove(self.key);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
