//! Persistence boundary: a synchronous string key-value store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::SchemeError;

/// A durable, synchronous, string-valued key-value store.
///
/// A missing entry is `Ok(None)`, never an empty string.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SchemeError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SchemeError>;

    /// `false` when the host disabled the store entirely.
    fn is_available(&self) -> bool {
        true
    }
}

/// Nullable, failure-free view of a [`KeyValueStore`].
///
/// Errors from the store are logged and treated as "absent" (reads) or
/// ignored (writes).
#[derive(Clone, Default)]
pub struct Persistence {
    store: Option<Rc<dyn KeyValueStore>>,
}

impl Persistence {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn none() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.as_ref().is_some_and(|s| s.is_available())
    }

    pub fn read(&self, key: &str) -> Option<String> {
        let store = self.store.as_ref().filter(|s| s.is_available())?;
        match store.get(key) {
            Ok(v) => v,
            Err(err) => {
                log::debug!("color scheme read of `{key}` failed: {err}");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) {
        let Some(store) = self.store.as_ref().filter(|s| s.is_available()) else {
            log::trace!("no store available; dropping write of `{key}`");
            return;
        };
        if let Err(err) = store.set(key, value) {
            log::warn!("color scheme write of `{key}` failed: {err}");
        }
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("attached", &self.store.is_some())
            .field("available", &self.is_available())
            .finish()
    }
}

/// In-memory store with an availability switch and access counters.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    available: Cell<bool>,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            available: Cell::new(true),
            reads: Cell::new(0),
            writes: Cell::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that behaves like one disabled by the host.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.available.set(false);
        store
    }

    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.borrow_mut().insert(key.into(), value.into());
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Looks at the contents without counting as a read.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SchemeError> {
        self.reads.set(self.reads.get() + 1);
        if !self.available.get() {
            return Err(SchemeError::StorageUnavailable);
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SchemeError> {
        self.writes.set(self.writes.get() + 1);
        if !self.available.get() {
            return Err(SchemeError::StorageUnavailable);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.get()
    }
}
