//! Canonical symbol name allocation

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::domain::SymbolName;

type NameKey = (Arc<Path>, Box<str>);

/// Deduplicating allocator for [`SymbolName`]s
///
/// Only weak references are tracked, so a name lives exactly as long as the
/// longest-lived range holding it. Safe to share between threads.
#[derive(Debug, Default)]
pub struct SymbolNameAllocator {
    names: Mutex<HashMap<NameKey, Weak<SymbolName>>>,
}

impl SymbolNameAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live name for (`context`, `name`), creating it if needed
    pub fn allocate(&self, name: String, context: &Arc<Path>) -> Arc<SymbolName> {
        let key: NameKey = (Arc::clone(context), name.into_boxed_str());
        let mut names = self.lock();
        if let Some(existing) = names.get(&key).and_then(Weak::upgrade) {
            return existing;
        }
        let symbol = Arc::new(SymbolName::new(key.1.clone(), Arc::clone(context)));
        names.insert(key, Arc::downgrade(&symbol));
        symbol
    }

    /// Forget names no range refers to anymore, returning how many were dropped
    pub fn purge(&self) -> usize {
        let mut names = self.lock();
        let before = names.len();
        names.retain(|_, name| name.strong_count() > 0);
        before - names.len()
    }

    /// Number of tracked keys, including dead ones not yet purged
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NameKey, Weak<SymbolName>>> {
        // the map holds no invariant a panicking holder could break
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
