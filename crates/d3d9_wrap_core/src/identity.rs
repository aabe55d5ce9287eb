use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::types::NativePtr;

/// Native object → wrapper association.
///
/// The table never owns a wrapper: it stores `Weak` references, so a wrapper whose last strong
/// reference is gone can no longer be found even before [`IdentityTable::delete`] runs.
/// The lock is held only for the duration of a single operation.
pub struct IdentityTable<W> {
    entries: Mutex<HashMap<NativePtr, Weak<W>>>,
}

impl<W> Default for IdentityTable<W> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<W> IdentityTable<W> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NativePtr, Weak<W>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Associates `native` with `wrapper`, replacing any previous (dead) association.
    pub fn save(&self, wrapper: &Arc<W>, native: NativePtr) {
        self.lock().insert(native, Arc::downgrade(wrapper));
    }

    /// Removes every association pointing at `wrapper`.
    pub fn delete(&self, wrapper: &Arc<W>) {
        let target = Arc::as_ptr(wrapper);
        self.lock().retain(|_, entry| !std::ptr::eq(entry.as_ptr(), target));
    }

    /// The live wrapper registered for `native`, if any. Never creates an entry.
    pub fn find(&self, native: NativePtr) -> Option<Arc<W>> {
        self.lock().get(&native).and_then(Weak::upgrade)
    }

    /// Returns the wrapper for `native`, building and registering one if none is alive.
    ///
    /// Lookup and insertion happen under one lock acquisition, so concurrent callers for the
    /// same native object always observe a single wrapper. `make` must not call back into the
    /// table.
    pub fn find_or_insert_with(&self, native: NativePtr, make: impl FnOnce() -> W) -> Arc<W> {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(&native).and_then(Weak::upgrade) {
            return existing;
        }
        let wrapper = Arc::new(make());
        entries.insert(native, Arc::downgrade(&wrapper));
        wrapper
    }

    pub fn len(&self) -> usize {
        self.lock().values().filter(|entry| entry.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
