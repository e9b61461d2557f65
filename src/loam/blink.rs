//! # Blink: request-scoped memoization
//!
//! A compute-once cache for derived values (resolved structures, taxonomy
//! lookups, resolved search indexes). It is purely a de-duplication layer:
//! never a source of truth, never persisted, and it must be flushed between
//! units of work (requests, batch jobs) — stale cross-request memoization is
//! a correctness bug.
//!
//! Keys are structured `(kind, id, sub)` tuples rather than concatenated
//! strings, so invalidating everything derived from one entity is
//! "remove all entries whose kind and id match" instead of prefix matching.

use crate::error::Result;
use std::any::Any;
use std::collections::HashMap;

/// Cache key: entity kind (e.g. `"collection"`), entity id, and a sub-key
/// naming the derived value (e.g. `"structure"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlinkKey {
    pub kind: &'static str,
    pub id: String,
    pub sub: String,
}

impl BlinkKey {
    pub fn new(kind: &'static str, id: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            sub: sub.into(),
        }
    }
}

/// The memoization store itself. One per unit of work.
#[derive(Default)]
pub struct Blink {
    entries: HashMap<BlinkKey, Box<dyn Any>>,
}

impl Blink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute `producer()` under `key` on first call; return the cached
    /// value on subsequent calls without invoking `producer` again.
    pub fn once<T, F>(&mut self, key: BlinkKey, producer: F) -> T
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.entries.get(&key).and_then(|v| v.downcast_ref::<T>()) {
            return hit.clone();
        }
        let value = producer();
        self.entries.insert(key, Box::new(value.clone()));
        value
    }

    /// Fallible variant of [`once`](Self::once). Errors propagate uncached,
    /// so a failed producer runs again on the next call.
    pub fn try_once<T, F>(&mut self, key: BlinkKey, producer: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Result<T>,
    {
        if let Some(hit) = self.entries.get(&key).and_then(|v| v.downcast_ref::<T>()) {
            return Ok(hit.clone());
        }
        let value = producer()?;
        self.entries.insert(key, Box::new(value.clone()));
        Ok(value)
    }

    /// Remove a single entry.
    pub fn forget(&mut self, key: &BlinkKey) {
        self.entries.remove(key);
    }

    /// Remove every entry derived from one entity, regardless of sub-key.
    pub fn flush_entity(&mut self, kind: &str, id: &str) {
        self.entries.retain(|k, _| !(k.kind == kind && k.id == id));
    }

    /// Remove everything. Call between units of work.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let mut blink = Blink::new();
        let calls = Cell::new(0);

        let key = BlinkKey::new("collection", "blog", "structure");
        let first: i32 = blink.once(key.clone(), || {
            calls.set(calls.get() + 1);
            42
        });
        let second: i32 = blink.once(key, || {
            calls.set(calls.get() + 1);
            99
        });

        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn forget_removes_single_entry() {
        let mut blink = Blink::new();
        let key = BlinkKey::new("collection", "blog", "structure");
        let _: i32 = blink.once(key.clone(), || 1);

        blink.forget(&key);
        let recomputed: i32 = blink.once(key, || 2);
        assert_eq!(recomputed, 2);
    }

    #[test]
    fn flush_entity_removes_all_sub_keys_for_one_id() {
        let mut blink = Blink::new();
        let _: i32 = blink.once(BlinkKey::new("collection", "blog", "structure"), || 1);
        let _: i32 = blink.once(BlinkKey::new("collection", "blog", "taxonomies"), || 2);
        let _: i32 = blink.once(BlinkKey::new("collection", "pages", "structure"), || 3);

        blink.flush_entity("collection", "blog");

        assert_eq!(blink.len(), 1);
        let kept: i32 = blink.once(BlinkKey::new("collection", "pages", "structure"), || 99);
        assert_eq!(kept, 3);
    }

    #[test]
    fn errors_propagate_uncached() {
        use crate::error::LoamError;

        let mut blink = Blink::new();
        let key = BlinkKey::new("search", "default", "index");

        let failed: Result<i32> = blink.try_once(key.clone(), || {
            Err(LoamError::Store("boom".to_string()))
        });
        assert!(failed.is_err());

        let recovered = blink.try_once(key, || Ok(7)).unwrap();
        assert_eq!(recovered, 7);
    }

    #[test]
    fn flush_clears_everything() {
        let mut blink = Blink::new();
        let _: i32 = blink.once(BlinkKey::new("collection", "blog", "structure"), || 1);
        let _: i32 = blink.once(BlinkKey::new("global", "footer", "blueprint"), || 2);

        blink.flush();
        assert!(blink.is_empty());
    }
}
