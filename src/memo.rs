use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;

/// Where a memoized value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    function: &'static str,
    args: String,
}

#[derive(Debug, Clone)]
struct MemoEntry<V> {
    value: V,
    stored_at: Instant,
}

/// In-memory result cache keyed by function name and argument string.
///
/// Entries live until `ttl` elapses (forever when `ttl` is `None`) or until
/// they are dropped with [`Memo::invalidate`] / [`Memo::clear`]. Only
/// successful results are stored.
#[derive(Debug)]
pub struct Memo<V> {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<MemoKey, MemoEntry<V>>>,
}

impl<V: Clone> Memo<V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, function: &'static str, args: &str) -> Option<V> {
        let key = MemoKey {
            function,
            args: args.to_string(),
        };
        let mut guard = self.entries.lock().expect("memo lock poisoned");
        let fresh = guard
            .get(&key)
            .map(|entry| self.is_fresh(entry))
            .unwrap_or(false);
        if !fresh {
            guard.remove(&key);
            return None;
        }
        guard.get(&key).map(|entry| entry.value.clone())
    }

    pub fn insert(&self, function: &'static str, args: &str, value: V) {
        let key = MemoKey {
            function,
            args: args.to_string(),
        };
        let entry = MemoEntry {
            value,
            stored_at: Instant::now(),
        };
        let mut guard = self.entries.lock().expect("memo lock poisoned");
        guard.insert(key, entry);
    }

    /// Returns the cached value, or runs `compute` and stores its success.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_try_insert_with<F>(
        &self,
        function: &'static str,
        args: &str,
        compute: F,
    ) -> Result<(V, Source)>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(function, args) {
            return Ok((value, Source::Cache));
        }
        let value = compute()?;
        self.insert(function, args, value.clone());
        Ok((value, Source::Fresh))
    }

    pub fn invalidate(&self, function: &'static str, args: &str) -> bool {
        let key = MemoKey {
            function,
            args: args.to_string(),
        };
        let mut guard = self.entries.lock().expect("memo lock poisoned");
        guard.remove(&key).is_some()
    }

    pub fn clear(&self) -> usize {
        let mut guard = self.entries.lock().expect("memo lock poisoned");
        let count = guard.len();
        guard.clear();
        count
    }

    pub fn len(&self) -> usize {
        let guard = self.entries.lock().expect("memo lock poisoned");
        guard.values().filter(|entry| self.is_fresh(entry)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &MemoEntry<V>) -> bool {
        match self.ttl {
            Some(ttl) => entry.stored_at.elapsed() < ttl,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn second_lookup_hits_cache() {
        let memo: Memo<u32> = Memo::new(None);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        let (first, source) = memo.get_or_try_insert_with("f", "1", compute).unwrap();
        assert_eq!((first, source), (7, Source::Fresh));
        let (second, source) = memo
            .get_or_try_insert_with("f", "1", || Ok(99))
            .unwrap();
        assert_eq!((second, source), (7, Source::Cache));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn keys_include_function_name() {
        let memo: Memo<u32> = Memo::new(None);
        memo.insert("career", "42", 1);
        memo.insert("shots", "42", 2);
        assert_eq!(memo.get("career", "42"), Some(1));
        assert_eq!(memo.get("shots", "42"), Some(2));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn errors_are_not_stored() {
        let memo: Memo<u32> = Memo::new(None);
        let err = memo.get_or_try_insert_with("f", "x", || Err(anyhow::anyhow!("boom")));
        assert!(err.is_err());
        assert!(memo.is_empty());
        let (value, source) = memo.get_or_try_insert_with("f", "x", || Ok(3)).unwrap();
        assert_eq!((value, source), (3, Source::Fresh));
    }

    #[test]
    fn zero_ttl_always_expires() {
        let memo: Memo<u32> = Memo::new(Some(Duration::ZERO));
        memo.insert("f", "1", 5);
        assert_eq!(memo.get("f", "1"), None);
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn invalidate_and_clear() {
        let memo: Memo<u32> = Memo::new(None);
        memo.insert("f", "1", 1);
        memo.insert("f", "2", 2);
        assert!(memo.invalidate("f", "1"));
        assert!(!memo.invalidate("f", "1"));
        assert_eq!(memo.get("f", "2"), Some(2));
        assert_eq!(memo.clear(), 1);
        assert!(memo.is_empty());
    }
}
