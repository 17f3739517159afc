//! Per-month cache owned by whoever loads the data (the service layer).
//! Keys are `YYYY-MM` month keys.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MonthCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for MonthCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MonthCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, month: &str) -> Option<&V> {
        self.entries.get(month)
    }

    pub fn insert(&mut self, month: impl Into<String>, value: V) {
        self.entries.insert(month.into(), value);
    }

    /// Drops one month; returns whether anything was cached for it.
    pub fn clear_cache_for_month(&mut self, month: &str) -> bool {
        self.entries.remove(month).is_some()
    }

    pub fn clear_all(&mut self) {
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

    #[test]
    fn invalidates_single_month_and_everything() {
        let mut cache = MonthCache::new();
        cache.insert("2024-01", vec![1, 2]);
        cache.insert("2024-02", vec![3]);

        assert_eq!(cache.get("2024-01"), Some(&vec![1, 2]));
        assert!(cache.clear_cache_for_month("2024-01"));
        assert!(!cache.clear_cache_for_month("2024-01"));
        assert_eq!(cache.get("2024-01"), None);
        assert_eq!(cache.len(), 1);

        cache.clear_all();
        assert!(cache.is_empty());
    }
}
