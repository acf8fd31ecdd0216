//! Search history - история и сохранённые поиски
//!
//! Also keeps search analytics.
//!
//! Everything here is best effort: storage errors and corrupt documents are
//! logged and read as empty, never returned to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{FilterSet, SavedSearch, SearchHistoryEntry};
use crate::db::KeyValueStore;

pub const HISTORY_KEY: &str = "search_history";
pub const SAVED_KEY: &str = "saved_searches";
pub const ANALYTICS_KEY: &str = "search_analytics";

/// Default number of history entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Aggregate counters over every settled search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchAnalytics {
    pub total_searches: u64,
    pub zero_result_searches: u64,
    pub query_counts: HashMap<String, u64>,
    pub last_search_at: Option<DateTime<Utc>>,
}

impl SearchAnalytics {
    fn record(&mut self, query: &str, result_count: usize) {
        self.total_searches += 1;
        if result_count == 0 {
            self.zero_result_searches += 1;
        }
        *self.query_counts.entry(query.to_lowercase()).or_insert(0) += 1;
        self.last_search_at = Some(Utc::now());
    }

    /// Most searched queries, ties broken alphabetically
    pub fn popular_queries(&self, limit: usize) -> Vec<(String, u64)> {
        let mut counts: Vec<_> = self
            .query_counts
            .iter()
            .map(|(q, c)| (q.clone(), *c))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        counts
    }

    /// Share of searches that found nothing (0.0 - 1.0)
    pub fn zero_result_rate(&self) -> f64 {
        if self.total_searches == 0 {
            return 0.0;
        }
        self.zero_result_searches as f64 / self.total_searches as f64
    }
}

/// History and saved searches for one search session
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Recent searches, most recent first
    pub fn entries(&self) -> Vec<SearchHistoryEntry> {
        self.load(HISTORY_KEY)
    }

    /// Record a search; a repeated query moves to the front instead of duplicating.
    /// The query is kept exactly as typed, so "squat " and "squat" are two entries.
    pub fn record(&self, query: &str, result_count: usize) {
        if query.trim().is_empty() {
            return;
        }

        let mut entries = self.entries();
        entries.retain(|e| e.query != query);
        entries.insert(
            0,
            SearchHistoryEntry {
                query: query.to_string(),
                timestamp: Utc::now(),
                result_count,
            },
        );
        entries.truncate(self.limit);

        self.store_value(HISTORY_KEY, &entries);
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Failed to clear search history: {}", e);
        }
    }

    pub fn saved(&self) -> Vec<SavedSearch> {
        self.load(SAVED_KEY)
    }

    pub fn save(&self, name: &str, query: &str, filters: &FilterSet) -> SavedSearch {
        let now = Utc::now();
        let mut all = self.saved();
        // Ids are never reused, even after removals
        let next = all
            .iter()
            .filter_map(|s| s.id.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);
        let saved = SavedSearch {
            id: format!("saved-{}", next),
            name: name.trim().to_string(),
            query: query.trim().to_string(),
            filters: filters.clone(),
            created_at: now,
        };

        all.push(saved.clone());
        self.store_value(SAVED_KEY, &all);
        debug!("Saved search '{}' ({})", saved.name, saved.id);
        saved
    }

    /// Returns false when no saved search had that id
    pub fn remove_saved(&self, id: &str) -> bool {
        let mut all = self.saved();
        let before = all.len();
        all.retain(|s| s.id != id);
        if all.len() == before {
            return false;
        }
        self.store_value(SAVED_KEY, &all);
        true
    }

    pub fn analytics(&self) -> SearchAnalytics {
        match self.read(ANALYTICS_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Corrupt {} document, starting over: {}", ANALYTICS_KEY, e);
                SearchAnalytics::default()
            }),
            None => SearchAnalytics::default(),
        }
    }

    pub fn record_analytics(&self, query: &str, result_count: usize) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let mut analytics = self.analytics();
        analytics.record(query, result_count);
        self.store_value(ANALYTICS_KEY, &analytics);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.read(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Corrupt {} document, treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }

    fn store_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json) {
            warn!("Failed to write {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use anyhow::{Result, bail};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            bail!("storage disabled")
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            bail!("quota exceeded")
        }
        fn remove(&self, _key: &str) -> Result<()> {
            bail!("storage disabled")
        }
    }

    fn history() -> SearchHistory {
        SearchHistory::new(Arc::new(MemoryStore::new()), DEFAULT_HISTORY_LIMIT)
    }

    #[test]
    fn test_record_and_read_back() {
        let h = history();
        h.record("bench", 3);
        let entries = h.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "bench");
        assert_eq!(entries[0].result_count, 3);
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let h = history();
        h.record("squat", 1);
        h.record("deadlift", 1);
        h.record("squat", 5);

        let entries = h.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "squat");
        assert_eq!(entries[0].result_count, 5);
        assert_eq!(entries[1].query, "deadlift");
    }

    #[test]
    fn test_capped_at_ten() {
        let h = history();
        for i in 0..11 {
            h.record(&format!("query {}", i), i);
        }
        let entries = h.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].query, "query 10");
        assert_eq!(entries[9].query, "query 1");
        assert!(!entries.iter().any(|e| e.query == "query 0"));
    }

    #[test]
    fn test_blank_query_ignored() {
        let h = history();
        h.record("   ", 0);
        assert!(h.entries().is_empty());
    }

    #[test]
    fn test_query_stored_as_typed() {
        let h = history();
        h.record("squat", 2);
        h.record("squat ", 2);

        let queries: Vec<_> = h.entries().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["squat ", "squat"]);
    }

    #[test]
    fn test_corrupt_document_reads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "{not json").unwrap();
        store.set(ANALYTICS_KEY, "[]").unwrap();
        let h = SearchHistory::new(store, DEFAULT_HISTORY_LIMIT);
        assert!(h.entries().is_empty());
        assert_eq!(h.analytics(), SearchAnalytics::default());

        // and recovers on the next write
        h.record("row", 2);
        assert_eq!(h.entries().len(), 1);
    }

    #[test]
    fn test_broken_storage_degrades_to_empty() {
        let h = SearchHistory::new(Arc::new(BrokenStore), DEFAULT_HISTORY_LIMIT);
        h.record("curl", 1);
        h.save("arms", "curl", &FilterSet::default());
        h.clear();
        assert!(h.entries().is_empty());
        assert!(h.saved().is_empty());
    }

    #[test]
    fn test_saved_searches() {
        let h = history();
        let filters = FilterSet {
            equipment: vec!["barbell".to_string()],
            ..Default::default()
        };
        let saved = h.save("Heavy day", "squat", &filters);
        let all = h.saved();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Heavy day");
        assert_eq!(all[0].filters, filters);

        assert!(h.remove_saved(&saved.id));
        assert!(!h.remove_saved(&saved.id));
        assert!(h.saved().is_empty());
    }

    #[test]
    fn test_saved_ids_unique_after_removal() {
        let h = history();
        let filters = FilterSet::default();
        let a = h.save("a", "squat", &filters);
        let b = h.save("b", "bench", &filters);
        assert!(h.remove_saved(&a.id));
        let c = h.save("c", "row", &filters);
        assert_ne!(b.id, c.id);

        assert!(h.remove_saved(&b.id));
        let left = h.saved();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, c.id);
        assert_eq!(left[0].name, "c");
    }

    #[test]
    fn test_analytics_counts() {
        let h = history();
        h.record_analytics("Squat", 4);
        h.record_analytics("squat", 4);
        h.record_analytics("zzz", 0);

        let a = h.analytics();
        assert_eq!(a.total_searches, 3);
        assert_eq!(a.zero_result_searches, 1);
        assert_eq!(a.popular_queries(1), vec![("squat".to_string(), 2)]);
        assert!((a.zero_result_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert!(a.last_search_at.is_some());
    }
}
