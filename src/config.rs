//! Search configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::search::history::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_DB_PATH: &str = "gymscout.db";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last input before a search runs
    pub debounce: Duration,
    pub page_size: usize,
    pub history_limit: usize,
    pub db_path: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            page_size: DEFAULT_PAGE_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl SearchConfig {
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce = Duration::from_millis(ms);
        self
    }

    /// A zero page size would never return anything
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_page_size_floor() {
        let config = SearchConfig::default().with_page_size(0);
        assert_eq!(config.page_size, 1);
    }
}
