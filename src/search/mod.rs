//! Search module - query operators, history, suggestions and the search session
//!
//! Features:
//! - `field:value` operators parsed out of free text (`chest equipment:barbell`)
//! - Debounced searches with stale-response suppression
//! - Persistent history, saved searches and analytics

pub mod history;
pub mod query;
pub mod session;
pub mod suggestions;
pub mod types;

pub use history::{SearchAnalytics, SearchHistory};
pub use query::{ParsedQuery, parse, to_filters};
pub use session::{SearchPhase, SearchSession, SearchState};
pub use suggestions::generate_suggestions;
pub use types::{
    FilterSet, OperatorField, SavedSearch, SearchHistoryEntry, SearchOperator, SearchResult,
    SearchSuggestion, SortField, SortOrder, SortSpec, SuggestionKind,
};
