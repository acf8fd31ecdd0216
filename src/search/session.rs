//! Search session - debounced, sequenced searches over a collaborator
//!
//! Input changes restart a debounce timer; only the last input inside the
//! window runs. Every request gets a sequence number and a completion that
//! is not the latest issued request is dropped, so a slow old response can
//! never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::history::SearchHistory;
use super::query::{parse, to_filters};
use super::suggestions::generate_suggestions;
use super::types::{FilterSet, SavedSearch, SearchResult, SearchSuggestion, SortSpec};
use crate::catalog::ExerciseSearch;
use crate::config::SearchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query and no filters
    Idle,
    /// A request is in flight
    Searching,
    /// A result (possibly empty) is on display
    Settled,
}

/// What the search surface shows right now
#[derive(Debug, Clone)]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Raw query as typed
    pub query: String,
    pub clean_query: String,
    /// Filters after operators were merged in
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub result: SearchResult,
}

impl SearchState {
    fn idle() -> Self {
        Self {
            phase: SearchPhase::Idle,
            query: String::new(),
            clean_query: String::new(),
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            result: SearchResult::empty(),
        }
    }
}

/// User-controlled inputs
#[derive(Debug, Clone, Default)]
struct SearchInput {
    query: String,
    filters: FilterSet,
    sort: SortSpec,
}

struct Inner {
    searcher: Arc<dyn ExerciseSearch>,
    history: SearchHistory,
    config: SearchConfig,
    input: Mutex<SearchInput>,
    /// Sequence number of the most recently issued request
    latest: AtomicU64,
    state: watch::Sender<SearchState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Inner {
    fn next_seq(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    /// Run the current input. `None` means the result was superseded.
    async fn execute(&self) -> Option<SearchResult> {
        let input = lock(&self.input).clone();
        let parsed = parse(&input.query);
        let filters = to_filters(&parsed.operators, &input.filters);

        if parsed.is_blank() && filters.is_empty() {
            // also invalidates anything still in flight
            self.reset_to_idle();
            return Some(SearchResult::empty());
        }

        // Allocated under the state lock so a concurrent reset cannot slip in
        // between numbering the request and marking it in flight.
        let mut seq = 0;
        self.state.send_modify(|s| {
            seq = self.next_seq();
            s.phase = SearchPhase::Searching;
            s.query = input.query.clone();
        });
        debug!(seq, query = %parsed.clean_query, "Issuing search");

        let outcome = self
            .searcher
            .search_exercises(&parsed.clean_query, &filters, input.sort, self.config.page_size, 0)
            .await;

        let (result, succeeded) = match outcome {
            Ok(result) => (result, true),
            Err(e) => {
                warn!("Search for '{}' failed: {:#}", input.query, e);
                (SearchResult::empty(), false)
            }
        };

        let settled = SearchState {
            phase: SearchPhase::Settled,
            query: input.query.clone(),
            clean_query: parsed.clean_query,
            filters,
            sort: input.sort,
            result: result.clone(),
        };
        if !self.publish_if_latest(seq, settled) {
            debug!(seq, "Discarding stale search result");
            return None;
        }

        if succeeded && !input.query.trim().is_empty() {
            self.history.record(&input.query, result.filtered_count);
            self.history.record_analytics(&input.query, result.filtered_count);
        }
        Some(result)
    }

    /// Replace the state only if `seq` is still the newest request
    ///
    /// The check runs inside the watch lock, the same lock every reset takes,
    /// so a superseded result can never land after a newer state.
    fn publish_if_latest(&self, seq: u64, next: SearchState) -> bool {
        self.state.send_if_modified(|s| {
            if !self.is_latest(seq) {
                return false;
            }
            *s = next;
            true
        })
    }

    /// Invalidate in-flight requests and show the idle state
    fn reset_to_idle(&self) {
        self.state.send_modify(|s| {
            self.next_seq();
            *s = SearchState::idle();
        });
    }

    /// Fetch the page after the settled result and publish the combined list
    async fn load_more(&self) -> Option<SearchResult> {
        // Snapshot and numbering happen under one lock, as in `execute`
        let mut request = None;
        self.state.send_if_modified(|s| {
            if s.phase == SearchPhase::Settled && s.result.has_more {
                request = Some((self.next_seq(), s.clone()));
            }
            false
        });
        let (seq, current) = request?;

        let offset = current.result.items.len();
        let outcome = self
            .searcher
            .search_exercises(
                &current.clean_query,
                &current.filters,
                current.sort,
                self.config.page_size,
                offset,
            )
            .await;

        let page = match outcome {
            Ok(page) => page,
            Err(e) => {
                warn!("Loading more results for '{}' failed: {:#}", current.query, e);
                return None;
            }
        };

        let mut items = current.result.items;
        items.extend(page.items);
        let result = SearchResult {
            items,
            total_count: page.total_count,
            filtered_count: page.filtered_count,
            search_time_ms: page.search_time_ms,
            has_more: page.has_more,
        };
        let next = SearchState {
            result: result.clone(),
            ..current
        };
        if !self.publish_if_latest(seq, next) {
            debug!(seq, "Discarding stale page");
            return None;
        }
        Some(result)
    }
}

/// One search surface: input, history, and the result on display
pub struct SearchSession {
    inner: Arc<Inner>,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchSession {
    /// Must be created inside a tokio runtime; debounce timers run on it
    pub fn new(
        searcher: Arc<dyn ExerciseSearch>,
        history: SearchHistory,
        config: SearchConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current().context("search session needs a tokio runtime")?;
        let (state, _) = watch::channel(SearchState::idle());
        Ok(Self {
            inner: Arc::new(Inner {
                searcher,
                history,
                config,
                input: Mutex::new(SearchInput::default()),
                latest: AtomicU64::new(0),
                state,
            }),
            runtime,
            pending: Mutex::new(None),
        })
    }

    pub fn history(&self) -> &SearchHistory {
        &self.inner.history
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    /// Current state snapshot
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn query(&self) -> String {
        lock(&self.inner.input).query.clone()
    }

    pub fn filters(&self) -> FilterSet {
        lock(&self.inner.input).filters.clone()
    }

    /// Update the raw query and restart the debounce timer
    pub fn set_query(&self, query: impl Into<String>) {
        lock(&self.inner.input).query = query.into();
        self.schedule();
    }

    /// Replace the externally controlled filters and restart the debounce timer
    pub fn set_filters(&self, filters: FilterSet) {
        lock(&self.inner.input).filters = filters;
        self.schedule();
    }

    pub fn set_sort(&self, sort: SortSpec) {
        lock(&self.inner.input).sort = sort;
        self.schedule();
    }

    /// Run the current input right away, skipping the debounce window
    pub async fn search_now(&self) -> Option<SearchResult> {
        self.cancel_pending();
        self.inner.execute().await
    }

    pub async fn load_more(&self) -> Option<SearchResult> {
        self.inner.load_more().await
    }

    /// Drop query and filters and go back to idle
    pub fn clear(&self) {
        self.cancel_pending();
        *lock(&self.inner.input) = SearchInput::default();
        self.inner.reset_to_idle();
    }

    pub fn suggestions(&self, partial: &str) -> Vec<SearchSuggestion> {
        let history = &self.inner.history;
        generate_suggestions(partial, &history.entries(), &history.saved())
    }

    /// Save the current query and filters under `name`
    pub fn save_current(&self, name: &str) -> Option<SavedSearch> {
        let input = lock(&self.inner.input).clone();
        if input.query.trim().is_empty() && input.filters.is_empty() {
            return None;
        }
        let saved = self.inner.history.save(name, &input.query, &input.filters);
        info!("Saved search '{}'", saved.name);
        Some(saved)
    }

    /// Load a saved search into the input and run it after the debounce window
    pub fn apply_saved(&self, saved: &SavedSearch) {
        {
            let mut input = lock(&self.inner.input);
            input.query = saved.query.clone();
            input.filters = saved.filters.clone();
        }
        self.schedule();
    }

    fn schedule(&self) {
        let inner = Arc::clone(&self.inner);
        let delay = inner.config.debounce;
        let runtime = self.runtime.clone();

        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later abort of this timer never cancels the request
            runtime.spawn(async move {
                inner.execute().await;
            });
        });

        if let Some(previous) = lock(&self.pending).replace(handle) {
            previous.abort();
        }
    }

    fn cancel_pending(&self) {
        if let Some(previous) = lock(&self.pending).take() {
            previous.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
