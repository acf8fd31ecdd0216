//! Exercise catalog - the search collaborator behind a search session

use std::cmp::Ordering;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Instant;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::exercises::{Category, Difficulty, Exercise, MuscleGroup, get_all_exercises};
use crate::search::{FilterSet, SearchResult, SortField, SortOrder, SortSpec};

/// Executes a search against an exercise source
///
/// The session only depends on this contract; a remote backend and the
/// built-in [`LocalCatalog`] are interchangeable.
#[async_trait]
pub trait ExerciseSearch: Send + Sync {
    async fn search_exercises(
        &self,
        query: &str,
        filters: &FilterSet,
        sort: SortSpec,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResult>;
}

/// In-memory catalog over the built-in exercise library
pub struct LocalCatalog {
    exercises: RwLock<Vec<Exercise>>,
    next_custom_id: AtomicU64,
}

impl Default for LocalCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCatalog {
    pub fn new() -> Self {
        Self::with_exercises(get_all_exercises())
    }

    pub fn with_exercises(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises: RwLock::new(exercises),
            next_custom_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.exercises.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a user-defined exercise for this session only
    ///
    /// Custom entries get a synthetic id, zero calories and no equipment.
    /// They are not written anywhere.
    pub fn add_custom(
        &self,
        name: &str,
        category: Category,
        muscle_groups: Vec<MuscleGroup>,
    ) -> Result<Exercise> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("custom exercise needs a name"));
        }
        let n = self.next_custom_id.fetch_add(1, AtomicOrdering::Relaxed);
        let exercise = Exercise {
            id: format!("custom-{}", n),
            name: name.to_string(),
            category,
            muscle_groups,
            equipment: Vec::new(),
            difficulty: Difficulty::Beginner,
            calories_per_minute: 0.0,
            description: None,
            video_url: None,
            image_url: None,
            is_custom: true,
        };
        self.exercises
            .write()
            .map_err(|_| anyhow!("catalog lock poisoned"))?
            .push(exercise.clone());
        debug!("Added custom exercise {} ({})", exercise.name, exercise.id);
        Ok(exercise)
    }
}

fn matches_filters(exercise: &Exercise, filters: &FilterSet) -> bool {
    if !filters.muscles.is_empty()
        && !filters
            .muscles
            .iter()
            .any(|v| exercise.muscle_groups.iter().any(|m| m.matches(v)))
    {
        return false;
    }
    if !filters.equipment.is_empty()
        && !filters
            .equipment
            .iter()
            .any(|v| exercise.equipment.iter().any(|e| e.as_str() == v))
    {
        return false;
    }
    if !filters.categories.is_empty()
        && !filters.categories.iter().any(|v| exercise.category.as_str() == v)
    {
        return false;
    }
    if !filters.difficulty.is_empty()
        && !filters.difficulty.iter().any(|v| exercise.difficulty.as_str() == v)
    {
        return false;
    }
    if filters.has_video && exercise.video_url.is_none() {
        return false;
    }
    if filters.has_image && exercise.image_url.is_none() {
        return false;
    }
    true
}

/// Lower is better: name prefix, then name contains, then anything else
fn relevance_rank(exercise: &Exercise, query: &str) -> u8 {
    if query.is_empty() {
        return 0;
    }
    let name = exercise.name.to_lowercase();
    if name.starts_with(query) {
        0
    } else if name.contains(query) {
        1
    } else {
        2
    }
}

fn compare(a: &Exercise, b: &Exercise, sort: SortSpec, query: &str) -> Ordering {
    let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
    let ordering = match sort.field {
        // best match first regardless of order
        SortField::Relevance => {
            return relevance_rank(a, query)
                .cmp(&relevance_rank(b, query))
                .then_with(by_name);
        }
        SortField::Name => by_name(),
        SortField::Difficulty => a.difficulty.cmp(&b.difficulty).then_with(by_name),
        SortField::Calories => a
            .calories_per_minute
            .total_cmp(&b.calories_per_minute)
            .then_with(by_name),
    };
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ExerciseSearch for LocalCatalog {
    async fn search_exercises(
        &self,
        query: &str,
        filters: &FilterSet,
        sort: SortSpec,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResult> {
        let started = Instant::now();
        let exercises = self.exercises.read().map_err(|_| anyhow!("catalog lock poisoned"))?;

        let query = query.trim().to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();

        let mut matched: Vec<&Exercise> = exercises
            .iter()
            .filter(|e| matches_filters(e, filters))
            .filter(|e| {
                let hay = e.haystack();
                terms.iter().all(|t| hay.contains(t))
            })
            .collect();
        matched.sort_by(|a, b| compare(a, b, sort, &query));

        let filtered_count = matched.len();
        let items: Vec<Exercise> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        let has_more = offset + items.len() < filtered_count;

        Ok(SearchResult {
            total_count: exercises.len(),
            filtered_count,
            has_more,
            items,
            search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
