//! Data types shared by the query interpreter, session and catalog

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercises::Exercise;

/// Filter category an operator field maps to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorField {
    Muscle,
    Equipment,
    Category,
    Difficulty,
    Video,
    Image,
    /// Parsed but not a known field; contributes nothing to filters
    Unrecognized(String),
}

impl OperatorField {
    /// Map a (lower-cased) field name to its category
    pub fn from_name(name: &str) -> Self {
        match name {
            "muscle" | "muscles" => OperatorField::Muscle,
            "equipment" => OperatorField::Equipment,
            "category" | "categories" => OperatorField::Category,
            "difficulty" => OperatorField::Difficulty,
            "video" => OperatorField::Video,
            "image" => OperatorField::Image,
            other => OperatorField::Unrecognized(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OperatorField::Muscle => "muscle",
            OperatorField::Equipment => "equipment",
            OperatorField::Category => "category",
            OperatorField::Difficulty => "difficulty",
            OperatorField::Video => "video",
            OperatorField::Image => "image",
            OperatorField::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, OperatorField::Unrecognized(_))
    }
}

impl fmt::Display for OperatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `field:value` token pulled out of a raw query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOperator {
    pub field: OperatorField,
    pub value: String,
}

impl SearchOperator {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: OperatorField::from_name(field),
            value: value.to_string(),
        }
    }
}

/// Structured constraints applied to a search
///
/// List categories are any-of within a list; the media flags only
/// constrain when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    pub muscles: Vec<String>,
    pub equipment: Vec<String>,
    pub categories: Vec<String>,
    pub difficulty: Vec<String>,
    pub has_video: bool,
    pub has_image: bool,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.muscles.is_empty()
            && self.equipment.is_empty()
            && self.categories.is_empty()
            && self.difficulty.is_empty()
            && !self.has_video
            && !self.has_image
    }

    /// Number of active constraints, for display
    pub fn active_count(&self) -> usize {
        self.muscles.len()
            + self.equipment.len()
            + self.categories.len()
            + self.difficulty.len()
            + usize::from(self.has_video)
            + usize::from(self.has_image)
    }

    /// Render back into operator syntax, e.g. `muscle:chest video:true`
    pub fn to_operator_string(&self) -> String {
        let mut parts = Vec::new();
        parts.extend(self.muscles.iter().map(|v| format!("muscle:{}", v)));
        parts.extend(self.equipment.iter().map(|v| format!("equipment:{}", v)));
        parts.extend(self.categories.iter().map(|v| format!("category:{}", v)));
        parts.extend(self.difficulty.iter().map(|v| format!("difficulty:{}", v)));
        if self.has_video {
            parts.push("video:true".to_string());
        }
        if self.has_image {
            parts.push("image:true".to_string());
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Relevance,
    Name,
    Difficulty,
    Calories,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// Snapshot returned by the search collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<Exercise>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub search_time_ms: f64,
    pub has_more: bool,
}

impl SearchResult {
    /// Zero-count result used for blank input and failed searches
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub filters: FilterSet,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    History,
    Saved,
    Operator,
}

impl SuggestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionKind::History => "recent",
            SuggestionKind::Saved => "saved",
            SuggestionKind::Operator => "filter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSuggestion {
    pub kind: SuggestionKind,
    /// Full query text to put in the search box when accepted
    pub text: String,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_count_counts_each_constraint() {
        let mut filters = FilterSet::default();
        assert_eq!(filters.active_count(), 0);
        assert!(filters.is_empty());

        filters.muscles = vec!["chest".to_string(), "back".to_string()];
        filters.difficulty = vec!["advanced".to_string()];
        filters.has_video = true;
        assert_eq!(filters.active_count(), 4);
        assert_eq!(
            filters.to_operator_string(),
            "muscle:chest muscle:back difficulty:advanced video:true"
        );
    }

    #[test]
    fn test_unrecognized_field_keeps_name() {
        let field = OperatorField::from_name("color");
        assert!(!field.is_recognized());
        assert_eq!(field.to_string(), "color");
    }
}
