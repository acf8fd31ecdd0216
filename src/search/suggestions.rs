//! Suggestion ranking for the search box

use super::query::trailing_field;
use super::types::{
    OperatorField, SavedSearch, SearchHistoryEntry, SearchSuggestion, SuggestionKind,
};

const MAX_HISTORY_SUGGESTIONS: usize = 3;
const MAX_SAVED_SUGGESTIONS: usize = 2;

/// Candidate values offered after a bare `field:`
pub fn operator_values(field: &OperatorField) -> &'static [&'static str] {
    match field {
        OperatorField::Muscle => &[
            "chest", "back", "shoulders", "biceps", "triceps", "core", "glutes", "quads",
            "hamstrings", "calves",
        ],
        OperatorField::Equipment => &[
            "barbell", "dumbbell", "kettlebell", "bodyweight", "cable", "machine", "bands",
        ],
        OperatorField::Category => &[
            "strength", "cardio", "flexibility", "plyometrics", "martial_arts",
        ],
        OperatorField::Difficulty => &["beginner", "intermediate", "advanced"],
        OperatorField::Video | OperatorField::Image => &["true", "false"],
        OperatorField::Unrecognized(_) => &[],
    }
}

/// Build suggestions for a partially typed query
///
/// Fixed priority: matching history, then matching saved searches, then
/// operator values when the query ends in `field:`. Within a group the
/// stored order is kept.
pub fn generate_suggestions(
    query: &str,
    history: &[SearchHistoryEntry],
    saved: &[SavedSearch],
) -> Vec<SearchSuggestion> {
    let needle = query.to_lowercase();
    let mut suggestions = Vec::new();

    suggestions.extend(
        history
            .iter()
            .filter(|e| e.query.to_lowercase().contains(&needle))
            .take(MAX_HISTORY_SUGGESTIONS)
            .map(|e| SearchSuggestion {
                kind: SuggestionKind::History,
                text: e.query.clone(),
                detail: Some(format!("{} results", e.result_count)),
            }),
    );

    suggestions.extend(
        saved
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle) || s.query.to_lowercase().contains(&needle)
            })
            .take(MAX_SAVED_SUGGESTIONS)
            .map(|s| SearchSuggestion {
                kind: SuggestionKind::Saved,
                text: s.query.clone(),
                detail: Some(s.name.clone()),
            }),
    );

    if let Some(field) = trailing_field(query) {
        let field = OperatorField::from_name(&field.to_lowercase());
        suggestions.extend(operator_values(&field).iter().map(|value| SearchSuggestion {
            kind: SuggestionKind::Operator,
            text: format!("{}{}", query, value),
            detail: Some(format!("{}:{}", field, value)),
        }));
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::FilterSet;
    use chrono::Utc;

    fn entry(query: &str) -> SearchHistoryEntry {
        SearchHistoryEntry {
            query: query.to_string(),
            timestamp: Utc::now(),
            result_count: 1,
        }
    }

    fn saved(name: &str, query: &str) -> SavedSearch {
        SavedSearch {
            id: format!("id-{}", name),
            name: name.to_string(),
            query: query.to_string(),
            filters: FilterSet::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_capped_and_ordered() {
        let history = vec![
            entry("bench press"),
            entry("Incline press"),
            entry("squat"),
            entry("overhead PRESS"),
            entry("leg press"),
        ];
        let s = generate_suggestions("press", &history, &[]);
        let texts: Vec<_> = s.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["bench press", "Incline press", "overhead PRESS"]);
        assert!(s.iter().all(|s| s.kind == SuggestionKind::History));
    }

    #[test]
    fn test_saved_match_by_name_or_query() {
        let saved_list = vec![
            saved("Leg day", "squat muscle:quads"),
            saved("Push", "press"),
            saved("Arms", "curl"),
            saved("Legs two", "lunge"),
        ];
        let s = generate_suggestions("leg", &[], &saved_list);
        let names: Vec<_> = s.iter().filter_map(|s| s.detail.as_deref()).collect();
        assert_eq!(names, vec!["Leg day", "Legs two"]);

        let s = generate_suggestions("press", &[], &saved_list);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].text, "press");
    }

    #[test]
    fn test_group_priority() {
        let history = vec![entry("chest equipment:barbell")];
        let saved_list = vec![saved("Chest", "chest")];
        let s = generate_suggestions("chest", &history, &saved_list);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].kind, SuggestionKind::History);
        assert_eq!(s[1].kind, SuggestionKind::Saved);
    }

    #[test]
    fn test_operator_values_after_trailing_field() {
        let s = generate_suggestions("chest difficulty:", &[], &[]);
        let texts: Vec<_> = s.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "chest difficulty:beginner",
                "chest difficulty:intermediate",
                "chest difficulty:advanced",
            ]
        );
        assert!(s.iter().all(|s| s.kind == SuggestionKind::Operator));
    }

    #[test]
    fn test_unknown_trailing_field_has_no_values() {
        assert!(generate_suggestions("colour:", &[], &[]).is_empty());
    }

    #[test]
    fn test_plural_alias_gets_values() {
        let s = generate_suggestions("muscles:", &[], &[]);
        assert_eq!(s.len(), 10);
        assert_eq!(s[0].text, "muscles:chest");
    }

    #[test]
    fn test_restartable() {
        let history = vec![entry("row"), entry("rower")];
        let first = generate_suggestions("row", &history, &[]);
        let second = generate_suggestions("row", &history, &[]);
        assert_eq!(first, second);
    }
}
