//! Query interpreter - splits `field:value` operators out of free text

use std::sync::LazyLock;

use regex::Regex;

use super::types::{FilterSet, OperatorField, SearchOperator};

/// `word:non-whitespace`; a bare `word:` never matches
static OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+):(\S+)").expect("operator pattern is valid"));

/// Values accepted as "true" for the media flags. Nothing else is.
const TRUTHY: &[&str] = &["true", "yes"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub clean_query: String,
    pub operators: Vec<SearchOperator>,
}

impl ParsedQuery {
    pub fn is_blank(&self) -> bool {
        self.clean_query.trim().is_empty()
    }
}

/// Parse a raw search string into free text plus operators
///
/// Operators keep their order of appearance. Each matched token is cut out
/// of the text and the remainder is trimmed; anything that does not match
/// stays in the query verbatim.
pub fn parse(raw: &str) -> ParsedQuery {
    let mut operators = Vec::new();
    let mut clean = String::with_capacity(raw.len());
    let mut last = 0;

    for caps in OPERATOR_RE.captures_iter(raw) {
        let (Some(whole), Some(field), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        operators.push(SearchOperator {
            field: OperatorField::from_name(&field.as_str().to_lowercase()),
            value: value.as_str().to_lowercase(),
        });
        clean.push_str(&raw[last..whole.start()]);
        last = whole.end();
    }
    clean.push_str(&raw[last..]);

    ParsedQuery {
        clean_query: clean.trim().to_string(),
        operators,
    }
}

/// Fold operators into a copy of `existing`
///
/// List categories are unioned (a value already present is not added
/// twice). Media flags are set from a literal match against `true`/`yes`.
pub fn to_filters(operators: &[SearchOperator], existing: &FilterSet) -> FilterSet {
    let mut filters = existing.clone();

    for op in operators {
        match &op.field {
            OperatorField::Muscle => push_unique(&mut filters.muscles, &op.value),
            OperatorField::Equipment => push_unique(&mut filters.equipment, &op.value),
            OperatorField::Category => push_unique(&mut filters.categories, &op.value),
            OperatorField::Difficulty => push_unique(&mut filters.difficulty, &op.value),
            OperatorField::Video => filters.has_video = is_truthy(&op.value),
            OperatorField::Image => filters.has_image = is_truthy(&op.value),
            OperatorField::Unrecognized(_) => {}
        }
    }

    filters
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value)
}

/// Field name of a trailing `field:` with no value yet, e.g. `"chest muscle:"`
pub fn trailing_field(query: &str) -> Option<&str> {
    let stripped = query.strip_suffix(':')?;
    let start = stripped
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let field = &stripped[start..];
    (!field.is_empty()).then_some(field)
}
