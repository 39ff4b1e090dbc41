//! Free-text search over entity fields.

use crate::dialect::Dialect;
use crate::predicate::{Condition, Predicate};

/// A field a search query is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchField {
    /// A column on the searched entity.
    Field(String),
    /// A field reached through a relation.
    Related {
        /// Relation name.
        relation: String,
        /// Field on the related entity.
        inner: Box<SearchField>,
    },
}

impl SearchField {
    /// A column on the searched entity.
    pub fn field(name: impl Into<String>) -> Self {
        SearchField::Field(name.into())
    }

    /// A field on a related entity.
    pub fn related(relation: impl Into<String>, inner: SearchField) -> Self {
        SearchField::Related {
            relation: relation.into(),
            inner: Box::new(inner),
        }
    }

    fn to_predicate(&self, query: &str, insensitive: bool) -> Predicate {
        match self {
            SearchField::Field(name) => {
                Predicate::matches(name.clone(), Condition::contains(query, insensitive))
            }
            SearchField::Related { relation, inner } => {
                Predicate::related(relation.clone(), inner.to_predicate(query, insensitive))
            }
        }
    }
}

impl From<&str> for SearchField {
    fn from(name: &str) -> Self {
        SearchField::field(name)
    }
}

/// Builds `And([Or([contains query on each field])])`.
///
/// Returns `None` for a blank query so callers can skip the clause. The
/// case-insensitive flag is set only where the dialect needs it requested;
/// MySQL collations already compare case-insensitively.
///
/// ```
/// use helios_dialect::dialect::Dialect;
/// use helios_dialect::search::{SearchField, build_search_predicate};
/// use serde_json::json;
///
/// let predicate = build_search_predicate(Dialect::Postgres, "blog", &[SearchField::field("name")]).unwrap();
/// assert_eq!(
///     predicate.to_json(),
///     json!({"AND": {"OR": [{"name": {"contains": "blog", "mode": "insensitive"}}]}})
/// );
/// ```
pub fn build_search_predicate(
    dialect: Dialect,
    query: &str,
    fields: &[SearchField],
) -> Option<Predicate> {
    let query = query.trim();
    if query.is_empty() || fields.is_empty() {
        return None;
    }

    let insensitive = dialect.sql().explicit_case_insensitive();
    let alternatives = fields
        .iter()
        .map(|field| field.to_predicate(query, insensitive))
        .collect();

    Some(Predicate::And(vec![Predicate::Or(alternatives)]))
}
