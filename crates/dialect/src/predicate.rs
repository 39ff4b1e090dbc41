//! Structured predicates for the entity store.
//!
//! A [`Predicate`] is a small boolean tree over entity fields. It renders two
//! ways: to SQL through [`crate::entity::SqlEntityStore`], and to the
//! ORM-style JSON document returned by [`Predicate::to_json`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::types::SqlValue;

/// How a field is compared with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOp {
    /// Exact equality.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

impl MatchOp {
    /// Key used in the JSON rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Equals => "equals",
            MatchOp::Contains => "contains",
            MatchOp::StartsWith => "startsWith",
            MatchOp::EndsWith => "endsWith",
        }
    }

    /// The value as bound for this operator (`%v%`, `v%`, `%v`).
    pub fn pattern(&self, value: &SqlValue) -> SqlValue {
        let text = match value {
            SqlValue::Null => return SqlValue::Null,
            SqlValue::Text(s) => s.clone(),
            other => other.to_string(),
        };
        match self {
            MatchOp::Equals => value.clone(),
            MatchOp::Contains => SqlValue::Text(format!("%{}%", text)),
            MatchOp::StartsWith => SqlValue::Text(format!("{}%", text)),
            MatchOp::EndsWith => SqlValue::Text(format!("%{}", text)),
        }
    }
}

/// Comparison applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Operator.
    pub op: MatchOp,
    /// Right-hand value, unwrapped.
    pub value: SqlValue,
    /// Request case-insensitive matching explicitly.
    #[serde(default)]
    pub insensitive: bool,
}

impl Condition {
    /// Substring match.
    pub fn contains(value: impl Into<SqlValue>, insensitive: bool) -> Self {
        Self {
            op: MatchOp::Contains,
            value: value.into(),
            insensitive,
        }
    }

    /// Exact match.
    pub fn equals(value: impl Into<SqlValue>) -> Self {
        Self {
            op: MatchOp::Equals,
            value: value.into(),
            insensitive: false,
        }
    }
}

/// A boolean tree over entity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// All children hold.
    And(Vec<Predicate>),
    /// Any child holds.
    Or(Vec<Predicate>),
    /// A field comparison.
    Match {
        /// Column on the current entity.
        field: String,
        /// Comparison.
        condition: Condition,
    },
    /// A predicate on a related entity.
    Related {
        /// Relation name on the current entity.
        relation: String,
        /// Predicate evaluated against the related entity.
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// Field comparison.
    pub fn matches(field: impl Into<String>, condition: Condition) -> Self {
        Predicate::Match {
            field: field.into(),
            condition,
        }
    }

    /// Predicate on a related entity.
    pub fn related(relation: impl Into<String>, predicate: Predicate) -> Self {
        Predicate::Related {
            relation: relation.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Renders the ORM-style filter document.
    ///
    /// A conjunction with one child renders as that child's object; a
    /// disjunction is always a list.
    pub fn to_json(&self) -> Value {
        match self {
            Predicate::And(children) => {
                let inner = match children.as_slice() {
                    [only] => only.to_json(),
                    _ => Value::Array(children.iter().map(Predicate::to_json).collect()),
                };
                json!({ "AND": inner })
            }
            Predicate::Or(children) => {
                json!({ "OR": children.iter().map(Predicate::to_json).collect::<Vec<_>>() })
            }
            Predicate::Match { field, condition } => {
                let mut body = Map::new();
                let value = serde_json::to_value(&condition.value).unwrap_or(Value::Null);
                body.insert(condition.op.as_str().to_string(), value);
                if condition.insensitive {
                    body.insert("mode".to_string(), Value::from("insensitive"));
                }
                let mut doc = Map::new();
                doc.insert(field.clone(), Value::Object(body));
                Value::Object(doc)
            }
            Predicate::Related {
                relation,
                predicate,
            } => {
                let mut doc = Map::new();
                doc.insert(relation.clone(), predicate.to_json());
                Value::Object(doc)
            }
        }
    }
}
