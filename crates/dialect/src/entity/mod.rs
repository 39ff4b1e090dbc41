//! The analytics entity catalogue and the structured query path.
//!
//! [`Entity`] is the closed set of tables the structured path can query.
//! Each entity knows its table, primary key and the to-one relations its
//! foreign keys point along. [`EntityStore`] is the structured counterpart
//! to [`crate::executor::QueryExecutor`]; [`SqlEntityStore`] implements it by
//! rendering [`Criteria`] to SQL for the configured dialect.

mod sql;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::predicate::Predicate;
use crate::types::{OrderBy, PageWindow, Row, SqlValue};

pub use sql::SqlEntityStore;

static COLUMN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("column pattern is a valid regex")
});

/// The entities reachable through the structured query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    /// Tracked website.
    Website,
    /// Visitor session.
    Session,
    /// Page view or custom event.
    WebsiteEvent,
    /// Account.
    User,
    /// Team of users.
    Team,
    /// Team membership.
    TeamUser,
    /// Saved report.
    Report,
}

/// A to-one relation from one entity to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Relation name as used in predicates.
    pub name: &'static str,
    /// The related entity.
    pub target: Entity,
    /// Column on the owning entity holding the target's primary key.
    pub foreign_key: &'static str,
}

const fn rel(name: &'static str, target: Entity, foreign_key: &'static str) -> Relation {
    Relation {
        name,
        target,
        foreign_key,
    }
}

const WEBSITE_RELATIONS: &[Relation] = &[
    rel("user", Entity::User, "user_id"),
    rel("team", Entity::Team, "team_id"),
];
const SESSION_RELATIONS: &[Relation] = &[rel("website", Entity::Website, "website_id")];
const WEBSITE_EVENT_RELATIONS: &[Relation] = &[
    rel("website", Entity::Website, "website_id"),
    rel("session", Entity::Session, "session_id"),
];
const TEAM_USER_RELATIONS: &[Relation] = &[
    rel("user", Entity::User, "user_id"),
    rel("team", Entity::Team, "team_id"),
];
const REPORT_RELATIONS: &[Relation] = &[
    rel("website", Entity::Website, "website_id"),
    rel("user", Entity::User, "user_id"),
];

impl Entity {
    /// Every entity.
    pub const ALL: [Entity; 7] = [
        Entity::Website,
        Entity::Session,
        Entity::WebsiteEvent,
        Entity::User,
        Entity::Team,
        Entity::TeamUser,
        Entity::Report,
    ];

    /// Table name.
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Website => "website",
            Entity::Session => "session",
            Entity::WebsiteEvent => "website_event",
            Entity::User => "user",
            Entity::Team => "team",
            Entity::TeamUser => "team_user",
            Entity::Report => "report",
        }
    }

    /// Primary key column.
    pub fn primary_key(&self) -> &'static str {
        match self {
            Entity::Website => "website_id",
            Entity::Session => "session_id",
            Entity::WebsiteEvent => "event_id",
            Entity::User => "user_id",
            Entity::Team => "team_id",
            Entity::TeamUser => "team_user_id",
            Entity::Report => "report_id",
        }
    }

    /// Relations owned by this entity.
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            Entity::Website => WEBSITE_RELATIONS,
            Entity::Session => SESSION_RELATIONS,
            Entity::WebsiteEvent => WEBSITE_EVENT_RELATIONS,
            Entity::User | Entity::Team => &[],
            Entity::TeamUser => TEAM_USER_RELATIONS,
            Entity::Report => REPORT_RELATIONS,
        }
    }

    /// Looks up a relation by name.
    pub fn relation(&self, name: &str) -> Option<Relation> {
        self.relations().iter().find(|r| r.name == name).copied()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Entity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|e| e.table() == s)
            .ok_or_else(|| QueryError::InvalidCriteria {
                message: format!("unknown entity '{}'", s),
            })
    }
}

/// Filters for a structured query.
///
/// Equality filters and the predicate are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// `column = value` filters, in order.
    pub equals: Vec<(String, SqlValue)>,
    /// Additional predicate.
    pub predicate: Option<Predicate>,
}

impl Criteria {
    /// Empty criteria (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.equals.push((column.into(), value.into()));
        self
    }

    /// ANDs a predicate into the criteria.
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(Predicate::And(mut children)) => {
                children.push(predicate);
                Predicate::And(children)
            }
            Some(existing) => Predicate::And(vec![existing, predicate]),
            None => predicate,
        });
        self
    }

    /// Returns true if nothing filters the result.
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.predicate.is_none()
    }
}

/// Arguments for [`EntityStore::find_many`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindArgs {
    /// Row filters.
    pub criteria: Criteria,
    /// Sort term.
    pub order: Option<OrderBy>,
    /// Limit/offset.
    pub window: PageWindow,
}

impl FindArgs {
    /// Find everything matching `criteria`.
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            ..Default::default()
        }
    }
}

/// Structured data access by entity.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Returns rows of `entity` matching `args`.
    async fn find_many(&self, entity: Entity, args: &FindArgs) -> QueryResult<Vec<Row>>;

    /// Counts rows of `entity` matching `criteria`.
    async fn count(&self, entity: Entity, criteria: &Criteria) -> QueryResult<u64>;
}

pub(crate) fn validate_column(column: &str) -> QueryResult<&str> {
    if COLUMN_NAME.is_match(column) {
        Ok(column)
    } else {
        Err(QueryError::InvalidCriteria {
            message: format!("invalid column name '{}'", column),
        })
    }
}
