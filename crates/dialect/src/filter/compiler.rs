//! Filter compilation.

use serde::Serialize;
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::lookup::{Website, WebsiteLookup};
use crate::types::{ParamMap, SqlValue};

use super::{FilterOperator, FilterSpec, QueryFilters, QueryOptions};

/// Join that brings session columns into event queries.
pub const SESSION_JOIN: &str = "inner join session on website_event.session_id = session.session_id";

const DEFAULT_DATE_COLUMN: &str = "website_event.created_at";

/// SQL fragments and parameters produced for one report query.
///
/// Fragments contain `{{name}}` placeholders only; every value lives in
/// `params`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFilters {
    /// Session join, or empty.
    pub join_fragment: String,
    /// Newline separated `AND ...` predicates, or empty.
    pub where_fragment: String,
    /// Date range predicate, or empty.
    pub date_fragment: String,
    /// Values for every placeholder in the fragments.
    pub params: ParamMap,
}

impl CompiledFilters {
    /// Whether the session table is joined.
    pub fn joins_session(&self) -> bool {
        !self.join_fragment.is_empty()
    }
}

/// Compiles [`QueryFilters`] for one dialect.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    dialect: Dialect,
    date_column: String,
}

impl FilterCompiler {
    /// Creates a compiler filtering dates on `website_event.created_at`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }

    /// Filters dates on another column.
    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    /// The dialect fragments are compiled for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Resolves the website, then compiles.
    ///
    /// Fails with [`QueryError::EntityNotFound`] when the lookup has no such
    /// website. Lookup failures surface as [`QueryError::Execution`].
    pub async fn compile<L>(
        &self,
        lookup: &L,
        website_id: Uuid,
        filters: &QueryFilters,
        options: &QueryOptions,
    ) -> QueryResult<CompiledFilters>
    where
        L: WebsiteLookup + ?Sized,
    {
        let website = lookup
            .website(website_id)
            .await?
            .ok_or_else(|| QueryError::website_not_found(website_id))?;

        Ok(self.compile_for(&website, filters, options))
    }

    /// Compiles filters for an already resolved website.
    pub fn compile_for(
        &self,
        website: &Website,
        filters: &QueryFilters,
        options: &QueryOptions,
    ) -> CompiledFilters {
        let range = filters.date_range().clamp(website.reset_at);

        let needs_session =
            options.join_session || filters.filters.iter().any(FilterSpec::is_session_scoped);
        let join_fragment = if needs_session {
            SESSION_JOIN.to_string()
        } else {
            String::new()
        };

        let where_fragment = filters
            .filters
            .iter()
            .flat_map(|filter| self.filter_lines(filter))
            .collect::<Vec<_>>()
            .join("\n");

        let date_fragment = match (range.start_date, range.end_date) {
            (Some(_), Some(_)) => format!(
                "AND {} BETWEEN {{{{startDate}}}} AND {{{{endDate}}}}",
                self.date_column
            ),
            (Some(_), None) => format!("AND {} >= {{{{startDate}}}}", self.date_column),
            (None, _) => String::new(),
        };

        let mut params = ParamMap::new();
        for filter in &filters.filters {
            let value = if filter.operator.is_substring() {
                filter.value.wildcard()
            } else {
                filter.value.clone()
            };
            params.insert(filter.name.clone(), value);
        }
        params.insert("websiteId".to_string(), SqlValue::Uuid(website.id));
        params.insert(
            "websiteDomain".to_string(),
            SqlValue::text(website.domain.clone()),
        );
        if let Some(start) = range.start_date {
            params.insert("startDate".to_string(), SqlValue::Timestamp(start));
        }
        if let Some(end) = range.end_date {
            params.insert("endDate".to_string(), SqlValue::Timestamp(end));
        }

        tracing::trace!(
            dialect = %self.dialect,
            filters = filters.filters.len(),
            joins_session = needs_session,
            "Compiled report filters"
        );

        CompiledFilters {
            join_fragment,
            where_fragment,
            date_fragment,
            params,
        }
    }

    fn filter_lines(&self, filter: &FilterSpec) -> Vec<String> {
        let Some(column) = filter.column.as_deref() else {
            return Vec::new();
        };

        let like = self.dialect.sql().like_operator();
        let op = match filter.operator {
            FilterOperator::Equals => "=".to_string(),
            FilterOperator::NotEquals => "!=".to_string(),
            FilterOperator::Contains => like.to_string(),
            FilterOperator::DoesNotContain => format!("not {}", like),
        };
        let placeholder = match &filter.type_hint {
            Some(hint) => format!("{{{{{}::{}}}}}", filter.name, hint),
            None => format!("{{{{{}}}}}", filter.name),
        };

        let mut lines = vec![format!("AND {} {} {}", column, op, placeholder)];
        if filter.name == "referrer" {
            lines.push(
                "AND (website_event.referrer_domain != {{websiteDomain}} \
                 or website_event.referrer_domain is null)"
                    .to_string(),
            );
        }
        lines
    }
}
