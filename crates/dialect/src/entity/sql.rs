//! [`EntityStore`] over a [`QueryExecutor`].

use async_trait::async_trait;

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::executor::{QueryExecutor, RawQuery};
use crate::paging::read_count;
use crate::predicate::{MatchOp, Predicate};
use crate::types::{ParamMap, Row, SqlValue};

use super::{Criteria, Entity, EntityStore, FindArgs, validate_column};

/// Renders structured criteria to SQL and runs it through a [`RawQuery`].
///
/// Statements are built as templates with generated `{{pN}}` placeholders,
/// so they go through the same binding and diagnostics as raw queries.
#[derive(Debug, Clone)]
pub struct SqlEntityStore<E> {
    runner: RawQuery<E>,
}

impl<E: QueryExecutor> SqlEntityStore<E> {
    /// Creates a store on top of `runner`.
    pub fn new(runner: RawQuery<E>) -> Self {
        Self { runner }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &RawQuery<E> {
        &self.runner
    }

    /// Renders the `select` for `find_many` without executing it.
    pub fn render_find(&self, entity: Entity, args: &FindArgs) -> QueryResult<(String, ParamMap)> {
        let mut writer = SqlWriter::new(self.runner.dialect());
        let table = writer.table(entity);

        let mut sql = format!("select {}.* from {}", table, table);
        writer.push_where(&mut sql, entity, &args.criteria)?;

        if let Some(order) = &args.order {
            sql.push_str(&format!("\norder by {}", order.to_sql()));
        }
        if let (Some(take), Some(skip)) = (args.window.take, args.window.skip) {
            sql.push_str(&format!("\nlimit {} offset {}", take, skip));
        }

        Ok((sql, writer.params))
    }

    /// Renders the `count(*)` for `count` without executing it.
    pub fn render_count(
        &self,
        entity: Entity,
        criteria: &Criteria,
    ) -> QueryResult<(String, ParamMap)> {
        let mut writer = SqlWriter::new(self.runner.dialect());
        let table = writer.table(entity);

        let mut sql = format!("select count(*) as num from {}", table);
        writer.push_where(&mut sql, entity, criteria)?;

        Ok((sql, writer.params))
    }
}

#[async_trait]
impl<E: QueryExecutor> EntityStore for SqlEntityStore<E> {
    async fn find_many(&self, entity: Entity, args: &FindArgs) -> QueryResult<Vec<Row>> {
        let (sql, params) = self.render_find(entity, args)?;
        self.runner.execute(&sql, &params).await
    }

    async fn count(&self, entity: Entity, criteria: &Criteria) -> QueryResult<u64> {
        let (sql, params) = self.render_count(entity, criteria)?;
        let rows = self.runner.execute(&sql, &params).await?;
        read_count(&rows)
    }
}

struct SqlWriter {
    dialect: Dialect,
    params: ParamMap,
}

impl SqlWriter {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: ParamMap::new(),
        }
    }

    fn table(&self, entity: Entity) -> String {
        match self.dialect {
            Dialect::Postgres => format!("\"{}\"", entity.table()),
            Dialect::MySql => format!("`{}`", entity.table()),
        }
    }

    fn bind(&mut self, value: SqlValue) -> String {
        let name = format!("p{}", self.params.len());
        self.params.insert(name.clone(), value);
        format!("{{{{{}}}}}", name)
    }

    fn push_where(&mut self, sql: &mut String, entity: Entity, criteria: &Criteria) -> QueryResult<()> {
        let mut clauses = Vec::new();
        let table = self.table(entity);

        for (column, value) in &criteria.equals {
            let column = validate_column(column)?;
            let clause = match value {
                SqlValue::Null => format!("{}.{} is null", table, column),
                value => format!("{}.{} = {}", table, column, self.bind(value.clone())),
            };
            clauses.push(clause);
        }
        if let Some(predicate) = &criteria.predicate {
            clauses.push(self.predicate(entity, predicate)?);
        }

        if !clauses.is_empty() {
            sql.push_str("\nwhere ");
            sql.push_str(&clauses.join("\nand "));
        }
        Ok(())
    }

    fn predicate(&mut self, entity: Entity, predicate: &Predicate) -> QueryResult<String> {
        match predicate {
            Predicate::And(children) => self.group(entity, children, " and ", "1 = 1"),
            Predicate::Or(children) => self.group(entity, children, " or ", "1 = 0"),
            Predicate::Match { field, condition } => {
                let column = format!("{}.{}", self.table(entity), validate_column(field)?);
                let clause = match (condition.op, &condition.value) {
                    (MatchOp::Equals, SqlValue::Null) => format!("{} is null", column),
                    (MatchOp::Equals, value) => {
                        format!("{} = {}", column, self.bind(value.clone()))
                    }
                    (op, value) => {
                        let like = if condition.insensitive {
                            self.dialect.sql().like_operator()
                        } else {
                            "like"
                        };
                        format!("{} {} {}", column, like, self.bind(op.pattern(value)))
                    }
                };
                Ok(clause)
            }
            Predicate::Related {
                relation,
                predicate,
            } => {
                let rel = entity
                    .relation(relation)
                    .ok_or_else(|| QueryError::InvalidCriteria {
                        message: format!("{} has no relation '{}'", entity, relation),
                    })?;
                let parent = self.table(entity);
                let target = self.table(rel.target);
                let inner = self.predicate(rel.target, predicate)?;
                Ok(format!(
                    "exists (select 1 from {target} where {target}.{pk} = {parent}.{fk} and {inner})",
                    pk = rel.target.primary_key(),
                    fk = rel.foreign_key,
                ))
            }
        }
    }

    fn group(
        &mut self,
        entity: Entity,
        children: &[Predicate],
        separator: &str,
        empty: &str,
    ) -> QueryResult<String> {
        if children.is_empty() {
            return Ok(empty.to_string());
        }
        let parts = children
            .iter()
            .map(|child| self.predicate(entity, child))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(format!("({})", parts.join(separator)))
    }
}
