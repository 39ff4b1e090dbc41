//! Named-placeholder SQL templates.
//!
//! Templates reference parameters as `{{name}}` or `{{name::type}}`. Binding
//! happens in two steps:
//!
//! 1. [`Template::parse`] splits the source into [`Token`]s.
//! 2. [`Template::bind`] renders each placeholder with the dialect's
//!    positional syntax and collects the values in the same order.
//!
//! ```
//! use helios_dialect::dialect::Dialect;
//! use helios_dialect::template::{BindMode, Template};
//! use helios_dialect::types::{ParamMap, SqlValue};
//!
//! let template = Template::parse("select * from t where id = {{id}} and name = {{name::text}}");
//! let mut params = ParamMap::new();
//! params.insert("id".into(), SqlValue::from(5i64));
//! params.insert("name".into(), SqlValue::from("a"));
//!
//! let pg = template.bind(Dialect::Postgres, &params, BindMode::Strict).unwrap();
//! assert_eq!(pg.sql, "select * from t where id = $1 and name = $2::text");
//!
//! let mysql = template.bind(Dialect::MySql, &params, BindMode::Strict).unwrap();
//! assert_eq!(mysql.sql, "select * from t where id = ? and name = ?");
//! assert_eq!(mysql.params, pg.params);
//! ```

mod parser;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::types::{ParamMap, SqlValue};

pub use parser::{Token, tokenize};

/// How to treat a placeholder with no entry in the parameter map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Fail with [`QueryError::MalformedTemplate`].
    #[default]
    Strict,
    /// Bind `NULL` and log a warning.
    Lenient,
}

/// A statement ready for the executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundQuery {
    /// SQL with dialect positional placeholders.
    pub sql: String,
    /// Values in placeholder order.
    pub params: Vec<SqlValue>,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Parses a template.
    ///
    /// Parsing never fails: text that does not look like a placeholder is
    /// kept as literal SQL.
    pub fn parse(source: &str) -> Self {
        Self {
            tokens: tokenize(source),
        }
    }

    /// The parsed tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Placeholder names in order of occurrence (duplicates included).
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Placeholder { name, .. } => Some(name.as_str()),
            Token::Text(_) => None,
        })
    }

    /// Renders the template for `dialect`, resolving values from `params`.
    pub fn bind(
        &self,
        dialect: Dialect,
        params: &ParamMap,
        mode: BindMode,
    ) -> QueryResult<BoundQuery> {
        let sql_dialect = dialect.sql();
        let mut sql = String::new();
        let mut values = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Text(text) => sql.push_str(text),
                Token::Placeholder {
                    name, type_hint, ..
                } => {
                    let value = match (params.get(name), mode) {
                        (Some(value), _) => value.clone(),
                        (None, BindMode::Lenient) => {
                            tracing::warn!(
                                placeholder = %name,
                                "Template placeholder has no parameter, binding NULL"
                            );
                            SqlValue::Null
                        }
                        (None, BindMode::Strict) => {
                            return Err(QueryError::MalformedTemplate { name: name.clone() });
                        }
                    };
                    values.push(value);
                    sql.push_str(&sql_dialect.placeholder(values.len(), type_hint.as_deref()));
                }
            }
        }

        Ok(BoundQuery {
            sql,
            params: values,
        })
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Template::parse(source)
    }
}
