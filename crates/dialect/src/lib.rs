//! Helios Dialect
//!
//! Dialect-portable SQL for analytics reporting. Reports are written once
//! as templates with named placeholders and run unchanged against
//! PostgreSQL or MySQL.
//!
//! # Features
//!
//! - **Fragment generators**: date bucketing, intervals, epoch and elapsed
//!   time arithmetic, case-insensitive matching, spelled per engine
//! - **Filter compiler**: report filters to join/where/date fragments plus
//!   parameters, scoped to one website
//! - **Templates**: `{{name}}` / `{{name::type}}` placeholders bound to
//!   `$n` or `?` positional parameters
//! - **Paging**: structured and raw paged queries with total counts
//! - **Search**: free-text predicates over entity fields and relations
//!
//! Enable database drivers with feature flags in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! helios-dialect = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! - `postgres` - `tokio-postgres` with a `deadpool-postgres` pool
//! - `mysql` - `sqlx` MySQL pool
//! - `cli` - the `helios-sql` renderer binary
//!
//! # Architecture
//!
//! - [`dialect`] - the [`Dialect`] registry and [`SqlDialect`] generators
//! - [`filter`] - report filters and the [`FilterCompiler`]
//! - [`template`] - placeholder parsing and binding
//! - [`executor`] - the [`QueryExecutor`] seam, [`RawQuery`] and diagnostics
//! - [`paging`] - paged structured and raw queries
//! - [`entity`] / [`predicate`] / [`search`] - the structured query path
//! - [`lookup`] - website and timezone collaborators
//! - [`config`] - environment configuration and logging
//! - [`backends`] - database drivers
//!
//! # Quick Start
//!
//! ```
//! use helios_dialect::dialect::Dialect;
//! use helios_dialect::filter::{FilterCompiler, FilterOperator, FilterSpec, QueryFilters, QueryOptions};
//! use helios_dialect::lookup::Website;
//! use helios_dialect::template::{BindMode, Template};
//! use uuid::Uuid;
//!
//! let dialect = Dialect::MySql;
//! let website = Website::new(Uuid::new_v4(), "example.com");
//! let filters = QueryFilters::new()
//!     .with_filter(FilterSpec::field("url", FilterOperator::Contains, "/blog"));
//!
//! let compiled = FilterCompiler::new(dialect).compile_for(&website, &filters, &QueryOptions::default());
//!
//! let sql = format!(
//!     "select count(*) as num from website_event {}\nwhere website_event.website_id = {{{{websiteId}}}}\n{}",
//!     compiled.join_fragment, compiled.where_fragment,
//! );
//! let bound = Template::parse(&sql)
//!     .bind(dialect, &compiled.params, BindMode::Strict)
//!     .unwrap();
//!
//! assert!(bound.sql.contains("website_event.url_path like ?"));
//! assert_eq!(bound.params.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod executor;
pub mod filter;
pub mod lookup;
pub mod paging;
pub mod predicate;
pub mod search;
pub mod template;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{DialectConfig, init_logging};
pub use dialect::{DateUnit, Dialect, Fragments, SqlDialect};
pub use error::{ExecutionError, QueryError, QueryResult};
pub use executor::{DiagnosticSink, MemorySink, NoopSink, QueryExecutor, RawQuery, TracingSink};
pub use filter::{CompiledFilters, FilterCompiler, FilterOperator, FilterSpec, QueryFilters, QueryOptions};
pub use paging::{paged_query, paged_raw_query};
pub use template::{BindMode, BoundQuery, Template};
pub use types::{PageParams, PagedResult, ParamMap, Row, SqlValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
