//! Timezone-aware convenience over [`SqlDialect`].

use std::sync::Arc;

use super::{DateUnit, Dialect, SqlDialect};
use crate::error::QueryResult;
use crate::lookup::{FixedOffsetResolver, TimezoneResolver};

/// Generates bucketing fragments from timezone *names*.
///
/// PostgreSQL takes the zone name directly; for dialects that need numeric
/// offsets the name is resolved through the [`TimezoneResolver`] first.
#[derive(Clone)]
pub struct Fragments {
    dialect: Dialect,
    resolver: Arc<dyn TimezoneResolver>,
}

impl std::fmt::Debug for Fragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fragments")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Fragments {
    /// Creates a generator with the given resolver.
    pub fn new(dialect: Dialect, resolver: Arc<dyn TimezoneResolver>) -> Self {
        Self { dialect, resolver }
    }

    /// Creates a generator that only accepts fixed-offset zones.
    pub fn fixed_offsets(dialect: Dialect) -> Self {
        Self::new(dialect, Arc::new(FixedOffsetResolver))
    }

    /// The underlying dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The raw generator.
    pub fn sql(&self) -> &'static dyn SqlDialect {
        self.dialect.sql()
    }

    fn zone_argument(&self, timezone: &str) -> QueryResult<String> {
        if self.sql().requires_utc_offset() {
            self.resolver.utc_offset(timezone)
        } else {
            Ok(timezone.to_string())
        }
    }

    /// [`SqlDialect::truncate_date`] taking a zone name.
    pub fn date_bucket(
        &self,
        field: &str,
        unit: DateUnit,
        timezone: Option<&str>,
    ) -> QueryResult<String> {
        let zone = timezone.map(|tz| self.zone_argument(tz)).transpose()?;
        Ok(self.sql().truncate_date(field, unit, zone.as_deref()))
    }

    /// [`SqlDialect::weekly_bucket`] taking a zone name.
    pub fn weekly_bucket(&self, field: &str, timezone: &str) -> QueryResult<String> {
        let zone = self.zone_argument(timezone)?;
        Ok(self.sql().weekly_bucket(field, &zone))
    }
}
