//! Collaborators consulted while compiling queries.
//!
//! - [`WebsiteLookup`] resolves the website a query is scoped to (its domain
//!   and optional data reset timestamp).
//! - [`TimezoneResolver`] turns a zone name into the numeric UTC offset that
//!   MySQL's `CONVERT_TZ` needs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExecutionError, QueryError, QueryResult};

/// The website fields the filter compiler needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Website id.
    pub id: Uuid,
    /// The site's own domain, used to exclude self-referrals.
    pub domain: String,
    /// Data before this instant is hidden from reports.
    #[serde(default)]
    pub reset_at: Option<DateTime<Utc>>,
}

impl Website {
    /// Creates a website record without a reset timestamp.
    pub fn new(id: Uuid, domain: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
            reset_at: None,
        }
    }

    /// Sets the reset timestamp.
    pub fn with_reset_at(mut self, reset_at: DateTime<Utc>) -> Self {
        self.reset_at = Some(reset_at);
        self
    }
}

/// Resolves websites by id.
#[async_trait]
pub trait WebsiteLookup: Send + Sync {
    /// Returns the website, or `None` if it does not exist.
    async fn website(&self, id: Uuid) -> Result<Option<Website>, ExecutionError>;
}

/// In-memory [`WebsiteLookup`].
#[derive(Debug, Clone, Default)]
pub struct StaticWebsites {
    websites: HashMap<Uuid, Website>,
}

impl StaticWebsites {
    /// Creates an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a website.
    pub fn with(mut self, website: Website) -> Self {
        self.websites.insert(website.id, website);
        self
    }
}

#[async_trait]
impl WebsiteLookup for StaticWebsites {
    async fn website(&self, id: Uuid) -> Result<Option<Website>, ExecutionError> {
        Ok(self.websites.get(&id).cloned())
    }
}

/// Resolves timezone names to numeric UTC offsets (`+05:30`).
pub trait TimezoneResolver: Send + Sync {
    /// Returns the offset for `zone`.
    fn utc_offset(&self, zone: &str) -> QueryResult<String>;
}

/// Accepts zones that already are fixed offsets.
///
/// Understands `UTC`, `GMT`, `Z`, `Etc/UTC`, `±HH:MM`, `±H:MM`, `±HHMM` and `±HH`.
/// Named regional zones need a resolver backed by a tz database.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetResolver;

impl TimezoneResolver for FixedOffsetResolver {
    fn utc_offset(&self, zone: &str) -> QueryResult<String> {
        let unknown = || QueryError::UnknownTimezone {
            zone: zone.to_string(),
        };

        let trimmed = zone.trim();
        if matches!(
            trimmed.to_ascii_uppercase().as_str(),
            "UTC" | "GMT" | "Z" | "ETC/UTC" | "ETC/GMT"
        ) {
            return Ok("+00:00".to_string());
        }

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => ('+', &trimmed[1..]),
            Some('-') => ('-', &trimmed[1..]),
            _ => return Err(unknown()),
        };

        if !rest.is_ascii() {
            return Err(unknown());
        }
        let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) if h.len() <= 2 && m.len() == 2 => (h, m),
            Some(_) => return Err(unknown()),
            None => match rest.len() {
                1 | 2 => (rest, "0"),
                4 => rest.split_at(2),
                _ => return Err(unknown()),
            },
        };
        if !is_digits(hours) || !is_digits(minutes) {
            return Err(unknown());
        }
        let hours: u32 = hours.parse().map_err(|_| unknown())?;
        let minutes: u32 = minutes.parse().map_err(|_| unknown())?;
        if hours > 14 || minutes >= 60 {
            return Err(unknown());
        }

        Ok(format!("{}{:02}:{:02}", sign, hours, minutes))
    }
}
