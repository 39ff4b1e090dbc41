//! Pagination types shared by the structured and raw paging paths.
//!
//! Pages are offset based: a page size of zero (or none at all) means the
//! caller wants every row, and the envelope still echoes what was asked for.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

static ORDER_BY_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("order by pattern is a valid regex")
});

/// Paging request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Rows per page; `None` or `0` disables limiting.
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Column to sort by.
    #[serde(default)]
    pub order_by: Option<String>,

    /// Sort descending instead of ascending.
    #[serde(default)]
    pub sort_descending: bool,
}

fn default_page() -> u32 {
    1
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
            order_by: None,
            sort_descending: false,
        }
    }
}

/// The sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A single ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Column to order by (validated identifier).
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl OrderBy {
    /// Creates an ordering term, rejecting anything but a plain identifier.
    pub fn new(column: impl Into<String>, direction: SortDirection) -> QueryResult<Self> {
        let column = column.into();
        if !ORDER_BY_COLUMN.is_match(&column) {
            return Err(QueryError::InvalidOrderBy { column });
        }
        Ok(Self { column, direction })
    }

    /// Renders `<column> asc|desc`.
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}

/// Limit/offset derived from [`PageParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageWindow {
    /// Maximum rows to return.
    pub take: Option<u64>,
    /// Rows to skip.
    pub skip: Option<u64>,
}

impl PageWindow {
    /// A window that returns everything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns true if no limit applies.
    pub fn is_unbounded(&self) -> bool {
        self.take.is_none()
    }
}

impl PageParams {
    /// Creates page params for the given page and size.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Sets the sort column and direction.
    pub fn with_order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(column.into());
        self.sort_descending = descending;
        self
    }

    /// The page size as echoed in the envelope (`0` when absent).
    pub fn size(&self) -> u32 {
        self.page_size.unwrap_or(0)
    }

    /// Derives take/skip; only a positive page size limits the result.
    pub fn window(&self) -> PageWindow {
        match self.page_size {
            Some(size) if size > 0 => {
                let page = u64::from(self.page.max(1));
                let size = u64::from(size);
                PageWindow {
                    take: Some(size),
                    skip: Some(size * (page - 1)),
                }
            }
            _ => PageWindow::unbounded(),
        }
    }

    /// Derives the ordering term, if a sort column was requested.
    pub fn order(&self) -> QueryResult<Option<OrderBy>> {
        let Some(column) = &self.order_by else {
            return Ok(None);
        };
        let direction = if self.sort_descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        OrderBy::new(column.clone(), direction).map(Some)
    }
}

/// A page of results with the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// The rows in this page.
    pub data: Vec<T>,

    /// Total matching rows ignoring pagination.
    pub count: u64,

    /// The requested page.
    pub page: u32,

    /// The requested page size (`0` means unlimited).
    pub page_size: u32,

    /// The requested sort column.
    pub order_by: Option<String>,
}

impl<T> PagedResult<T> {
    /// Builds the envelope from the request that produced it.
    pub fn new(data: Vec<T>, count: u64, params: &PageParams) -> Self {
        Self {
            data,
            count,
            page: params.page,
            page_size: params.size(),
            order_by: params.order_by.clone(),
        }
    }

    /// Returns true if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps the rows to a different type.
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            data: self.data.into_iter().map(f).collect(),
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            order_by: self.order_by,
        }
    }
}
