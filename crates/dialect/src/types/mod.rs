//! Value and paging types shared across the crate.

mod pagination;
mod value;

pub use pagination::{OrderBy, PageParams, PageWindow, PagedResult, SortDirection};
pub use value::{ParamMap, Row, SqlValue};
