//! Database drivers implementing [`QueryExecutor`](crate::executor::QueryExecutor).
//!
//! Each backend is behind a cargo feature:
//!
//! | Feature | Module | Driver |
//! |---------|--------|--------|
//! | `postgres` | `backends::postgres` | `tokio-postgres` over a `deadpool-postgres` pool |
//! | `mysql` | `backends::mysql` | `sqlx` MySQL pool |

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(any(feature = "postgres", feature = "mysql"))]
use rust_decimal::Decimal;
#[cfg(any(feature = "postgres", feature = "mysql"))]
use serde_json::Value;

/// Whole numerics become JSON integers, everything else a float.
#[cfg(any(feature = "postgres", feature = "mysql"))]
pub(crate) fn decimal_to_json(value: Decimal) -> Value {
    use rust_decimal::prelude::ToPrimitive;

    if value.fract().is_zero() {
        if let Some(i) = value.to_i64() {
            return Value::from(i);
        }
    }
    value
        .to_f64()
        .map(Value::from)
        .unwrap_or_else(|| Value::String(value.to_string()))
}
