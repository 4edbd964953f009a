pub mod plans;
pub mod profiles;
pub mod questions;
pub mod sessions;
pub mod submissions;

pub use plans::*;
pub use profiles::*;
pub use questions::*;
pub use sessions::*;
pub use submissions::*;

use sqlx::error::BoxDynError;

/// Wrap a column-level decode failure into a `sqlx::Error`.
pub(crate) fn decode_error(column: &str, detail: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: BoxDynError::from(detail.to_string()),
    }
}
