//! Type Catalog
//!
//! Maps the portable field data kinds accepted in table definitions to
//! concrete PostgreSQL column types.
//!
//! # Principles
//!
//! - Pure: no I/O, no shared state
//! - Total over the closed `DataKind` enum
//! - Unknown kind strings fail with `UnsupportedKind`

mod column_type;
mod errors;
mod kind;

pub use column_type::{
    resolve_column_type, resolve_column_type_str, ColumnParams, DEFAULT_CHAR_LENGTH,
    DEFAULT_PRECISION, DEFAULT_SCALE, DEFAULT_VARCHAR_LENGTH, GEOMETRY_PLACEHOLDER_TYPE,
};
pub use errors::UnsupportedKind;
pub use kind::{DataKind, GeometrySubtype};
