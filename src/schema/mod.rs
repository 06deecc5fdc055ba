//! Table definition subsystem
//!
//! Turns a caller-submitted `TableDefinition` into a checked `TableSpec`.
//!
//! # Design Principles
//!
//! - Lenient wire types, strict checked types
//! - Every violation reported at once, never fail-fast
//! - Geometry and IoT rules live in their own sub-validators
//! - No synthesis from a partially valid definition

mod iot;
mod spatial;
mod spec;
mod types;
mod validator;

pub use iot::{IotConfig, SensorType};
pub use spatial::{DEFAULT_SRID, MAX_SRID};
pub use spec::{FieldSpec, GeometryColumn, OnDeleteAction, Relation, TableSpec};
pub use types::{FieldDefinition, FieldValidation, TableDefinition};
pub use validator::{
    check, check_field, is_valid_identifier, validate, ValidationReport, IDENTIFIER_PATTERN,
    MAX_FIELD_NAME_LEN, MAX_TABLE_NAME_LEN, RESERVED_COLUMNS, RESERVED_TABLE_SUFFIX,
};
