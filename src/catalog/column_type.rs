//! Column type resolution
//!
//! `resolve_column_type` is total over `DataKind`. Geometry kinds resolve to a
//! placeholder; the real typed column is added by the geometry extension.

use super::errors::UnsupportedKind;
use super::kind::DataKind;

/// Length used for VARCHAR when none is supplied
pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;
/// Length used for CHAR when none is supplied
pub const DEFAULT_CHAR_LENGTH: u32 = 1;
/// Precision used for DECIMAL/NUMERIC outside the validated path
pub const DEFAULT_PRECISION: u32 = 10;
/// Scale used for DECIMAL/NUMERIC outside the validated path
pub const DEFAULT_SCALE: u32 = 2;
/// Relational type reported for geometry kinds
pub const GEOMETRY_PLACEHOLDER_TYPE: &str = "GEOMETRY";

/// Kind-specific type parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnParams {
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl ColumnParams {
    pub fn length(max_length: u32) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::default()
        }
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::default()
        }
    }
}

/// Resolves a data kind to its PostgreSQL column type.
pub fn resolve_column_type(kind: DataKind, params: &ColumnParams) -> String {
    match kind {
        DataKind::Text => "TEXT".to_string(),
        DataKind::Varchar => format!(
            "VARCHAR({})",
            params.max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH)
        ),
        DataKind::Char => format!("CHAR({})", params.max_length.unwrap_or(DEFAULT_CHAR_LENGTH)),
        DataKind::Integer => "INTEGER".to_string(),
        DataKind::BigInt => "BIGINT".to_string(),
        DataKind::Decimal | DataKind::Numeric => format!(
            "DECIMAL({},{})",
            params.precision.unwrap_or(DEFAULT_PRECISION),
            params.scale.unwrap_or(DEFAULT_SCALE)
        ),
        DataKind::Float => "FLOAT".to_string(),
        DataKind::DoublePrecision => "DOUBLE PRECISION".to_string(),
        DataKind::Boolean => "BOOLEAN".to_string(),
        DataKind::Date => "DATE".to_string(),
        DataKind::Time => "TIME".to_string(),
        DataKind::Timestamp => "TIMESTAMP".to_string(),
        DataKind::TimestampTz => "TIMESTAMPTZ".to_string(),
        DataKind::Json => "JSON".to_string(),
        DataKind::Jsonb | DataKind::IotSensor => "JSONB".to_string(),
        DataKind::Uuid => "UUID".to_string(),
        DataKind::GeometryPoint
        | DataKind::GeometryPolygon
        | DataKind::GeometryLinestring
        | DataKind::GeometryMultipoint
        | DataKind::GeometryMultipolygon
        | DataKind::Geometry => GEOMETRY_PLACEHOLDER_TYPE.to_string(),
        DataKind::Tags => "TEXT[]".to_string(),
    }
}

/// Resolves a wire kind name, failing on names outside the catalog.
pub fn resolve_column_type_str(kind: &str, params: &ColumnParams) -> Result<String, UnsupportedKind> {
    let kind: DataKind = kind.parse()?;
    Ok(resolve_column_type(kind, params))
}
