//! Data kind and geometry subtype definitions
//!
//! Wire names are bit-exact with persisted metadata rows:
//! TEXT, VARCHAR, CHAR, INTEGER, BIGINT, DECIMAL, NUMERIC, FLOAT,
//! DOUBLE PRECISION, BOOLEAN, DATE, TIME, TIMESTAMP, TIMESTAMPTZ, JSON, JSONB,
//! UUID, GEOMETRY_POINT, GEOMETRY_POLYGON, GEOMETRY_LINESTRING,
//! GEOMETRY_MULTIPOINT, GEOMETRY_MULTIPOLYGON, GEOMETRY, IOT_SENSOR, TAGS

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::UnsupportedKind;

/// Abstract field data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataKind {
    Text,
    Varchar,
    Char,
    Integer,
    BigInt,
    Decimal,
    Numeric,
    Float,
    DoublePrecision,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Jsonb,
    Uuid,
    GeometryPoint,
    GeometryPolygon,
    GeometryLinestring,
    GeometryMultipoint,
    GeometryMultipolygon,
    /// Generic geometry; the subtype comes from the field's `geometryType`
    Geometry,
    /// Structured IoT sensor reading, stored as a document
    IotSensor,
    /// Free-form tag list
    Tags,
}

impl DataKind {
    /// Every kind in catalog order
    pub const ALL: [DataKind; 25] = [
        DataKind::Text,
        DataKind::Varchar,
        DataKind::Char,
        DataKind::Integer,
        DataKind::BigInt,
        DataKind::Decimal,
        DataKind::Numeric,
        DataKind::Float,
        DataKind::DoublePrecision,
        DataKind::Boolean,
        DataKind::Date,
        DataKind::Time,
        DataKind::Timestamp,
        DataKind::TimestampTz,
        DataKind::Json,
        DataKind::Jsonb,
        DataKind::Uuid,
        DataKind::GeometryPoint,
        DataKind::GeometryPolygon,
        DataKind::GeometryLinestring,
        DataKind::GeometryMultipoint,
        DataKind::GeometryMultipolygon,
        DataKind::Geometry,
        DataKind::IotSensor,
        DataKind::Tags,
    ];

    /// Returns the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Text => "TEXT",
            DataKind::Varchar => "VARCHAR",
            DataKind::Char => "CHAR",
            DataKind::Integer => "INTEGER",
            DataKind::BigInt => "BIGINT",
            DataKind::Decimal => "DECIMAL",
            DataKind::Numeric => "NUMERIC",
            DataKind::Float => "FLOAT",
            DataKind::DoublePrecision => "DOUBLE PRECISION",
            DataKind::Boolean => "BOOLEAN",
            DataKind::Date => "DATE",
            DataKind::Time => "TIME",
            DataKind::Timestamp => "TIMESTAMP",
            DataKind::TimestampTz => "TIMESTAMPTZ",
            DataKind::Json => "JSON",
            DataKind::Jsonb => "JSONB",
            DataKind::Uuid => "UUID",
            DataKind::GeometryPoint => "GEOMETRY_POINT",
            DataKind::GeometryPolygon => "GEOMETRY_POLYGON",
            DataKind::GeometryLinestring => "GEOMETRY_LINESTRING",
            DataKind::GeometryMultipoint => "GEOMETRY_MULTIPOINT",
            DataKind::GeometryMultipolygon => "GEOMETRY_MULTIPOLYGON",
            DataKind::Geometry => "GEOMETRY",
            DataKind::IotSensor => "IOT_SENSOR",
            DataKind::Tags => "TAGS",
        }
    }

    /// Geometry kinds are added out-of-band, never in a CREATE TABLE column list
    pub fn is_geometry(&self) -> bool {
        self.implied_geometry_subtype().is_some() || *self == DataKind::Geometry
    }

    /// Kinds whose defaults are emitted unquoted
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataKind::Integer
                | DataKind::BigInt
                | DataKind::Decimal
                | DataKind::Numeric
                | DataKind::Float
                | DataKind::DoublePrecision
        )
    }

    /// Integer-only numeric kinds
    pub fn is_integral(&self) -> bool {
        matches!(self, DataKind::Integer | DataKind::BigInt)
    }

    pub fn is_boolean(&self) -> bool {
        *self == DataKind::Boolean
    }

    /// Date and time kinds
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataKind::Date | DataKind::Time | DataKind::Timestamp | DataKind::TimestampTz
        )
    }

    /// VARCHAR and CHAR carry a length
    pub fn requires_length(&self) -> bool {
        matches!(self, DataKind::Varchar | DataKind::Char)
    }

    /// DECIMAL and NUMERIC carry precision and scale
    pub fn requires_precision(&self) -> bool {
        matches!(self, DataKind::Decimal | DataKind::Numeric)
    }

    /// Subtype fixed by the kind itself; `None` for the generic `GEOMETRY`
    /// and for non-geometry kinds.
    pub fn implied_geometry_subtype(&self) -> Option<GeometrySubtype> {
        match self {
            DataKind::GeometryPoint => Some(GeometrySubtype::Point),
            DataKind::GeometryPolygon => Some(GeometrySubtype::Polygon),
            DataKind::GeometryLinestring => Some(GeometrySubtype::LineString),
            DataKind::GeometryMultipoint => Some(GeometrySubtype::MultiPoint),
            DataKind::GeometryMultipolygon => Some(GeometrySubtype::MultiPolygon),
            _ => None,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = UnsupportedKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedKind(s.to_string()))
    }
}

impl TryFrom<String> for DataKind {
    type Error = UnsupportedKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataKind> for String {
    fn from(kind: DataKind) -> Self {
        kind.as_str().to_string()
    }
}

/// PostGIS geometry subtype used as the column type modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeometrySubtype {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Geometry,
}

impl GeometrySubtype {
    pub const ALL: [GeometrySubtype; 8] = [
        GeometrySubtype::Point,
        GeometrySubtype::LineString,
        GeometrySubtype::Polygon,
        GeometrySubtype::MultiPoint,
        GeometrySubtype::MultiLineString,
        GeometrySubtype::MultiPolygon,
        GeometrySubtype::GeometryCollection,
        GeometrySubtype::Geometry,
    ];

    /// Returns the PostGIS type modifier name
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometrySubtype::Point => "POINT",
            GeometrySubtype::LineString => "LINESTRING",
            GeometrySubtype::Polygon => "POLYGON",
            GeometrySubtype::MultiPoint => "MULTIPOINT",
            GeometrySubtype::MultiLineString => "MULTILINESTRING",
            GeometrySubtype::MultiPolygon => "MULTIPOLYGON",
            GeometrySubtype::GeometryCollection => "GEOMETRYCOLLECTION",
            GeometrySubtype::Geometry => "GEOMETRY",
        }
    }

    /// Case-insensitive lookup
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        GeometrySubtype::ALL
            .iter()
            .copied()
            .find(|subtype| subtype.as_str() == upper)
    }
}

impl fmt::Display for GeometrySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for kind in DataKind::ALL {
            assert_eq!(kind.as_str().parse::<DataKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "MONEY".parse::<DataKind>().unwrap_err();
        assert_eq!(err.kind(), "MONEY");
        assert!(err.to_string().contains("MONEY"));
    }

    #[test]
    fn test_kind_names_are_case_sensitive() {
        assert!("varchar".parse::<DataKind>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&DataKind::DoublePrecision).unwrap();
        assert_eq!(json, "\"DOUBLE PRECISION\"");

        let kind: DataKind = serde_json::from_str("\"GEOMETRY_POINT\"").unwrap();
        assert_eq!(kind, DataKind::GeometryPoint);

        assert!(serde_json::from_str::<DataKind>("\"BLOB\"").is_err());
    }

    #[test]
    fn test_geometry_classification() {
        let geometry: Vec<_> = DataKind::ALL.iter().filter(|k| k.is_geometry()).collect();
        assert_eq!(geometry.len(), 6);
        assert!(!DataKind::IotSensor.is_geometry());
        assert_eq!(DataKind::Geometry.implied_geometry_subtype(), None);
        assert_eq!(
            DataKind::GeometryLinestring.implied_geometry_subtype(),
            Some(GeometrySubtype::LineString)
        );
    }

    #[test]
    fn test_subtype_parse() {
        assert_eq!(GeometrySubtype::parse("point"), Some(GeometrySubtype::Point));
        assert_eq!(
            GeometrySubtype::parse("MultiPolygon"),
            Some(GeometrySubtype::MultiPolygon)
        );
        assert_eq!(GeometrySubtype::parse("circle"), None);
    }
}
