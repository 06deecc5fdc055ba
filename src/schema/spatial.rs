//! Geometry field rules
//!
//! - SRID must be a PostGIS-assignable identifier (1..=998999), default 4326
//! - `geometryType` must name a known subtype
//! - On a specific geometry kind the subtype is fixed by the kind

use crate::catalog::{DataKind, GeometrySubtype};

use super::spec::GeometryColumn;

/// SRID assumed when a geometry field omits one (WGS 84)
pub const DEFAULT_SRID: i32 = 4326;
/// Largest SRID PostGIS accepts for user-defined systems
pub const MAX_SRID: i64 = 998_999;

/// Checks the geometry parameters of a field of `kind`.
///
/// Returns violation messages without a field prefix.
pub fn check(
    kind: DataKind,
    srid: Option<i64>,
    geometry_type: Option<&str>,
) -> Result<GeometryColumn, Vec<String>> {
    let mut errors = Vec::new();

    let srid = match srid {
        None => DEFAULT_SRID,
        Some(value) if (1..=MAX_SRID).contains(&value) => value as i32,
        Some(value) => {
            errors.push(format!("srid {} is not a valid SRID (1..={})", value, MAX_SRID));
            DEFAULT_SRID
        }
    };

    let requested = match geometry_type.map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(name) => match GeometrySubtype::parse(name) {
            Some(subtype) => Some(subtype),
            None => {
                errors.push(format!("geometryType '{}' is not a recognized subtype", name));
                None
            }
        },
    };

    let subtype = match (kind.implied_geometry_subtype(), requested) {
        (Some(implied), Some(requested)) if implied != requested => {
            errors.push(format!(
                "geometryType {} conflicts with data type {}",
                requested, kind
            ));
            implied
        }
        (Some(implied), _) => implied,
        (None, Some(requested)) => requested,
        (None, None) => GeometrySubtype::Geometry,
    };

    if errors.is_empty() {
        Ok(GeometryColumn { subtype, srid })
    } else {
        Err(errors)
    }
}
