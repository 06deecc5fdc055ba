//! Definition validator
//!
//! Validation semantics:
//! - Every rule is applied independently, nothing short-circuits
//! - All violations are returned together, in a single pass
//! - A definition with any violation is never synthesized
//!
//! Field messages are prefixed with the field position (`fields[2]`) so an
//! administration surface can point at the offending row.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{ColumnParams, DataKind};

use super::iot;
use super::spatial;
use super::spec::{FieldSpec, OnDeleteAction, Relation, TableSpec};
use super::types::{FieldDefinition, TableDefinition};

/// Identifier rule shared by table and field names
pub const IDENTIFIER_PATTERN: &str = "^[a-z][a-z0-9_]*$";
/// Longest logical table name; leaves room for `custom_` and `_history_trigger`
pub const MAX_TABLE_NAME_LEN: usize = 40;
/// Table name ending reserved for generated history tables
pub const RESERVED_TABLE_SUFFIX: &str = "_history";
/// PostgreSQL identifier limit
pub const MAX_FIELD_NAME_LEN: usize = 63;
/// PostgreSQL VARCHAR upper bound
pub const MAX_LENGTH_LIMIT: i64 = 10_485_760;
/// PostgreSQL NUMERIC precision upper bound
pub const MAX_PRECISION: i64 = 1000;

/// Column names generated on the main or history table
pub const RESERVED_COLUMNS: [&str; 9] = [
    "id",
    "created_at",
    "updated_at",
    "deleted_at",
    "history_id",
    "record_id",
    "operation",
    "changed_by",
    "changed_at",
];

/// Outcome of validating a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Returns whether `name` satisfies `^[a-z][a-z0-9_]*$`.
pub fn is_valid_identifier(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(IDENTIFIER_PATTERN).ok())
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(name))
}

/// Validates a definition and reports every violation found.
///
/// Never fails; an invalid definition yields `valid: false`.
pub fn validate(definition: &TableDefinition) -> ValidationReport {
    match check(definition) {
        Ok(_) => ValidationReport::from_errors(Vec::new()),
        Err(errors) => ValidationReport::from_errors(errors),
    }
}

/// Validates a definition and, when it is clean, returns the checked spec.
pub fn check(definition: &TableDefinition) -> Result<TableSpec, Vec<String>> {
    let mut errors = Vec::new();

    check_identifier(
        "Table name",
        &definition.name,
        MAX_TABLE_NAME_LEN,
        &mut errors,
    );
    if definition.name.ends_with(RESERVED_TABLE_SUFFIX) {
        errors.push(format!(
            "Table name '{}' must not end with '{}' (reserved for history tables)",
            definition.name, RESERVED_TABLE_SUFFIX
        ));
    }

    if definition.display_name.trim().is_empty() {
        errors.push("Display name is required".to_string());
    }

    if definition.fields.is_empty() {
        errors.push("At least one field is required".to_string());
    }

    let mut fields = Vec::with_capacity(definition.fields.len());
    for (position, field) in definition.fields.iter().enumerate() {
        let order = field.order.unwrap_or(position as i64);
        match check_field(field, position, order) {
            Ok(spec) => fields.push(spec),
            Err(mut field_errors) => errors.append(&mut field_errors),
        }
    }

    check_duplicates(definition, &mut errors);

    if errors.is_empty() {
        Ok(TableSpec {
            name: definition.name.clone(),
            display_name: definition.display_name.trim().to_string(),
            description: definition.description.clone(),
            icon: definition.icon.clone(),
            fields,
        })
    } else {
        Err(errors)
    }
}

/// Validates a single field at `position`, using `order` as its display order.
pub fn check_field(
    field: &FieldDefinition,
    position: usize,
    order: i64,
) -> Result<FieldSpec, Vec<String>> {
    let label = field_label(field, position);
    let mut errors = Vec::new();

    let mut name_errors = Vec::new();
    check_identifier("name", &field.name, MAX_FIELD_NAME_LEN, &mut name_errors);
    if name_errors.is_empty() && RESERVED_COLUMNS.contains(&field.name.as_str()) {
        name_errors.push(format!("name '{}' is reserved for a generated column", field.name));
    }
    errors.extend(name_errors.into_iter().map(|e| format!("{}: {}", label, e)));

    if field.display_name.trim().is_empty() {
        errors.push(format!("{}: display name is required", label));
    }

    if !(0..=i32::MAX as i64).contains(&order) {
        errors.push(format!("{}: order {} must be a non-negative integer", label, order));
    }

    let kind = if field.data_type.trim().is_empty() {
        errors.push(format!("{}: data type is required", label));
        None
    } else {
        match field.data_type.parse::<DataKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                errors.push(format!("{}: {}", label, e));
                None
            }
        }
    };

    let relation = check_relation(field, kind, &label, &mut errors);
    let options = check_options(field, &label, &mut errors);

    let Some(kind) = kind else {
        return Err(errors);
    };

    let params = check_params(field, kind, &label, &mut errors);

    let geometry = if kind.is_geometry() {
        match spatial::check(kind, field.srid, field.geometry_type.as_deref()) {
            Ok(column) => Some(column),
            Err(geometry_errors) => {
                errors.extend(geometry_errors.into_iter().map(|e| format!("{}: {}", label, e)));
                None
            }
        }
    } else {
        None
    };

    let iot = if kind == DataKind::IotSensor {
        match iot::check(field.iot_config.as_ref()) {
            Ok(config) => Some(config),
            Err(iot_errors) => {
                errors.extend(iot_errors.into_iter().map(|e| format!("{}: {}", label, e)));
                None
            }
        }
    } else {
        None
    };

    if field.is_timeseries && !(kind.is_temporal() || kind.is_numeric()) {
        errors.push(format!(
            "{}: isTimeseries requires a date/time or numeric data type, got {}",
            label, kind
        ));
    }

    let default_value = check_default(field, kind, &options, &label, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(FieldSpec {
        name: field.name.clone(),
        display_name: field.display_name.trim().to_string(),
        kind,
        params,
        is_required: field.is_required,
        is_unique: field.is_unique,
        is_timeseries: field.is_timeseries,
        default_value,
        relation,
        geometry,
        iot,
        options,
        order: order as i32,
    })
}

fn field_label(field: &FieldDefinition, position: usize) -> String {
    if field.name.is_empty() {
        format!("fields[{}]", position)
    } else {
        format!("fields[{}] ({})", position, field.name)
    }
}

fn check_identifier(what: &str, name: &str, max_len: usize, errors: &mut Vec<String>) {
    if name.is_empty() {
        errors.push(format!("{} is required", what));
        return;
    }
    if !is_valid_identifier(name) {
        errors.push(format!(
            "{} '{}' must match {} (lowercase letters, digits, underscores)",
            what, name, IDENTIFIER_PATTERN
        ));
    }
    if name.len() > max_len {
        errors.push(format!(
            "{} '{}' exceeds {} characters",
            what, name, max_len
        ));
    }
}

fn check_params(
    field: &FieldDefinition,
    kind: DataKind,
    label: &str,
    errors: &mut Vec<String>,
) -> ColumnParams {
    let mut params = ColumnParams::default();

    if kind.requires_length() {
        match field.max_length {
            None => errors.push(format!("{}: maxLength is required for {}", label, kind)),
            Some(len) if (1..=MAX_LENGTH_LIMIT).contains(&len) => {
                params.max_length = Some(len as u32)
            }
            Some(len) => errors.push(format!(
                "{}: maxLength {} must be between 1 and {}",
                label, len, MAX_LENGTH_LIMIT
            )),
        }
    }

    if kind.requires_precision() {
        match field.precision {
            None => errors.push(format!("{}: precision is required for {}", label, kind)),
            Some(precision) if (1..=MAX_PRECISION).contains(&precision) => {
                let scale = field.scale.unwrap_or(0);
                if !(0..=precision).contains(&scale) {
                    errors.push(format!(
                        "{}: scale {} must be between 0 and precision {}",
                        label, scale, precision
                    ));
                }
                params.precision = Some(precision as u32);
                params.scale = Some(scale.clamp(0, precision) as u32);
            }
            Some(precision) => errors.push(format!(
                "{}: precision {} must be between 1 and {}",
                label, precision, MAX_PRECISION
            )),
        }
    }

    params
}

fn check_relation(
    field: &FieldDefinition,
    kind: Option<DataKind>,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<Relation> {
    if !field.is_relation() {
        if field.on_delete.is_some() {
            errors.push(format!("{}: onDelete requires relationTable", label));
        }
        return None;
    }

    let before = errors.len();

    let table = field.relation_table.as_deref().unwrap_or("");
    if table.is_empty() {
        errors.push(format!("{}: relationTable is required for relation fields", label));
    } else if !is_valid_identifier(table) {
        errors.push(format!("{}: relationTable '{}' is not a valid table name", label, table));
    }

    let target = field.relation_field.as_deref().unwrap_or("");
    if target.is_empty() {
        errors.push(format!("{}: relationField is required for relation fields", label));
    } else if !is_valid_identifier(target) {
        errors.push(format!("{}: relationField '{}' is not a valid field name", label, target));
    }

    if kind.map_or(false, |k| k.is_geometry()) {
        errors.push(format!("{}: geometry fields cannot reference other tables", label));
    }

    let on_delete = match field.on_delete.as_deref() {
        None => None,
        Some(action) => match OnDeleteAction::parse(action) {
            Some(OnDeleteAction::SetNull) if field.is_required => {
                errors.push(format!("{}: onDelete SET NULL conflicts with isRequired", label));
                None
            }
            Some(parsed) => Some(parsed),
            None => {
                errors.push(format!("{}: onDelete '{}' is not a recognized action", label, action));
                None
            }
        },
    };

    if errors.len() > before {
        return None;
    }

    Some(Relation {
        table: table.to_string(),
        field: target.to_string(),
        on_delete,
    })
}

fn check_options(field: &FieldDefinition, label: &str, errors: &mut Vec<String>) -> Vec<String> {
    let Some(validation) = &field.validation else {
        return Vec::new();
    };

    if validation.options.is_empty() {
        errors.push(format!("{}: select options must not be empty", label));
        return Vec::new();
    }

    let mut seen = HashMap::new();
    for (i, option) in validation.options.iter().enumerate() {
        if option.trim().is_empty() {
            errors.push(format!("{}: option {} is empty", label, i));
        } else if let Some(first) = seen.insert(option.as_str(), i) {
            errors.push(format!(
                "{}: option '{}' is duplicated (first at {})",
                label, option, first
            ));
        }
    }

    validation.options.clone()
}

fn check_default(
    field: &FieldDefinition,
    kind: DataKind,
    options: &[String],
    label: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    let text = match field.default_value.as_ref()? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        value @ (Value::Array(_) | Value::Object(_)) => {
            if matches!(kind, DataKind::Json | DataKind::Jsonb | DataKind::IotSensor) {
                value.to_string()
            } else {
                errors.push(format!("{}: default value must be a scalar for {}", label, kind));
                return None;
            }
        }
    };

    if kind.is_geometry() {
        errors.push(format!("{}: geometry fields do not take a default value", label));
        return None;
    }

    if kind.is_integral() {
        if text.trim().parse::<i64>().is_err() {
            errors.push(format!("{}: default '{}' is not an integer", label, text));
            return None;
        }
        return Some(text.trim().to_string());
    }

    if kind.is_numeric() {
        let valid = text.trim().parse::<f64>().map_or(false, f64::is_finite);
        if !valid {
            errors.push(format!("{}: default '{}' is not a number", label, text));
            return None;
        }
        return Some(text.trim().to_string());
    }

    if kind.is_boolean() {
        let normalized = text.trim().to_ascii_lowercase();
        if normalized != "true" && normalized != "false" {
            errors.push(format!("{}: default '{}' is not a boolean", label, text));
            return None;
        }
        return Some(normalized);
    }

    if !options.is_empty() && !options.iter().any(|o| *o == text) {
        errors.push(format!("{}: default '{}' is not one of the options", label, text));
        return None;
    }

    Some(text)
}

fn check_duplicates(definition: &TableDefinition, errors: &mut Vec<String>) {
    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut orders: HashMap<i64, usize> = HashMap::new();

    for (position, field) in definition.fields.iter().enumerate() {
        if !field.name.is_empty() {
            if let Some(first) = names.get(field.name.as_str()) {
                errors.push(format!(
                    "fields[{}]: duplicate field name '{}' (first declared at fields[{}])",
                    position, field.name, first
                ));
            } else {
                names.insert(&field.name, position);
            }
        }

        let order = field.order.unwrap_or(position as i64);
        if let Some(first) = orders.get(&order) {
            errors.push(format!(
                "fields[{}]: duplicate order {} (also used by fields[{}])",
                position, order, first
            ));
        } else {
            orders.insert(order, position);
        }
    }
}
