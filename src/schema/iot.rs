//! IoT sensor field rules
//!
//! An `IOT_SENSOR` field carries an `iotConfig` object:
//!
//! ```json
//! {"sensorType": "temperature", "unit": "°C", "minValue": -40, "maxValue": 85,
//!  "samplingIntervalSeconds": 60, "deviceId": "floor2-east"}
//! ```
//!
//! Only `sensorType` is mandatory. Unknown keys are violations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized sensor categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Pressure,
    Co2,
    Light,
    Motion,
    Occupancy,
    Energy,
    Voltage,
    Current,
    Flow,
    Level,
    Custom,
}

impl SensorType {
    pub const ALL: [SensorType; 13] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Pressure,
        SensorType::Co2,
        SensorType::Light,
        SensorType::Motion,
        SensorType::Occupancy,
        SensorType::Energy,
        SensorType::Voltage,
        SensorType::Current,
        SensorType::Flow,
        SensorType::Level,
        SensorType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Pressure => "pressure",
            SensorType::Co2 => "co2",
            SensorType::Light => "light",
            SensorType::Motion => "motion",
            SensorType::Occupancy => "occupancy",
            SensorType::Energy => "energy",
            SensorType::Voltage => "voltage",
            SensorType::Current => "current",
            SensorType::Flow => "flow",
            SensorType::Level => "level",
            SensorType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        SensorType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated sensor configuration, persisted as JSON in field metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IotConfig {
    pub sensor_type: SensorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

const KNOWN_KEYS: [&str; 6] = [
    "sensorType",
    "unit",
    "minValue",
    "maxValue",
    "samplingIntervalSeconds",
    "deviceId",
];

/// Checks an `iotConfig` value, returning messages without a field prefix.
pub fn check(config: Option<&Value>) -> Result<IotConfig, Vec<String>> {
    let object = match config {
        None | Some(Value::Null) => {
            return Err(vec!["iotConfig is required for IOT_SENSOR fields".to_string()])
        }
        Some(Value::Object(object)) => object,
        Some(_) => return Err(vec!["iotConfig must be an object".to_string()]),
    };

    let mut errors = Vec::new();

    for key in object.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            errors.push(format!("iotConfig has unknown key '{}'", key));
        }
    }

    let sensor_type = match object.get("sensorType") {
        None | Some(Value::Null) => {
            errors.push("iotConfig.sensorType is required".to_string());
            None
        }
        Some(Value::String(name)) => {
            let parsed = SensorType::parse(name);
            if parsed.is_none() {
                errors.push(format!("iotConfig.sensorType '{}' is not recognized", name));
            }
            parsed
        }
        Some(_) => {
            errors.push("iotConfig.sensorType must be a string".to_string());
            None
        }
    };

    let unit = optional_string(object.get("unit"), "unit", &mut errors);
    let device_id = optional_string(object.get("deviceId"), "deviceId", &mut errors);
    let min_value = optional_number(object.get("minValue"), "minValue", &mut errors);
    let max_value = optional_number(object.get("maxValue"), "maxValue", &mut errors);

    if let (Some(min), Some(max)) = (min_value, max_value) {
        if min > max {
            errors.push(format!(
                "iotConfig.minValue {} is greater than maxValue {}",
                min, max
            ));
        }
    }

    let sampling_interval_seconds = match object.get("samplingIntervalSeconds") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64().filter(|v| *v > 0) {
            Some(seconds) => Some(seconds),
            None => {
                errors.push(
                    "iotConfig.samplingIntervalSeconds must be a positive integer".to_string(),
                );
                None
            }
        },
    };

    match sensor_type {
        Some(sensor_type) if errors.is_empty() => Ok(IotConfig {
            sensor_type,
            unit,
            min_value,
            max_value,
            sampling_interval_seconds,
            device_id,
        }),
        _ => Err(errors),
    }
}

fn optional_string(value: Option<&Value>, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("iotConfig.{} must be a string", key));
            None
        }
    }
}

fn optional_number(value: Option<&Value>, key: &str, errors: &mut Vec<String>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => {
            errors.push(format!("iotConfig.{} must be a number", key));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config() {
        let config = check(Some(&json!({"sensorType": "humidity"}))).unwrap();
        assert_eq!(config.sensor_type, SensorType::Humidity);
        assert_eq!(config.unit, None);
    }

    #[test]
    fn test_full_config() {
        let config = check(Some(&json!({
            "sensorType": "temperature",
            "unit": "C",
            "minValue": -40,
            "maxValue": 85.5,
            "samplingIntervalSeconds": 60,
            "deviceId": "dev-1"
        })))
        .unwrap();
        assert_eq!(config.min_value, Some(-40.0));
        assert_eq!(config.max_value, Some(85.5));
        assert_eq!(config.sampling_interval_seconds, Some(60));
        assert_eq!(config.device_id.as_deref(), Some("dev-1"));
    }

    #[test]
    fn test_missing_config() {
        let errors = check(None).unwrap_err();
        assert!(errors[0].contains("required"));
        assert!(check(Some(&json!([1, 2]))).is_err());
    }

    #[test]
    fn test_all_violations_reported() {
        let errors = check(Some(&json!({
            "sensorType": "radar",
            "minValue": 10,
            "maxValue": 1,
            "samplingIntervalSeconds": 0,
            "colour": "red"
        })))
        .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("colour")));
        assert!(errors.iter().any(|e| e.contains("radar")));
        assert!(errors.iter().any(|e| e.contains("greater than")));
        assert!(errors.iter().any(|e| e.contains("samplingIntervalSeconds")));
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = check(Some(&json!({"sensorType": "co2", "deviceId": "x"}))).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, json!({"sensorType": "co2", "deviceId": "x"}));
    }
}
