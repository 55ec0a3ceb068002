// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::common::config::AppConfig;

/// Independent collection pipelines, each with its own dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Power,
    Fan,
    Temperature,
}

impl Category {
    /// Fixed order in which a cycle visits the categories.
    pub const ALL: [Category; 3] = [Category::Power, Category::Fan, Category::Temperature];

    pub fn dataset_file(&self) -> &'static str {
        match self {
            Category::Power => AppConfig::PSU_DATASET_FILE,
            Category::Fan => AppConfig::FAN_DATASET_FILE,
            Category::Temperature => AppConfig::TEMP_DATASET_FILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Power => "power",
            Category::Fan => "fan",
            Category::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sensor value, or the marker the controller left us when it had none.
///
/// Serialized as a JSON number or the string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Unavailable,
}

impl Reading {
    /// Interpret a raw JSON field. Missing, `null`, non-numeric and
    /// non-finite values all become [`Reading::Unavailable`].
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(serde_json::Value::as_f64) {
            Some(v) if v.is_finite() => Reading::Value(v),
            _ => Reading::Unavailable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::Unavailable => None,
        }
    }

    /// Contribution to an aggregate sum; the sentinel counts as zero.
    pub fn contribution(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_f64(*v),
            Reading::Unavailable => serializer.serialize_str(AppConfig::UNAVAILABLE_READING),
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Reading::from_json(Some(&raw)))
    }
}

/// One observation, as stored in a dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Reading")]
    pub reading: Reading,
}

impl SensorReading {
    pub fn new(name: impl Into<String>, reading: Reading) -> Self {
        Self::at(name, Utc::now(), reading)
    }

    pub fn at(name: impl Into<String>, timestamp: DateTime<Utc>, reading: Reading) -> Self {
        Self {
            name: name.into(),
            timestamp,
            reading,
        }
    }
}

/// PSU population a discovered endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Power distribution board PSUs feeding the GPU tray.
    AcceleratorTray,
    /// Motherboard PSUs feeding the CPU tray.
    ComputeTray,
}

/// A PSU sensor endpoint resolved during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub relative_path: String,
    pub device_class: DeviceClass,
}

impl EndpointDescriptor {
    pub fn new(relative_path: impl Into<String>, device_class: DeviceClass) -> Self {
        Self {
            relative_path: relative_path.into(),
            device_class,
        }
    }

    /// The raw sensor id: last segment of the endpoint path.
    pub fn member_id(&self) -> &str {
        self.relative_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_serialization() {
        assert_eq!(serde_json::to_value(Reading::Value(12.5)).unwrap(), json!(12.5));
        assert_eq!(serde_json::to_value(Reading::Unavailable).unwrap(), json!("N/A"));
    }

    #[test]
    fn test_reading_from_json() {
        assert_eq!(Reading::from_json(Some(&json!(7000))), Reading::Value(7000.0));
        assert_eq!(Reading::from_json(Some(&json!(null))), Reading::Unavailable);
        assert_eq!(Reading::from_json(Some(&json!("N/A"))), Reading::Unavailable);
        assert_eq!(Reading::from_json(None), Reading::Unavailable);
    }

    #[test]
    fn test_sensor_reading_field_names() {
        let ts = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let reading = SensorReading::at("FAN1 Front", ts, Reading::Value(7200.0));
        let value = serde_json::to_value(&reading).unwrap();
        assert_eq!(value["Name"], json!("FAN1 Front"));
        assert_eq!(value["Timestamp"], json!("2025-01-02T03:04:05Z"));
        assert_eq!(value["Reading"], json!(7200.0));

        let back: SensorReading = serde_json::from_value(value).unwrap();
        assert_eq!(back, reading);
    }

    #[test]
    fn test_member_id() {
        let ep = EndpointDescriptor::new(
            "/redfish/v1/Chassis/Miramar_Sensor/Sensors/power_PWR_PDB_PSU3",
            DeviceClass::AcceleratorTray,
        );
        assert_eq!(ep.member_id(), "power_PWR_PDB_PSU3");

        let ep = EndpointDescriptor::new("PWR_MB_PSU1/", DeviceClass::ComputeTray);
        assert_eq!(ep.member_id(), "PWR_MB_PSU1");
    }

    #[test]
    fn test_category_files() {
        assert_eq!(Category::Power.dataset_file(), "psu_readings.json");
        assert_eq!(Category::Fan.dataset_file(), "fan_readings.json");
        assert_eq!(Category::Temperature.dataset_file(), "temp_readings.json");
        assert_eq!(Category::ALL[0], Category::Power);
    }
}
