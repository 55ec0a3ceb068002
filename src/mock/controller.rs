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

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use axum::http::StatusCode;
use rand::{rng, Rng};
use serde_json::{json, Value};

use crate::common::config::AppConfig;

const GPU_TRAY_PSU_WATTS: f64 = 450.0;
const CPU_TRAY_PSU_WATTS: f64 = 300.0;
const FAN_RPM: f64 = 8_000.0;
const TEMPERATURE_CELSIUS: f64 = 45.0;
const JITTER_RATIO: f64 = 0.05;

// Directory members that are not PSUs and must be ignored by discovery
const OTHER_SENSORS: [&str; 2] = ["temp_TEMP_MB_INLET", "volt_P12V_MB"];

/// Shape of the simulated chassis.
#[derive(Debug, Clone)]
pub struct MockLayout {
    pub chassis: String,
    pub gpu_tray_psus: usize,
    pub cpu_tray_psus: usize,
    pub fans: usize,
    pub temperatures: usize,
    /// Thermal entries carry their reading inline; otherwise each entry only
    /// links to its own resource.
    pub inline_thermal: bool,
}

impl Default for MockLayout {
    fn default() -> Self {
        Self {
            chassis: AppConfig::DEFAULT_CHASSIS.to_string(),
            gpu_tray_psus: 4,
            cpu_tray_psus: 2,
            fans: 8,
            temperatures: 6,
            inline_thermal: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThermalKind {
    Fans,
    Temperatures,
}

impl ThermalKind {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "Fans" => Some(ThermalKind::Fans),
            "Temperatures" => Some(ThermalKind::Temperatures),
            _ => None,
        }
    }

    fn segment(&self) -> &'static str {
        match self {
            ThermalKind::Fans => "Fans",
            ThermalKind::Temperatures => "Temperatures",
        }
    }

    fn field(&self) -> &'static str {
        match self {
            ThermalKind::Fans => "Reading",
            ThermalKind::Temperatures => "ReadingCelsius",
        }
    }

    fn baseline(&self) -> f64 {
        match self {
            ThermalKind::Fans => FAN_RPM,
            ThermalKind::Temperatures => TEMPERATURE_CELSIUS,
        }
    }
}

/// In-memory BMC. Every request renders fresh, jittered readings.
pub struct MockController {
    layout: MockLayout,
    failing: RwLock<HashSet<String>>,
    thermal_failing: AtomicBool,
}

impl MockController {
    pub fn new(layout: MockLayout) -> Self {
        Self {
            layout,
            failing: RwLock::new(HashSet::new()),
            thermal_failing: AtomicBool::new(false),
        }
    }

    /// Make the sensor with this id answer 503 from now on. Inline thermal
    /// entries for the id report a null reading instead.
    pub fn fail_sensor(&self, id: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(id.into());
        }
    }

    pub fn set_thermal_failing(&self, failing: bool) {
        self.thermal_failing.store(failing, Ordering::Relaxed);
    }

    fn is_failing(&self, id: &str) -> bool {
        self.failing
            .read()
            .map(|failing| failing.contains(id))
            .unwrap_or(false)
    }

    fn chassis_path(&self) -> String {
        format!("/redfish/v1/Chassis/{}", self.layout.chassis)
    }

    fn check_chassis(&self, chassis: &str) -> Result<(), StatusCode> {
        if chassis == self.layout.chassis {
            Ok(())
        } else {
            Err(StatusCode::NOT_FOUND)
        }
    }

    pub fn gpu_tray_psu_ids(&self) -> Vec<String> {
        (1..=self.layout.gpu_tray_psus)
            .map(|i| format!("power_PWR_PDB_PSU{i}"))
            .collect()
    }

    pub fn cpu_tray_psu_ids(&self) -> Vec<String> {
        (1..=self.layout.cpu_tray_psus)
            .map(|i| format!("power_PWR_MB_PSU{i}"))
            .collect()
    }

    pub fn fan_ids(&self) -> Vec<String> {
        (1..=self.layout.fans)
            .map(|i| format!("SPD_FAN{}_{}", i.div_ceil(2), if i % 2 == 1 { "F" } else { "R" }))
            .collect()
    }

    pub fn temperature_ids(&self) -> Vec<String> {
        (1..=self.layout.temperatures)
            .map(|i| match i {
                1 => "TEMP_PDB_PSU1".to_string(),
                2 => "TEMP_MB_PSU1".to_string(),
                n => format!("TEMP_GPU{}", n - 2),
            })
            .collect()
    }

    fn psu_baseline(&self, id: &str) -> Option<f64> {
        if self.gpu_tray_psu_ids().iter().any(|p| p == id) {
            Some(GPU_TRAY_PSU_WATTS)
        } else if self.cpu_tray_psu_ids().iter().any(|p| p == id) {
            Some(CPU_TRAY_PSU_WATTS)
        } else {
            None
        }
    }

    pub fn sensor_directory(&self, chassis: &str) -> Result<Value, StatusCode> {
        self.check_chassis(chassis)?;
        let base = self.chassis_path();
        let members: Vec<Value> = self
            .gpu_tray_psu_ids()
            .into_iter()
            .chain(self.cpu_tray_psu_ids())
            .chain(OTHER_SENSORS.iter().map(|s| s.to_string()))
            .map(|id| json!({ "@odata.id": format!("{base}/Sensors/{id}") }))
            .collect();

        Ok(json!({
            "@odata.id": format!("{base}/Sensors"),
            "Name": "Sensors",
            "Members@odata.count": members.len(),
            "Members": members,
        }))
    }

    pub fn sensor(&self, chassis: &str, id: &str) -> Result<Value, StatusCode> {
        self.check_chassis(chassis)?;
        let baseline = match self.psu_baseline(id) {
            Some(baseline) => baseline,
            None if OTHER_SENSORS.contains(&id) => 1.0,
            None => return Err(StatusCode::NOT_FOUND),
        };
        if self.is_failing(id) {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }

        Ok(json!({
            "@odata.id": format!("{}/Sensors/{id}", self.chassis_path()),
            "Id": id,
            "Name": id,
            "Reading": jitter(baseline),
            "ReadingUnits": "W",
        }))
    }

    fn thermal_entry(&self, kind: ThermalKind, id: &str) -> Value {
        let mut entry = json!({
            "@odata.id": format!("{}/Thermal/{}/{id}", self.chassis_path(), kind.segment()),
            "MemberId": id,
            "Name": id,
        });
        if self.layout.inline_thermal {
            entry[kind.field()] = if self.is_failing(id) {
                Value::Null
            } else {
                json!(jitter(kind.baseline()))
            };
        }
        entry
    }

    pub fn thermal(&self, chassis: &str) -> Result<Value, StatusCode> {
        self.check_chassis(chassis)?;
        if self.thermal_failing.load(Ordering::Relaxed) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }

        let fans: Vec<Value> = self
            .fan_ids()
            .iter()
            .map(|id| self.thermal_entry(ThermalKind::Fans, id))
            .collect();
        let temperatures: Vec<Value> = self
            .temperature_ids()
            .iter()
            .map(|id| self.thermal_entry(ThermalKind::Temperatures, id))
            .collect();

        Ok(json!({
            "@odata.id": format!("{}/Thermal", self.chassis_path()),
            "Fans": fans,
            "Temperatures": temperatures,
        }))
    }

    pub fn thermal_member(&self, chassis: &str, group: &str, id: &str) -> Result<Value, StatusCode> {
        self.check_chassis(chassis)?;
        let kind = ThermalKind::from_segment(group).ok_or(StatusCode::NOT_FOUND)?;
        let known = match kind {
            ThermalKind::Fans => self.fan_ids(),
            ThermalKind::Temperatures => self.temperature_ids(),
        };
        if !known.iter().any(|k| k == id) {
            return Err(StatusCode::NOT_FOUND);
        }
        if self.is_failing(id) {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }

        let mut member = json!({ "MemberId": id, "Name": id });
        member[kind.field()] = json!(jitter(kind.baseline()));
        Ok(member)
    }
}

fn jitter(baseline: f64) -> f64 {
    let spread = baseline * JITTER_RATIO;
    let value = baseline + rng().random_range(-spread..=spread);
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_lists_psus_and_other_sensors() {
        let controller = MockController::new(MockLayout::default());
        let directory = controller.sensor_directory("Miramar_Sensor").unwrap();
        let members = directory["Members"].as_array().unwrap();
        assert_eq!(members.len(), 4 + 2 + OTHER_SENSORS.len());
        assert_eq!(
            members[0]["@odata.id"],
            json!("/redfish/v1/Chassis/Miramar_Sensor/Sensors/power_PWR_PDB_PSU1")
        );

        assert_eq!(
            controller.sensor_directory("Other").unwrap_err(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_readings_jitter_around_baseline() {
        let controller = MockController::new(MockLayout::default());
        for _ in 0..20 {
            let doc = controller.sensor("Miramar_Sensor", "power_PWR_MB_PSU1").unwrap();
            let reading = doc["Reading"].as_f64().unwrap();
            assert!((285.0..=315.0).contains(&reading));
        }
    }

    #[test]
    fn test_failing_sensor() {
        let controller = MockController::new(MockLayout::default());
        controller.fail_sensor("power_PWR_PDB_PSU2");
        controller.fail_sensor("SPD_FAN1_F");

        assert_eq!(
            controller.sensor("Miramar_Sensor", "power_PWR_PDB_PSU2").unwrap_err(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let thermal = controller.thermal("Miramar_Sensor").unwrap();
        assert!(thermal["Fans"][0]["Reading"].is_null());
        assert!(thermal["Fans"][1]["Reading"].is_f64());

        controller.set_thermal_failing(true);
        assert!(controller.thermal("Miramar_Sensor").is_err());
    }

    #[test]
    fn test_thermal_ids() {
        let controller = MockController::new(MockLayout {
            fans: 3,
            temperatures: 4,
            ..MockLayout::default()
        });
        assert_eq!(controller.fan_ids(), vec!["SPD_FAN1_F", "SPD_FAN1_R", "SPD_FAN2_F"]);
        assert_eq!(
            controller.temperature_ids(),
            vec!["TEMP_PDB_PSU1", "TEMP_MB_PSU1", "TEMP_GPU1", "TEMP_GPU2"]
        );
    }

    #[test]
    fn test_linked_thermal_entries() {
        let controller = MockController::new(MockLayout {
            inline_thermal: false,
            ..MockLayout::default()
        });
        let thermal = controller.thermal("Miramar_Sensor").unwrap();
        let entry = &thermal["Temperatures"][0];
        assert!(entry.get("ReadingCelsius").is_none());
        assert_eq!(
            entry["@odata.id"],
            json!("/redfish/v1/Chassis/Miramar_Sensor/Thermal/Temperatures/TEMP_PDB_PSU1")
        );

        let member = controller
            .thermal_member("Miramar_Sensor", "Temperatures", "TEMP_PDB_PSU1")
            .unwrap();
        assert!(member["ReadingCelsius"].is_f64());
    }
}
