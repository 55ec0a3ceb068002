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

//! Redfish response envelopes consumed by the collectors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sensor::Reading;

/// `{"Members": [{"@odata.id": "..."}]}` returned by a collection resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberList {
    #[serde(rename = "Members", default)]
    pub members: Vec<MemberLink>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberLink {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// The chassis Thermal resource: fan and temperature sensor groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThermalListing {
    #[serde(rename = "Fans", default)]
    pub fans: Vec<ThermalEntry>,
    #[serde(rename = "Temperatures", default)]
    pub temperatures: Vec<ThermalEntry>,
}

/// One element of `Fans` or `Temperatures`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThermalEntry {
    #[serde(rename = "MemberId")]
    pub member_id: Option<String>,
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ThermalEntry {
    /// Raw sensor id: `MemberId`, else the last segment of the resource
    /// link, else `"Unknown"`.
    pub fn raw_id(&self) -> &str {
        if let Some(id) = self.member_id.as_deref() {
            return id;
        }
        self.odata_id
            .as_deref()
            .and_then(|link| link.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .unwrap_or("Unknown")
    }

    /// The reading embedded in the listing, if the field is present at all.
    pub fn inline_reading(&self, field: &str) -> Option<Reading> {
        self.fields.get(field).map(|v| Reading::from_json(Some(v)))
    }
}

/// A single sensor resource: `{"Reading": n}` or `{"ReadingCelsius": n}`
/// among other properties.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingEnvelope {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ReadingEnvelope {
    pub fn reading(&self, field: &str) -> Reading {
        Reading::from_json(self.fields.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_list() {
        let list: MemberList = serde_json::from_value(json!({
            "@odata.id": "/redfish/v1/Chassis/Miramar_Sensor/Sensors",
            "Members": [
                {"@odata.id": "/redfish/v1/Chassis/Miramar_Sensor/Sensors/power_PWR_PDB_PSU1"},
                {"@odata.id": "/redfish/v1/Chassis/Miramar_Sensor/Sensors/TEMP_AMBIENT"}
            ],
            "Members@odata.count": 2
        }))
        .unwrap();
        assert_eq!(list.members.len(), 2);
        assert!(list.members[0].odata_id.ends_with("power_PWR_PDB_PSU1"));
    }

    #[test]
    fn test_thermal_listing_defaults() {
        let listing: ThermalListing = serde_json::from_value(json!({
            "Fans": [
                {"MemberId": "SPD_FAN1_F", "Reading": 7200, "ReadingUnits": "RPM"},
                {"@odata.id": "/redfish/v1/Chassis/Miramar_Sensor/Sensors/SPD_FAN2_F"}
            ]
        }))
        .unwrap();
        assert!(listing.temperatures.is_empty());
        assert_eq!(listing.fans.len(), 2);

        let first = &listing.fans[0];
        assert_eq!(first.raw_id(), "SPD_FAN1_F");
        assert_eq!(first.inline_reading("Reading"), Some(Reading::Value(7200.0)));

        let second = &listing.fans[1];
        assert_eq!(second.raw_id(), "SPD_FAN2_F");
        assert_eq!(second.inline_reading("Reading"), None);

        assert_eq!(ThermalEntry::default().raw_id(), "Unknown");
    }

    #[test]
    fn test_reading_envelope() {
        let env: ReadingEnvelope =
            serde_json::from_value(json!({"ReadingCelsius": 41.5, "Status": {}})).unwrap();
        assert_eq!(env.reading("ReadingCelsius"), Reading::Value(41.5));
        assert_eq!(env.reading("Reading"), Reading::Unavailable);
    }
}
