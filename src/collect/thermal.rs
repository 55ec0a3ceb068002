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

//! Fan and temperature collectors. Both read the chassis Thermal resource
//! every cycle and differ only in which array they walk, which reading field
//! they pick, and how sensors are named.

use async_trait::async_trait;
use tracing::debug;

use crate::collect::fanout::fan_out;
use crate::collect::strategy::{BatchResult, CategoryCollector};
use crate::common::config::CollectorConfig;
use crate::error::Result;
use crate::network::redfish::{ReadingEnvelope, ThermalEntry, ThermalListing};
use crate::network::ControllerClient;
use crate::sensor::naming::{fan_rules, temperature_rules, NameRules};
use crate::sensor::{Category, Reading, SensorReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalGroup {
    Fans,
    Temperatures,
}

impl ThermalGroup {
    pub fn category(&self) -> Category {
        match self {
            ThermalGroup::Fans => Category::Fan,
            ThermalGroup::Temperatures => Category::Temperature,
        }
    }

    pub fn reading_field(&self) -> &'static str {
        match self {
            ThermalGroup::Fans => "Reading",
            ThermalGroup::Temperatures => "ReadingCelsius",
        }
    }

    pub fn rules(&self) -> &'static NameRules {
        match self {
            ThermalGroup::Fans => fan_rules(),
            ThermalGroup::Temperatures => temperature_rules(),
        }
    }

    fn take_entries(&self, listing: ThermalListing) -> Vec<ThermalEntry> {
        match self {
            ThermalGroup::Fans => listing.fans,
            ThermalGroup::Temperatures => listing.temperatures,
        }
    }
}

pub struct ThermalCollector {
    client: ControllerClient,
    thermal_path: String,
    group: ThermalGroup,
}

impl ThermalCollector {
    pub fn new(client: ControllerClient, config: &CollectorConfig, group: ThermalGroup) -> Self {
        Self {
            client,
            thermal_path: config.thermal_path(),
            group,
        }
    }

    pub fn fans(client: ControllerClient, config: &CollectorConfig) -> Self {
        Self::new(client, config, ThermalGroup::Fans)
    }

    pub fn temperatures(client: ControllerClient, config: &CollectorConfig) -> Self {
        Self::new(client, config, ThermalGroup::Temperatures)
    }
}

/// Turn one listing entry into a reading. The inline value is used when the
/// listing carries one; otherwise the entry's own resource is fetched.
pub async fn resolve_entry(
    client: &ControllerClient,
    group: ThermalGroup,
    entry: &ThermalEntry,
) -> Result<SensorReading> {
    let field = group.reading_field();
    let reading = match (entry.inline_reading(field), entry.odata_id.as_deref()) {
        (Some(reading), _) => reading,
        (None, Some(link)) => client.get_json::<ReadingEnvelope>(link).await?.reading(field),
        (None, None) => Reading::Unavailable,
    };

    let name = group.rules().normalize(entry.raw_id());
    Ok(SensorReading::new(name, reading))
}

#[async_trait]
impl CategoryCollector for ThermalCollector {
    fn category(&self) -> Category {
        self.group.category()
    }

    async fn collect(&self) -> BatchResult {
        // Not isolated: a failed listing fails the whole round
        let listing: ThermalListing = self.client.get_json(&self.thermal_path).await?;
        let entries = self.group.take_entries(listing);
        let listed = entries.len();

        let client = self.client.clone();
        let group = self.group;
        let batch = fan_out(
            entries,
            |entry| entry.raw_id().to_string(),
            move |entry| {
                let client = client.clone();
                async move { resolve_entry(&client, group, &entry).await }
            },
        )
        .await;

        debug!(
            "Collected {} of {listed} {} readings",
            batch.len(),
            self.group.category()
        );
        Ok(batch)
    }
}
