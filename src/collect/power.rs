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

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::collect::aggregator::total_power;
use crate::collect::fanout::fan_out;
use crate::collect::strategy::{BatchResult, CategoryCollector};
use crate::error::Result;
use crate::network::redfish::ReadingEnvelope;
use crate::network::{ControllerClient, EndpointInventory};
use crate::sensor::naming::psu_rules;
use crate::sensor::{Category, EndpointDescriptor, SensorReading};

/// Polls every discovered PSU and appends the cycle's total power.
pub struct PowerCollector {
    client: ControllerClient,
    inventory: Arc<EndpointInventory>,
}

impl PowerCollector {
    pub fn new(client: ControllerClient, inventory: Arc<EndpointInventory>) -> Self {
        Self { client, inventory }
    }
}

/// Query one PSU sensor and name it after its tray.
pub async fn query_psu(
    client: &ControllerClient,
    endpoint: &EndpointDescriptor,
) -> Result<SensorReading> {
    let envelope: ReadingEnvelope = client.get_json(&endpoint.relative_path).await?;
    let name = psu_rules(endpoint.device_class).normalize(endpoint.member_id());
    Ok(SensorReading::new(name, envelope.reading("Reading")))
}

#[async_trait]
impl CategoryCollector for PowerCollector {
    fn category(&self) -> Category {
        Category::Power
    }

    async fn collect(&self) -> BatchResult {
        let endpoints: Vec<EndpointDescriptor> = self.inventory.iter().cloned().collect();
        let client = self.client.clone();

        let mut batch = fan_out(
            endpoints,
            |endpoint| endpoint.relative_path.clone(),
            move |endpoint| {
                let client = client.clone();
                async move { query_psu(&client, &endpoint).await }
            },
        )
        .await;

        let total = total_power(&batch);
        debug!(
            "Collected {} of {} PSU readings, total {:?} W",
            batch.len(),
            self.inventory.len(),
            total.reading.value()
        );
        batch.push(total);
        Ok(batch)
    }
}
