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

//! One-shot PSU endpoint discovery.

use tracing::info;

use crate::common::config::{AppConfig, CollectorConfig};
use crate::error::Result;
use crate::network::client::ControllerClient;
use crate::network::redfish::MemberList;
use crate::sensor::{DeviceClass, EndpointDescriptor};

/// PSU endpoints split by tray. Built once before polling starts and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointInventory {
    accelerator_tray: Vec<EndpointDescriptor>,
    compute_tray: Vec<EndpointDescriptor>,
}

impl EndpointInventory {
    /// Partition a sensor directory by the PSU naming markers. Members that
    /// are not PSU power sensors are ignored.
    pub fn from_members(list: &MemberList) -> Self {
        let mut inventory = Self::default();
        for member in &list.members {
            let path = member.odata_id.as_str();
            if path.contains(AppConfig::GPU_TRAY_PSU_MARKER) {
                inventory
                    .accelerator_tray
                    .push(EndpointDescriptor::new(path, DeviceClass::AcceleratorTray));
            } else if path.contains(AppConfig::CPU_TRAY_PSU_MARKER) {
                inventory
                    .compute_tray
                    .push(EndpointDescriptor::new(path, DeviceClass::ComputeTray));
            }
        }
        inventory
    }

    pub fn accelerator_tray(&self) -> &[EndpointDescriptor] {
        &self.accelerator_tray
    }

    pub fn compute_tray(&self) -> &[EndpointDescriptor] {
        &self.compute_tray
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.accelerator_tray.iter().chain(self.compute_tray.iter())
    }

    pub fn len(&self) -> usize {
        self.accelerator_tray.len() + self.compute_tray.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Query the chassis sensor directory and resolve the PSU endpoints.
///
/// There is no retry: any failure here is fatal to the run.
pub async fn discover_endpoints(
    client: &ControllerClient,
    config: &CollectorConfig,
) -> Result<EndpointInventory> {
    let list: MemberList = client.get_json(&config.sensors_path()).await?;
    let inventory = EndpointInventory::from_members(&list);

    info!(
        "Discovered {} GPU tray and {} CPU tray PSU endpoints ({} sensors listed)",
        inventory.accelerator_tray.len(),
        inventory.compute_tray.len(),
        list.members.len()
    );
    Ok(inventory)
}
