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

pub mod aggregator;
pub mod fanout;
pub mod power;
pub mod scheduler;
pub mod strategy;
pub mod thermal;

use std::sync::Arc;

pub use power::PowerCollector;
pub use scheduler::{CycleState, RunSummary, Scheduler};
pub use strategy::{BatchResult, CategoryCollector};
pub use thermal::{ThermalCollector, ThermalGroup};

use crate::common::config::CollectorConfig;
use crate::network::{ControllerClient, EndpointInventory};

/// Build one collector per category from a discovered inventory.
pub fn standard_collectors(
    client: &ControllerClient,
    inventory: Arc<EndpointInventory>,
    config: &CollectorConfig,
) -> Vec<Box<dyn CategoryCollector>> {
    let power: Box<dyn CategoryCollector> = Box::new(PowerCollector::new(client.clone(), inventory));
    let fans: Box<dyn CategoryCollector> = Box::new(ThermalCollector::fans(client.clone(), config));
    let temperatures: Box<dyn CategoryCollector> =
        Box::new(ThermalCollector::temperatures(client.clone(), config));
    vec![power, fans, temperatures]
}
