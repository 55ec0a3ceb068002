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

use crate::common::config::AppConfig;
use crate::sensor::{Reading, SensorReading};

/// Sum the PSU readings of one cycle. Unavailable readings contribute zero.
pub fn sum_readings<'a>(readings: impl IntoIterator<Item = &'a SensorReading>) -> f64 {
    readings
        .into_iter()
        .map(|r| r.reading.contribution())
        .sum()
}

/// The synthetic "Total Power in W" reading, stamped now.
pub fn total_power(readings: &[SensorReading]) -> SensorReading {
    SensorReading::new(
        AppConfig::TOTAL_POWER_NAME,
        Reading::Value(sum_readings(readings)),
    )
}
