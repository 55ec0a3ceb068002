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

use std::net::SocketAddr;

use clap::Parser;

use crate::common::config::AppConfig;
use crate::mock::controller::MockLayout;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mock BMC serving Redfish sensor readings", long_about = None)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1:8000", help = "Address to listen on")]
    pub bind: SocketAddr,

    #[arg(long, default_value = AppConfig::DEFAULT_CHASSIS, help = "Chassis name")]
    pub chassis: String,

    #[arg(long, default_value_t = 4, help = "Number of GPU tray PSUs")]
    pub gpu_tray_psus: usize,

    #[arg(long, default_value_t = 2, help = "Number of CPU tray PSUs")]
    pub cpu_tray_psus: usize,

    #[arg(long, default_value_t = 8, help = "Number of fans")]
    pub fans: usize,

    #[arg(long, default_value_t = 6, help = "Number of temperature sensors")]
    pub temperatures: usize,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Sensor ids that answer 503, e.g. power_PWR_PDB_PSU2,SPD_FAN1_F"
    )]
    pub failing_sensors: Vec<String>,

    #[arg(long, help = "Make the Thermal listing itself fail")]
    pub fail_thermal: bool,

    #[arg(long, help = "Omit inline thermal readings so clients follow member links")]
    pub linked_thermal: bool,
}

impl Args {
    pub fn layout(&self) -> MockLayout {
        MockLayout {
            chassis: self.chassis.clone(),
            gpu_tray_psus: self.gpu_tray_psus,
            cpu_tray_psus: self.cpu_tray_psus,
            fans: self.fans,
            temperatures: self.temperatures,
            inline_thermal: !self.linked_thermal,
        }
    }
}
