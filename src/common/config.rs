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
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cli::{CollectArgs, Scheme};
use crate::error::{Error, Result};

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Polling
    pub const MIN_PROBE_INTERVAL_SECS: u64 = 15;

    // Network Configuration
    pub const MAX_CONCURRENT_QUERIES: usize = 32;
    pub const EXTRA_WORKERS_OVER_CPUS: usize = 4;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const POOL_IDLE_TIMEOUT_SECS: u64 = 60;
    pub const TCP_KEEPALIVE_SECS: u64 = 30;

    // Controller
    pub const PASSWORD_ENV_VAR: &'static str = "BMC_PASSWORD";
    pub const DEFAULT_CHASSIS: &'static str = "Miramar_Sensor";
    pub const GPU_TRAY_PSU_MARKER: &'static str = "power_PWR_PDB_";
    pub const CPU_TRAY_PSU_MARKER: &'static str = "PWR_MB_PSU";

    // Datasets
    pub const PSU_DATASET_FILE: &'static str = "psu_readings.json";
    pub const FAN_DATASET_FILE: &'static str = "fan_readings.json";
    pub const TEMP_DATASET_FILE: &'static str = "temp_readings.json";
    pub const TOTAL_POWER_NAME: &'static str = "Total Power in W";
    pub const UNAVAILABLE_READING: &'static str = "N/A";

    // Summary
    pub const CYCLE_TOLERANCE_SECS: i64 = 5;
}

/// Environment-specific configuration
pub struct EnvConfig;

impl EnvConfig {
    /// Worker count for one fan-out round: bounded by available concurrency,
    /// never more than the number of sensors being queried.
    pub fn max_concurrent_queries(sensor_count: usize) -> usize {
        let by_cpus = std::cmp::min(
            AppConfig::MAX_CONCURRENT_QUERIES,
            num_cpus::get() + AppConfig::EXTRA_WORKERS_OVER_CPUS,
        );
        std::cmp::min(sensor_count, by_cpus).max(1)
    }

    /// Read the controller password from the environment.
    ///
    /// An empty value counts as unset.
    pub fn controller_password() -> Result<String> {
        match std::env::var(AppConfig::PASSWORD_ENV_VAR) {
            Ok(password) if !password.is_empty() => Ok(password),
            _ => Err(Error::MissingSecret(AppConfig::PASSWORD_ENV_VAR)),
        }
    }

    pub fn sensors_path(chassis: &str) -> String {
        format!("/redfish/v1/Chassis/{chassis}/Sensors")
    }

    pub fn thermal_path(chassis: &str) -> String {
        format!("/redfish/v1/Chassis/{chassis}/Thermal")
    }
}

/// Polling cadence: a fixed delay between cycles and an optional total
/// collection budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBudget {
    interval: Duration,
    total_duration: Option<Duration>,
}

impl CycleBudget {
    /// Build a budget, rejecting intervals below
    /// [`AppConfig::MIN_PROBE_INTERVAL_SECS`].
    pub fn from_secs(interval_secs: u64, total_duration_secs: Option<u64>) -> Result<Self> {
        if interval_secs < AppConfig::MIN_PROBE_INTERVAL_SECS {
            return Err(Error::IntervalTooShort {
                got: interval_secs,
                min: AppConfig::MIN_PROBE_INTERVAL_SECS,
            });
        }
        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            total_duration: total_duration_secs.map(Duration::from_secs),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `None` means collect until interrupted.
    pub fn total_duration(&self) -> Option<Duration> {
        self.total_duration
    }
}

/// Immutable runtime configuration, built once at startup and shared by
/// reference with discovery, the collectors and the scheduler.
#[derive(Clone)]
pub struct CollectorConfig {
    pub base_url: Url,
    pub username: String,
    pub password: String,
    pub chassis: String,
    pub budget: CycleBudget,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
}

impl CollectorConfig {
    pub fn from_args(args: &CollectArgs, password: String) -> Result<Self> {
        let budget = CycleBudget::from_secs(args.probe_every, args.collect_for)?;
        let base_url = controller_base_url(&args.bmc_ip, args.scheme)?;

        Ok(Self {
            base_url,
            username: args.bmc_username.clone(),
            password,
            chassis: args.chassis.clone(),
            budget,
            output_dir: args.output_dir.clone(),
            request_timeout: Duration::from_secs(args.request_timeout),
        })
    }

    pub fn sensors_path(&self) -> String {
        EnvConfig::sensors_path(&self.chassis)
    }

    pub fn thermal_path(&self) -> String {
        EnvConfig::thermal_path(&self.chassis)
    }
}

impl fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("chassis", &self.chassis)
            .field("budget", &self.budget)
            .field("output_dir", &self.output_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Turn `10.0.0.5`, `bmc.local:8443` or a full `https://…` address into the
/// controller base URL.
pub fn controller_base_url(address: &str, scheme: Scheme) -> Result<Url> {
    let address = address.trim().trim_end_matches('/');
    let candidate = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("{}://{address}", scheme.as_str())
    };

    let url = Url::parse(&candidate).map_err(|e| Error::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(Error::InvalidAddress {
            address: address.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}
