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

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::common::config::AppConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the BMC on a fixed interval and append readings to the datasets.
    /// The password is read from the BMC_PASSWORD environment variable.
    Collect(CollectArgs),
    /// Summarize previously collected datasets.
    Summary(SummaryArgs),
}

#[derive(Parser, Clone, Debug)]
pub struct CollectArgs {
    /// Server BMC IP address (optionally with a port).
    #[arg(long)]
    pub bmc_ip: String,
    /// Username for authentication.
    #[arg(long)]
    pub bmc_username: String,
    /// Probe interval in seconds (minimum 15).
    #[arg(long)]
    pub probe_every: u64,
    /// Duration in seconds for which to collect data. Runs indefinitely if not specified.
    #[arg(long)]
    pub collect_for: Option<u64>,
    /// Directory the dataset files are written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Redfish chassis holding the sensors.
    #[arg(long, default_value = AppConfig::DEFAULT_CHASSIS)]
    pub chassis: String,
    /// URL scheme used to reach the BMC.
    #[arg(long, value_enum, default_value_t = Scheme::Https)]
    pub scheme: Scheme,
    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = AppConfig::DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,
}

#[derive(Parser, Clone, Debug)]
pub struct SummaryArgs {
    /// Directory holding the dataset files.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,
    /// Keep every N-th sample. Default is 1 (consider all samples).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub resample: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}
