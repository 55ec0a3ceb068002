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

//! Unified error types for the bmc-stats library.
//!
//! Startup errors (missing secret, invalid interval, discovery failure) are
//! fatal to the process. Request errors raised while querying a single
//! sensor are isolated by the collectors and only logged.
//!
//! # Example
//!
//! ```rust,no_run
//! use bmc_stats::{CycleBudget, Result};
//!
//! fn budget() -> Result<CycleBudget> {
//!     CycleBudget::from_secs(30, Some(3600))
//! }
//! ```

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// The main error type for bmc-stats operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The environment variable carrying the controller password is unset.
    #[error("{0} environment variable not set.")]
    MissingSecret(&'static str),

    /// The polling interval is below the controller-safe floor.
    #[error("probe interval cannot be lower than {min} seconds (got {got})")]
    IntervalTooShort { got: u64, min: u64 },

    /// The controller address could not be turned into a base URL.
    #[error("Invalid controller address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The request could not be sent or the response body could not be read.
    ///
    /// Covers connection failures, TLS errors and timeouts.
    #[error("Request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The controller answered with a non-success status code.
    #[error("Request to {path} returned HTTP {status}")]
    Status { path: String, status: StatusCode },

    /// The response body did not match the expected Redfish envelope.
    #[error("Unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A fan-out worker task panicked or was cancelled.
    #[error("Query task for {sensor} did not complete: {reason}")]
    Task { sensor: String, reason: String },

    /// Writing a dataset file failed.
    #[error("Failed to write dataset {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dataset file exists but is not a JSON array of records.
    #[error("Dataset {} is not a valid JSON array: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for bmc-stats operations.
pub type Result<T> = std::result::Result<T, Error>;
