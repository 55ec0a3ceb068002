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

use async_trait::async_trait;

use crate::error::Result;
use crate::sensor::{Category, SensorReading};

/// Result type for one collector round
pub type BatchResult = Result<Vec<SensorReading>>;

/// One per-category collection pipeline.
///
/// `collect` fans out to the controller, joins every query, and returns the
/// batch for this cycle. It never touches the dataset files; persisting the
/// batch is the scheduler's job.
#[async_trait]
pub trait CategoryCollector: Send + Sync {
    /// Which dataset the batch belongs to
    fn category(&self) -> Category;

    /// Collect one batch. An `Err` means the whole round failed (e.g. the
    /// sensor listing could not be fetched); individual sensor failures are
    /// absorbed and only shrink the batch.
    async fn collect(&self) -> BatchResult;
}
