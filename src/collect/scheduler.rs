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

//! The polling loop.
//!
//! Each cycle runs the power, fan and temperature collectors one after
//! another, appends each batch to its dataset, then sleeps for the fixed
//! interval. The loop ends when the duration budget is spent or a shutdown
//! is requested. Shutdown is observed between collector rounds and during
//! the sleep; a round already in flight is allowed to finish and persist.

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::collect::strategy::CategoryCollector;
use crate::common::config::CycleBudget;
use crate::sensor::Category;
use crate::storage::DatasetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
    Completed,
    Interrupted,
}

/// How a scheduler run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub state: CycleState,
    /// Cycles in which every collector round ran.
    pub cycles: u64,
}

pub struct Scheduler {
    budget: CycleBudget,
    store: DatasetStore,
    collectors: Vec<Box<dyn CategoryCollector>>,
    shutdown: watch::Receiver<bool>,
    state: CycleState,
}

impl Scheduler {
    /// Collectors are run in power, fan, temperature order regardless of the
    /// order they are passed in.
    pub fn new(
        budget: CycleBudget,
        store: DatasetStore,
        mut collectors: Vec<Box<dyn CategoryCollector>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        collectors.sort_by_key(|c| {
            Category::ALL
                .iter()
                .position(|category| *category == c.category())
        });

        Self {
            budget,
            store,
            collectors,
            shutdown,
            state: CycleState::Idle,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub async fn run(&mut self) -> RunSummary {
        self.state = CycleState::Running;
        let end = self.budget.total_duration().map(|d| Instant::now() + d);
        let mut cycles = 0;

        info!(
            "Polling every {}s{}",
            self.budget.interval().as_secs(),
            match self.budget.total_duration() {
                Some(d) => format!(" for {}s", d.as_secs()),
                None => String::new(),
            }
        );

        loop {
            if self.shutdown_requested() {
                self.state = CycleState::Interrupted;
                break;
            }
            if end.is_some_and(|end| Instant::now() >= end) {
                self.state = CycleState::Completed;
                break;
            }

            let started = Instant::now();
            if !self.run_cycle().await {
                self.state = CycleState::Interrupted;
                break;
            }
            cycles += 1;
            info!("Cycle {cycles} finished in {:?}", started.elapsed());

            if !self.sleep_interval().await {
                self.state = CycleState::Interrupted;
                break;
            }
        }

        RunSummary {
            state: self.state,
            cycles,
        }
    }

    /// One pass over every category. Returns `false` when a shutdown request
    /// cut the cycle short.
    pub async fn run_cycle(&self) -> bool {
        for collector in &self.collectors {
            if self.shutdown_requested() {
                return false;
            }

            let category = collector.category();
            match collector.collect().await {
                Ok(batch) => match self.store.append(category, &batch) {
                    Ok(total) => debug!(
                        "Stored {} {category} readings ({total} in dataset)",
                        batch.len()
                    ),
                    Err(e) => error!("Dropping {category} batch: {e}"),
                },
                Err(e) => error!("Skipping {category} readings this cycle: {e}"),
            }
        }
        true
    }

    /// Sleep for the full interval. Returns `false` if a shutdown request
    /// arrived first.
    async fn sleep_interval(&self) -> bool {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(self.budget.interval()) => true,
            _ = wait_for_shutdown(&mut shutdown) => false,
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|requested| *requested).await.is_err() {
        // Sender gone: nobody can ask us to stop any more
        std::future::pending::<()>().await;
    }
}
