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

use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::warn;

use crate::common::config::EnvConfig;
use crate::error::{Error, Result};

/// Run one query per item on a bounded set of worker tasks and wait for all
/// of them.
///
/// `label` names the item for logging. Results are returned in completion
/// order; failed queries are logged with their label and dropped, so one bad
/// sensor never takes its siblings down with it.
pub async fn fan_out<I, T, L, F, Fut>(items: Vec<I>, label: L, query: F) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    L: Fn(&I) -> String,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(EnvConfig::max_concurrent_queries(
        items.len(),
    )));
    let mut pending = FuturesUnordered::new();

    for item in items {
        let sensor = label(&item);
        let semaphore = semaphore.clone();
        let task = query(item);
        let task_sensor = sensor.clone();

        let handle = tokio::spawn(async move {
            // Limit in-flight requests against the controller
            let _permit = semaphore.acquire().await.map_err(|e| Error::Task {
                sensor: task_sensor,
                reason: e.to_string(),
            })?;
            task.await
        });

        pending.push(async move { (sensor, handle.await) });
    }

    let mut completed = Vec::with_capacity(pending.len());
    while let Some((sensor, joined)) = pending.next().await {
        let result = joined.unwrap_or_else(|e| {
            Err(Error::Task {
                sensor: sensor.clone(),
                reason: e.to_string(),
            })
        });

        match result {
            Ok(value) => completed.push(value),
            Err(e) => warn!("Failed to query sensor {sensor}: {e}"),
        }
    }
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let items: Vec<u32> = (1..=5).collect();
        let results = fan_out(
            items,
            |i| format!("sensor-{i}"),
            |i| async move {
                if i == 3 {
                    Err(Error::Task {
                        sensor: format!("sensor-{i}"),
                        reason: "boom".to_string(),
                    })
                } else {
                    Ok(i * 10)
                }
            },
        )
        .await;

        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(sorted, vec![10, 20, 40, 50]);
    }

    #[tokio::test]
    async fn test_panicking_task_is_dropped() {
        let results = fan_out(
            vec![1u32, 2],
            |i| i.to_string(),
            |i| async move {
                if i == 1 {
                    panic!("worker panic");
                }
                Ok(i)
            },
        )
        .await;
        assert_eq!(results, vec![2]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..200).collect();
        let limit = EnvConfig::max_concurrent_queries(items.len());

        let results = fan_out(items, |i| i.to_string(), |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            }
        })
        .await;

        assert_eq!(results.len(), 200);
        assert!(peak.load(Ordering::SeqCst) <= limit);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u8> = fan_out(Vec::<u8>::new(), |i| i.to_string(), |i| async move {
            Ok(i)
        })
        .await;
        assert!(results.is_empty());
    }
}
