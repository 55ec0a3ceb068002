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

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::sensor::Reading;
use crate::summary::loader::RecordedReading;

/// Keep every `every`-th record, starting with the first.
pub fn resample<T: Clone>(records: &[T], every: usize) -> Vec<T> {
    records.iter().step_by(every.max(1)).cloned().collect()
}

/// Earliest and latest timestamp across all datasets.
pub fn monitoring_period(datasets: &[&[RecordedReading]]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut timestamps = datasets.iter().flat_map(|d| d.iter().map(|r| r.timestamp));
    let first = timestamps.next()?;
    Some(timestamps.fold((first, first), |(start, end), ts| {
        (start.min(ts), end.max(ts))
    }))
}

/// Split records into polling cycles. A gap of more than `tolerance` to the
/// previous record starts a new cycle.
pub fn group_cycles(records: &[RecordedReading], tolerance: TimeDelta) -> Vec<&[RecordedReading]> {
    let mut cycles = Vec::new();
    let mut start = 0;
    for i in 1..records.len() {
        if records[i].timestamp - records[i - 1].timestamp > tolerance {
            cycles.push(&records[start..i]);
            start = i;
        }
    }
    if start < records.len() {
        cycles.push(&records[start..]);
    }
    cycles
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorStats {
    pub name: String,
    pub samples: usize,
    pub unavailable: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub last: Reading,
}

impl SensorStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            samples: 0,
            unavailable: 0,
            min: None,
            max: None,
            mean: None,
            last: Reading::Unavailable,
        }
    }

    fn record(&mut self, reading: Reading, sum: &mut f64) {
        self.samples += 1;
        self.last = reading;
        match reading.value() {
            Some(v) => {
                *sum += v;
                self.min = Some(self.min.map_or(v, |m| m.min(v)));
                self.max = Some(self.max.map_or(v, |m| m.max(v)));
            }
            None => self.unavailable += 1,
        }
    }
}

/// Per-sensor statistics, sorted by sensor name.
pub fn sensor_stats(records: &[RecordedReading]) -> Vec<SensorStats> {
    let mut by_name: BTreeMap<&str, (SensorStats, f64)> = BTreeMap::new();
    for record in records {
        let (stats, sum) = by_name
            .entry(record.name.as_str())
            .or_insert_with(|| (SensorStats::new(&record.name), 0.0));
        stats.record(record.reading, sum);
    }

    by_name
        .into_values()
        .map(|(mut stats, sum)| {
            let valid = stats.samples - stats.unavailable;
            if valid > 0 {
                stats.mean = Some(sum / valid as f64);
            }
            stats
        })
        .collect()
}
