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

//! Offline summary of collected datasets.

pub mod loader;
pub mod stats;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};

use crate::common::config::AppConfig;
use crate::error::Result;
use crate::sensor::{Category, Reading};

pub use loader::{load_dataset, parse_timestamp, RecordedReading};
pub use stats::{group_cycles, monitoring_period, resample, sensor_stats, SensorStats};

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: Category,
    pub records: usize,
    pub sensors: Vec<SensorStats>,
}

#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub power_cycles: usize,
    pub peak_total_power: Option<f64>,
    pub categories: Vec<CategorySummary>,
}

/// Load the three datasets under `dir`, keep every `resample_every`-th
/// record of each, and summarize them.
pub fn summarize(dir: &Path, resample_every: usize) -> Result<DatasetSummary> {
    let mut datasets = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let records = load_dataset(&dir.join(category.dataset_file()))?;
        datasets.push((category, resample(&records, resample_every)));
    }

    let slices: Vec<&[RecordedReading]> = datasets.iter().map(|(_, r)| r.as_slice()).collect();
    let period = monitoring_period(&slices);

    let power: &[RecordedReading] = datasets
        .iter()
        .find(|(category, _)| *category == Category::Power)
        .map(|(_, r)| r.as_slice())
        .unwrap_or(&[]);
    let power_cycles = group_cycles(power, TimeDelta::seconds(AppConfig::CYCLE_TOLERANCE_SECS)).len();
    let peak_total_power = power
        .iter()
        .filter(|r| r.name == AppConfig::TOTAL_POWER_NAME)
        .filter_map(|r| r.reading.value())
        .reduce(f64::max);

    let categories = datasets
        .iter()
        .map(|(category, records)| CategorySummary {
            category: *category,
            records: records.len(),
            sensors: sensor_stats(records),
        })
        .collect();

    Ok(DatasetSummary {
        period,
        power_cycles,
        peak_total_power,
        categories,
    })
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            Some((start, end)) => writeln!(
                f,
                "Monitoring period: {} to {} ({}s)",
                start.to_rfc3339(),
                end.to_rfc3339(),
                (end - start).num_seconds()
            )?,
            None => writeln!(f, "Monitoring period: no data")?,
        }
        writeln!(f, "Power cycles: {}", self.power_cycles)?;
        writeln!(
            f,
            "Peak {}: {}",
            AppConfig::TOTAL_POWER_NAME,
            fmt_value(self.peak_total_power)
        )?;

        for summary in &self.categories {
            writeln!(f)?;
            writeln!(
                f,
                "[{}] {} records",
                summary.category, summary.records
            )?;
            writeln!(
                f,
                "{:<32} {:>8} {:>6} {:>10} {:>10} {:>10} {:>10}",
                "Sensor", "Samples", "N/A", "Min", "Max", "Mean", "Last"
            )?;
            for s in &summary.sensors {
                let last = match s.last {
                    Reading::Value(v) => format!("{v:.2}"),
                    Reading::Unavailable => AppConfig::UNAVAILABLE_READING.to_string(),
                };
                writeln!(
                    f,
                    "{:<32} {:>8} {:>6} {:>10} {:>10} {:>10} {:>10}",
                    s.name,
                    s.samples,
                    s.unavailable,
                    fmt_value(s.min),
                    fmt_value(s.max),
                    fmt_value(s.mean),
                    last
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorReading;
    use crate::storage::DatasetStore;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn reading(secs: i64, name: &str, value: Reading) -> SensorReading {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + TimeDelta::seconds(secs);
        SensorReading::at(name, ts, value)
    }

    #[test]
    fn test_summarize_collected_datasets() {
        let dir = tempdir().unwrap();
        let store = DatasetStore::new(dir.path());

        for (cycle, total) in [(0, 900.0), (15, 1200.0)] {
            store
                .append(
                    Category::Power,
                    &[
                        reading(cycle, "GPU_TRAY_PSU1", Reading::Value(total / 2.0)),
                        reading(cycle, "CPU_TRAY_PSU1", Reading::Value(total / 2.0)),
                        reading(cycle + 1, AppConfig::TOTAL_POWER_NAME, Reading::Value(total)),
                    ],
                )
                .unwrap();
            store
                .append(Category::Fan, &[reading(cycle + 2, "FAN1 Front", Reading::Unavailable)])
                .unwrap();
        }

        let summary = summarize(dir.path(), 1).unwrap();
        assert_eq!(summary.power_cycles, 2);
        assert_eq!(summary.peak_total_power, Some(1200.0));
        let (start, end) = summary.period.unwrap();
        assert_eq!((end - start).num_seconds(), 17);

        let power = &summary.categories[0];
        assert_eq!(power.category, Category::Power);
        assert_eq!(power.records, 6);
        assert_eq!(power.sensors[0].name, "CPU_TRAY_PSU1");

        let temperature = &summary.categories[2];
        assert_eq!(temperature.records, 0);

        let rendered = summary.to_string();
        assert!(rendered.contains("Power cycles: 2"));
        assert!(rendered.contains("Peak Total Power in W: 1200.00"));
        assert!(rendered.contains("FAN1 Front"));
    }

    #[test]
    fn test_summarize_empty_directory() {
        let dir = tempdir().unwrap();
        let summary = summarize(dir.path(), 2).unwrap();
        assert!(summary.period.is_none());
        assert_eq!(summary.power_cycles, 0);
        assert!(summary.to_string().contains("no data"));
    }
}
