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

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sensor::Reading;

/// A record read back from a dataset file.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedReading {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

/// Load every well-formed record from the dataset at `path`.
///
/// A missing file is an empty dataset. Records without a name or with a
/// timestamp that cannot be parsed are skipped.
pub fn load_dataset(path: &Path) -> Result<Vec<RecordedReading>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<Value> = serde_json::from_str(&content).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        match parse_record(value) {
            Some(record) => records.push(record),
            None => debug!("Skipping record {index} in {}", path.display()),
        }
    }
    Ok(records)
}

fn parse_record(value: &Value) -> Option<RecordedReading> {
    let name = value.get("Name")?.as_str()?;
    let timestamp = parse_timestamp(value.get("Timestamp")?.as_str()?)?;
    Some(RecordedReading {
        name: name.to_string(),
        timestamp,
        reading: Reading::from_json(value.get("Reading")),
    })
}

/// Accepts RFC 3339 as well as naive ISO-8601 timestamps, which are taken
/// to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
