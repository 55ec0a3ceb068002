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

//! Append-only JSON array datasets.
//!
//! A dataset is a single pretty-printed JSON array of
//! `{"Name", "Timestamp", "Reading"}` records. Appending rewrites the whole
//! array: the existing records are read back, the batch is added, and the
//! result is written to a sibling temporary file that is then renamed over
//! the dataset. A crash between two appends therefore always leaves a
//! complete array behind.
//!
//! Existing records are carried over as raw JSON values, so anything already
//! in the file survives an append unchanged even if it does not parse as a
//! [`SensorReading`].

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sensor::{Category, SensorReading};

/// The three per-category dataset files under one directory.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.dir.join(category.dataset_file())
    }

    /// Append one batch to the category's dataset and return the number of
    /// records now stored.
    pub fn append(&self, category: Category, batch: &[SensorReading]) -> Result<usize> {
        append_records(&self.path_for(category), batch)
    }
}

/// Read the records stored at `path`.
///
/// A missing, empty, unreadable or malformed file yields an empty list; the
/// next append then starts a fresh array.
pub fn read_records(path: &Path) -> Vec<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Cannot read dataset {}, starting fresh: {e}", path.display());
            return Vec::new();
        }
    };

    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!(
                "Dataset {} does not hold a JSON array, starting fresh",
                path.display()
            );
            Vec::new()
        }
        Err(e) => {
            warn!("Dataset {} is malformed, starting fresh: {e}", path.display());
            Vec::new()
        }
    }
}

/// Read-modify-write append of `batch` to the dataset at `path`.
pub fn append_records(path: &Path, batch: &[SensorReading]) -> Result<usize> {
    let mut records = read_records(path);
    for reading in batch {
        records.push(serde_json::to_value(reading)?);
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;

    write_atomically(path, &buf).map_err(|source| Error::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Appended {} records to {} ({} total)",
        batch.len(),
        path.display(),
        records.len()
    );
    Ok(records.len())
}

fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
