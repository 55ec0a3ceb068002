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

//! Sensor identity normalization.
//!
//! Each category maps the controller's raw member ids onto display names
//! through a small ordered list of `(pattern, replacement)` rules. Rules are
//! applied in order, each at most once, and none of them matches its own
//! output, so normalizing an already canonical name is a no-op.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sensor::types::DeviceClass;

/// A single rewrite: the first match of `pattern` is replaced.
pub struct RewriteRule {
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteRule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Failed to compile sensor naming rule"),
            replacement,
        }
    }

    fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.pattern.replace(name, self.replacement)
    }
}

/// An ordered rule table.
pub struct NameRules {
    rules: Vec<RewriteRule>,
}

impl NameRules {
    fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.to_string(), |name, rule| rule.apply(&name).into_owned())
    }
}

static GPU_TRAY_PSU_RULES: Lazy<NameRules> = Lazy::new(|| {
    NameRules::new(vec![
        RewriteRule::new("power_PWR_PDB_PSU", "GPU_TRAY_PSU"),
        RewriteRule::new("^power_", ""),
    ])
});

static CPU_TRAY_PSU_RULES: Lazy<NameRules> = Lazy::new(|| {
    NameRules::new(vec![
        RewriteRule::new("PWR_MB_PSU", "CPU_TRAY_PSU"),
        RewriteRule::new("^power_", ""),
    ])
});

static FAN_RULES: Lazy<NameRules> = Lazy::new(|| {
    NameRules::new(vec![
        RewriteRule::new("^SPD_", ""),
        RewriteRule::new("_F$", " Front"),
        RewriteRule::new("_R$", " Rear"),
    ])
});

static TEMPERATURE_RULES: Lazy<NameRules> = Lazy::new(|| {
    NameRules::new(vec![
        RewriteRule::new("TEMP_PDB_PSU", "TEMP_GPU_TRAY_PSU"),
        RewriteRule::new("TEMP_MB_PSU", "TEMP_CPU_TRAY_PSU"),
    ])
});

pub fn psu_rules(class: DeviceClass) -> &'static NameRules {
    match class {
        DeviceClass::AcceleratorTray => &GPU_TRAY_PSU_RULES,
        DeviceClass::ComputeTray => &CPU_TRAY_PSU_RULES,
    }
}

pub fn fan_rules() -> &'static NameRules {
    &FAN_RULES
}

pub fn temperature_rules() -> &'static NameRules {
    &TEMPERATURE_RULES
}
