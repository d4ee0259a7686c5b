// SPDX-License-Identifier: AGPL-3.0-or-later
// GenePool - Partitioned k-NN Ensemble Classifier
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Run Configuration
//!
//! Everything a batch run needs besides the data itself: feature width,
//! creature layout, neighbor count, seed and ingestion limits. Loaded from
//! JSON or built in code, then validated before any work starts.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenePoolError, Result};
use crate::store::GeneStore;

/// Default read-buffer bound for one input line (32 KiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 32 * 1024;

/// How shards claim their randomized slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSchedule {
    /// Shards claim in ordinal order; identical seeds give identical shards.
    #[default]
    Ordered,
    /// Shards claim in parallel; placement may depend on interleaving.
    Concurrent,
}

/// Configuration of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Features per gene (excluding the label column)
    pub num_features: usize,

    /// Number of creatures (shards)
    #[serde(default = "default_num_creatures")]
    pub num_creatures: usize,

    /// Slots per creature
    pub creature_capacity: usize,

    /// Neighbors consulted per classification
    #[serde(default = "default_k")]
    pub k: usize,

    /// Run-wide seed for randomized placement
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub schedule: PartitionSchedule,

    /// Worker threads (0 = rayon default)
    #[serde(default)]
    pub threads: usize,

    /// Bound on a single input line, in bytes
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    /// Whether input files start with an attribute header line
    #[serde(default)]
    pub has_header: bool,
}

fn default_num_creatures() -> usize {
    8
}

fn default_k() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_features: 1,
            num_creatures: default_num_creatures(),
            creature_capacity: 1,
            k: default_k(),
            seed: default_seed(),
            schedule: PartitionSchedule::default(),
            threads: 0,
            max_line_bytes: default_max_line_bytes(),
            has_header: false,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GenePoolError::ingestion(path, 0, e.to_string()))?;
        Self::from_json_str(&text)
            .map_err(|e| GenePoolError::config("run_config.load", format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Total slots across all creatures.
    pub fn total_capacity(&self) -> usize {
        self.num_creatures.saturating_mul(self.creature_capacity)
    }

    /// Check the values that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("num_features", self.num_features),
            ("num_creatures", self.num_creatures),
            ("creature_capacity", self.creature_capacity),
            ("k", self.k),
            ("max_line_bytes", self.max_line_bytes),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(GenePoolError::config(
                    "run_config.validate",
                    format!("{name} must be positive, got 0"),
                ));
            }
        }
        if self.k > self.creature_capacity {
            return Err(GenePoolError::config(
                "run_config.validate",
                format!(
                    "k = {} exceeds creature_capacity = {}",
                    self.k, self.creature_capacity
                ),
            ));
        }
        Ok(())
    }

    /// Check the configuration against ingested data.
    pub fn validate_for(&self, store: &GeneStore) -> Result<()> {
        self.validate()?;
        if store.num_features() != self.num_features {
            return Err(GenePoolError::config(
                "run_config.validate_for",
                format!(
                    "configured num_features = {}, ingested data has {}",
                    self.num_features,
                    store.num_features()
                ),
            ));
        }
        if self.total_capacity() < store.len() {
            return Err(GenePoolError::Capacity {
                creatures: self.num_creatures,
                available: self.total_capacity(),
                required: store.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config() -> RunConfig {
        RunConfig {
            num_features: 2,
            num_creatures: 3,
            creature_capacity: 4,
            k: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(config().validate().is_ok());
        assert_eq!(config().total_capacity(), 12);
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let cfg = RunConfig { k: 0, ..config() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("k must be positive"));
    }

    #[test]
    fn test_validate_rejects_k_above_capacity() {
        let cfg = RunConfig { k: 5, ..config() };
        assert!(matches!(
            cfg.validate(),
            Err(GenePoolError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_for_store() {
        let mut store = GeneStore::new(3).unwrap();
        store.push(&[1.0, 2.0, 3.0], "A").unwrap();
        let err = config().validate_for(&store).unwrap_err();
        assert!(err.to_string().contains("num_features"));

        let mut store = GeneStore::new(2).unwrap();
        for i in 0..13 {
            store.push(&[i as f32, 0.0], "A").unwrap();
        }
        assert!(matches!(
            config().validate_for(&store),
            Err(GenePoolError::Capacity { required: 13, available: 12, .. })
        ));
    }

    #[test]
    fn test_json_defaults() {
        let cfg = RunConfig::from_json_str(r#"{"num_features": 784, "creature_capacity": 1000}"#)
            .unwrap();
        assert_eq!(cfg.num_features, 784);
        assert_eq!(cfg.k, 5);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.schedule, PartitionSchedule::Ordered);
        assert_eq!(cfg.max_line_bytes, DEFAULT_MAX_LINE_BYTES);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let cfg = RunConfig {
            schedule: PartitionSchedule::Concurrent,
            seed: 7,
            ..config()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&cfg).unwrap().as_bytes())
            .unwrap();

        let loaded = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_json_file_missing() {
        let err = RunConfig::from_json_file("/nonexistent/genepool.json").unwrap_err();
        assert!(matches!(err, GenePoolError::Ingestion { .. }));
    }
}
