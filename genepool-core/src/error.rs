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

//! Error types for GenePool
//!
//! Every error is fatal for the run that raised it: the dataset and the
//! configuration are fixed inputs, so there is nothing to retry. Each variant
//! carries the operation and the offending value.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenePoolError {
    #[error("Allocation failed in {operation}: could not reserve {requested} elements")]
    Allocation {
        operation: &'static str,
        requested: usize,
    },

    #[error("Ingestion error in {origin} at line {line}: {reason}")]
    Ingestion {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error("Label too long: '{label}' is {len} bytes, maximum is {max}")]
    LabelTooLong { label: String, len: usize, max: usize },

    #[error(
        "Not enough creatures to hold all genes: {creatures} creatures provide {available} slots, {required} genes need coverage"
    )]
    Capacity {
        creatures: usize,
        available: usize,
        required: usize,
    },

    #[error("Configuration error in {operation}: {reason}")]
    Configuration {
        operation: &'static str,
        reason: String,
    },
}

impl GenePoolError {
    pub fn config(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            operation,
            reason: reason.into(),
        }
    }

    pub fn ingestion(origin: &Path, line: usize, reason: impl Into<String>) -> Self {
        Self::Ingestion {
            origin: origin.display().to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Allocation { .. } => "allocation",
            Self::Ingestion { .. } => "ingestion",
            Self::LabelTooLong { .. } => "label_too_long",
            Self::Capacity { .. } => "capacity",
            Self::Configuration { .. } => "configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenePoolError>;
