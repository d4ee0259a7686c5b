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

//! GenePool Core
//!
//! Data model shared by the GenePool crates.
//!
//! # Core Components
//!
//! - **Gene Store** (`store`): append-only arena owning every labeled feature
//!   vector of a run. Creatures refer to genes by index only.
//! - **Genes and labels** (`gene`): borrowed gene views and the label
//!   interning table.
//! - **Run configuration** (`config`): serde-loadable settings plus validation.
//! - **Errors** (`error`): the fatal error taxonomy of a batch run.
//!
//! # Example
//!
//! ```rust
//! use genepool_core::GeneStore;
//!
//! let mut store = GeneStore::new(2).unwrap();
//! store.push(&[0.0, 1.0], "A").unwrap();
//! store.push(&[5.0, 5.0], "B").unwrap();
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.get(1).unwrap().label, "B");
//! ```

pub mod config;
pub mod error;
pub mod gene;
pub mod store;

pub use config::{DEFAULT_MAX_LINE_BYTES, PartitionSchedule, RunConfig};
pub use error::{GenePoolError, Result};
pub use gene::{Gene, Label, LabelId, LabelTable, MAX_LABEL_LEN, parse_label};
pub use store::GeneStore;

/// Crate version
pub const GENEPOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
