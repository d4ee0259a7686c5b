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

//! GenePool Tools
//!
//! Library side of the `genepool` CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Stratified 90/10 split: writes train_iris.csv and test_iris.csv
//! genepool prep split iris.csv --seed 42
//!
//! # Partition the training set into 8 creatures and evaluate with k = 5
//! genepool run --train train_iris.csv --test test_iris.csv \
//!     --header --creatures 8 --capacity 40 -k 5
//!
//! # Same run from a JSON configuration
//! genepool run --train train_iris.csv --test test_iris.csv --config run.json
//!
//! # Inspect the attribute header
//! genepool attributes iris.csv
//! ```

pub mod error;
pub mod io;
pub mod prep;
pub mod report;

pub use error::ToolsError;
pub use io::{IngestOptions, count_attributes, header_len, ingest_csv, ingest_reader, read_attributes};
pub use prep::{
    AssignSummary, DEFAULT_TEST_FRACTION, GROUP_COLUMN, LABEL_COLUMNS, SplitSummary, Table,
    assign_groups, find_label_column, split_dataset,
};
pub use report::{CreatureScore, EvaluationReport, evaluate, plurality};
