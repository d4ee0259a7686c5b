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

//! Dataset preparation
//!
//! Turns a headed CSV file into the `label,features...` layout the ingester
//! reads. The label column is found by name and moved first.
//!
//! - [`split_dataset`]: seeded, stratified train/test split
//! - [`assign_groups`]: seeded shuffle, then a leading `__gene__` group column

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::{Result, ToolsError};

/// Header names recognized as the label column, in priority order.
pub const LABEL_COLUMNS: [&str; 10] = [
    "label", "labels", "class", "classes", "Label", "Labels", "Class", "Classes", "species",
    "Species",
];

/// Name of the group column written by [`assign_groups`].
pub const GROUP_COLUMN: &str = "__gene__";

/// Share of each class held out by default.
pub const DEFAULT_TEST_FRACTION: f64 = 0.1;

/// Index of the label column, using the first name of [`LABEL_COLUMNS`]
/// present in `headers`.
pub fn find_label_column(headers: &StringRecord) -> Option<usize> {
    LABEL_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h.trim() == *name))
}

/// A CSV table with its label column already moved first.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Read `path` and move its label column to the front.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(File::open(path)?);
        let headers = reader.headers()?.clone();
        let label_col = find_label_column(&headers).ok_or_else(|| ToolsError::NoLabelColumn {
            path: path.to_path_buf(),
            expected: LABEL_COLUMNS.join(", "),
        })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(label_first(&record?, label_col));
        }
        Ok(Self {
            headers: label_first(&headers, label_col),
            rows,
        })
    }

    #[inline]
    pub fn label(&self, row: usize) -> &str {
        self.rows[row].get(0).unwrap_or_default()
    }

    fn write(&self, path: &Path, rows: &[usize]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record(&self.headers)?;
        for &i in rows {
            writer.write_record(&self.rows[i])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn label_first(record: &StringRecord, label_col: usize) -> StringRecord {
    let mut out = StringRecord::with_capacity(record.as_slice().len(), record.len());
    out.push_field(record.get(label_col).unwrap_or_default());
    for (i, field) in record.iter().enumerate() {
        if i != label_col {
            out.push_field(field);
        }
    }
    out
}

/// `<dir>/<prefix><file name>`; `dir` defaults to the input's directory.
fn prefixed_path(input: &Path, prefix: &str, out_dir: Option<&Path>) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| ToolsError::InvalidInput(format!("{} has no file name", input.display())))?;
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    Ok(dir.join(format!("{}{}", prefix, name.to_string_lossy())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Rows held out per class: `round(len * fraction)`, leaving at least one
/// training row whenever the class has more than one.
fn test_share(len: usize, fraction: f64) -> usize {
    let n = (len as f64 * fraction).round() as usize;
    if len > 1 { n.min(len - 1) } else { 0 }
}

/// Stratified split of `input` into `train_<name>` and `test_<name>`.
pub fn split_dataset(
    input: &Path,
    test_fraction: f64,
    seed: u64,
    out_dir: Option<&Path>,
) -> Result<SplitSummary> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(ToolsError::InvalidInput(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }
    let table = Table::read(input)?;

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for i in 0..table.rows.len() {
        by_class.entry(table.label(i)).or_default().push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(table.rows.len());
    let mut test = Vec::new();
    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let held = test_share(rows.len(), test_fraction);
        test.extend_from_slice(&rows[..held]);
        train.extend_from_slice(&rows[held..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    let summary = SplitSummary {
        train_path: prefixed_path(input, "train_", out_dir)?,
        test_path: prefixed_path(input, "test_", out_dir)?,
        train_rows: train.len(),
        test_rows: test.len(),
    };
    table.write(&summary.train_path, &train)?;
    table.write(&summary.test_path, &test)?;

    info!(
        classes = by_class.len(),
        train = summary.train_rows,
        test = summary.test_rows,
        "Split dataset"
    );
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub groups: usize,
}

/// Shuffle `input`, tag row `i` with group `i % groups`, and write the rows
/// grouped to `preprocessed_<name>`.
///
/// `groups` must be in `[2, rows]`.
pub fn assign_groups(
    input: &Path,
    groups: usize,
    seed: u64,
    out_dir: Option<&Path>,
) -> Result<AssignSummary> {
    let table = Table::read(input)?;
    let rows = table.rows.len();
    if rows == 0 {
        return Err(ToolsError::InvalidInput(format!(
            "{} has no data rows",
            input.display()
        )));
    }
    if groups < 2 || groups > rows {
        return Err(ToolsError::InvalidInput(format!(
            "number of groups must be between 2 and {rows}, got {groups}"
        )));
    }

    let mut order: Vec<usize> = (0..rows).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

    // Stable sort keeps the shuffled order within a group
    let mut tagged: Vec<(usize, usize)> = order
        .into_iter()
        .enumerate()
        .map(|(i, row)| (i % groups, row))
        .collect();
    tagged.sort_by_key(|&(group, _)| group);

    let output_path = prefixed_path(input, "preprocessed_", out_dir)?;
    let mut writer = csv::Writer::from_writer(File::create(&output_path)?);
    let mut header = StringRecord::new();
    header.push_field(GROUP_COLUMN);
    header.extend(table.headers.iter());
    writer.write_record(&header)?;

    let mut record = StringRecord::new();
    for (group, row) in tagged {
        record.clear();
        record.push_field(&group.to_string());
        record.extend(table.rows[row].iter());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(rows, groups, path = %output_path.display(), "Assigned groups");
    Ok(AssignSummary {
        output_path,
        rows,
        groups,
    })
}
