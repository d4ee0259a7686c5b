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

//! File-level tests for ingestion and dataset preparation

use std::fs;
use std::path::{Path, PathBuf};

use genepool_index::{Creature, PartitionConfig, Partitioner};
use genepool_tools::{
    GROUP_COLUMN, IngestOptions, ToolsError, assign_groups, count_attributes, evaluate,
    header_len, ingest_csv, read_attributes, split_dataset,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Headed dataset with the label column in the middle.
fn iris_like(rows_per_class: usize) -> String {
    let mut text = String::from("sepal,species,petal\n");
    for (c, name) in ["setosa", "versicolor", "virginica"].iter().enumerate() {
        for i in 0..rows_per_class {
            let base = 10.0 * c as f32;
            text.push_str(&format!("{},{},{}\n", base + i as f32 * 0.01, name, base - i as f32 * 0.01));
        }
    }
    text
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_ingest_file_with_header() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "train.csv", "label,x,y\r\nA,0,0\r\nA,0,1\r\nB,5,5\r\n");

    let opts = IngestOptions {
        has_header: true,
        ..IngestOptions::new(2)
    };
    let store = ingest_csv(&path, &opts).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(2).unwrap().label, "B");
    assert_eq!(store.features(1), Some(&[0.0f32, 1.0][..]));
}

#[test]
fn test_missing_file_is_ingestion_error() {
    let dir = TempDir::new().unwrap();
    let err = ingest_csv(dir.path().join("absent.csv"), &IngestOptions::new(2)).unwrap_err();
    assert_eq!(err.kind(), "ingestion");
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_attribute_header() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "data.csv", "label,a,b,c\nX,1,2,3\n");

    assert_eq!(read_attributes(&path, 1024).unwrap(), vec!["label", "a", "b", "c"]);
    assert_eq!(count_attributes(&path, 1024).unwrap(), 4);
    assert_eq!(header_len(&path, 1024).unwrap(), "label,a,b,c\n".len());

    let empty = write(&dir, "empty.csv", "");
    assert!(read_attributes(&empty, 1024).is_err());
    assert!(header_len(&empty, 1024).is_err());

    let single = write(&dir, "single.csv", "label\nX\n");
    assert!(count_attributes(&single, 1024).is_err());

    assert!(read_attributes(&path, 4).is_err());
    assert!(header_len(&path, 4).is_err());
}

#[test]
fn test_split_is_stratified_and_seeded() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "iris.csv", &iris_like(20));

    let summary = split_dataset(&input, 0.1, 42, None).unwrap();
    assert_eq!(summary.train_rows, 54);
    assert_eq!(summary.test_rows, 6);
    assert_eq!(summary.train_path, dir.path().join("train_iris.csv"));

    let test = read_lines(&summary.test_path);
    assert_eq!(test[0], "species,sepal,petal");
    for class in ["setosa", "versicolor", "virginica"] {
        let n = test.iter().filter(|l| l.starts_with(class)).count();
        assert_eq!(n, 2, "class {class}");
    }

    let first_train = read_lines(&summary.train_path);
    let out = TempDir::new().unwrap();
    let again = split_dataset(&input, 0.1, 42, Some(out.path())).unwrap();
    assert_eq!(read_lines(&again.train_path), first_train);
}

#[test]
fn test_split_requires_label_column() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "plain.csv", "a,b\n1,2\n");
    match split_dataset(&input, 0.1, 42, None) {
        Err(ToolsError::NoLabelColumn { path, .. }) => assert_eq!(path, input),
        other => panic!("expected NoLabelColumn, got {other:?}"),
    }
}

#[test]
fn test_assign_groups() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "iris.csv", &iris_like(5));

    let summary = assign_groups(&input, 4, 7, None).unwrap();
    assert_eq!(summary.rows, 15);
    let lines = read_lines(&summary.output_path);
    assert_eq!(lines[0], format!("{GROUP_COLUMN},species,sepal,petal"));

    let groups: Vec<usize> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert!(groups.windows(2).all(|w| w[0] <= w[1]));
    for g in 0..4 {
        let n = groups.iter().filter(|&&x| x == g).count();
        assert!(n == 3 || n == 4, "group {g} has {n} rows");
    }

    assert!(assign_groups(&input, 1, 7, None).is_err());
    assert!(assign_groups(&input, 16, 7, None).is_err());
}

#[test]
fn test_prepared_split_runs_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "iris.csv", &iris_like(30));
    let split = split_dataset(&input, 0.1, 42, None).unwrap();

    let opts = IngestOptions {
        has_header: true,
        ..IngestOptions::new(2)
    };
    let train = ingest_csv(&split.train_path, &opts).unwrap();
    let test = ingest_csv(&split.test_path, &opts).unwrap();
    assert_eq!(train.len() + test.len(), 90);

    let mut creatures = Creature::uniform(4, 30);
    Partitioner::new(PartitionConfig::default())
        .fill_from_store(&mut creatures, &train)
        .unwrap();

    let report = evaluate(&train, &test, &creatures, 3).unwrap();
    assert_eq!(report.creatures.len(), 4);
    assert_eq!(report.test_genes, test.len());
    assert!(report.ensemble_accuracy() > 0.9);
}
