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

//! Selection and k-NN integration tests
//!
//! Checks `nth_element` against a full sort and runs the classifier over
//! partitioned creatures built from clustered data.

use genepool_core::GeneStore;
use genepool_index::{
    Creature, KnnClassifier, PartitionConfig, Partitioner, nth_element, nth_element_by_key,
};
use proptest::prelude::*;
use proptest::test_runner::TestRunner;

/// Deterministic clustered points: cluster `c` sits around `(10c, 10c)`.
fn clustered_store(per_cluster: usize, labels: &[&str]) -> GeneStore {
    let mut store = GeneStore::new(2).unwrap();
    for (c, label) in labels.iter().enumerate() {
        let center = 10.0 * c as f32;
        for i in 0..per_cluster {
            let jitter = ((i * 7 + c * 3) as f32).sin() * 0.8;
            store
                .push(&[center + jitter, center - jitter], label)
                .unwrap();
        }
    }
    store
}

#[test]
fn test_nth_element_matches_sort() {
    let mut runner = TestRunner::new(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    });
    let strategy = prop::collection::vec(-1000.0f64..1000.0, 1..200)
        .prop_flat_map(|v| {
            let n = v.len();
            (Just(v), 0..n)
        });

    runner
        .run(&strategy, |(values, k)| {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));

            let mut v = values.clone();
            nth_element(&mut v, k);
            prop_assert_eq!(v[k], sorted[k]);
            prop_assert!(v[..k].iter().all(|x| *x <= v[k]));
            prop_assert!(v[k + 1..].iter().all(|x| *x >= v[k]));

            let mut remaining = v.clone();
            remaining.sort_by(|a, b| a.total_cmp(b));
            prop_assert_eq!(remaining, sorted);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_nth_element_on_adversarial_orders() {
    let n = 10_000;
    let ascending: Vec<u32> = (0..n).collect();
    let descending: Vec<u32> = (0..n).rev().collect();
    let constant = vec![5u32; n as usize];

    for input in [ascending, descending, constant] {
        for k in [0, 1, n as usize / 2, n as usize - 1] {
            let mut v = input.clone();
            nth_element(&mut v, k);
            let mut sorted = input.clone();
            sorted.sort_unstable();
            assert_eq!(v[k], sorted[k]);
        }
    }
}

#[test]
fn test_nth_element_by_key_on_records() {
    let mut records: Vec<(f64, usize)> = vec![(3.5, 0), (0.25, 1), (9.0, 2), (1.0, 3), (0.25, 4)];
    nth_element_by_key(&mut records, 1, |r| r.0);
    assert_eq!(records[1].0, 0.25);
    assert!(records[2..].iter().all(|r| r.0 >= 0.25));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_nth_element_rank_out_of_bounds() {
    let mut v = vec![1, 2, 3];
    nth_element(&mut v, 3);
}

#[test]
fn test_ensemble_on_clustered_data() {
    let labels = ["setosa", "versicolor", "virginica"];
    let store = clustered_store(40, &labels);
    let mut creatures = Creature::uniform(6, 30);
    Partitioner::new(PartitionConfig::default())
        .fill_from_store(&mut creatures, &store)
        .unwrap();

    let knn = KnnClassifier::new(&store, 5).unwrap();
    let queries: Vec<Vec<f32>> = (0..labels.len())
        .map(|c| vec![10.0 * c as f32 + 0.1, 10.0 * c as f32 - 0.1])
        .collect();

    for creature in &creatures {
        let predictions = knn.classify_batch(creature, &queries).unwrap();
        assert_eq!(predictions.len(), queries.len());
        for p in &predictions {
            assert!(p.votes >= 1 && p.votes <= 5);
            assert!(labels.contains(&p.label.as_str()));
        }
    }

    // Each creature holds 30 of 120 genes, so every cluster is represented
    // somewhere; the whole store classifies every cluster correctly.
    let everyone = Creature::from_members(99, (0..store.len()).collect(), &store).unwrap();
    let predictions = knn.classify_batch(&everyone, &queries).unwrap();
    for (p, expected) in predictions.iter().zip(labels) {
        assert_eq!(p.label.as_str(), expected);
        assert_eq!(p.votes, 5);
    }
}

#[test]
fn test_neighbors_sorted_and_bounded() {
    let store = clustered_store(20, &["a", "b"]);
    let everyone = Creature::from_members(0, (0..store.len()).collect(), &store).unwrap();
    let knn = KnnClassifier::new(&store, 7).unwrap();

    let neighbors = knn.neighbors(&everyone, &[10.0, 10.0]).unwrap();
    assert_eq!(neighbors.len(), 7);
    assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert!(neighbors.iter().all(|e| e.source_index >= 20));
}
