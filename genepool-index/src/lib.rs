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

//! GenePool Index Layer
//!
//! Partitioning of a [`GeneStore`](genepool_core::GeneStore) into creatures
//! and k-NN classification against them.
//!
//! ## Components
//!
//! - **Selection** (`select`): in-place quickselect (`nth_element`) with
//!   median-of-three pivots. Used to pull the `k` nearest distances without a
//!   full sort.
//!
//! - **Creatures** (`creature`): bounded index sets, one per ensemble member.
//!
//! - **Usage ledger** (`ledger`): lock-free per-gene counters enforcing even
//!   usage while creatures are filled concurrently.
//!
//! - **Partitioner** (`partition`): coverage-first, seeded randomized fill.
//!
//! - **k-NN** (`knn`): distance computation, selection and plurality vote.
//!
//! ## Example
//!
//! ```rust
//! use genepool_core::GeneStore;
//! use genepool_index::{Creature, KnnClassifier, PartitionConfig, Partitioner};
//!
//! let mut store = GeneStore::new(1).unwrap();
//! for (x, label) in [(0.0, "A"), (0.2, "A"), (5.0, "B"), (5.1, "B")] {
//!     store.push(&[x], label).unwrap();
//! }
//!
//! let mut creatures = Creature::uniform(2, 3);
//! let stats = Partitioner::new(PartitionConfig::default())
//!     .fill_from_store(&mut creatures, &store)
//!     .unwrap();
//! assert_eq!(stats.total_slots, 6);
//!
//! let everyone = Creature::from_members(9, vec![0, 1, 2, 3], &store).unwrap();
//! let knn = KnnClassifier::new(&store, 3).unwrap();
//! let p = knn.classify(&everyone, &[0.1]).unwrap();
//! assert_eq!(p.label.as_str(), "A");
//! ```

pub mod creature;
pub mod distance;
pub mod knn;
pub mod ledger;
pub mod partition;
pub mod select;

pub use creature::Creature;
pub use distance::{euclidean, squared_euclidean};
pub use knn::{DistanceEntry, KnnClassifier, Prediction};
pub use ledger::{Claim, UsageLedger};
pub use partition::{
    PartitionConfig, PartitionStats, Partitioner, SHUFFLE_STREAM, creature_stream,
};
pub use select::{nth_element, nth_element_by, nth_element_by_key, select_smallest_by_key};
