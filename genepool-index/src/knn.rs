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

//! k-Nearest-Neighbor Classification
//!
//! A creature acts as the reference set. For a query vector the classifier:
//!
//! 1. computes the Euclidean distance to every gene the creature references,
//! 2. runs [`nth_element_by`] at rank `k - 1` so the `k` nearest entries
//!    form the leading group (the rest stay unsorted),
//! 3. votes over the labels of that group.
//!
//! ## Vote
//!
//! - most votes wins
//! - tied labels: smallest total distance of their voters wins
//! - still tied: the label met first wins, walking the `k` winners in
//!   `(distance, source_index)` order
//!
//! The store and the creatures are only read, so any number of queries can
//! be classified in parallel.

use std::cmp::Ordering;

use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

use genepool_core::{GenePoolError, GeneStore, Label, LabelId, Result};

use crate::creature::Creature;
use crate::distance::euclidean;
use crate::select::nth_element_by;

/// Distance from the query to one reference gene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEntry {
    pub distance: f64,
    /// Store index of the reference gene
    pub source_index: usize,
}

impl DistanceEntry {
    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.source_index.cmp(&other.source_index))
    }
}

/// Outcome of one classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub label_id: LabelId,
    /// Neighbors that voted for `label`
    pub votes: usize,
    /// Summed distance of those neighbors
    pub total_distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    label_id: LabelId,
    votes: usize,
    total_distance: f64,
}

pub struct KnnClassifier<'s> {
    store: &'s GeneStore,
    k: usize,
}

impl<'s> KnnClassifier<'s> {
    pub fn new(store: &'s GeneStore, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(GenePoolError::config(
                "knn",
                "k must be positive, got 0",
            ));
        }
        Ok(Self { store, k })
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn store(&self) -> &'s GeneStore {
        self.store
    }

    /// The `k` nearest reference entries, nearest first.
    pub fn neighbors(&self, creature: &Creature, query: &[f32]) -> Result<Vec<DistanceEntry>> {
        let mut entries = Vec::with_capacity(creature.len());
        self.nearest_into(creature, query, &mut entries)?;
        entries.truncate(self.k);
        Ok(entries)
    }

    /// Predict the label of `query` from `creature`.
    pub fn classify(&self, creature: &Creature, query: &[f32]) -> Result<Prediction> {
        let mut entries = Vec::with_capacity(creature.len());
        self.classify_with(creature, query, &mut entries)
    }

    /// Classify many raw query vectors in parallel.
    pub fn classify_batch<Q>(&self, creature: &Creature, queries: &[Q]) -> Result<Vec<Prediction>>
    where
        Q: AsRef<[f32]> + Sync,
    {
        self.check_creature(creature)?;
        debug!(
            creature = creature.ordinal(),
            queries = queries.len(),
            k = self.k,
            "Classifying batch"
        );
        queries
            .par_iter()
            .map_init(
                || Vec::with_capacity(creature.len()),
                |entries, q| self.classify_with(creature, q.as_ref(), entries),
            )
            .collect()
    }

    /// Classify every gene referenced by `queries` against `reference`.
    pub fn classify_members(
        &self,
        reference: &Creature,
        queries: &Creature,
    ) -> Result<Vec<Prediction>> {
        self.check_creature(reference)?;
        queries
            .members()
            .par_iter()
            .map_init(
                || Vec::with_capacity(reference.len()),
                |entries, &member| {
                    let query = self.member_features(member)?;
                    self.classify_with(reference, query, entries)
                },
            )
            .collect()
    }

    fn classify_with(
        &self,
        creature: &Creature,
        query: &[f32],
        entries: &mut Vec<DistanceEntry>,
    ) -> Result<Prediction> {
        self.nearest_into(creature, query, entries)?;
        self.vote(&entries[..self.k])
    }

    /// Fill `entries` with distances and order the `k` nearest at the front.
    fn nearest_into(
        &self,
        creature: &Creature,
        query: &[f32],
        entries: &mut Vec<DistanceEntry>,
    ) -> Result<()> {
        self.check_creature(creature)?;
        if query.len() != self.store.num_features() {
            return Err(GenePoolError::config(
                "knn.classify",
                format!(
                    "query has {} features, store expects {}",
                    query.len(),
                    self.store.num_features()
                ),
            ));
        }

        entries.clear();
        for &member in creature.members() {
            let features = self.member_features(member)?;
            entries.push(DistanceEntry {
                distance: euclidean(query, features),
                source_index: member,
            });
        }

        // Ranking on (distance, source_index) keeps boundary ties reproducible
        if self.k < entries.len() {
            nth_element_by(entries, self.k - 1, DistanceEntry::order);
        }
        entries[..self.k].sort_unstable_by(DistanceEntry::order);
        Ok(())
    }

    fn vote(&self, nearest: &[DistanceEntry]) -> Result<Prediction> {
        let mut tallies: SmallVec<[Tally; 8]> = SmallVec::new();
        for entry in nearest {
            let label_id = self.store.label_id(entry.source_index).ok_or_else(|| {
                GenePoolError::config(
                    "knn.vote",
                    format!("gene index {} has no label", entry.source_index),
                )
            })?;
            match tallies.iter_mut().find(|t| t.label_id == label_id) {
                Some(t) => {
                    t.votes += 1;
                    t.total_distance += entry.distance;
                }
                None => tallies.push(Tally {
                    label_id,
                    votes: 1,
                    total_distance: entry.distance,
                }),
            }
        }

        // Tallies are in first-seen order; only strictly better replaces
        let mut winner = tallies[0];
        for t in &tallies[1..] {
            let better = t.votes > winner.votes
                || (t.votes == winner.votes && t.total_distance < winner.total_distance);
            if better {
                winner = *t;
            }
        }

        let name = self.store.label_name(winner.label_id).unwrap_or_default();
        Ok(Prediction {
            label: Label::from(name).unwrap_or_default(),
            label_id: winner.label_id,
            votes: winner.votes,
            total_distance: winner.total_distance,
        })
    }

    fn check_creature(&self, creature: &Creature) -> Result<()> {
        if creature.is_empty() {
            return Err(GenePoolError::config(
                "knn.classify",
                format!("creature {} has no members", creature.ordinal()),
            ));
        }
        if self.k > creature.len() {
            return Err(GenePoolError::config(
                "knn.classify",
                format!(
                    "k = {} exceeds the {} members of creature {}",
                    self.k,
                    creature.len(),
                    creature.ordinal()
                ),
            ));
        }
        Ok(())
    }

    fn member_features(&self, member: usize) -> Result<&'s [f32]> {
        self.store.features(member).ok_or_else(|| {
            GenePoolError::config(
                "knn.classify",
                format!(
                    "member {} out of range for {} genes",
                    member,
                    self.store.len()
                ),
            )
        })
    }
}
