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

//! Creatures
//!
//! A creature is a bounded set of gene indices that serves as one k-NN
//! reference set. It holds indices into a [`GeneStore`], never gene data.
//!
//! Lifecycle: created empty with a fixed capacity, filled exactly once by the
//! partitioner, read-only afterwards.

use genepool_core::{GenePoolError, GeneStore, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    ordinal: usize,
    capacity: usize,
    members: Vec<usize>,
}

impl Creature {
    /// Empty creature that will hold `capacity` gene indices.
    pub fn with_capacity(ordinal: usize, capacity: usize) -> Self {
        Self {
            ordinal,
            capacity,
            members: Vec::with_capacity(capacity),
        }
    }

    /// `count` empty creatures of equal capacity, ordinals `0..count`.
    pub fn uniform(count: usize, capacity: usize) -> Vec<Self> {
        (0..count).map(|i| Self::with_capacity(i, capacity)).collect()
    }

    /// Creature built from explicit members, already filled.
    ///
    /// Every member must index a gene of `store`.
    pub fn from_members(ordinal: usize, members: Vec<usize>, store: &GeneStore) -> Result<Self> {
        if let Some(&bad) = members.iter().find(|&&m| m >= store.len()) {
            return Err(GenePoolError::config(
                "creature.from_members",
                format!(
                    "member {} out of range for {} genes in creature {}",
                    bad,
                    store.len(),
                    ordinal
                ),
            ));
        }
        Ok(Self {
            ordinal,
            capacity: members.len(),
            members,
        })
    }

    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gene indices held by this creature; empty until filled.
    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True once every slot is populated.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.capacity > 0 && self.members.len() == self.capacity
    }

    /// Free slots left.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.capacity - self.members.len()
    }

    #[inline]
    pub(crate) fn push_member(&mut self, index: usize) {
        debug_assert!(self.members.len() < self.capacity, "creature overfilled");
        self.members.push(index);
    }
}
