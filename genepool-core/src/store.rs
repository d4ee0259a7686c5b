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

//! Arena-Based Gene Store
//!
//! Owns every gene of a run in a single contiguous feature buffer.
//!
//! ## Layout
//!
//! - `features`: `len * num_features` floats, gene `i` at
//!   `[i * num_features, (i + 1) * num_features)`
//! - `labels`: one [`LabelId`] per gene, resolved through the [`LabelTable`]
//!
//! Creatures never hold gene data, only indices into this store, so the store
//! is the single owner of vector memory. Genes are append-only: once pushed,
//! neither features nor label can change.

use crate::error::{GenePoolError, Result};
use crate::gene::{Gene, LabelId, LabelTable};
use tracing::{debug, warn};

/// Append-only arena of labeled feature vectors.
#[derive(Debug, Clone)]
pub struct GeneStore {
    /// Contiguous feature storage
    features: Vec<f32>,
    /// Label of each gene
    labels: Vec<LabelId>,
    table: LabelTable,
    /// Features per gene, fixed for the lifetime of the store
    num_features: usize,
}

impl GeneStore {
    /// Create an empty store for genes of `num_features` features.
    pub fn new(num_features: usize) -> Result<Self> {
        if num_features == 0 {
            return Err(GenePoolError::config(
                "gene_store",
                "num_features must be positive, got 0",
            ));
        }
        Ok(Self {
            features: Vec::new(),
            labels: Vec::new(),
            table: LabelTable::new(),
            num_features,
        })
    }

    /// Create a store with room for `count` genes.
    ///
    /// Fails with [`GenePoolError::Allocation`] when the backing buffer cannot
    /// be reserved.
    pub fn with_capacity(count: usize, num_features: usize) -> Result<Self> {
        let mut store = Self::new(num_features)?;
        store.reserve(count)?;
        Ok(store)
    }

    /// Reserve room for `additional` more genes.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let floats = additional
            .checked_mul(self.num_features)
            .ok_or(GenePoolError::Allocation {
                operation: "gene_store.reserve",
                requested: usize::MAX,
            })?;
        self.features
            .try_reserve_exact(floats)
            .map_err(|_| GenePoolError::Allocation {
                operation: "gene_store.reserve",
                requested: floats,
            })?;
        self.labels
            .try_reserve_exact(additional)
            .map_err(|_| GenePoolError::Allocation {
                operation: "gene_store.reserve",
                requested: additional,
            })?;
        debug!(
            genes = additional,
            bytes = floats * std::mem::size_of::<f32>(),
            "Reserved gene storage"
        );
        Ok(())
    }

    /// Append one gene and return its index.
    pub fn push(&mut self, features: &[f32], label: &str) -> Result<usize> {
        if features.len() != self.num_features {
            return Err(GenePoolError::config(
                "gene_store.push",
                format!(
                    "gene {} has {} features, store expects {}",
                    self.labels.len(),
                    features.len(),
                    self.num_features
                ),
            ));
        }
        let label_id = self.table.intern(label)?;
        let index = self.labels.len();
        self.features.extend_from_slice(features);
        self.labels.push(label_id);
        Ok(index)
    }

    /// Append many genes at once.
    ///
    /// All-or-nothing: if any gene is rejected the store is rolled back to
    /// its previous contents and the error is returned.
    pub fn extend<I, F, L>(&mut self, genes: I) -> Result<usize>
    where
        I: IntoIterator<Item = (F, L)>,
        F: AsRef<[f32]>,
        L: AsRef<str>,
    {
        let start_len = self.labels.len();
        let start_labels = self.table.len();

        for (features, label) in genes {
            if let Err(err) = self.push(features.as_ref(), label.as_ref()) {
                warn!(
                    rolled_back = self.labels.len() - start_len,
                    "Batch insert rejected, store rolled back"
                );
                self.features.truncate(start_len * self.num_features);
                self.labels.truncate(start_len);
                self.table.truncate(start_labels);
                return Err(err);
            }
        }
        Ok(self.labels.len() - start_len)
    }

    /// Number of genes stored
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Borrow gene `index`, or `None` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Gene<'_>> {
        let label_id = *self.labels.get(index)?;
        let start = index * self.num_features;
        Some(Gene {
            index,
            features: &self.features[start..start + self.num_features],
            label: self.table.name(label_id)?,
            label_id,
        })
    }

    /// Borrow gene `index`, failing with a configuration error when out of range.
    pub fn gene(&self, index: usize) -> Result<Gene<'_>> {
        self.get(index).ok_or_else(|| {
            GenePoolError::config(
                "gene_store.gene",
                format!("gene index {} out of range for {} genes", index, self.len()),
            )
        })
    }

    /// Feature slice of gene `index`.
    #[inline]
    pub fn features(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.num_features;
        Some(&self.features[start..start + self.num_features])
    }

    #[inline]
    pub fn label_id(&self, index: usize) -> Option<LabelId> {
        self.labels.get(index).copied()
    }

    pub fn label_name(&self, id: LabelId) -> Option<&str> {
        self.table.name(id)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.table
    }

    pub fn iter(&self) -> impl Iterator<Item = Gene<'_>> {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Memory used by features and label ids, in bytes
    pub fn memory_usage(&self) -> usize {
        self.features.capacity() * std::mem::size_of::<f32>()
            + self.labels.capacity() * std::mem::size_of::<LabelId>()
    }
}
