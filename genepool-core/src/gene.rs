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

//! Genes and labels
//!
//! A gene is one labeled feature vector. Genes are not owned individually:
//! the [`GeneStore`](crate::store::GeneStore) keeps every feature in one
//! arena and hands out borrowed [`Gene`] views.
//!
//! Labels are short class names (at most [`MAX_LABEL_LEN`] bytes). They are
//! interned into a [`LabelTable`] so each gene only carries a 4-byte
//! [`LabelId`], and voting can count ids instead of comparing strings.

use std::collections::HashMap;
use std::fmt;

use arrayvec::ArrayString;

use crate::error::{GenePoolError, Result};

/// Longest label accepted, in bytes.
pub const MAX_LABEL_LEN: usize = 15;

/// Inline, fixed-capacity label storage.
pub type Label = ArrayString<MAX_LABEL_LEN>;

/// Validate and copy a label into inline storage.
pub fn parse_label(raw: &str) -> Result<Label> {
    Label::from(raw).map_err(|_| GenePoolError::LabelTooLong {
        label: raw.to_string(),
        len: raw.len(),
        max: MAX_LABEL_LEN,
    })
}

/// Dense id of an interned label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u32);

impl LabelId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Borrowed view of one gene in a store.
#[derive(Debug, Clone, Copy)]
pub struct Gene<'a> {
    /// Position of the gene in its store
    pub index: usize,
    pub features: &'a [f32],
    pub label: &'a str,
    pub label_id: LabelId,
}

impl Gene<'_> {
    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }
}

/// Interning table mapping label strings to dense ids.
///
/// Ids are assigned in first-seen order, so the table is deterministic for a
/// given ingestion order.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    names: Vec<Label>,
    ids: HashMap<Label, LabelId>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `raw`, interning it on first sight.
    pub fn intern(&mut self, raw: &str) -> Result<LabelId> {
        let label = parse_label(raw)?;
        if let Some(&id) = self.ids.get(&label) {
            return Ok(id);
        }
        let id = LabelId(self.names.len() as u32);
        self.names.push(label);
        self.ids.insert(label, id);
        Ok(id)
    }

    /// Look up an already interned label.
    pub fn lookup(&self, raw: &str) -> Option<LabelId> {
        let label = Label::from(raw).ok()?;
        self.ids.get(&label).copied()
    }

    pub fn name(&self, id: LabelId) -> Option<&str> {
        self.names.get(id.as_usize()).map(|l| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, l)| (LabelId(i as u32), l.as_str()))
    }

    /// Forget every label interned after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        for label in self.names.drain(len.min(self.names.len())..) {
            self.ids.remove(&label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_bounds() {
        assert_eq!(parse_label("seven").unwrap().as_str(), "seven");
        assert!(parse_label("exactly15bytes!").is_ok());

        match parse_label("sixteen-bytes-xx") {
            Err(GenePoolError::LabelTooLong { len, max, .. }) => {
                assert_eq!(len, 16);
                assert_eq!(max, MAX_LABEL_LEN);
            }
            other => panic!("expected LabelTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_intern_is_stable() {
        let mut table = LabelTable::new();
        let a = table.intern("A").unwrap();
        let b = table.intern("B").unwrap();
        assert_eq!(table.intern("A").unwrap(), a);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(b), Some("B"));
        assert_eq!(table.lookup("B"), Some(b));
        assert_eq!(table.lookup("C"), None);
    }

    #[test]
    fn test_truncate_forgets_labels() {
        let mut table = LabelTable::new();
        table.intern("keep").unwrap();
        table.intern("drop").unwrap();
        table.truncate(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("drop"), None);
        assert_eq!(table.intern("drop").unwrap(), LabelId(1));
    }
}
