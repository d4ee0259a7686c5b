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

//! Gene Usage Ledger
//!
//! Counts how many creature slots reference each gene while creatures are
//! being filled, and enforces the even-usage rule.
//!
//! ## Rule
//!
//! Let `level = floor(total_claims / num_genes)`. A gene may take one more
//! slot only if its usage after the claim is at most `level + 1`, i.e. its
//! current usage is `<= level`.
//!
//! Every claim lifts a gene to at most `level + 1`, and `level` only moves up
//! once every gene has reached it, so at any moment all usages sit in
//! `[level, level + 1]` (after the even-fill pass has given every gene one
//! slot).
//!
//! ## Concurrency
//!
//! The check and the increment are a single compare-and-swap on the gene's
//! counter. The running total is bumped after a successful swap, so readers
//! may see a total that lags the counters. A lagging total only makes the
//! rule stricter, never looser, and a blocked claimer simply probes on.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Outcome of a probing claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Gene that took the slot
    pub index: usize,
    /// Candidates rejected before `index` was accepted
    pub probes: usize,
}

/// Per-gene atomic usage counters.
pub struct UsageLedger {
    counts: Vec<AtomicU32>,
    total: AtomicU64,
}

impl UsageLedger {
    pub fn new(num_genes: usize) -> Self {
        Self {
            counts: (0..num_genes).map(|_| AtomicU32::new(0)).collect(),
            total: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Slots currently referencing gene `index`.
    #[inline]
    pub fn usage(&self, index: usize) -> u32 {
        self.counts[index].load(Ordering::Acquire)
    }

    /// Claims recorded so far.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Running average usage, rounded down.
    #[inline]
    pub fn level(&self) -> u32 {
        if self.counts.is_empty() {
            return 0;
        }
        (self.total() / self.counts.len() as u64) as u32
    }

    /// Record a slot for `index` without checking the rule.
    ///
    /// Used by the even-fill pass, which hands every gene exactly one slot.
    #[inline]
    pub fn record(&self, index: usize) {
        self.counts[index].fetch_add(1, Ordering::AcqRel);
        self.total.fetch_add(1, Ordering::AcqRel);
    }

    /// Atomically take one slot for `index` if the rule allows it.
    pub fn try_claim(&self, index: usize) -> bool {
        let counter = &self.counts[index];
        let mut current = counter.load(Ordering::Acquire);
        loop {
            if current > self.level() {
                return false;
            }
            match counter.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.total.fetch_add(1, Ordering::AcqRel);
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Claim `start`, or the next eligible gene after it with wraparound.
    ///
    /// Some gene is always eligible (the least used one sits at or below the
    /// level), so this returns once the total catches up with concurrent
    /// claimers.
    ///
    /// # Panics
    ///
    /// Panics if the ledger tracks no genes.
    pub fn claim_from(&self, start: usize) -> Claim {
        let n = self.counts.len();
        assert!(n > 0, "claim_from on an empty ledger");

        let mut probes = 0;
        let mut index = start % n;
        loop {
            if self.try_claim(index) {
                return Claim { index, probes };
            }
            probes += 1;
            index += 1;
            if index == n {
                index = 0;
            }
            if probes % n == 0 {
                std::hint::spin_loop();
            }
        }
    }

    /// Copy of every counter.
    pub fn snapshot(&self) -> Vec<u32> {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::Acquire))
            .collect()
    }

    /// Smallest and largest usage, or `(0, 0)` when empty.
    pub fn spread(&self) -> (u32, u32) {
        let mut min = u32::MAX;
        let mut max = 0;
        for c in &self.counts {
            let v = c.load(Ordering::Acquire);
            min = min.min(v);
            max = max.max(v);
        }
        if self.counts.is_empty() { (0, 0) } else { (min, max) }
    }
}
