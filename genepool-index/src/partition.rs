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

//! Creature Partitioning
//!
//! Distributes gene indices over a fixed set of creatures so that every gene
//! lands in at least one creature, usage stays even, and placement is random
//! but reproducible from a seed.
//!
//! ## Phases
//!
//! 1. **Validate**: non-empty creature list and store, distinct ordinals, no
//!    zero-capacity or already-filled creature, and
//!    `sum(capacity) >= num_genes`. Nothing is written on failure.
//! 2. **Even fill**: a seeded shuffle of `0..num_genes` is dealt round-robin
//!    to creatures that still have room. Every gene gets exactly one slot, so
//!    coverage holds and every usage counter reads 1.
//! 3. **Randomized fill**: each remaining slot draws a candidate from its
//!    creature's own ChaCha stream and claims it through the
//!    [`UsageLedger`], probing forward when the candidate is over-used.
//!
//! Phases are separated by rayon join points. The randomized fill runs in
//! creature order under [`PartitionSchedule::Ordered`] and on the rayon pool
//! under [`PartitionSchedule::Concurrent`].
//!
//! ## Random streams
//!
//! All streams share the key `seed`. Creature `i` reads ChaCha stream `i`;
//! the even-fill shuffle reads stream [`SHUFFLE_STREAM`]. No process-global
//! RNG state is touched.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use genepool_core::{GenePoolError, GeneStore, PartitionSchedule, Result, RunConfig};

use crate::creature::Creature;
use crate::ledger::UsageLedger;

/// ChaCha stream reserved for the even-fill shuffle.
pub const SHUFFLE_STREAM: u64 = u64::MAX;

/// Partitioner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionConfig {
    pub seed: u64,
    pub schedule: PartitionSchedule,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            schedule: PartitionSchedule::Ordered,
        }
    }
}

impl From<&RunConfig> for PartitionConfig {
    fn from(cfg: &RunConfig) -> Self {
        Self {
            seed: cfg.seed,
            schedule: cfg.schedule,
        }
    }
}

/// Summary of a completed partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    pub creatures: usize,
    pub genes: usize,
    pub total_slots: usize,
    /// Slots filled by the randomized pass
    pub random_slots: usize,
    pub min_usage: u32,
    pub max_usage: u32,
    /// Over-used candidates skipped during the randomized pass
    pub probes: usize,
}

impl PartitionStats {
    /// Largest difference in usage between two genes.
    pub fn usage_spread(&self) -> u32 {
        self.max_usage - self.min_usage
    }
}

/// Random stream of creature `ordinal` under `seed`.
pub fn creature_stream(seed: u64, ordinal: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(ordinal as u64);
    rng
}

pub struct Partitioner {
    config: PartitionConfig,
}

impl Partitioner {
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Fill `creatures` with the genes of `store`.
    pub fn fill_from_store(
        &self,
        creatures: &mut [Creature],
        store: &GeneStore,
    ) -> Result<PartitionStats> {
        self.fill(creatures, store.len())
    }

    /// Fill every creature with indices in `[0, num_genes)`.
    ///
    /// On error no creature has been modified.
    pub fn fill(&self, creatures: &mut [Creature], num_genes: usize) -> Result<PartitionStats> {
        let total_slots = validate(creatures, num_genes)?;
        info!(
            creatures = creatures.len(),
            genes = num_genes,
            total_slots,
            seed = self.config.seed,
            schedule = ?self.config.schedule,
            "Partitioning genes into creatures"
        );

        let ledger = UsageLedger::new(num_genes);

        // Phase 2: even fill
        let dealt = self.deal_coverage(creatures, num_genes);
        creatures
            .par_iter_mut()
            .zip(dealt.into_par_iter())
            .for_each(|(creature, hand)| {
                for index in hand {
                    ledger.record(index);
                    creature.push_member(index);
                }
            });
        debug!(level = ledger.level(), "Even fill complete");

        // Phase 3: randomized fill
        let seed = self.config.seed;
        let probes: usize = match self.config.schedule {
            PartitionSchedule::Ordered => creatures
                .iter_mut()
                .map(|c| fill_random(c, seed, &ledger))
                .sum(),
            PartitionSchedule::Concurrent => creatures
                .par_iter_mut()
                .map(|c| fill_random(c, seed, &ledger))
                .sum(),
        };

        let (min_usage, max_usage) = ledger.spread();
        let stats = PartitionStats {
            creatures: creatures.len(),
            genes: num_genes,
            total_slots,
            random_slots: total_slots - num_genes,
            min_usage,
            max_usage,
            probes,
        };
        info!(
            min_usage,
            max_usage,
            probes,
            random_slots = stats.random_slots,
            "Partition complete"
        );
        Ok(stats)
    }

    /// Deal a seeded shuffle of every gene round-robin over the creatures.
    ///
    /// Returns one hand per creature. Callers have checked that total
    /// capacity covers `num_genes`.
    fn deal_coverage(&self, creatures: &[Creature], num_genes: usize) -> Vec<Vec<usize>> {
        let mut deck: Vec<usize> = (0..num_genes).collect();
        let mut rng = creature_stream(self.config.seed, 0);
        rng.set_stream(SHUFFLE_STREAM);
        deck.shuffle(&mut rng);

        let mut hands: Vec<Vec<usize>> = creatures
            .iter()
            .map(|c| Vec::with_capacity(c.capacity().min(num_genes / creatures.len() + 1)))
            .collect();

        let mut cards = deck.into_iter();
        let mut round = 0;
        'deal: loop {
            for (hand, creature) in hands.iter_mut().zip(creatures) {
                if creature.capacity() <= round {
                    continue;
                }
                match cards.next() {
                    Some(card) => hand.push(card),
                    None => break 'deal,
                }
            }
            round += 1;
        }
        hands
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Self::new(PartitionConfig::default())
    }
}

/// Check every precondition before any creature is touched.
///
/// Returns the total slot count.
fn validate(creatures: &[Creature], num_genes: usize) -> Result<usize> {
    if creatures.is_empty() {
        return Err(GenePoolError::config("partition", "no creatures to fill"));
    }
    if num_genes == 0 {
        return Err(GenePoolError::config("partition", "gene store is empty"));
    }
    if num_genes > u32::MAX as usize {
        return Err(GenePoolError::config(
            "partition",
            format!("{num_genes} genes exceed the usage counter range"),
        ));
    }
    let mut ordinals = HashSet::with_capacity(creatures.len());
    for creature in creatures {
        // The ordinal selects the creature's random stream
        if !ordinals.insert(creature.ordinal()) {
            return Err(GenePoolError::config(
                "partition",
                format!(
                    "creature ordinal {} is used more than once",
                    creature.ordinal()
                ),
            ));
        }
        if creature.capacity() == 0 {
            return Err(GenePoolError::config(
                "partition",
                format!("creature {} has zero capacity", creature.ordinal()),
            ));
        }
        if !creature.is_empty() {
            return Err(GenePoolError::config(
                "partition",
                format!(
                    "creature {} already holds {} genes",
                    creature.ordinal(),
                    creature.len()
                ),
            ));
        }
    }

    let total_slots = creatures
        .iter()
        .try_fold(0usize, |acc, c| acc.checked_add(c.capacity()))
        .ok_or_else(|| GenePoolError::config("partition", "total capacity overflows usize"))?;
    if total_slots < num_genes {
        return Err(GenePoolError::Capacity {
            creatures: creatures.len(),
            available: total_slots,
            required: num_genes,
        });
    }
    Ok(total_slots)
}

/// Fill the remaining slots of one creature from its own stream.
///
/// Returns the number of probes taken.
fn fill_random(creature: &mut Creature, seed: u64, ledger: &UsageLedger) -> usize {
    let num_genes = ledger.len();
    let mut rng = creature_stream(seed, creature.ordinal());
    let mut probes = 0;
    for _ in 0..creature.remaining() {
        let candidate = rng.gen_range(0..num_genes);
        let claim = ledger.claim_from(candidate);
        probes += claim.probes;
        creature.push_member(claim.index);
    }
    probes
}
