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

//! Ensemble evaluation
//!
//! Every creature classifies every test gene. A creature's score is its
//! share of correct predictions. The ensemble prediction for a test gene is
//! the plurality of the creatures' predictions, ties going to the label with
//! the smallest summed voter distance, then to the lowest creature ordinal.

use std::fmt;

use genepool_core::{GeneStore, LabelId, Result};
use genepool_index::{Creature, KnnClassifier, Prediction};
use smallvec::SmallVec;
use tracing::{debug, info};

/// Correct predictions of one creature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureScore {
    pub ordinal: usize,
    pub members: usize,
    pub correct: usize,
    pub total: usize,
}

impl CreatureScore {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub k: usize,
    pub train_genes: usize,
    pub test_genes: usize,
    pub creatures: Vec<CreatureScore>,
    pub ensemble_correct: usize,
}

impl EvaluationReport {
    pub fn ensemble_accuracy(&self) -> f64 {
        if self.test_genes == 0 {
            0.0
        } else {
            self.ensemble_correct as f64 / self.test_genes as f64
        }
    }

    /// Mean accuracy of the individual creatures.
    pub fn mean_creature_accuracy(&self) -> f64 {
        if self.creatures.is_empty() {
            return 0.0;
        }
        self.creatures.iter().map(CreatureScore::accuracy).sum::<f64>()
            / self.creatures.len() as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "k = {}, {} training genes, {} test genes",
            self.k, self.train_genes, self.test_genes
        )?;
        writeln!(f, "{:>8} {:>8} {:>10} {:>9}", "creature", "members", "correct", "accuracy")?;
        for s in &self.creatures {
            writeln!(
                f,
                "{:>8} {:>8} {:>10} {:>8.2}%",
                s.ordinal,
                s.members,
                format!("{}/{}", s.correct, s.total),
                s.accuracy() * 100.0
            )?;
        }
        writeln!(
            f,
            "mean creature accuracy: {:.2}%",
            self.mean_creature_accuracy() * 100.0
        )?;
        write!(
            f,
            "ensemble accuracy:      {:.2}% ({}/{})",
            self.ensemble_accuracy() * 100.0,
            self.ensemble_correct,
            self.test_genes
        )
    }
}

/// Classify every gene of `test` with every creature over `train`.
///
/// Labels are compared by name, since the two stores intern independently.
pub fn evaluate(
    train: &GeneStore,
    test: &GeneStore,
    creatures: &[Creature],
    k: usize,
) -> Result<EvaluationReport> {
    let knn = KnnClassifier::new(train, k)?;
    let queries: Vec<&[f32]> = test.iter().map(|g| g.features).collect();

    let mut per_creature = Vec::with_capacity(creatures.len());
    for creature in creatures {
        let predictions = knn.classify_batch(creature, &queries)?;
        let correct = test
            .iter()
            .zip(&predictions)
            .filter(|(gene, p)| p.label.as_str() == gene.label)
            .count();
        debug!(creature = creature.ordinal(), correct, "Creature evaluated");
        per_creature.push((
            CreatureScore {
                ordinal: creature.ordinal(),
                members: creature.len(),
                correct,
                total: test.len(),
            },
            predictions,
        ));
    }

    let mut ensemble_correct = 0;
    let mut votes: Vec<&Prediction> = Vec::with_capacity(per_creature.len());
    for (q, gene) in test.iter().enumerate() {
        votes.clear();
        votes.extend(per_creature.iter().map(|(_, p)| &p[q]));
        if let Some(winner) = plurality(&votes)
            && train.label_name(winner) == Some(gene.label)
        {
            ensemble_correct += 1;
        }
    }

    let report = EvaluationReport {
        k,
        train_genes: train.len(),
        test_genes: test.len(),
        creatures: per_creature.into_iter().map(|(s, _)| s).collect(),
        ensemble_correct,
    };
    info!(
        creatures = report.creatures.len(),
        ensemble_accuracy = report.ensemble_accuracy(),
        "Evaluation complete"
    );
    Ok(report)
}

/// Plurality label over creature predictions, given in creature order.
pub fn plurality(predictions: &[&Prediction]) -> Option<LabelId> {
    let mut tallies: SmallVec<[(LabelId, usize, f64); 8]> = SmallVec::new();
    for p in predictions {
        match tallies.iter_mut().find(|t| t.0 == p.label_id) {
            Some(t) => {
                t.1 += 1;
                t.2 += p.total_distance;
            }
            None => tallies.push((p.label_id, 1, p.total_distance)),
        }
    }
    tallies
        .into_iter()
        .reduce(|best, t| {
            if t.1 > best.1 || (t.1 == best.1 && t.2 < best.2) {
                t
            } else {
                best
            }
        })
        .map(|t| t.0)
}
