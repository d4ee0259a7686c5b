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

//! Euclidean distance kernels.
//!
//! Features are stored as `f32` but accumulated in `f64`, so long vectors
//! (784 pixels and up) do not lose precision in the running sum.

/// Squared Euclidean distance.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch");

    // Four independent accumulators keep the loop vectorizable
    let mut acc = [0.0f64; 4];
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let tail_a = chunks_a.remainder();
    let tail_b = chunks_b.remainder();

    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..4 {
            let d = ca[lane] as f64 - cb[lane] as f64;
            acc[lane] += d * d;
        }
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (x, y) in tail_a.iter().zip(tail_b) {
        let d = *x as f64 - *y as f64;
        sum += d * d;
    }
    sum
}

/// Euclidean distance `sqrt(sum((a_i - b_i)^2))`.
#[inline]
pub fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(squared_euclidean(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(euclidean(&[0.0, 0.5], &[0.0, 1.0]), 0.5);
    }

    #[test]
    fn test_chunked_matches_naive() {
        let a: Vec<f32> = (0..37).map(|i| (i as f32 * 0.37).sin()).collect();
        let b: Vec<f32> = (0..37).map(|i| (i as f32 * 1.3).cos()).collect();
        let naive: f64 = a
            .iter()
            .zip(&b)
            .map(|(x, y)| (*x as f64 - *y as f64).powi(2))
            .sum();
        assert!((squared_euclidean(&a, &b) - naive).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry_and_identity() {
        let a = [1.5f32, -2.25, 1e6, 3.0, 0.1];
        let b = [-7.0f32, 0.0, 2.5, 3.0, 1e-3];
        assert_eq!(euclidean(&a, &b), euclidean(&b, &a));
        assert_eq!(euclidean(&a, &a), 0.0);
    }
}
