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

//! Selection (nth_element)
//!
//! Partial sort that places a single rank correctly without ordering the rest.
//!
//! After `nth_element_by(v, k, cmp)`:
//! - `v[k]` is the element a full sort would put at position `k`
//! - every element of `v[..k]` compares `<=` to it
//! - every element of `v[k + 1..]` compares `>=` to it
//!
//! Average O(n), against O(n log n) for sorting the whole candidate list.
//!
//! ## Algorithm
//!
//! Lomuto partitioning with a median-of-three pivot (low, middle, high), the
//! median swapped to the end before partitioning. Sorted and reverse-sorted
//! inputs therefore stay linear. The loop narrows `[lo, hi]` to the side that
//! holds `k` instead of recursing.
//!
//! One routine serves every payload: raw `f64` distances go through
//! [`nth_element`], keyed records such as `(distance, index)` pairs go through
//! [`nth_element_by_key`].

use std::cmp::Ordering;

/// Place rank `k` of `v` using the natural order.
///
/// Incomparable values (NaN) are treated as equal.
///
/// # Panics
///
/// Panics if `k >= v.len()`.
#[inline]
pub fn nth_element<T: PartialOrd>(v: &mut [T], k: usize) {
    nth_element_by(v, k, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Place rank `k` of `v` ordering elements by `key`.
///
/// # Panics
///
/// Panics if `k >= v.len()`.
#[inline]
pub fn nth_element_by_key<T, K, F>(v: &mut [T], k: usize, mut key: F)
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    nth_element_by(v, k, |a, b| {
        key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal)
    });
}

/// Place rank `k` of `v` using the comparator `cmp`.
///
/// # Panics
///
/// Panics if `k >= v.len()`.
pub fn nth_element_by<T, F>(v: &mut [T], k: usize, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = v.len();
    assert!(k < n, "nth_element: rank {k} out of bounds for length {n}");

    let mut lo = 0;
    let mut hi = n - 1;
    while lo < hi {
        let pivot = partition(v, lo, hi, &mut cmp);
        match k.cmp(&pivot) {
            Ordering::Equal => return,
            // k >= lo, so pivot > lo here
            Ordering::Less => hi = pivot - 1,
            Ordering::Greater => lo = pivot + 1,
        }
    }
}

/// Move the `k` smallest elements (by `key`) to the front and return them.
///
/// The returned group is unordered. `k == 0` returns an empty slice and
/// `k >= v.len()` returns the whole slice untouched.
pub fn select_smallest_by_key<T, K, F>(v: &mut [T], k: usize, key: F) -> &mut [T]
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    if k == 0 {
        return &mut v[..0];
    }
    if k < v.len() {
        nth_element_by_key(v, k - 1, key);
    }
    let end = k.min(v.len());
    &mut v[..end]
}

/// Order `v[lo]`, `v[mid]`, `v[hi]`, then park the median at `hi`.
#[inline]
fn median_of_three<T, F>(v: &mut [T], lo: usize, hi: usize, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mid = lo + (hi - lo) / 2;
    if cmp(&v[mid], &v[lo]) == Ordering::Less {
        v.swap(mid, lo);
    }
    if cmp(&v[hi], &v[lo]) == Ordering::Less {
        v.swap(hi, lo);
    }
    if cmp(&v[hi], &v[mid]) == Ordering::Less {
        v.swap(hi, mid);
    }
    v.swap(mid, hi);
}

/// Lomuto partition of `v[lo..=hi]` around the median-of-three pivot.
///
/// Returns the pivot's final position. Elements equal to the pivot are sent
/// left on every other encounter so runs of ties do not degrade to O(n^2).
fn partition<T, F>(v: &mut [T], lo: usize, hi: usize, cmp: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    median_of_three(v, lo, hi, cmp);

    let mut store = lo;
    let mut send_tie_left = false;
    for i in lo..hi {
        let goes_left = match cmp(&v[i], &v[hi]) {
            Ordering::Less => true,
            Ordering::Equal => {
                send_tie_left = !send_tie_left;
                send_tie_left
            }
            Ordering::Greater => false,
        };
        if goes_left {
            v.swap(i, store);
            store += 1;
        }
    }
    v.swap(store, hi);
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partitioned(v: &[f64], k: usize) {
        let pivot = v[k];
        assert!(v[..k].iter().all(|&x| x <= pivot), "left of {k}: {v:?}");
        assert!(v[k + 1..].iter().all(|&x| x >= pivot), "right of {k}: {v:?}");
    }

    #[test]
    fn test_every_rank_matches_sort() {
        let base = vec![9.0, 1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0, 5.0, 0.0];
        let mut sorted = base.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for k in 0..base.len() {
            let mut v = base.clone();
            nth_element(&mut v, k);
            assert_eq!(v[k], sorted[k]);
            assert_partitioned(&v, k);
        }
    }

    #[test]
    fn test_sorted_and_reversed_inputs() {
        let mut asc: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        nth_element(&mut asc, 500);
        assert_eq!(asc[500], 500.0);

        let mut desc: Vec<f64> = (0..1000).rev().map(|i| i as f64).collect();
        nth_element(&mut desc, 10);
        assert_eq!(desc[10], 10.0);
        assert_partitioned(&desc, 10);
    }

    #[test]
    fn test_all_equal() {
        let mut v = vec![3.0; 10_000];
        nth_element(&mut v, 4_321);
        assert_eq!(v[4_321], 3.0);
    }

    #[test]
    fn test_single_element() {
        let mut v = vec![42.0];
        nth_element(&mut v, 0);
        assert_eq!(v, vec![42.0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_rank_out_of_bounds() {
        let mut v = vec![1.0, 2.0];
        nth_element(&mut v, 2);
    }

    #[test]
    fn test_by_key_pairs() {
        let mut pairs: Vec<(f64, usize)> = vec![(4.0, 0), (0.5, 1), (3.0, 2), (0.1, 3), (2.0, 4)];
        nth_element_by_key(&mut pairs, 1, |p| p.0);
        assert_eq!(pairs[1], (0.5, 1));
        assert!(pairs[0].0 <= 0.5);
        assert!(pairs[2..].iter().all(|p| p.0 >= 0.5));
    }

    #[test]
    fn test_select_smallest() {
        let mut v = vec![5, 3, 9, 1, 7, 2];
        let group = select_smallest_by_key(&mut v, 3, |x| *x);
        group.sort();
        assert_eq!(&group[..], &[1, 2, 3]);

        let mut v = vec![2, 1];
        assert!(select_smallest_by_key(&mut v, 0, |x| *x).is_empty());
        assert_eq!(select_smallest_by_key(&mut v, 5, |x| *x).len(), 2);
    }

    #[test]
    fn test_nan_does_not_panic() {
        let mut v = vec![1.0, f64::NAN, 0.5, 2.0];
        nth_element(&mut v, 1);
        assert_eq!(v.len(), 4);
    }
}
