/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! The bounded collector for a k-NN query.
//!
//! A max-heap of at most k (distance, point) pairs. The heap top is the
//! worst entry held, so the k-distance used for pruning is one peek away.
//! Acceptance is decided on the lexicographic (distance, index) key, not
//! the distance alone: the collector converges on the k smallest such keys
//! no matter what order candidates arrive in, which keeps the single-query
//! and batch searchers in exact agreement on distance ties.

use super::NeighborCollector;
use super::query_items::QueryNeighbor;
use pointstore::PointIndex;
use std::collections::BinaryHeap;

/// The heap for doing a fairly efficient k-NN query. Holds at most `k`
/// neighbors; once full, a new candidate evicts the worst entry when it
/// beats it. `k_distance` is the live pruning radius.
#[derive(Debug)]
pub struct KnnResultHeap {
    heap: BinaryHeap<QueryNeighbor>,
    k: usize,
}

impl KnnResultHeap {
    /// Creates a collector for the `k` nearest neighbors. Callers validate
    /// `k >= 1` at the query surface.
    pub fn new(k: usize) -> KnnResultHeap {
        debug_assert!(k >= 1);
        KnnResultHeap {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
        }
    }

    /// Offers a candidate and returns the updated k-distance. Under-full
    /// collectors accept everything; a full collector replaces its worst
    /// entry when the candidate's (distance, index) key is smaller, and
    /// ignores the candidate otherwise.
    pub fn insert(&mut self, dist: f64, index: PointIndex) -> f64 {
        let candidate = QueryNeighbor { dist, index };
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(worst) = self.heap.peek() {
            if candidate < *worst {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
        self.k_distance()
    }

    /// The current pruning radius: infinite until `k` entries are held,
    /// afterwards the k-th smallest distance seen. Never increases.
    pub fn k_distance(&self) -> f64 {
        if self.heap.len() < self.k {
            f64::INFINITY
        } else {
            self.heap.peek().map(|n| n.dist).unwrap_or(f64::INFINITY)
        }
    }

    /// The number of neighbors currently held.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether any neighbor has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// How many neighbors were asked for.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Finalizes the collector, ascending by (distance, index). This
    /// consumes the heap.
    pub fn unpack(self) -> Vec<(f64, PointIndex)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|n| (n.dist, n.index))
            .collect()
    }
}

impl NeighborCollector for KnnResultHeap {
    fn collect(&mut self, dist: f64, index: PointIndex) -> f64 {
        self.insert(dist, index)
    }

    fn radius(&self) -> f64 {
        self.k_distance()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn unpacking_has_correct_order() {
        let mut heap = KnnResultHeap::new(4);
        heap.insert(0.4, 2);
        heap.insert(0.1, 4);
        heap.insert(0.3, 6);
        heap.insert(0.2, 8);
        let unpack = heap.unpack();
        assert_eq!(unpack.len(), 4);
        assert_eq!(
            unpack.iter().map(|(_, i)| *i).collect::<Vec<_>>(),
            vec![4, 8, 6, 2]
        );
        for w in unpack.windows(2) {
            assert!(w[0].0 <= w[1].0);
        }
    }

    #[test]
    fn k_distance_infinite_until_full() {
        let mut heap = KnnResultHeap::new(3);
        assert_eq!(heap.k_distance(), f64::INFINITY);
        heap.insert(1.0, 0);
        heap.insert(2.0, 1);
        assert_eq!(heap.k_distance(), f64::INFINITY);
        heap.insert(3.0, 2);
        assert_eq!(heap.k_distance(), 3.0);
    }

    #[test]
    fn k_distance_tightens_monotonically() {
        let mut heap = KnnResultHeap::new(2);
        let dists = [5.0, 4.0, 6.0, 1.0, 3.0, 0.5];
        let mut last = f64::INFINITY;
        for (i, d) in dists.iter().enumerate() {
            let kd = heap.insert(*d, i);
            assert!(kd <= last);
            last = kd;
        }
        assert_eq!(last, 1.0);
        let unpack = heap.unpack();
        assert_eq!(unpack, vec![(0.5, 5), (1.0, 3)]);
    }

    #[test]
    fn worse_candidates_are_ignored_when_full() {
        let mut heap = KnnResultHeap::new(2);
        heap.insert(1.0, 0);
        heap.insert(2.0, 1);
        let kd = heap.insert(9.0, 2);
        assert_eq!(kd, 2.0);
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn short_result_when_fewer_than_k() {
        let mut heap = KnnResultHeap::new(10);
        heap.insert(0.5, 1);
        heap.insert(0.25, 0);
        assert_eq!(heap.unpack(), vec![(0.25, 0), (0.5, 1)]);
    }

    #[test]
    fn ties_keep_the_smaller_index() {
        // with k = 2 and three candidates at distance 1.0 the held pair is
        // the two smallest indexes, regardless of arrival order
        for order in [[7, 3, 5], [3, 5, 7], [5, 7, 3]] {
            let mut heap = KnnResultHeap::new(2);
            for i in order {
                heap.insert(1.0, i);
            }
            assert_eq!(heap.unpack(), vec![(1.0, 3), (1.0, 5)]);
        }
    }
}
