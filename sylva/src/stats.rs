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

//! Passive query counters.
//!
//! The query engine only ever increments these, it never reads them back to
//! make decisions. Exact point-to-point distance evaluations are counted;
//! region lower-bound computations are not, so the counter is directly
//! comparable against a linear scan of the same store.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by every query against one tree. Increments are relaxed
/// atomics so concurrent readers can query in parallel.
#[derive(Debug, Default)]
pub struct QueryStatistics {
    knn_queries: AtomicUsize,
    distance_evals: AtomicUsize,
}

impl QueryStatistics {
    /// Creates zeroed counters.
    pub fn new() -> QueryStatistics {
        QueryStatistics::default()
    }

    /// Records one issued k-NN query.
    pub fn record_knn_query(&self) {
        self.knn_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a batch of exact distance evaluations.
    pub fn record_distance_evals(&self, count: usize) {
        self.distance_evals.fetch_add(count, Ordering::Relaxed);
    }

    /// Total k-NN queries issued so far.
    pub fn knn_queries(&self) -> usize {
        self.knn_queries.load(Ordering::Relaxed)
    }

    /// Total exact distance evaluations so far.
    pub fn distance_evals(&self) -> usize {
        self.distance_evals.load(Ordering::Relaxed)
    }

    /// Zeroes both counters.
    pub fn reset(&self) {
        self.knn_queries.store(0, Ordering::Relaxed);
        self.distance_evals.store(0, Ordering::Relaxed);
    }
}
