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

//! Tools and data structures for assisting spatial tree queries.

use pointstore::PointIndex;

pub(crate) mod query_items;
pub use query_items::{CandidateQueue, QueryCandidate};

pub(crate) mod knn_result_heap;
pub use knn_result_heap::KnnResultHeap;

/// Anything a page expansion can report nearby points into. The bounded
/// k-NN heap is the usual sink, a range collector or a clustering consumer
/// can implement this to reuse the same traversal.
pub trait NeighborCollector {
    /// Offers one (distance, point) pair and returns the collector's
    /// updated pruning radius.
    fn collect(&mut self, dist: f64, index: PointIndex) -> f64;
    /// The current pruning radius. Candidates further than this can never
    /// improve the collector.
    fn radius(&self) -> f64;
}
