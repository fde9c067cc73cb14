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

//! Odds and ends, mostly the linear-scan reference query.

use crate::errors::{SylvaError, SylvaResult};
use crate::query_tools::KnnResultHeap;
use pointstore::{PointIndex, PointStore};

/// Brute-force k nearest neighbors over a whole store.
///
/// Shares the tree searchers' collector, so ordering and tie handling are
/// identical; any tree built over the same store must reproduce this
/// answer exactly. Useful as ground truth in tests and benches, and as the
/// better choice for stores small enough that a tree is overhead.
pub fn linear_knn<D: PointStore>(
    store: &D,
    point: &[f64],
    k: usize,
) -> SylvaResult<Vec<(f64, PointIndex)>> {
    if k < 1 {
        return Err(SylvaError::InvalidArgument(
            "at least one neighbor has to be requested",
        ));
    }
    let indexes = store.reference_indexes();
    let dists = store.distances_to_point(point, &indexes)?;
    let mut collector = KnnResultHeap::new(k);
    for (pi, dist) in indexes.into_iter().zip(dists) {
        collector.insert(dist, pi);
    }
    Ok(collector.unpack())
}
