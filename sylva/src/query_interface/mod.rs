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

//! Interfaces that simplify bulk queries
//!
//! Two ways to amortize many queries. `knn` fans independent single
//! queries across threads, each with its own descent. `partitioned_knn_batch`
//! shards one id-keyed mapping into several coordinated batch descents and
//! runs the shards in parallel; queries inside a shard share traversal.

use crate::errors::{SylvaError, SylvaResult};
use crate::rtree::{BatchResult, QueryId, QueryMap, RTree};
use pointstore::{PointIndex, PointStore};
use rayon::prelude::*;
use std::sync::Arc;

/// Interface for bulk queries. Handles sharing the tree across the pool
/// for you.
pub struct BulkInterface<D: PointStore> {
    tree: Arc<RTree<D>>,
}

impl<D: PointStore> BulkInterface<D> {
    /// Creates a new one.
    pub fn new(tree: Arc<RTree<D>>) -> Self {
        BulkInterface { tree }
    }

    /// The wrapped tree.
    pub fn tree(&self) -> &RTree<D> {
        &self.tree
    }

    /// Bulk knn: one independent search per point, fanned across the pool.
    /// Results line up with the input slice.
    pub fn knn(&self, points: &[&[f64]], k: usize) -> Vec<SylvaResult<Vec<(f64, PointIndex)>>> {
        let mut chunked_results: Vec<Vec<SylvaResult<Vec<(f64, PointIndex)>>>> = points
            .par_chunks(16)
            .map(|chunk_points| {
                chunk_points
                    .iter()
                    .map(|p| self.tree.knn(p, k))
                    .collect()
            })
            .collect();
        chunked_results
            .drain(..)
            .reduce(|mut a, mut x| {
                a.extend(x.drain(..));
                a
            })
            .unwrap_or_default()
    }

    /// Shards an id-keyed query mapping into groups of `partition` queries
    /// and answers each shard with one coordinated batch descent, shards in
    /// parallel. Output is the merged mapping, identical to an unsharded
    /// [`RTree::knn_batch`] over the same input.
    pub fn partitioned_knn_batch(
        &self,
        queries: &QueryMap,
        k: usize,
        partition: usize,
    ) -> SylvaResult<BatchResult> {
        if partition < 1 {
            return Err(SylvaError::InvalidArgument(
                "partitions must hold at least one query",
            ));
        }
        let mut ids: Vec<QueryId> = queries.keys().cloned().collect();
        ids.sort_unstable();

        let shards: Vec<QueryMap> = ids
            .chunks(partition)
            .map(|chunk| {
                chunk
                    .iter()
                    .filter_map(|id| queries.get(id).map(|p| (*id, p.clone())))
                    .collect()
            })
            .collect();
        let shard_results: Vec<SylvaResult<BatchResult>> = shards
            .par_iter()
            .map(|shard| self.tree.knn_batch(shard, k))
            .collect();

        let mut merged = BatchResult::default();
        for result in shard_results {
            merged.extend(result?);
        }
        Ok(merged)
    }
}
