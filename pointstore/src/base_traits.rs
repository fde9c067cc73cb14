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

use std::cmp::min;
use std::fmt::Debug;
use std::sync::Mutex;

use rayon::prelude::*;

use crate::distances::*;
use crate::errors::*;
use crate::PointIndex;

#[inline]
fn chunk(data_dim: usize) -> usize {
    min(15000 / data_dim, 20).max(1)
}

/// Base trait for a point store.
///
/// A store owns a fixed set of points, addressable by `PointIndex`, and the
/// metric used to compare them. Indexes built over a store only ever read
/// it, a store handed to a tree must not change underneath it.
pub trait PointStore: Debug + Send + Sync + 'static {
    /// Underlying metric this point store uses
    type Metric: Metric;

    /// The number of points this store covers
    fn len(&self) -> usize;
    /// If this is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The dimension of the underlying data
    fn dim(&self) -> usize;
    /// Indexes used for access
    fn reference_indexes(&self) -> Vec<PointIndex>;
    /// Gets a point from this store
    fn point(&self, pi: PointIndex) -> PointStoreResult<&[f64]>;

    /// The main distance function. This parallelizes if the index set is
    /// large enough to be worth the fork.
    fn distances_to_point(
        &self,
        point: &[f64],
        indexes: &[PointIndex],
    ) -> PointStoreResult<Vec<f64>> {
        let chunk = chunk(self.dim());
        let len = indexes.len();
        if len > chunk * 3 {
            let mut dists: Vec<f64> = vec![0.0; len];
            let dist_iter = dists.par_chunks_mut(chunk);
            let indexes_iter = indexes.par_chunks(chunk);
            let error: Mutex<Result<(), PointStoreError>> = Mutex::new(Ok(()));
            dist_iter
                .zip(indexes_iter)
                .for_each(|(chunk_dists, chunk_indexes)| {
                    for (d, i) in chunk_dists.iter_mut().zip(chunk_indexes) {
                        match self.point(*i) {
                            Ok(y) => *d = Self::Metric::dist(point, y),
                            Err(e) => {
                                *error.lock().unwrap() = Err(e);
                            }
                        }
                    }
                });
            (error.into_inner().unwrap())?;
            Ok(dists)
        } else {
            indexes
                .iter()
                .map(|i| {
                    let y = self.point(*i)?;
                    Ok(Self::Metric::dist(point, y))
                })
                .collect()
        }
    }
}
