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

//! In-memory backing for a point store.

use std::marker::PhantomData;

use crate::base_traits::PointStore;
use crate::distances::Metric;
use crate::errors::*;
use crate::PointIndex;

/// RAM-resident point data, stored as one flat row-major buffer.
#[derive(Debug)]
pub struct DataRam<M: Metric> {
    data: Vec<f64>,
    dim: usize,
    metric: PhantomData<M>,
}

impl<M: Metric> DataRam<M> {
    /// Wraps a flat buffer whose length is a whole number of `dim`-wide
    /// rows.
    pub fn new(data: Vec<f64>, dim: usize) -> PointStoreResult<DataRam<M>> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(PointStoreError::DimensionMismatch {
                expected: dim,
                actual: data.len(),
            });
        }
        Ok(DataRam {
            data,
            dim,
            metric: PhantomData,
        })
    }
}

impl<M: Metric> PointStore for DataRam<M> {
    type Metric = M;

    fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn reference_indexes(&self) -> Vec<PointIndex> {
        (0..self.len()).collect()
    }

    fn point(&self, pi: PointIndex) -> PointStoreResult<&[f64]> {
        let start = pi * self.dim;
        self.data
            .get(start..start + self.dim)
            .ok_or(PointStoreError::DataAccessError {
                index: pi,
                store_name: "ram".to_string(),
            })
    }
}
