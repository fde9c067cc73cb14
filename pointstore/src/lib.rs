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
//! # Point Store
//! The data-access and metric layer for sylva. It owns the points a spatial
//! index is built over, the metric that compares them, and the bounding
//! regions the index prunes with. Spatial trees hold an `Arc` to a store
//! and only ever read from it.

#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

mod distances;
pub use distances::*;
pub mod errors;

pub mod data_sources;
pub mod loaders;

mod regions;
pub use regions::BoundingBox;

mod base_traits;
#[doc(inline)]
pub use base_traits::*;

use data_sources::DataRam;

/// A sensible default for an in-memory store
pub type DefaultStore<M> = DataRam<M>;

/// To make things more obvious, we type the point index.
/// Identifies one point within the store it was loaded into.
pub type PointIndex = usize;
