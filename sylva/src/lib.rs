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

#![warn(missing_docs)]

//! # Sylva
//! A page-organized, height-balanced R-tree for exact k-nearest-neighbor
//! search. The tree is bulk-packed once over an immutable
//! [`pointstore::PointStore`] and then queried, one point at a time or as a
//! coordinated batch, with a branch-and-bound best-first search that prunes
//! on admissible region lower bounds.
//!
//! ## Parameter Guide
//! Two parameters shape the tree. `leaf_capacity` is the number of points a
//! data page holds; bigger pages mean fewer bound computations but more
//! exact distances per visited leaf. `directory_capacity` is the fan-out of
//! pointer pages; it trades tree height against the number of child bounds
//! scored per expanded page. The defaults (32 and 8) behave well for low
//! dimensional data; both shrink toward 2 for adversarial benchmarking of
//! the pruning itself.
//!
//! Queries are exact for any metric whose region bound never overestimates,
//! which holds for the metrics `pointstore` ships. The engine has no way to
//! detect a bound that lies, results are silently wrong under one, so treat
//! that contract as load-bearing when adding metrics.

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod errors;
pub use errors::{SylvaError, SylvaResult};

mod rtree;
pub use rtree::*;

pub mod query_interface;

pub mod stats;
pub mod utils;

pub use pointstore::PointIndex;
