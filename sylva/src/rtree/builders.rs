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

//! Sort-Tile-Recursive bulk packing.
//!
//! The tree is built once, bottom-up: points are tiled into full leaf
//! pages axis by axis, then each finished level is tiled again by region
//! centers into directory pages until a single root remains. Every level is
//! completed before the next starts, so all leaves sit at the same depth.
//! There is no insert or split path, a changed point set means a rebuild.

use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use smallvec::SmallVec;
use yaml_rust::YamlLoader;

use super::node::{DirectoryEntry, PageId, SpatialNode};
use super::tree::{RTree, RTreeParameters};
use crate::errors::{SylvaError, SylvaResult};
use pointstore::{BoundingBox, PointIndex, PointStore};

/// A construction object for a packed spatial tree. See
/// [`crate::RTreeParameters`] for docs.
#[derive(Debug)]
pub struct RTreeBuilder {
    pub(crate) leaf_capacity: usize,
    pub(crate) directory_capacity: usize,
}

impl Default for RTreeBuilder {
    fn default() -> RTreeBuilder {
        RTreeBuilder {
            leaf_capacity: 32,
            directory_capacity: 8,
        }
    }
}

impl RTreeBuilder {
    /// Creates a new builder with sensible defaults.
    pub fn new() -> RTreeBuilder {
        RTreeBuilder::default()
    }

    /// Creates a builder from a yaml config file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Self {
        let config = read_to_string(&path).expect("Unable to read config file");
        let params_files = YamlLoader::load_from_str(&config).unwrap();
        let params = &params_files[0];
        RTreeBuilder {
            leaf_capacity: params["leaf_capacity"].as_i64().unwrap_or(32) as usize,
            directory_capacity: params["directory_capacity"].as_i64().unwrap_or(8) as usize,
        }
    }

    /// See [`crate::RTreeParameters`] for docs
    pub fn set_leaf_capacity(&mut self, x: usize) -> &mut Self {
        self.leaf_capacity = x;
        self
    }
    /// See [`crate::RTreeParameters`] for docs
    pub fn set_directory_capacity(&mut self, x: usize) -> &mut Self {
        self.directory_capacity = x;
        self
    }

    /// Packs every point of the store into a fresh tree.
    pub fn build<D: PointStore>(&self, point_store: Arc<D>) -> SylvaResult<RTree<D>> {
        if self.leaf_capacity < 2 || self.directory_capacity < 2 {
            return Err(SylvaError::InvalidArgument(
                "page capacities must hold at least two entries",
            ));
        }
        let dim = point_store.dim();
        let parameters = Arc::new(RTreeParameters {
            leaf_capacity: self.leaf_capacity,
            directory_capacity: self.directory_capacity,
            point_store: Arc::clone(&point_store),
        });

        let mut items: Vec<(PointIndex, Vec<f64>)> =
            Vec::with_capacity(point_store.len());
        for pi in point_store.reference_indexes() {
            items.push((pi, point_store.point(pi)?.to_vec()));
        }

        let mut pages: Vec<SpatialNode> = Vec::new();
        if items.is_empty() {
            pages.push(SpatialNode::Leaf {
                points: SmallVec::new(),
            });
            debug!("packed an empty store into a single empty leaf");
            return Ok(RTree::from_parts(parameters, pages, PageId(0)));
        }

        // data level
        let mut groups = Vec::new();
        tile(items, 0, dim, self.leaf_capacity, &mut groups);
        let mut level: Vec<(PageId, BoundingBox)> = Vec::with_capacity(groups.len());
        for group in groups {
            let mut bounds = BoundingBox::from_point(&group[0].1);
            for (_, point) in &group[1..] {
                bounds.expand_point(point);
            }
            let page = PageId(pages.len());
            pages.push(SpatialNode::Leaf {
                points: group.iter().map(|(pi, _)| *pi).collect(),
            });
            level.push((page, bounds));
        }
        let mut levels = 1;

        // directory levels, until one page covers everything
        while level.len() > 1 {
            let tiled: Vec<((PageId, BoundingBox), Vec<f64>)> = level
                .drain(..)
                .map(|entry| {
                    let center = (0..dim).map(|axis| entry.1.center_along(axis)).collect();
                    (entry, center)
                })
                .collect();
            let mut groups = Vec::new();
            tile(tiled, 0, dim, self.directory_capacity, &mut groups);
            for group in groups {
                let mut bounds = group[0].0 .1.clone();
                for ((_, child_bounds), _) in &group[1..] {
                    bounds.expand(child_bounds);
                }
                let page = PageId(pages.len());
                pages.push(SpatialNode::Directory {
                    entries: group
                        .into_iter()
                        .map(|((child, child_bounds), _)| DirectoryEntry {
                            bounds: child_bounds,
                            child,
                        })
                        .collect(),
                });
                level.push((page, bounds));
            }
            levels += 1;
        }

        debug!(
            "packed {} points into {} pages across {} levels",
            point_store.len(),
            pages.len(),
            levels
        );
        Ok(RTree::from_parts(parameters, pages, level[0].0))
    }
}

/// Sort-Tile-Recursive grouping: orders `items` along `axis`, slices them
/// into roughly equal slabs, and recurses on the next axis until the last
/// one, which is chopped into runs of `capacity`. Groups never exceed
/// `capacity`.
fn tile<T>(
    mut items: Vec<(T, Vec<f64>)>,
    axis: usize,
    dim: usize,
    capacity: usize,
    groups: &mut Vec<Vec<(T, Vec<f64>)>>,
) {
    if items.len() <= capacity {
        groups.push(items);
        return;
    }
    items.sort_by(|a, b| a.1[axis].total_cmp(&b.1[axis]));
    if axis + 1 >= dim {
        while !items.is_empty() {
            let rest = items.split_off(capacity.min(items.len()));
            groups.push(std::mem::replace(&mut items, rest));
        }
    } else {
        let tiles = (items.len() + capacity - 1) / capacity;
        let remaining_axes = (dim - axis) as f64;
        let slices = ((tiles as f64).powf(1.0 / remaining_axes).ceil() as usize).max(1);
        let slab = (items.len() + slices - 1) / slices;
        while !items.is_empty() {
            let rest = items.split_off(slab.min(items.len()));
            let slab_items = std::mem::replace(&mut items, rest);
            tile(slab_items, axis + 1, dim, capacity, groups);
        }
    }
}
