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

//! # The page model
//!
//! A tree is an arena of pages addressed by `PageId`. A page is either a
//! leaf holding point indexes or a directory holding bounded references to
//! child pages. Queries read pages, they never mutate them, so the whole
//! node type is two variants and one dispatch point per traversal step.

use pointstore::{BoundingBox, PointIndex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Opaque reference to one page in a tree's arena.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PageId(pub(crate) usize);

impl PageId {
    /// The arena slot this id points at.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "page({})", self.0)
    }
}

/// A bounded reference from a directory page to one child page.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Minimum bounding rectangle of everything reachable through `child`.
    pub bounds: BoundingBox,
    /// The referenced page.
    pub child: PageId,
}

/// One page of the tree.
#[derive(Debug, Clone)]
pub enum SpatialNode {
    /// A data page. Entries are indexes into the tree's point store.
    Leaf {
        /// The points stored on this page.
        points: SmallVec<[PointIndex; 32]>,
    },
    /// A pointer page.
    Directory {
        /// The bounded child references stored on this page.
        entries: SmallVec<[DirectoryEntry; 8]>,
    },
}

impl SpatialNode {
    /// Whether this is a data page.
    pub fn is_leaf(&self) -> bool {
        matches!(self, SpatialNode::Leaf { .. })
    }

    /// The number of entries on the page, of either kind.
    pub fn entry_count(&self) -> usize {
        match self {
            SpatialNode::Leaf { points } => points.len(),
            SpatialNode::Directory { entries } => entries.len(),
        }
    }

    /// The point indexes of a leaf page.
    pub fn leaf_points(&self) -> Option<&[PointIndex]> {
        match self {
            SpatialNode::Leaf { points } => Some(points),
            SpatialNode::Directory { .. } => None,
        }
    }

    /// The child references of a directory page.
    pub fn directory_entries(&self) -> Option<&[DirectoryEntry]> {
        match self {
            SpatialNode::Leaf { .. } => None,
            SpatialNode::Directory { entries } => Some(entries),
        }
    }
}
