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

//! Axis-aligned bounding regions for spatial indexes.
//!
//! A `BoundingBox` is the minimum bounding rectangle of a set of points in
//! n dimensions. Directory pages of a spatial tree store one per child, and
//! metrics compute admissible lower bounds against them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An n-dimensional, axis-aligned minimum bounding rectangle.
///
/// The first few coordinates are stored inline, spatial data is usually 2
/// to 4 dimensional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    low: SmallVec<[f64; 4]>,
    high: SmallVec<[f64; 4]>,
}

impl BoundingBox {
    /// A degenerate box covering exactly one point.
    pub fn from_point(point: &[f64]) -> BoundingBox {
        BoundingBox {
            low: SmallVec::from_slice(point),
            high: SmallVec::from_slice(point),
        }
    }

    /// Builds a box from explicit corners. The corners must agree on
    /// dimension and satisfy `low[i] <= high[i]` on every axis.
    pub fn new(low: &[f64], high: &[f64]) -> BoundingBox {
        debug_assert_eq!(low.len(), high.len());
        debug_assert!(low.iter().zip(high).all(|(l, h)| l <= h));
        BoundingBox {
            low: SmallVec::from_slice(low),
            high: SmallVec::from_slice(high),
        }
    }

    /// The number of axes.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Lower corner.
    pub fn low(&self) -> &[f64] {
        &self.low
    }

    /// Upper corner.
    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// Grows this box to also cover `other`.
    pub fn expand(&mut self, other: &BoundingBox) {
        for (l, ol) in self.low.iter_mut().zip(&other.low) {
            *l = l.min(*ol);
        }
        for (h, oh) in self.high.iter_mut().zip(&other.high) {
            *h = h.max(*oh);
        }
    }

    /// Grows this box to also cover `point`.
    pub fn expand_point(&mut self, point: &[f64]) {
        for (l, p) in self.low.iter_mut().zip(point) {
            *l = l.min(*p);
        }
        for (h, p) in self.high.iter_mut().zip(point) {
            *h = h.max(*p);
        }
    }

    /// The smallest box covering both arguments.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = self.clone();
        merged.expand(other);
        merged
    }

    /// True if `point` lies inside the box, boundary included.
    pub fn contains_point(&self, point: &[f64]) -> bool {
        self.low.iter().zip(point).all(|(l, p)| l <= p)
            && self.high.iter().zip(point).all(|(h, p)| p <= h)
    }

    /// True if every point of `other` lies inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.low.iter().zip(&other.low).all(|(l, ol)| l <= ol)
            && self.high.iter().zip(&other.high).all(|(h, oh)| oh <= h)
    }

    /// Midpoint of the box along one axis. Bulk loaders order sibling
    /// regions by these.
    pub fn center_along(&self, axis: usize) -> f64 {
        (self.low[axis] + self.high[axis]) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_box_is_degenerate() {
        let b = BoundingBox::from_point(&[1.0, -2.0]);
        assert_eq!(b.low(), &[1.0, -2.0]);
        assert_eq!(b.high(), &[1.0, -2.0]);
        assert!(b.contains_point(&[1.0, -2.0]));
        assert!(!b.contains_point(&[1.0, -1.9]));
    }

    #[test]
    fn expand_covers_both() {
        let mut b = BoundingBox::from_point(&[0.0, 0.0]);
        b.expand_point(&[2.0, -1.0]);
        assert!(b.contains_point(&[1.0, -0.5]));
        assert_eq!(b.low(), &[0.0, -1.0]);
        assert_eq!(b.high(), &[2.0, 0.0]);

        let other = BoundingBox::from_point(&[-3.0, 5.0]);
        let merged = b.union(&other);
        assert!(merged.contains(&b));
        assert!(merged.contains(&other));
        assert_eq!(merged.low(), &[-3.0, -1.0]);
        assert_eq!(merged.high(), &[2.0, 5.0]);
    }

    #[test]
    fn center_is_midpoint() {
        let b = BoundingBox::new(&[0.0, 2.0], &[4.0, 2.0]);
        assert_eq!(b.center_along(0), 2.0);
        assert_eq!(b.center_along(1), 2.0);
    }
}
