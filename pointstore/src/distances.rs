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

//! Supported distances
//!
//! Each metric supplies the exact point-to-point distance and the matching
//! lower bound from a point to a bounding region. Branch-and-bound searches
//! rely on `min_dist` never overestimating: it must be less than or equal to
//! `dist(x, y)` for every point `y` the region could contain, in the same
//! metric as `dist`. The bound for a query inside the region is zero.

use crate::regions::BoundingBox;
use std::fmt::Debug;

/// The trait that enables a metric
pub trait Metric: 'static + Send + Sync + Debug + Clone {
    /// Exact distance between two points of the same dimension.
    fn dist(x: &[f64], y: &[f64]) -> f64;
    /// The norm, `dist(x, 0)`.
    fn norm(x: &[f64]) -> f64;
    /// Admissible lower bound on the distance from `y` to any point inside
    /// `bounds`.
    fn min_dist(bounds: &BoundingBox, y: &[f64]) -> f64;
}

/// Per-axis gap between a coordinate and an interval, zero inside it.
#[inline]
fn axis_gap(low: f64, high: f64, y: f64) -> f64 {
    if y < low {
        low - y
    } else if y > high {
        y - high
    } else {
        0.0
    }
}

/// L2 norm, the square root of the sum of squares
#[derive(Debug, Clone)]
pub struct L2 {}

impl Metric for L2 {
    #[inline]
    fn dist(x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(xi, yi)| (xi - yi) * (xi - yi))
            .sum::<f64>()
            .sqrt()
    }

    #[inline]
    fn norm(x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum::<f64>().sqrt()
    }

    fn min_dist(bounds: &BoundingBox, y: &[f64]) -> f64 {
        bounds
            .low()
            .iter()
            .zip(bounds.high())
            .zip(y)
            .map(|((l, h), yi)| {
                let gap = axis_gap(*l, *h, *yi);
                gap * gap
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// L1 norm, the sum of absolute values
#[derive(Debug, Clone)]
pub struct L1 {}

impl Metric for L1 {
    #[inline]
    fn dist(x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(xi, yi)| (xi - yi).abs()).sum()
    }

    #[inline]
    fn norm(x: &[f64]) -> f64 {
        x.iter().map(|xi| xi.abs()).sum()
    }

    fn min_dist(bounds: &BoundingBox, y: &[f64]) -> f64 {
        bounds
            .low()
            .iter()
            .zip(bounds.high())
            .zip(y)
            .map(|((l, h), yi)| axis_gap(*l, *h, *yi))
            .sum()
    }
}

/// L infinity norm, the max of the absolute values of the elements
#[derive(Debug, Clone)]
pub struct Linfty {}

impl Metric for Linfty {
    #[inline]
    fn dist(x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(xi, yi)| (xi - yi).abs())
            .fold(0.0, f64::max)
    }

    #[inline]
    fn norm(x: &[f64]) -> f64 {
        x.iter().map(|xi| xi.abs()).fold(0.0, f64::max)
    }

    fn min_dist(bounds: &BoundingBox, y: &[f64]) -> f64 {
        bounds
            .low()
            .iter()
            .zip(bounds.high())
            .zip(y)
            .map(|((l, h), yi)| axis_gap(*l, *h, *yi))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_known_values() {
        assert_approx_eq!(L2::dist(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_approx_eq!(L2::norm(&[3.0, 4.0]), 5.0);
    }

    #[test]
    fn l1_linfty_known_values() {
        assert_approx_eq!(L1::dist(&[0.0, 0.0], &[3.0, -4.0]), 7.0);
        assert_approx_eq!(Linfty::dist(&[0.0, 0.0], &[3.0, -4.0]), 4.0);
    }

    #[test]
    fn min_dist_is_zero_inside() {
        let b = BoundingBox::new(&[0.0, 0.0], &[2.0, 2.0]);
        assert_eq!(L2::min_dist(&b, &[1.0, 1.5]), 0.0);
        assert_eq!(L1::min_dist(&b, &[2.0, 0.0]), 0.0);
        assert_eq!(Linfty::min_dist(&b, &[0.0, 2.0]), 0.0);
    }

    #[test]
    fn min_dist_never_overestimates() {
        // corners and edge midpoints of the box are reachable points, the
        // bound must stay below the exact distance to each of them
        let b = BoundingBox::new(&[-1.0, 0.0], &[1.0, 3.0]);
        let query = [4.0, -2.0];
        let inside = [
            [-1.0, 0.0],
            [1.0, 0.0],
            [-1.0, 3.0],
            [1.0, 3.0],
            [0.0, 1.5],
            [1.0, 2.0],
        ];
        for p in &inside {
            assert!(L2::min_dist(&b, &query) <= L2::dist(p, &query));
            assert!(L1::min_dist(&b, &query) <= L1::dist(p, &query));
            assert!(Linfty::min_dist(&b, &query) <= Linfty::dist(p, &query));
        }
    }

    #[test]
    fn l2_min_dist_exact_at_corner() {
        // closest reachable point to (4, -2) is the corner (1, 0)
        let b = BoundingBox::new(&[-1.0, 0.0], &[1.0, 3.0]);
        assert_approx_eq!(L2::min_dist(&b, &[4.0, -2.0]), L2::dist(&[1.0, 0.0], &[4.0, -2.0]));
    }
}
