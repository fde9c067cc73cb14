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

//! # The packed spatial tree
//!
//! A height-balanced R-tree over an immutable point store, queried with a
//! branch-and-bound best-first search. A query keeps two structures: the
//! bounded result heap, whose k-distance is the live pruning radius, and a
//! min-priority queue of pending subtrees keyed by their admissible lower
//! bound. A subtree is expanded only while its bound can still beat the
//! radius; because the queue is popped cheapest-first, the first popped
//! bound past the radius retires the whole queue.
//!
//! The batch entry point answers many queries in one coordinated recursive
//! descent. Each query carries its own result heap; a subtree is entered if
//! at least one query could still improve inside it, so queries sharing
//! subtrees pay for the traversal once.
//!
//! The tree never changes under a query. Callers that rebuild the store
//! must rebuild the tree; readers on other threads keep their own `Arc`.

use std::sync::Arc;

use hashbrown::HashMap;
use log::trace;

use super::node::{PageId, SpatialNode};
use super::query_tools::{CandidateQueue, KnnResultHeap, NeighborCollector};
use crate::errors::{SylvaError, SylvaResult};
use crate::stats::QueryStatistics;
use pointstore::{Metric, PointIndex, PointStore};

/// Identifies one query within a batch call. Assigned by the caller,
/// returned on the result mapping.
pub type QueryId = usize;

/// The id-keyed query mapping consumed by [`RTree::knn_batch`].
pub type QueryMap = HashMap<QueryId, Vec<f64>, fxhash::FxBuildHasher>;

/// The id-keyed result mapping produced by [`RTree::knn_batch`].
pub type BatchResult = HashMap<QueryId, Vec<(f64, PointIndex)>, fxhash::FxBuildHasher>;

/// Container for the parameters governing the shape of a packed tree.
#[derive(Debug)]
pub struct RTreeParameters<D: PointStore> {
    /// Most points a data page may hold.
    pub leaf_capacity: usize,
    /// Most child references a pointer page may hold.
    pub directory_capacity: usize,
    /// The point store this tree references
    pub point_store: Arc<D>,
}

/// One query of a batch descent: the query point and its private collector.
struct BatchQuery<'a> {
    id: QueryId,
    point: &'a [f64],
    collector: KnnResultHeap,
}

/// # Packed R-tree
///
/// The tree is a flat arena of pages plus the root id. It is cheap to share
/// behind an `Arc` and safe to query from many threads at once, the only
/// mutation anywhere below is the relaxed counters in [`QueryStatistics`].
#[derive(Debug)]
pub struct RTree<D: PointStore> {
    parameters: Arc<RTreeParameters<D>>,
    pages: Vec<SpatialNode>,
    root: PageId,
    stats: QueryStatistics,
}

impl<D: PointStore> RTree<D> {
    pub(crate) fn from_parts(
        parameters: Arc<RTreeParameters<D>>,
        pages: Vec<SpatialNode>,
        root: PageId,
    ) -> RTree<D> {
        RTree {
            parameters,
            pages,
            root,
            stats: QueryStatistics::new(),
        }
    }

    /// The root page id.
    pub fn root(&self) -> PageId {
        self.root
    }

    /// Resolves a page id against the arena.
    pub fn node(&self, page: PageId) -> SylvaResult<&SpatialNode> {
        self.pages
            .get(page.0)
            .ok_or(SylvaError::PageFault { page: page.0 })
    }

    /// The parameters the tree was packed with.
    pub fn parameters(&self) -> &RTreeParameters<D> {
        &self.parameters
    }

    /// The store the tree indexes.
    pub fn point_store(&self) -> &D {
        &self.parameters.point_store
    }

    /// The number of indexed points.
    pub fn len(&self) -> usize {
        self.parameters.point_store.len()
    }

    /// Whether the tree indexes nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Levels from root to leaf, inclusive. An empty tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut page = self.root;
        while let SpatialNode::Directory { entries } = &self.pages[page.0] {
            page = entries[0].child;
            height += 1;
        }
        height
    }

    /// The passive counters every query increments.
    pub fn stats(&self) -> &QueryStatistics {
        &self.stats
    }

    pub(crate) fn pages(&self) -> impl Iterator<Item = &SpatialNode> {
        self.pages.iter()
    }

    /// # K nearest neighbor query
    ///
    /// Returns the `k` points closest to `point`, ascending by distance with
    /// ties broken by point index, so reruns are bit-identical. Fewer than
    /// `k` indexed points simply give a shorter answer.
    ///
    /// The root is expanded immediately, its bound is trivially zero.
    /// Directory entries whose region contains the query are expanded
    /// greedily on the spot, nothing on the queue can beat a zero bound;
    /// the rest are queued behind their lower bound or discarded against
    /// the current radius. The loop then pops cheapest bounds until one
    /// exceeds the radius, at which point no queued subtree can hold a
    /// better neighbor.
    pub fn knn(&self, point: &[f64], k: usize) -> SylvaResult<Vec<(f64, PointIndex)>> {
        if k < 1 {
            return Err(SylvaError::InvalidArgument(
                "at least one neighbor has to be requested",
            ));
        }
        if point.len() != self.parameters.point_store.dim() {
            return Err(SylvaError::InvalidArgument(
                "query dimension does not match the store",
            ));
        }
        self.stats.record_knn_query();

        let mut collector = KnnResultHeap::new(k);
        let mut queue = CandidateQueue::new();
        let mut radius =
            self.expand_page(self.root, point, &mut collector, &mut queue, f64::INFINITY)?;

        while let Some(candidate) = queue.pop() {
            if candidate.min_dist > radius {
                break;
            }
            radius = self.expand_page(candidate.page, point, &mut collector, &mut queue, radius)?;
        }
        trace!(
            "knn over {} points finished with radius {}",
            self.len(),
            radius
        );
        Ok(collector.unpack())
    }

    /// Expands one page against a single query. Leaf entries go through the
    /// collector; directory entries are greedily descended on a zero bound,
    /// queued when they could beat `radius`, and dropped otherwise. Returns
    /// the tightened radius.
    fn expand_page<C: NeighborCollector>(
        &self,
        page: PageId,
        point: &[f64],
        collector: &mut C,
        queue: &mut CandidateQueue,
        mut radius: f64,
    ) -> SylvaResult<f64> {
        let store = &self.parameters.point_store;
        match self.node(page)? {
            SpatialNode::Leaf { points } => {
                let dists = store.distances_to_point(point, points)?;
                self.stats.record_distance_evals(dists.len());
                for (pi, dist) in points.iter().zip(dists) {
                    if dist <= radius {
                        radius = collector.collect(dist, *pi);
                    }
                }
            }
            SpatialNode::Directory { entries } => {
                for entry in entries {
                    let lower = D::Metric::min_dist(&entry.bounds, point);
                    if lower <= 0.0 {
                        radius = self.expand_page(entry.child, point, collector, queue, radius)?;
                    } else if lower <= radius {
                        queue.push(lower, entry.child);
                    }
                }
            }
        }
        Ok(radius)
    }

    /// # Batch k nearest neighbor query
    ///
    /// Answers every query of the mapping in one shared descent, returning
    /// per id exactly what [`RTree::knn`] returns for that point. An empty
    /// mapping is a no-op. All queries share `k`.
    pub fn knn_batch(&self, queries: &QueryMap, k: usize) -> SylvaResult<BatchResult> {
        if k < 1 {
            return Err(SylvaError::InvalidArgument(
                "at least one neighbor has to be requested",
            ));
        }
        if queries.is_empty() {
            return Ok(BatchResult::default());
        }
        if queries
            .values()
            .any(|point| point.len() != self.parameters.point_store.dim())
        {
            return Err(SylvaError::InvalidArgument(
                "query dimension does not match the store",
            ));
        }

        let mut arena: Vec<BatchQuery> = queries
            .iter()
            .map(|(id, point)| BatchQuery {
                id: *id,
                point: point.as_slice(),
                collector: KnnResultHeap::new(k),
            })
            .collect();
        arena.sort_by_key(|q| q.id);

        self.batch_descend(self.root, &mut arena)?;

        let mut results = BatchResult::default();
        for query in arena {
            self.stats.record_knn_query();
            results.insert(query.id, query.collector.unpack());
        }
        Ok(results)
    }

    /// One step of the coordinated descent. A leaf is charged to every
    /// query, entries times queries distance evaluations is the floor of
    /// what a leaf visit can cost. A directory ranks its entries by the
    /// closest any query comes to them and recurses into an entry while at
    /// least one query's k-distance still reaches that query's own bound on
    /// the entry; the ranking only helps radii tighten early, the per-query
    /// test is what keeps pruning safe.
    fn batch_descend(&self, page: PageId, queries: &mut [BatchQuery<'_>]) -> SylvaResult<()> {
        let store = &self.parameters.point_store;
        match self.node(page)? {
            SpatialNode::Leaf { points } => {
                for query in queries.iter_mut() {
                    let dists = store.distances_to_point(query.point, points)?;
                    self.stats.record_distance_evals(dists.len());
                    for (pi, dist) in points.iter().zip(dists) {
                        if dist <= query.collector.k_distance() {
                            query.collector.insert(dist, *pi);
                        }
                    }
                }
            }
            SpatialNode::Directory { entries } => {
                let mut ranked: Vec<(f64, usize, Vec<f64>)> = entries
                    .iter()
                    .enumerate()
                    .map(|(position, entry)| {
                        let bounds: Vec<f64> = queries
                            .iter()
                            .map(|query| D::Metric::min_dist(&entry.bounds, query.point))
                            .collect();
                        let key = bounds.iter().cloned().fold(f64::INFINITY, f64::min);
                        (key, position, bounds)
                    })
                    .collect();
                // stable, entry order breaks key ties
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (_key, position, bounds) in ranked {
                    let reachable = queries
                        .iter()
                        .zip(&bounds)
                        .any(|(query, lower)| *lower <= query.collector.k_distance());
                    if reachable {
                        self.batch_descend(entries[position].child, queries)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rtree::builders::tests::random_store;
    use crate::rtree::builders::RTreeBuilder;
    use crate::utils::linear_knn;
    use pointstore::data_sources::DataRam;
    use pointstore::L2;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// The worked example: A at the origin, B and C tied at distance one,
    /// D far away.
    fn build_quad_tree() -> RTree<DataRam<L2>> {
        let data = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
        let store = Arc::new(DataRam::<L2>::new(data, 2).unwrap());
        let mut builder = RTreeBuilder::new();
        builder.set_leaf_capacity(2).set_directory_capacity(2);
        builder.build(store).unwrap()
    }

    fn batch_of(points: &[(QueryId, Vec<f64>)]) -> QueryMap {
        points.iter().cloned().collect()
    }

    #[test]
    fn two_nearest_of_the_quad() {
        let tree = build_quad_tree();
        let nbrs = tree.knn(&[0.0, 0.0], 2).unwrap();
        assert_eq!(nbrs.len(), 2);
        assert_eq!(nbrs[0], (0.0, 0));
        // B and C tie at distance one, the smaller index wins
        assert_approx_eq!(nbrs[1].0, 1.0);
        assert_eq!(nbrs[1].1, 1);
    }

    #[test]
    fn oversized_k_returns_everything() {
        let tree = build_quad_tree();
        let nbrs = tree.knn(&[0.0, 0.0], 5).unwrap();
        assert_eq!(
            nbrs.iter().map(|(_, pi)| *pi).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_approx_eq!(nbrs[3].0, 50.0f64.sqrt());
    }

    #[test]
    fn zero_k_is_rejected_before_any_traversal() {
        let tree = build_quad_tree();
        tree.stats().reset();
        assert!(tree.knn(&[0.0, 0.0], 0).is_err());
        assert!(tree.knn_batch(&batch_of(&[(0, vec![0.0, 0.0])]), 0).is_err());
        assert_eq!(tree.stats().distance_evals(), 0);
        assert_eq!(tree.stats().knn_queries(), 0);
    }

    #[test]
    fn empty_tree_gives_empty_answers() {
        let store: Arc<DataRam<L2>> = Arc::new(DataRam::new(Vec::new(), 2).unwrap());
        let tree = RTreeBuilder::new().build(store).unwrap();
        assert_eq!(tree.knn(&[1.0, 2.0], 3).unwrap(), Vec::new());
        let results = tree
            .knn_batch(&batch_of(&[(7, vec![1.0, 2.0])]), 3)
            .unwrap();
        assert_eq!(results[&7], Vec::new());
    }

    #[test]
    fn mismatched_query_dimension_is_rejected() {
        let tree = build_quad_tree();
        assert!(tree.knn(&[0.0, 0.0, 0.0], 2).is_err());
        assert!(tree
            .knn_batch(&batch_of(&[(0, vec![0.0])]), 2)
            .is_err());
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let tree = build_quad_tree();
        let results = tree.knn_batch(&QueryMap::default(), 4).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn matches_linear_scan_across_tree_shapes() {
        let store = random_store(400, 2, 11);
        let mut rng = SmallRng::seed_from_u64(12);
        for (leaf_cap, dir_cap) in [(2, 2), (8, 4), (32, 8), (500, 8)] {
            let mut builder = RTreeBuilder::new();
            builder
                .set_leaf_capacity(leaf_cap)
                .set_directory_capacity(dir_cap);
            let tree = builder.build(Arc::clone(&store)).unwrap();
            for _ in 0..20 {
                let query = [rng.gen_range(-12.0..12.0), rng.gen_range(-12.0..12.0)];
                let k = rng.gen_range(1..20);
                let from_tree = tree.knn(&query, k).unwrap();
                let from_scan = linear_knn(store.as_ref(), &query, k).unwrap();
                assert_eq!(from_tree, from_scan);
            }
        }
    }

    #[test]
    fn results_are_sorted_and_duplicate_free() {
        let store = random_store(300, 3, 13);
        let tree = RTreeBuilder::new().build(Arc::clone(&store)).unwrap();
        let nbrs = tree.knn(&[0.0, 0.0, 0.0], 25).unwrap();
        assert_eq!(nbrs.len(), 25);
        for w in nbrs.windows(2) {
            assert!(w[0].0 <= w[1].0);
            assert!(w[0].1 != w[1].1);
        }
        let mut ids: Vec<_> = nbrs.iter().map(|(_, pi)| *pi).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn never_evaluates_more_distances_than_a_scan() {
        let store = random_store(1000, 2, 14);
        let mut builder = RTreeBuilder::new();
        builder.set_leaf_capacity(8).set_directory_capacity(4);
        let tree = builder.build(Arc::clone(&store)).unwrap();
        tree.stats().reset();
        tree.knn(&[0.25, -0.75], 5).unwrap();
        let evals = tree.stats().distance_evals();
        assert!(evals <= store.len());
        // a packed tree over uniform data prunes the bulk of the leaves
        assert!(evals < store.len() / 2, "only pruned down to {}", evals);
    }

    #[test]
    fn reruns_are_bit_identical() {
        // a grid makes distance ties common
        let mut data = Vec::new();
        for x in 0..10 {
            for y in 0..10 {
                data.push(x as f64);
                data.push(y as f64);
            }
        }
        let store = Arc::new(DataRam::<L2>::new(data, 2).unwrap());
        let mut builder = RTreeBuilder::new();
        builder.set_leaf_capacity(4).set_directory_capacity(3);
        let tree = builder.build(store).unwrap();
        let first = tree.knn(&[4.5, 4.5], 12).unwrap();
        for _ in 0..5 {
            assert_eq!(tree.knn(&[4.5, 4.5], 12).unwrap(), first);
        }
    }

    #[test]
    fn batch_matches_single_queries() {
        let store = random_store(500, 2, 15);
        let mut builder = RTreeBuilder::new();
        builder.set_leaf_capacity(8).set_directory_capacity(4);
        let tree = builder.build(store).unwrap();
        let mut rng = SmallRng::seed_from_u64(16);
        let queries: Vec<(QueryId, Vec<f64>)> = (0..40)
            .map(|id| {
                (
                    id,
                    vec![rng.gen_range(-12.0..12.0), rng.gen_range(-12.0..12.0)],
                )
            })
            .collect();
        let results = tree.knn_batch(&batch_of(&queries), 7).unwrap();
        assert_eq!(results.len(), queries.len());
        for (id, point) in &queries {
            assert_eq!(results[id], tree.knn(point, 7).unwrap(), "query {}", id);
        }
    }

    #[test]
    fn batch_matches_single_on_ties() {
        let mut data = Vec::new();
        for x in 0..8 {
            for y in 0..8 {
                data.push(x as f64);
                data.push(y as f64);
            }
        }
        let store = Arc::new(DataRam::<L2>::new(data, 2).unwrap());
        let mut builder = RTreeBuilder::new();
        builder.set_leaf_capacity(3).set_directory_capacity(2);
        let tree = builder.build(store).unwrap();
        let queries: Vec<(QueryId, Vec<f64>)> = vec![
            (0, vec![3.5, 3.5]),
            (1, vec![0.0, 0.0]),
            (2, vec![7.0, 0.0]),
        ];
        let results = tree.knn_batch(&batch_of(&queries), 6).unwrap();
        for (id, point) in &queries {
            assert_eq!(results[id], tree.knn(point, 6).unwrap());
        }
    }

    #[test]
    fn batch_counts_one_query_per_id() {
        let tree = build_quad_tree();
        tree.stats().reset();
        let queries = batch_of(&[
            (0, vec![0.0, 0.0]),
            (1, vec![5.0, 5.0]),
            (2, vec![-3.0, 2.0]),
        ]);
        tree.knn_batch(&queries, 2).unwrap();
        assert_eq!(tree.stats().knn_queries(), 3);
    }

    #[test]
    fn dangling_page_is_a_page_fault() {
        let tree = build_quad_tree();
        assert!(matches!(
            tree.node(PageId(9999)),
            Err(SylvaError::PageFault { page: 9999 })
        ));
    }
}
