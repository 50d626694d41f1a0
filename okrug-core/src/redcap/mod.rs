//! REDCAP: hierarchical spanning-tree clustering with selectable linkage.
//!
//! Nodes are agglomerated into a cluster tree by repeatedly merging the two
//! closest spatially adjacent clusters. The linkage rule and the distance
//! order are plain policy values rather than a class hierarchy:
//!
//! - first-order variants keep cluster distances fixed to aggregates of the
//!   original contiguity-edge lengths;
//! - full-order variants recompute the attribute distance between a merged
//!   cluster and every adjacent cluster after each merge (min, max, or mean
//!   over all cross-cluster object pairs).
//!
//! Each accepted merge records the contiguity edge that realised it, so the
//! merge sequence forms a spanning tree feeding the same best-cut
//! partitioning as SKATER. Fewer than `n − 1` merges signal a disconnected
//! first-order graph; the remaining components are then partitioned
//! independently.

use std::collections::HashMap;

use tracing::debug;

use crate::data::{AttributeMatrix, DistanceMetric};
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::mst::SpanningEdge;
use crate::objective::ObjectiveFunction;
use crate::partition::{group_components, partition_components};
use crate::union_find::DisjointSet;

/// Policy for the distance between two clusters during agglomeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Linkage {
    /// Minimum over contributing distances.
    #[default]
    Single,
    /// Maximum over contributing distances.
    Complete,
    /// Size-weighted mean over contributing distances.
    Average,
}

/// Policy for when cluster distances are recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Distances are fixed aggregates of first-order edge lengths.
    #[default]
    FirstOrder,
    /// Distances to a merged cluster are recomputed after every merge over
    /// all cross-cluster object pairs.
    FullOrder,
}

/// The minimal contiguity edge known to connect two clusters; kept so every
/// merge can be realised by a real first-order edge.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViaEdge {
    source: u32,
    target: u32,
    length: f64,
}

impl ViaEdge {
    fn min(self, other: Self) -> Self {
        let keep_self = self
            .length
            .total_cmp(&other.length)
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.target.cmp(&other.target))
            .is_le();
        if keep_self { self } else { other }
    }
}

/// Distance state for one adjacent cluster pair.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PairLink {
    dist: f64,
    /// Number of contributing distances (edge count for first-order,
    /// cross-pair count for full-order averages).
    count: f64,
    via: ViaEdge,
}

type NeighborMaps = HashMap<usize, HashMap<usize, PairLink>>;

/// Agglomerates defined objects into a spanning edge sequence in merge order.
pub(crate) fn agglomerate(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    linkage: Linkage,
    order: Order,
) -> Vec<SpanningEdge> {
    let n = graph.len();
    let defined = matrix.defined_ids();
    let mut set = DisjointSet::new(n);
    let mut members: Vec<Vec<u32>> = (0..n as u32).map(|id| vec![id]).collect();
    let mut maps = first_order_links(graph, matrix, metric);

    let mut edges = Vec::new();
    while edges.len() + 1 < defined.len() {
        let Some((ra, rb)) = closest_pair(&maps) else {
            break;
        };
        let link = maps[&ra][&rb];
        edges.push(SpanningEdge::new(
            link.via.source,
            link.via.target,
            link.via.length,
        ));

        let map_a = maps.remove(&ra).unwrap_or_default();
        let map_b = maps.remove(&rb).unwrap_or_default();
        let root = set.union(ra, rb);
        let merged_members = {
            let mut combined = std::mem::take(&mut members[ra]);
            combined.append(&mut members[rb]);
            combined
        };

        let mut combined_links: HashMap<usize, PairLink> = HashMap::new();
        for (other, link) in map_a.into_iter().chain(map_b) {
            if other == ra || other == rb {
                continue;
            }
            let entry = match combined_links.remove(&other) {
                Some(prior) => combine_links(linkage, prior, link),
                None => link,
            };
            combined_links.insert(other, entry);
        }

        if order == Order::FullOrder {
            for (&other, link) in &mut combined_links {
                link.dist = full_order_distance(
                    matrix,
                    metric,
                    linkage,
                    &merged_members,
                    &members[other],
                );
                link.count = (merged_members.len() * members[other].len()) as f64;
            }
        }

        for (&other, link) in &combined_links {
            let Some(other_map) = maps.get_mut(&other) else {
                continue;
            };
            other_map.remove(&ra);
            other_map.remove(&rb);
            other_map.insert(root, *link);
        }
        members[root] = merged_members;
        maps.insert(root, combined_links);
    }

    debug!(
        merges = edges.len(),
        objects = defined.len(),
        ?linkage,
        ?order,
        "agglomeration finished"
    );
    edges
}

/// Builds the initial cluster-pair links from the first-order edges.
fn first_order_links(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
) -> NeighborMaps {
    let mut maps: NeighborMaps = HashMap::new();
    for i in matrix.defined_ids() {
        for &j in graph.neighbors(i) {
            if j <= i || !matrix.is_defined(j as usize) {
                continue;
            }
            let length = metric.dissimilarity(matrix, i, j);
            let link = PairLink {
                dist: length,
                count: 1.0,
                via: ViaEdge {
                    source: i,
                    target: j,
                    length,
                },
            };
            maps.entry(i as usize).or_default().insert(j as usize, link);
            maps.entry(j as usize).or_default().insert(i as usize, link);
        }
    }
    maps
}

/// Scans for the globally shortest remaining cross-cluster pair.
///
/// Selection is by `(distance, lower root, higher root)`, so the result does
/// not depend on map iteration order.
fn closest_pair(maps: &NeighborMaps) -> Option<(usize, usize)> {
    let mut best: Option<(f64, usize, usize)> = None;
    for (&ra, inner) in maps {
        for (&rb, link) in inner {
            if rb <= ra {
                continue;
            }
            let candidate = (link.dist, ra, rb);
            let better = best.map_or(true, |(dist, a, b)| {
                candidate
                    .0
                    .total_cmp(&dist)
                    .then_with(|| candidate.1.cmp(&a))
                    .then_with(|| candidate.2.cmp(&b))
                    .is_lt()
            });
            if better {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, ra, rb)| (ra, rb))
}

fn combine_links(linkage: Linkage, left: PairLink, right: PairLink) -> PairLink {
    let (dist, count) = match linkage {
        Linkage::Single => (left.dist.min(right.dist), left.count + right.count),
        Linkage::Complete => (left.dist.max(right.dist), left.count + right.count),
        Linkage::Average => {
            let count = left.count + right.count;
            (
                (left.dist * left.count + right.dist * right.count) / count,
                count,
            )
        }
    };
    PairLink {
        dist,
        count,
        via: left.via.min(right.via),
    }
}

/// Exact linkage distance over all cross-cluster object pairs.
fn full_order_distance(
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    linkage: Linkage,
    left: &[u32],
    right: &[u32],
) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &a in left {
        for &b in right {
            let d = metric.dissimilarity(matrix, a, b);
            min = min.min(d);
            max = max.max(d);
            sum += d;
        }
    }
    match linkage {
        Linkage::Single => min,
        Linkage::Complete => max,
        Linkage::Average => sum / (left.len() * right.len()) as f64,
    }
}

/// Runs the full REDCAP pipeline: agglomerate, then best-cut partition.
pub(crate) fn run_redcap(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    linkage: Linkage,
    order: Order,
    target: usize,
    floor: Option<&FloorConstraint>,
    objective: &ObjectiveFunction<'_>,
) -> Vec<Vec<u32>> {
    let spanning = agglomerate(graph, matrix, metric, linkage, order);
    let tree_edges: Vec<(u32, u32)> = spanning
        .iter()
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    let components = group_components(matrix, &tree_edges, objective);
    partition_components(components, target, objective, floor)
}

#[cfg(test)]
mod tests;
