//! Minimum spanning tree construction over the contiguity graph.
//!
//! Edges exist only where the contiguity graph allows them and are weighted
//! by attribute dissimilarity under the selected metric. Prim's algorithm is
//! run per connected component with a deterministic tie-break, so a fixed
//! input ordering always reproduces the same tree. Disconnected input yields
//! a spanning forest and each component is treated independently downstream.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;

use crate::data::{AttributeMatrix, DistanceMetric};
use crate::graph::ContiguityGraph;

/// Errors returned while building a spanning forest.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MstError {
    /// The caller requested a spanning tree for an empty graph.
    #[error("cannot build a spanning tree for an empty graph")]
    EmptyGraph,
}

/// A spanning-tree edge: origin id, destination id and dissimilarity length.
///
/// The triple form is the reporting surface used to persist derived weights
/// externally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpanningEdge {
    source: u32,
    target: u32,
    length: f64,
}

impl SpanningEdge {
    pub(crate) fn new(source: u32, target: u32, length: f64) -> Self {
        Self {
            source,
            target,
            length,
        }
    }

    /// Returns the origin object id.
    #[must_use]
    pub fn source(&self) -> u32 {
        self.source
    }

    /// Returns the destination object id.
    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Returns the dissimilarity length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }
}

/// The output of spanning-forest construction.
///
/// When the contiguity graph is connected over the defined objects, the
/// forest is a single tree with `n − 1` edges.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanningForest {
    edges: Vec<SpanningEdge>,
    component_count: usize,
}

impl SpanningForest {
    /// Returns the forest edges in acceptance order.
    #[must_use]
    pub fn edges(&self) -> &[SpanningEdge] {
        &self.edges
    }

    /// Returns the number of connected components spanned.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Returns `true` when the forest spans a single component.
    #[must_use]
    pub fn is_tree(&self) -> bool {
        self.component_count == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FrontierEdge {
    length: f64,
    source: u32,
    target: u32,
}

impl Eq for FrontierEdge {}

impl Ord for FrontierEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the shortest edge wins, with
        // id tie-breaks for reproducibility under equal lengths.
        other
            .length
            .total_cmp(&self.length)
            .then_with(|| other.source.cmp(&self.source))
            .then_with(|| other.target.cmp(&self.target))
    }
}

impl PartialOrd for FrontierEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds a minimum spanning forest with Prim's algorithm.
///
/// Undefined rows are excluded entirely; they appear in no tree and count
/// toward no component.
///
/// # Errors
/// Returns [`MstError::EmptyGraph`] when the graph has no nodes.
pub fn build_spanning_forest(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
) -> Result<SpanningForest, MstError> {
    if graph.is_empty() {
        return Err(MstError::EmptyGraph);
    }

    let n = graph.len();
    let mut visited = vec![false; n];
    let mut edges = Vec::new();
    let mut component_count = 0usize;

    for start in 0..n {
        if visited[start] || !matrix.is_defined(start) {
            continue;
        }
        component_count += 1;
        visited[start] = true;
        let mut frontier = BinaryHeap::new();
        push_neighbors(graph, matrix, metric, start as u32, &visited, &mut frontier);

        while let Some(FrontierEdge {
            length,
            source,
            target,
        }) = frontier.pop()
        {
            if visited[target as usize] {
                continue;
            }
            visited[target as usize] = true;
            edges.push(SpanningEdge::new(source, target, length));
            push_neighbors(graph, matrix, metric, target, &visited, &mut frontier);
        }
    }

    Ok(SpanningForest {
        edges,
        component_count,
    })
}

fn push_neighbors(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    node: u32,
    visited: &[bool],
    frontier: &mut BinaryHeap<FrontierEdge>,
) {
    for &next in graph.neighbors(node) {
        if visited[next as usize] || !matrix.is_defined(next as usize) {
            continue;
        }
        frontier.push(FrontierEdge {
            length: metric.dissimilarity(matrix, node, next),
            source: node,
            target: next,
        });
    }
}
