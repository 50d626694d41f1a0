//! SKATER: spanning-tree partitioning.
//!
//! Builds a minimum spanning forest over the contiguity graph, then
//! recursively removes the edge whose deletion most reduces total SSD until
//! the target region count is reached or no floor-respecting cut remains.
//! Disconnected input is handled by partitioning each component's tree
//! independently; the split budget is shared across components through the
//! common priority queue.

use tracing::debug;

use crate::data::{AttributeMatrix, DistanceMetric};
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::mst::{MstError, SpanningForest, build_spanning_forest};
use crate::objective::ObjectiveFunction;
use crate::partition::{group_components, partition_components};

/// The regions produced by a SKATER run plus the underlying spanning forest,
/// kept for external reporting of the `(origin, destination, length)` triples.
pub(crate) struct SkaterOutcome {
    pub(crate) regions: Vec<Vec<u32>>,
    pub(crate) forest: SpanningForest,
}

pub(crate) fn run_skater(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    target: usize,
    floor: Option<&FloorConstraint>,
    objective: &ObjectiveFunction<'_>,
) -> Result<SkaterOutcome, MstError> {
    let forest = build_spanning_forest(graph, matrix, metric)?;
    let tree_edges: Vec<(u32, u32)> = forest
        .edges()
        .iter()
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    let components = group_components(matrix, &tree_edges, objective);
    debug!(
        components = components.len(),
        edges = tree_edges.len(),
        target,
        "partitioning spanning forest"
    );
    let regions = partition_components(components, target, objective, floor);
    Ok(SkaterOutcome { regions, forest })
}
