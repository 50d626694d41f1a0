//! Unit tests for REDCAP agglomeration and partitioning.

use rstest::rstest;

use super::{Linkage, Order, agglomerate, run_redcap};
use crate::data::{AttributeMatrix, DistanceMetric};
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::objective::ObjectiveFunction;

fn single_column(values: &[f64]) -> AttributeMatrix {
    AttributeMatrix::from_rows(values.iter().map(|&v| vec![v]).collect()).expect("valid matrix")
}

fn line_graph(n: usize) -> ContiguityGraph {
    let edges: Vec<(u32, u32)> = (1..n as u32).map(|i| (i - 1, i)).collect();
    ContiguityGraph::from_edges(n, &edges).expect("valid graph")
}

#[rstest]
#[case(Linkage::Single, Order::FirstOrder)]
#[case(Linkage::Complete, Order::FirstOrder)]
#[case(Linkage::Average, Order::FirstOrder)]
#[case(Linkage::Single, Order::FullOrder)]
#[case(Linkage::Complete, Order::FullOrder)]
#[case(Linkage::Average, Order::FullOrder)]
fn connected_input_yields_spanning_sequence(#[case] linkage: Linkage, #[case] order: Order) {
    let graph = line_graph(6);
    let matrix = single_column(&[1.0, 2.0, 8.0, 9.0, 3.0, 4.0]);
    let edges = agglomerate(&graph, &matrix, DistanceMetric::Euclidean, linkage, order);
    assert_eq!(edges.len(), 5);
    for edge in &edges {
        // every recorded edge must be a real contiguity edge
        assert!(graph.neighbors(edge.source()).contains(&edge.target()));
    }
}

#[test]
fn disconnected_first_order_graph_stops_early() {
    let graph = ContiguityGraph::from_edges(5, &[(0, 1), (3, 4)]).expect("valid graph");
    let matrix = single_column(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let edges = agglomerate(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Single,
        Order::FirstOrder,
    );
    assert!(edges.len() < 4, "merge loop must stop before n - 1 merges");
    assert_eq!(edges.len(), 2);
}

#[test]
fn single_linkage_merges_shortest_edges_first() {
    let graph = line_graph(4);
    let matrix = single_column(&[0.0, 1.0, 10.0, 10.5]);
    let edges = agglomerate(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Single,
        Order::FirstOrder,
    );
    // lengths are 1, 9, 0.5; merge order must be (2,3), (0,1), (1,2)
    assert_eq!(edges[0].source(), 2);
    assert_eq!(edges[0].target(), 3);
    assert_eq!(edges[1].source(), 0);
    assert_eq!(edges[1].target(), 1);
    assert_eq!(edges[2].source(), 1);
    assert_eq!(edges[2].target(), 2);
}

#[test]
fn complete_linkage_defers_growing_heterogeneous_clusters() {
    // square with a short diagonal of values; complete linkage must pick the
    // tightest merges before bridging the far pair
    let graph = ContiguityGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]).expect("valid");
    let matrix = single_column(&[0.0, 0.1, 5.0, 5.1]);
    let edges = agglomerate(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Complete,
        Order::FullOrder,
    );
    assert_eq!(edges.len(), 3);
    let first_two: Vec<(u32, u32)> = edges[..2]
        .iter()
        .map(|e| (e.source(), e.target()))
        .collect();
    assert!(first_two.contains(&(0, 1)));
    assert!(first_two.contains(&(2, 3)));
}

#[rstest]
#[case(Order::FirstOrder)]
#[case(Order::FullOrder)]
fn partitions_cover_every_object(#[case] order: Order) {
    let graph = line_graph(7);
    let matrix = single_column(&[2.0, 2.5, 9.0, 9.5, 1.0, 1.5, 8.0]);
    let objective = ObjectiveFunction::new(&matrix);
    let regions = run_redcap(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Average,
        order,
        3,
        None,
        &objective,
    );
    assert_eq!(regions.len(), 3);
    let mut all: Vec<u32> = regions.iter().flatten().copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..7).collect::<Vec<u32>>());
    for region in &regions {
        assert!(graph.subset_connected(region));
    }
}

#[test]
fn line_of_four_is_cut_between_value_groups() {
    let graph = line_graph(4);
    let matrix = single_column(&[1.0, 1.0, 10.0, 11.0]);
    let objective = ObjectiveFunction::new(&matrix);
    let regions = run_redcap(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Single,
        Order::FirstOrder,
        2,
        None,
        &objective,
    );
    assert_eq!(regions, vec![vec![0, 1], vec![2, 3]]);
}

#[test]
fn floor_constraint_is_honoured_during_partitioning() {
    let graph = line_graph(6);
    let matrix = single_column(&[0.0, 10.0, 10.5, 11.0, 20.0, 20.5]);
    let floor = FloorConstraint::new(vec![1.0; 6], 2.0).expect("valid floor");
    let objective = ObjectiveFunction::new(&matrix);
    let regions = run_redcap(
        &graph,
        &matrix,
        DistanceMetric::Euclidean,
        Linkage::Single,
        Order::FirstOrder,
        3,
        Some(&floor),
        &objective,
    );
    for region in &regions {
        assert!(floor.satisfied(region.iter().copied()));
        assert!(region.len() >= 2);
    }
}

#[test]
fn ssd_is_monotone_in_region_count() {
    let graph = line_graph(8);
    let matrix = single_column(&[5.0, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0]);
    let objective = ObjectiveFunction::new(&matrix);
    let mut previous = f64::INFINITY;
    for target in 1..=5 {
        let regions = run_redcap(
            &graph,
            &matrix,
            DistanceMetric::Euclidean,
            Linkage::Average,
            Order::FullOrder,
            target,
            None,
            &objective,
        );
        let total: f64 = regions.iter().map(|r| objective.ssd(r)).sum();
        assert!(total <= previous + 1e-9);
        previous = total;
    }
}
