use rand::SeedableRng;
use rand::rngs::SmallRng;
use rstest::rstest;

use super::{LocalSearch, MaxPParams, run_maxp};
use crate::data::{AttributeMatrix, DistanceMetric};
use crate::error::OkrugError;
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::objective::ObjectiveFunction;

fn line_graph(n: usize) -> ContiguityGraph {
    let edges: Vec<(u32, u32)> = (1..n as u32).map(|i| (i - 1, i)).collect();
    ContiguityGraph::from_edges(n, &edges).unwrap()
}

fn column(values: &[f64]) -> AttributeMatrix {
    let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
    AttributeMatrix::from_rows(rows).unwrap()
}

fn unit_floor(n: usize, threshold: f64) -> FloorConstraint {
    FloorConstraint::new(vec![1.0; n], threshold).unwrap()
}

fn run(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    floor: &FloorConstraint,
    params: &MaxPParams,
    seed: u64,
) -> Result<Vec<Vec<u32>>, OkrugError> {
    let objective = ObjectiveFunction::new(matrix);
    let mut rng = SmallRng::seed_from_u64(seed);
    run_maxp(
        graph,
        matrix,
        DistanceMetric::Euclidean,
        floor,
        params,
        &mut rng,
        &objective,
    )
}

#[test]
fn five_line_with_floor_three_meets_floor_everywhere() {
    let graph = line_graph(5);
    let matrix = column(&[1.0, 1.0, 1.0, 1.0, 1.0]);
    let floor = unit_floor(5, 3.0);

    let regions = run(&graph, &matrix, &floor, &MaxPParams::default(), 7).unwrap();

    let mut covered: Vec<u32> = regions.iter().flatten().copied().collect();
    covered.sort_unstable();
    assert_eq!(covered, vec![0, 1, 2, 3, 4]);
    for region in &regions {
        assert!(region.len() >= 3, "floor violated by {region:?}");
        assert!(graph.subset_connected(region));
    }
}

#[rstest]
#[case(LocalSearch::Greedy)]
#[case(LocalSearch::SimulatedAnnealing { cooling_rate: 0.85 })]
#[case(LocalSearch::Tabu { tabu_length: 8 })]
fn every_strategy_keeps_regions_feasible(#[case] local_search: LocalSearch) {
    let graph = line_graph(8);
    let matrix = column(&[0.0, 0.2, 0.1, 5.0, 5.2, 5.1, 9.0, 9.2]);
    let floor = unit_floor(8, 2.0);
    let params = MaxPParams {
        local_search,
        ..MaxPParams::default()
    };

    let regions = run(&graph, &matrix, &floor, &params, 42).unwrap();

    let mut covered: Vec<u32> = regions.iter().flatten().copied().collect();
    covered.sort_unstable();
    assert_eq!(covered, (0..8).collect::<Vec<u32>>());
    for region in &regions {
        assert!(floor.satisfied(region.iter().copied()));
        assert!(graph.subset_connected(region));
    }
}

#[test]
fn identical_seed_reproduces_the_partition() {
    let graph = line_graph(7);
    let matrix = column(&[3.0, 3.1, 8.0, 8.2, 1.0, 1.1, 1.2]);
    let floor = unit_floor(7, 2.0);
    let params = MaxPParams::default();

    let first = run(&graph, &matrix, &floor, &params, 9001).unwrap();
    let second = run(&graph, &matrix, &floor, &params, 9001).unwrap();

    assert_eq!(first, second);
}

#[test]
fn unreachable_floor_reports_infeasibility_with_attempt_count() {
    let graph = line_graph(4);
    let matrix = column(&[1.0, 2.0, 3.0, 4.0]);
    let floor = unit_floor(4, 100.0);
    let params = MaxPParams {
        max_attempts: 5,
        ..MaxPParams::default()
    };

    let err = run(&graph, &matrix, &floor, &params, 1).unwrap_err();
    assert!(matches!(err, OkrugError::InfeasibleFloor { attempts: 5 }));
}

#[test]
fn priority_seeds_start_the_first_region() {
    let graph = line_graph(6);
    let matrix = column(&[0.0, 0.1, 0.2, 7.0, 7.1, 7.2]);
    let floor = unit_floor(6, 3.0);
    let params = MaxPParams {
        seeds: vec![3],
        local_search: LocalSearch::Greedy,
        ..MaxPParams::default()
    };

    let regions = run(&graph, &matrix, &floor, &params, 11).unwrap();
    let seeded = regions.iter().find(|region| region.contains(&3)).unwrap();
    assert!(floor.satisfied(seeded.iter().copied()));
}

#[test]
fn undefined_rows_stay_unassigned() {
    let graph = line_graph(6);
    let matrix = column(&[2.0, 2.1, 2.2, 2.3, 2.4, 99.0])
        .with_undefined(vec![false, false, false, false, false, true])
        .unwrap();
    let floor = unit_floor(6, 2.0);

    let regions = run(&graph, &matrix, &floor, &MaxPParams::default(), 3).unwrap();

    let covered: Vec<u32> = regions.iter().flatten().copied().collect();
    assert!(!covered.contains(&5));
    let mut sorted = covered;
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
}

#[test]
fn whole_line_collapses_to_one_region_when_floor_is_nearly_everything() {
    let graph = line_graph(5);
    let matrix = column(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let floor = unit_floor(5, 4.0);

    let regions = run(&graph, &matrix, &floor, &MaxPParams::default(), 5).unwrap();

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0], vec![0, 1, 2, 3, 4]);
}
