//! Validation failures and stable error codes through the public API.

mod common;

use okrug_core::{
    DataError, GraphError, Method, MstError, OkrugBuilder, OkrugError, OkrugErrorCode,
};
use rstest::rstest;

use common::{column, line_graph, unit_floor};

#[rstest]
#[case(
    OkrugError::ZeroTargetRegions,
    OkrugErrorCode::ZeroTargetRegions,
    "OKRUG_ZERO_TARGET_REGIONS",
)]
#[case(
    OkrugError::InvalidTargetRegions { requested: 9, objects: 4 },
    OkrugErrorCode::InvalidTargetRegions,
    "OKRUG_INVALID_TARGET_REGIONS",
)]
#[case(
    OkrugError::GraphMatrixMismatch { graph_nodes: 4, matrix_rows: 3 },
    OkrugErrorCode::GraphMatrixMismatch,
    "OKRUG_GRAPH_MATRIX_MISMATCH",
)]
#[case(
    OkrugError::FloorLengthMismatch { weights: 2, objects: 4 },
    OkrugErrorCode::FloorLengthMismatch,
    "OKRUG_FLOOR_LENGTH_MISMATCH",
)]
#[case(OkrugError::MissingFloor, OkrugErrorCode::MissingFloor, "OKRUG_MISSING_FLOOR")]
#[case(
    OkrugError::InfeasibleFloor { attempts: 100 },
    OkrugErrorCode::InfeasibleFloor,
    "OKRUG_INFEASIBLE_FLOOR",
)]
#[case(
    OkrugError::Graph { source: GraphError::NeighborOutOfBounds { node: 0, neighbor: 9, node_count: 3 } },
    OkrugErrorCode::Graph,
    "OKRUG_INVALID_GRAPH",
)]
#[case(
    OkrugError::Data { source: DataError::RaggedRow { row: 1, len: 2, expected: 3 } },
    OkrugErrorCode::Data,
    "OKRUG_INVALID_DATA",
)]
#[case(
    OkrugError::Mst { source: MstError::EmptyGraph },
    OkrugErrorCode::Mst,
    "OKRUG_MST_FAILED",
)]
fn returns_expected_error_code(
    #[case] error: OkrugError,
    #[case] expected: OkrugErrorCode,
    #[case] as_str: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), as_str);
}

#[test]
fn graph_matrix_size_mismatch_is_rejected() {
    let graph = line_graph(4);
    let matrix = column(&[1.0, 2.0, 3.0]);
    let okrug = OkrugBuilder::new().with_target_regions(2).build().unwrap();

    let err = okrug.run(&graph, &matrix).unwrap_err();
    assert_eq!(
        err,
        OkrugError::GraphMatrixMismatch {
            graph_nodes: 4,
            matrix_rows: 3,
        }
    );
}

#[test]
fn floor_length_mismatch_is_rejected() {
    let graph = line_graph(4);
    let matrix = column(&[1.0, 2.0, 3.0, 4.0]);
    let okrug = OkrugBuilder::new()
        .with_target_regions(2)
        .with_floor(unit_floor(3, 1.0))
        .build()
        .unwrap();

    let err = okrug.run(&graph, &matrix).unwrap_err();
    assert_eq!(
        err,
        OkrugError::FloorLengthMismatch {
            weights: 3,
            objects: 4,
        }
    );
}

#[test]
fn target_above_defined_object_count_is_rejected() {
    let graph = line_graph(3);
    let matrix = column(&[1.0, 2.0, 3.0]);
    let okrug = OkrugBuilder::new().with_target_regions(5).build().unwrap();

    let err = okrug.run(&graph, &matrix).unwrap_err();
    assert_eq!(
        err,
        OkrugError::InvalidTargetRegions {
            requested: 5,
            objects: 3,
        }
    );
}

#[test]
fn undefined_rows_shrink_the_valid_target_range() {
    let graph = line_graph(3);
    let matrix = column(&[1.0, 2.0, 3.0])
        .with_undefined(vec![true, false, false])
        .unwrap();
    let okrug = OkrugBuilder::new().with_target_regions(3).build().unwrap();

    let err = okrug.run(&graph, &matrix).unwrap_err();
    assert_eq!(
        err,
        OkrugError::InvalidTargetRegions {
            requested: 3,
            objects: 2,
        }
    );
}

#[test]
fn maxp_builder_requires_a_floor() {
    let err = OkrugBuilder::new()
        .with_method(Method::MaxP)
        .build()
        .unwrap_err();
    assert_eq!(err, OkrugError::MissingFloor);
}

#[test]
fn infeasible_floor_surfaces_from_run() {
    let graph = line_graph(3);
    let matrix = column(&[1.0, 2.0, 3.0]);
    let okrug = OkrugBuilder::new()
        .with_method(Method::MaxP)
        .with_floor(unit_floor(3, 50.0))
        .with_seed(0)
        .build()
        .unwrap();

    let err = okrug.run(&graph, &matrix).unwrap_err();
    assert!(matches!(err, OkrugError::InfeasibleFloor { .. }));
}
