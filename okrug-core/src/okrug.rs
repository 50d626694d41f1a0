//! Regionalization orchestration for the okrug library.
//!
//! Provides the [`Okrug`] runtime entry point: input validation shared by
//! every method, dispatch to the SKATER, REDCAP and max-p solvers, and
//! assembly of the validated [`Regionalization`] output.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, instrument};

use crate::builder::Method;
use crate::data::{AttributeMatrix, DistanceMetric};
use crate::error::{OkrugError, Result};
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::maxp::{MaxPParams, run_maxp};
use crate::objective::ObjectiveFunction;
use crate::redcap::run_redcap;
use crate::result::Regionalization;
use crate::skater::run_skater;

/// Entry point for running a configured regionalization.
///
/// # Examples
/// ```
/// use okrug_core::{AttributeMatrix, ContiguityGraph, Method, OkrugBuilder};
///
/// let graph = ContiguityGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// let matrix = AttributeMatrix::from_rows(vec![
///     vec![1.0],
///     vec![1.0],
///     vec![10.0],
///     vec![11.0],
/// ])?;
/// let okrug = OkrugBuilder::new()
///     .with_method(Method::Skater)
///     .with_target_regions(2)
///     .build()?;
/// let result = okrug.run(&graph, &matrix)?;
/// assert_eq!(result.region_count(), 2);
/// assert_eq!(result.regions(), vec![vec![0, 1], vec![2, 3]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Okrug {
    method: Method,
    metric: DistanceMetric,
    target_regions: usize,
    floor: Option<FloorConstraint>,
    seed: Option<u64>,
    maxp: MaxPParams,
}

impl Okrug {
    pub(crate) fn new(
        method: Method,
        metric: DistanceMetric,
        target_regions: usize,
        floor: Option<FloorConstraint>,
        seed: Option<u64>,
        maxp: MaxPParams,
    ) -> Self {
        Self {
            method,
            metric,
            target_regions,
            floor,
            seed,
            maxp,
        }
    }

    /// Returns the configured method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the configured region count.
    #[must_use]
    pub fn target_regions(&self) -> usize {
        self.target_regions
    }

    /// Executes the configured method over a contiguity graph and its
    /// attribute matrix.
    ///
    /// Empty input yields an empty result. Undefined attribute rows stay
    /// unassigned in the output.
    ///
    /// # Errors
    /// Returns [`OkrugError::GraphMatrixMismatch`] when the graph and matrix
    /// disagree on object count, [`OkrugError::FloorLengthMismatch`] when the
    /// floor weight vector has the wrong length,
    /// [`OkrugError::InvalidTargetRegions`] when SKATER or REDCAP requests
    /// more regions than there are defined objects, and
    /// [`OkrugError::InfeasibleFloor`] when max-p exhausts its construction
    /// attempts.
    #[instrument(skip_all, fields(objects = matrix.rows(), method = ?self.method))]
    pub fn run(
        &self,
        graph: &ContiguityGraph,
        matrix: &AttributeMatrix,
    ) -> Result<Regionalization> {
        if graph.len() != matrix.rows() {
            return Err(OkrugError::GraphMatrixMismatch {
                graph_nodes: graph.len(),
                matrix_rows: matrix.rows(),
            });
        }
        if let Some(floor) = &self.floor {
            if floor.len() != matrix.rows() {
                return Err(OkrugError::FloorLengthMismatch {
                    weights: floor.len(),
                    objects: matrix.rows(),
                });
            }
        }
        let defined = matrix.defined_ids().len();
        if defined == 0 {
            return Ok(Regionalization::from_regions(&[], matrix.rows(), 0.0));
        }
        if !matches!(self.method, Method::MaxP)
            && (self.target_regions == 0 || self.target_regions > defined)
        {
            return Err(OkrugError::InvalidTargetRegions {
                requested: self.target_regions,
                objects: defined,
            });
        }

        let objective = ObjectiveFunction::new(matrix);
        let mut forest = None;
        let regions = match self.method {
            Method::Skater => {
                let outcome = run_skater(
                    graph,
                    matrix,
                    self.metric,
                    self.target_regions,
                    self.floor.as_ref(),
                    &objective,
                )?;
                debug!(
                    spanning_edges = outcome.forest.edges().len(),
                    components = outcome.forest.component_count(),
                    "spanning forest built"
                );
                forest = Some(outcome.forest);
                outcome.regions
            }
            Method::Redcap { linkage, order } => run_redcap(
                graph,
                matrix,
                self.metric,
                linkage,
                order,
                self.target_regions,
                self.floor.as_ref(),
                &objective,
            ),
            Method::MaxP => {
                // build() guarantees the floor is present for max-p.
                let floor = self.floor.as_ref().ok_or(OkrugError::MissingFloor)?;
                let mut rng = match self.seed {
                    Some(seed) => SmallRng::seed_from_u64(seed),
                    None => SmallRng::from_entropy(),
                };
                run_maxp(
                    graph,
                    matrix,
                    self.metric,
                    floor,
                    &self.maxp,
                    &mut rng,
                    &objective,
                )?
            }
        };

        let total: f64 = regions.iter().map(|region| objective.ssd(region)).sum();
        debug!(
            regions = regions.len(),
            objective = total,
            "regionalization finished"
        );
        let mut result = Regionalization::from_regions(&regions, matrix.rows(), total);
        if let Some(forest) = forest {
            result = result.with_spanning_forest(forest);
        }
        Ok(result)
    }
}
