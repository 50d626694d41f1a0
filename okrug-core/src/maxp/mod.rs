//! Max-p: floor-driven region growing with local-search refinement.
//!
//! Phase 1 seeds regions at random and grows each one neighbour by neighbour
//! until its floor weight is met, retrying the whole construction when a
//! region strands before reaching the floor. Objects that cannot be grown
//! into any feasible region become enclaves and are merged afterwards into
//! the adjacent region whose mean is nearest under the configured metric.
//!
//! Phase 2 sweeps single-object moves between neighbouring regions. A move
//! is only considered when the donor region stays connected and keeps its
//! floor; acceptance is a policy value: greedy, simulated annealing with a
//! caller-supplied cooling rate, or tabu search over a fixed-length FIFO of
//! reversed moves.
//!
//! All randomness flows through one explicit RNG instance seeded by the
//! caller, so identical seeds reproduce identical partitions.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::data::{AttributeMatrix, DistanceMetric};
use crate::error::OkrugError;
use crate::floor::FloorConstraint;
use crate::graph::ContiguityGraph;
use crate::objective::ObjectiveFunction;

/// Hard cap on construction retries before reporting infeasibility.
pub const MAX_ATTEMPTS: usize = 100;

/// Acceptance policy for phase-2 moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalSearch {
    /// Accept a move only when it improves the objective.
    Greedy,
    /// Accept improving moves, and worsening moves with probability
    /// `exp(-delta / temperature)`; the temperature decays by `cooling_rate`
    /// after every pass.
    SimulatedAnnealing {
        /// Multiplicative temperature decay in `(0, 1)`.
        cooling_rate: f64,
    },
    /// Accept improving moves unless the move is on the tabu list.
    Tabu {
        /// Length of the FIFO of forbidden reversed moves.
        tabu_length: usize,
    },
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::Greedy
    }
}

/// Tuning parameters for a max-p run.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxPParams {
    /// Construction retries before the run fails with `InfeasibleFloor`.
    pub max_attempts: usize,
    /// Local-search pass budget.
    pub iterations: usize,
    /// Acceptance policy for local-search moves.
    pub local_search: LocalSearch,
    /// Priority seed objects; remaining objects are appended shuffled.
    pub seeds: Vec<u32>,
}

impl Default for MaxPParams {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            iterations: 10,
            local_search: LocalSearch::default(),
            seeds: Vec::new(),
        }
    }
}

/// The single mutable partition state threaded through growth and search.
///
/// Membership is tracked both ways (object → region id, region → sorted
/// member list) and mutated only through [`PartitionState::apply_move`], so
/// the two views cannot drift apart.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PartitionState {
    assignment: Vec<Option<u32>>,
    members: Vec<Vec<u32>>,
}

impl PartitionState {
    fn new(n: usize) -> Self {
        Self {
            assignment: vec![None; n],
            members: Vec::new(),
        }
    }

    fn add_region(&mut self, ids: Vec<u32>) -> u32 {
        let region = self.members.len() as u32;
        for &id in &ids {
            self.assignment[id as usize] = Some(region);
        }
        let mut ids = ids;
        ids.sort_unstable();
        self.members.push(ids);
        region
    }

    fn assign(&mut self, id: u32, region: u32) {
        self.assignment[id as usize] = Some(region);
        let list = &mut self.members[region as usize];
        let at = list.partition_point(|&m| m < id);
        list.insert(at, id);
    }

    fn apply_move(&mut self, id: u32, from: u32, to: u32) {
        self.members[from as usize].retain(|&m| m != id);
        self.assign(id, to);
    }

    fn region_of(&self, id: u32) -> Option<u32> {
        self.assignment[id as usize]
    }

    fn members_of(&self, region: u32) -> &[u32] {
        &self.members[region as usize]
    }

    fn region_count(&self) -> usize {
        self.members.len()
    }

    fn into_regions(self) -> Vec<Vec<u32>> {
        let mut regions: Vec<Vec<u32>> = self
            .members
            .into_iter()
            .filter(|ids| !ids.is_empty())
            .collect();
        regions.sort_by_key(|ids| ids.first().copied());
        regions
    }
}

/// Runs max-p end to end. The region count is floor-driven, not requested.
///
/// # Errors
/// Returns [`OkrugError::InfeasibleFloor`] when no feasible construction is
/// found within `params.max_attempts` attempts.
pub(crate) fn run_maxp(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    floor: &FloorConstraint,
    params: &MaxPParams,
    rng: &mut SmallRng,
    objective: &ObjectiveFunction<'_>,
) -> Result<Vec<Vec<u32>>, OkrugError> {
    let mut state = None;
    let mut attempts = 0;
    while attempts < params.max_attempts {
        attempts += 1;
        if let Some(grown) = grow_regions(graph, matrix, metric, floor, &params.seeds, rng) {
            state = Some(grown);
            break;
        }
    }
    let Some(mut state) = state else {
        return Err(OkrugError::InfeasibleFloor { attempts });
    };
    debug!(
        regions = state.region_count(),
        attempts, "construction produced a feasible solution"
    );

    local_search(graph, floor, params, rng, objective, &mut state);
    Ok(state.into_regions())
}

/// One construction attempt: seed, grow, then merge enclaves.
///
/// Returns `None` when the attempt fails (no region reached the floor, or an
/// enclave could not be attached to any region).
fn grow_regions(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    floor: &FloorConstraint,
    seeds: &[u32],
    rng: &mut SmallRng,
) -> Option<PartitionState> {
    let mut state = PartitionState::new(graph.len());
    let queue = seed_order(matrix, seeds, rng);
    let mut enclaves: VecDeque<u32> = VecDeque::new();
    let mut sidelined = vec![false; graph.len()];

    for seed in queue {
        if state.region_of(seed).is_some() || sidelined[seed as usize] {
            continue;
        }
        let mut region = vec![seed];
        let grown = loop {
            if floor.satisfied(region.iter().copied()) {
                break true;
            }
            let eligible = eligible_neighbors(graph, matrix, &state, &sidelined, &region);
            if eligible.is_empty() {
                break false;
            }
            let pick = eligible[rng.gen_range(0..eligible.len())];
            region.push(pick);
        };
        if grown {
            state.add_region(region);
        } else {
            for id in region {
                sidelined[id as usize] = true;
                enclaves.push_back(id);
            }
        }
    }

    if state.region_count() == 0 {
        return None;
    }

    merge_enclaves(graph, matrix, metric, &mut state, enclaves).then_some(state)
}

/// Candidate ordering for region seeds: caller seeds first, then the
/// remaining defined objects in shuffled order.
fn seed_order(matrix: &AttributeMatrix, seeds: &[u32], rng: &mut SmallRng) -> Vec<u32> {
    let mut order: Vec<u32> = seeds
        .iter()
        .copied()
        .filter(|&id| (id as usize) < matrix.rows() && matrix.is_defined(id as usize))
        .collect();
    let mut rest: Vec<u32> = matrix
        .defined_ids()
        .into_iter()
        .filter(|id| !order.contains(id))
        .collect();
    rest.shuffle(rng);
    order.extend(rest);
    order
}

/// Unassigned defined neighbours of any region member, sorted for a
/// reproducible random pick.
fn eligible_neighbors(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    state: &PartitionState,
    sidelined: &[bool],
    region: &[u32],
) -> Vec<u32> {
    let mut eligible: Vec<u32> = region
        .iter()
        .flat_map(|&id| graph.neighbors(id).iter().copied())
        .filter(|&n| {
            matrix.is_defined(n as usize)
                && !sidelined[n as usize]
                && state.region_of(n).is_none()
                && !region.contains(&n)
        })
        .collect();
    eligible.sort_unstable();
    eligible.dedup();
    eligible
}

/// Attaches every enclave to the adjacent region whose mean is nearest to
/// the enclave's attributes; ties go to the lowest region id. Enclaves with
/// no assigned neighbour yet are requeued; a full cycle without progress
/// fails the attempt.
fn merge_enclaves(
    graph: &ContiguityGraph,
    matrix: &AttributeMatrix,
    metric: DistanceMetric,
    state: &mut PartitionState,
    mut enclaves: VecDeque<u32>,
) -> bool {
    let mut stalled = 0;
    while let Some(enclave) = enclaves.pop_front() {
        let mut adjacent: Vec<u32> = graph
            .neighbors(enclave)
            .iter()
            .filter_map(|&n| state.region_of(n))
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();

        let nearest = adjacent
            .into_iter()
            .map(|region| {
                let mean = region_mean(matrix, state.members_of(region));
                (metric.distance_to_point(matrix, enclave, &mean), region)
            })
            .min_by(|left, right| {
                left.0
                    .total_cmp(&right.0)
                    .then_with(|| left.1.cmp(&right.1))
            });

        match nearest {
            Some((_, region)) => {
                state.assign(enclave, region);
                stalled = 0;
            }
            None => {
                enclaves.push_back(enclave);
                stalled += 1;
                if stalled > enclaves.len() {
                    return false;
                }
            }
        }
    }
    true
}

fn region_mean(matrix: &AttributeMatrix, members: &[u32]) -> Vec<f64> {
    let cols = matrix.cols();
    let mut mean = vec![0.0; cols];
    let mut count = 0.0;
    for &id in members {
        if !matrix.is_defined(id as usize) {
            continue;
        }
        for (slot, value) in mean.iter_mut().zip(matrix.row(id as usize)) {
            *slot += value;
        }
        count += 1.0;
    }
    if count > 0.0 {
        for slot in &mut mean {
            *slot /= count;
        }
    }
    mean
}

const IMPROVEMENT_EPS: f64 = 1e-12;

/// Phase-2 move sweep with the configured acceptance policy.
fn local_search(
    graph: &ContiguityGraph,
    floor: &FloorConstraint,
    params: &MaxPParams,
    rng: &mut SmallRng,
    objective: &ObjectiveFunction<'_>,
    state: &mut PartitionState,
) {
    let mut temperature = 1.0f64;
    let mut tabu: VecDeque<(u32, u32)> = VecDeque::new();

    for pass in 0..params.iterations {
        let mut order: Vec<u32> = state
            .assignment
            .iter()
            .enumerate()
            .filter_map(|(id, region)| region.map(|_| id as u32))
            .collect();
        order.shuffle(rng);

        let mut improved = false;
        let mut accepted_any = false;

        for id in order {
            let Some(from) = state.region_of(id) else {
                continue;
            };
            if state.members_of(from).len() <= 1 {
                continue;
            }
            let donor_after: Vec<u32> = state
                .members_of(from)
                .iter()
                .copied()
                .filter(|&m| m != id)
                .collect();
            if !floor.satisfied(donor_after.iter().copied())
                || !graph.subset_connected(&donor_after)
            {
                continue;
            }
            let donor_ssd = objective.ssd(state.members_of(from));
            let donor_after_ssd = objective.ssd(&donor_after);

            let mut targets: Vec<u32> = graph
                .neighbors(id)
                .iter()
                .filter_map(|&n| state.region_of(n))
                .filter(|&region| region != from)
                .collect();
            targets.sort_unstable();
            targets.dedup();

            for to in targets {
                let recipient_ssd = objective.ssd(state.members_of(to));
                let mut recipient_after: Vec<u32> = state.members_of(to).to_vec();
                recipient_after.push(id);
                let recipient_after_ssd = objective.ssd(&recipient_after);
                let delta =
                    donor_after_ssd + recipient_after_ssd - donor_ssd - recipient_ssd;

                let accept = match params.local_search {
                    LocalSearch::Greedy => delta < -IMPROVEMENT_EPS,
                    LocalSearch::SimulatedAnnealing { .. } => {
                        delta < -IMPROVEMENT_EPS
                            || rng.gen::<f64>() < (-delta / temperature.max(f64::MIN_POSITIVE)).exp()
                    }
                    LocalSearch::Tabu { .. } => {
                        delta < -IMPROVEMENT_EPS && !tabu.contains(&(id, to))
                    }
                };
                if !accept {
                    continue;
                }

                state.apply_move(id, from, to);
                accepted_any = true;
                if delta < -IMPROVEMENT_EPS {
                    improved = true;
                }
                if let LocalSearch::Tabu { tabu_length } = params.local_search {
                    tabu.push_back((id, from));
                    while tabu.len() > tabu_length {
                        tabu.pop_front();
                    }
                }
                break;
            }
        }

        match params.local_search {
            LocalSearch::SimulatedAnnealing { cooling_rate } => {
                temperature *= cooling_rate;
                if !accepted_any {
                    debug!(pass, "annealing converged");
                    break;
                }
            }
            LocalSearch::Greedy | LocalSearch::Tabu { .. } => {
                if !improved {
                    debug!(pass, "no improving move in a full pass");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
