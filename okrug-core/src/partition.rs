//! Best-cut search over spanning trees, shared by SKATER and REDCAP.
//!
//! A partitioning node holds the ordered member ids of a sub-tree, its edges
//! and its SSD. Evaluating a node scores every candidate edge removal: the
//! tree is flood-filled from one endpoint of the removed edge to recover the
//! two connected vertex sets, degenerate and floor-violating candidates are
//! discarded, and the candidate with the lowest part-sum SSD wins (ties go to
//! the lowest edge index). Candidate scoring for one tree is spread across
//! the rayon pool in disjoint index ranges; the best candidate is selected
//! only after the parallel join, so no partial result is ever observable.
//!
//! The split loop keeps a max-heap of evaluated nodes ordered by SSD
//! reduction and repeatedly splits the most promising one. A node whose every
//! candidate violates the floor is retained whole and consumes one region
//! slot of the remaining budget.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use rayon::prelude::*;

use crate::data::AttributeMatrix;
use crate::floor::FloorConstraint;
use crate::objective::ObjectiveFunction;
use crate::union_find::DisjointSet;

/// The winning candidate cut of a partitioning node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BestCut {
    pub(crate) edge_index: usize,
    /// `ssd(part1) + ssd(part2)` for the winning removal.
    pub(crate) score: f64,
}

/// A sub-tree pending partitioning: ordered ids, owning edge list, SSD and,
/// once evaluated, the best cut.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SubTree {
    pub(crate) ids: Vec<u32>,
    pub(crate) edges: Vec<(u32, u32)>,
    pub(crate) ssd: f64,
    pub(crate) best: Option<BestCut>,
}

impl SubTree {
    pub(crate) fn new(
        mut ids: Vec<u32>,
        edges: Vec<(u32, u32)>,
        objective: &ObjectiveFunction<'_>,
    ) -> Self {
        ids.sort_unstable();
        ids.dedup();
        let ssd = objective.ssd(&ids);
        Self {
            ids,
            edges,
            ssd,
            best: None,
        }
    }

    /// Reduction achieved by the best cut, or `None` when unsplittable.
    fn reduction(&self) -> Option<f64> {
        self.best.map(|cut| self.ssd - cut.score)
    }

    /// Scores every candidate edge removal and records the best valid one.
    pub(crate) fn evaluate(
        &mut self,
        objective: &ObjectiveFunction<'_>,
        floor: Option<&FloorConstraint>,
    ) {
        self.best = None;
        if self.edges.is_empty() {
            return;
        }
        let adjacency = build_adjacency(&self.edges);
        let winner = (0..self.edges.len())
            .into_par_iter()
            .filter_map(|index| {
                self.score_candidate(index, &adjacency, objective, floor)
                    .map(|score| (index, score))
            })
            .min_by(|left, right| {
                left.1
                    .total_cmp(&right.1)
                    .then_with(|| left.0.cmp(&right.0))
            });
        self.best = winner.map(|(edge_index, score)| BestCut { edge_index, score });
    }

    /// Scores removing edge `index`, or `None` when the cut is infeasible.
    fn score_candidate(
        &self,
        index: usize,
        adjacency: &Adjacency,
        objective: &ObjectiveFunction<'_>,
        floor: Option<&FloorConstraint>,
    ) -> Option<f64> {
        let (part1, part2) = self.cut_members(index, adjacency);
        if part1.is_empty() || part2.is_empty() {
            return None;
        }
        if let Some(floor) = floor {
            if !floor.satisfied(part1.iter().copied()) || !floor.satisfied(part2.iter().copied()) {
                return None;
            }
        }
        Some(objective.ssd(&part1) + objective.ssd(&part2))
    }

    /// Flood-fills from one endpoint of edge `index` with that edge removed,
    /// returning the two vertex sets, each sorted.
    fn cut_members(&self, index: usize, adjacency: &Adjacency) -> (Vec<u32>, Vec<u32>) {
        let (origin, _) = self.edges[index];
        let mut inside = vec![false; self.ids.len()];
        let position: HashMap<u32, usize> = self
            .ids
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect();
        let mut queue = VecDeque::from([origin]);
        inside[position[&origin]] = true;
        while let Some(node) = queue.pop_front() {
            let Some(reachable) = adjacency.get(&node) else {
                continue;
            };
            for &(next, via) in reachable {
                if via == index || inside[position[&next]] {
                    continue;
                }
                inside[position[&next]] = true;
                queue.push_back(next);
            }
        }
        let mut part1 = Vec::new();
        let mut part2 = Vec::new();
        for (pos, &id) in self.ids.iter().enumerate() {
            if inside[pos] {
                part1.push(id);
            } else {
                part2.push(id);
            }
        }
        (part1, part2)
    }

    /// Splits at the recorded best cut, producing two evaluated-later children.
    pub(crate) fn split(&self, objective: &ObjectiveFunction<'_>) -> Option<(Self, Self)> {
        let cut = self.best?;
        let adjacency = build_adjacency(&self.edges);
        let (part1, part2) = self.cut_members(cut.edge_index, &adjacency);
        let membership: HashMap<u32, bool> = part1
            .iter()
            .map(|&id| (id, true))
            .chain(part2.iter().map(|&id| (id, false)))
            .collect();
        let mut edges1 = Vec::new();
        let mut edges2 = Vec::new();
        for (index, &edge) in self.edges.iter().enumerate() {
            if index == cut.edge_index {
                continue;
            }
            if membership[&edge.0] {
                edges1.push(edge);
            } else {
                edges2.push(edge);
            }
        }
        Some((
            Self::new(part1, edges1, objective),
            Self::new(part2, edges2, objective),
        ))
    }
}

type Adjacency = HashMap<u32, Vec<(u32, usize)>>;

fn build_adjacency(edges: &[(u32, u32)]) -> Adjacency {
    let mut adjacency: Adjacency = HashMap::new();
    for (index, &(a, b)) in edges.iter().enumerate() {
        adjacency.entry(a).or_default().push((b, index));
        adjacency.entry(b).or_default().push((a, index));
    }
    adjacency
}

/// Heap entry ordering trees by achievable SSD reduction (max-heap).
struct RankedTree(SubTree);

impl RankedTree {
    fn key(&self) -> (f64, u32) {
        let reduction = self.0.reduction().unwrap_or(f64::NEG_INFINITY);
        // Lowest leading id breaks reduction ties deterministically.
        (reduction, self.0.ids.first().copied().unwrap_or(u32::MAX))
    }
}

impl PartialEq for RankedTree {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedTree {}

impl Ord for RankedTree {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, left_id) = self.key();
        let (right, right_id) = other.key();
        left.total_cmp(&right).then_with(|| right_id.cmp(&left_id))
    }
}

impl PartialOrd for RankedTree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Groups tree edges and the defined ids into one [`SubTree`] per connected
/// component. Defined ids touched by no edge become singleton trees.
pub(crate) fn group_components(
    matrix: &AttributeMatrix,
    edges: &[(u32, u32)],
    objective: &ObjectiveFunction<'_>,
) -> Vec<SubTree> {
    let n = matrix.rows();
    let mut set = DisjointSet::new(n);
    for &(a, b) in edges {
        set.union(a as usize, b as usize);
    }

    let mut ids_by_root: Vec<Vec<u32>> = vec![Vec::new(); n];
    for id in matrix.defined_ids() {
        ids_by_root[set.find(id as usize)].push(id);
    }
    let mut edges_by_root: Vec<Vec<(u32, u32)>> = vec![Vec::new(); n];
    for &(a, b) in edges {
        edges_by_root[set.find(a as usize)].push((a, b));
    }

    (0..n)
        .filter_map(|root| {
            if ids_by_root[root].is_empty() {
                return None;
            }
            Some(SubTree::new(
                std::mem::take(&mut ids_by_root[root]),
                std::mem::take(&mut edges_by_root[root]),
                objective,
            ))
        })
        .collect()
}

/// Recursively splits the given component trees until `target` regions exist
/// or no tree has a valid cut, returning one sorted id list per region.
///
/// The returned count can be below `target` (floor-blocked) or above it
/// (more components than requested regions); callers inspect the count.
pub(crate) fn partition_components(
    components: Vec<SubTree>,
    target: usize,
    objective: &ObjectiveFunction<'_>,
    floor: Option<&FloorConstraint>,
) -> Vec<Vec<u32>> {
    let mut heap = BinaryHeap::new();
    let mut finals: Vec<SubTree> = Vec::new();

    for mut tree in components {
        tree.evaluate(objective, floor);
        if tree.best.is_some() {
            heap.push(RankedTree(tree));
        } else {
            finals.push(tree);
        }
    }

    while heap.len() + finals.len() < target {
        let Some(RankedTree(tree)) = heap.pop() else {
            break;
        };
        let Some((left, right)) = tree.split(objective) else {
            finals.push(tree);
            continue;
        };
        for mut child in [left, right] {
            child.evaluate(objective, floor);
            if child.best.is_some() {
                heap.push(RankedTree(child));
            } else {
                finals.push(child);
            }
        }
    }

    let mut regions: Vec<Vec<u32>> = finals
        .into_iter()
        .map(|tree| tree.ids)
        .chain(heap.into_iter().map(|ranked| ranked.0.ids))
        .filter(|ids| !ids.is_empty())
        .collect();
    regions.sort_by_key(|ids| ids.first().copied());
    regions
}
