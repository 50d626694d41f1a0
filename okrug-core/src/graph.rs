//! Read-only contiguity graph consumed by every regionalization algorithm.
//!
//! The graph is supplied by an external spatial-weights builder and is only
//! borrowed here. Neighbour lists are normalised at construction (sorted,
//! deduplicated, self-loops stripped) so that all downstream iteration orders
//! are deterministic for a fixed input.

use std::collections::VecDeque;

use thiserror::Error;

/// Errors returned while validating a contiguity graph.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// A neighbour list referenced a node id outside `[0, node_count)`.
    #[error("node {node} lists neighbour {neighbor}, but node_count is {node_count}")]
    NeighborOutOfBounds {
        /// Node whose neighbour list is invalid.
        node: usize,
        /// The out-of-range neighbour id.
        neighbor: u32,
        /// The number of nodes in the graph.
        node_count: usize,
    },
}

/// Adjacency structure expressing which spatial objects are neighbours.
///
/// Symmetry (`j ∈ neighbors(i)` implies `i ∈ neighbors(j)`) is expected by
/// convention and can be checked with [`ContiguityGraph::is_symmetric`], but
/// is not enforced; an asymmetric graph surfaces downstream as disconnected
/// regions.
///
/// # Examples
/// ```
/// use okrug_core::ContiguityGraph;
///
/// let graph = ContiguityGraph::from_neighbor_lists(vec![
///     vec![1],
///     vec![0, 2],
///     vec![1],
/// ])?;
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.neighbors(1), &[0, 2]);
/// assert!(graph.is_symmetric());
/// # Ok::<(), okrug_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContiguityGraph {
    neighbors: Vec<Vec<u32>>,
}

impl ContiguityGraph {
    /// Builds a graph from per-node neighbour lists.
    ///
    /// Lists are sorted and deduplicated; self-loops are dropped.
    ///
    /// # Errors
    /// Returns [`GraphError::NeighborOutOfBounds`] when a list references a
    /// node id `>= node_count`.
    pub fn from_neighbor_lists(lists: Vec<Vec<u32>>) -> Result<Self, GraphError> {
        let node_count = lists.len();
        let mut neighbors = Vec::with_capacity(node_count);
        for (node, mut list) in lists.into_iter().enumerate() {
            for &neighbor in &list {
                if neighbor as usize >= node_count {
                    return Err(GraphError::NeighborOutOfBounds {
                        node,
                        neighbor,
                        node_count,
                    });
                }
            }
            list.sort_unstable();
            list.dedup();
            list.retain(|&n| n as usize != node);
            neighbors.push(list);
        }
        Ok(Self { neighbors })
    }

    /// Builds a graph from undirected edges over `node_count` nodes.
    ///
    /// Each edge is inserted in both directions.
    ///
    /// # Errors
    /// Returns [`GraphError::NeighborOutOfBounds`] when an edge endpoint is
    /// `>= node_count`.
    pub fn from_edges(node_count: usize, edges: &[(u32, u32)]) -> Result<Self, GraphError> {
        let mut lists = vec![Vec::new(); node_count];
        for &(a, b) in edges {
            for (node, neighbor) in [(a, b), (b, a)] {
                let Some(list) = lists.get_mut(node as usize) else {
                    return Err(GraphError::NeighborOutOfBounds {
                        node: node as usize,
                        neighbor,
                        node_count,
                    });
                };
                list.push(neighbor);
            }
        }
        Self::from_neighbor_lists(lists)
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Returns the ordered neighbour ids of `node`.
    ///
    /// # Panics
    /// Panics when `node` is out of range; callers obtain ids from the graph
    /// itself so this indicates a logic error.
    #[must_use]
    pub fn neighbors(&self, node: u32) -> &[u32] {
        &self.neighbors[node as usize]
    }

    /// Advisory symmetry check.
    ///
    /// The core never enforces symmetry; an asymmetric graph fails downstream
    /// with disconnected regions instead.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.neighbors.iter().enumerate().all(|(node, list)| {
            list.iter()
                .all(|&n| self.neighbors[n as usize].binary_search(&(node as u32)).is_ok())
        })
    }

    /// Returns the connected components of the graph, each sorted ascending.
    ///
    /// Components themselves are ordered by their smallest member, so the
    /// result is deterministic.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<u32>> {
        let mut seen = vec![false; self.len()];
        let mut components = Vec::new();
        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start as u32]);
            seen[start] = true;
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &next in self.neighbors(node) {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Returns whether the subgraph induced by `ids` is connected.
    ///
    /// Connectivity is verified by breadth-first reachability restricted to
    /// the id set, never assumed. The empty set and singletons are connected.
    #[must_use]
    pub fn subset_connected(&self, ids: &[u32]) -> bool {
        let Some(&start) = ids.first() else {
            return true;
        };
        let mut membership = vec![false; self.len()];
        for &id in ids {
            membership[id as usize] = true;
        }
        let mut reached = 0usize;
        let mut queue = VecDeque::from([start]);
        membership[start as usize] = false;
        while let Some(node) = queue.pop_front() {
            reached += 1;
            for &next in self.neighbors(node) {
                if membership[next as usize] {
                    membership[next as usize] = false;
                    queue.push_back(next);
                }
            }
        }
        reached == ids.len()
    }
}
