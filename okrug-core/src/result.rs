//! Result types for regionalization runs.
//!
//! Provides the structures returned by [`crate::Okrug::run`]: per-object
//! region assignments, the region count, and the final objective value,
//! with validation of the region identifier invariants.

use thiserror::Error;

use crate::mst::SpanningForest;

/// Identifier assigned to a region.
///
/// # Examples
/// ```
/// use okrug_core::RegionId;
///
/// let id = RegionId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u32);

impl RegionId {
    /// Creates a new region identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn new(id: u32) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn get(self) -> u32 { self.0 }
}

/// Error returned when region identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousRegionIds {
    /// A non-empty assignment set does not include region `0`.
    #[error("region identifiers must include 0")]
    MissingZero,
    /// The assignments skip identifiers.
    #[error("region identifiers must be contiguous without gaps")]
    Gap,
}

/// Represents the output of an [`crate::Okrug::run`] invocation.
///
/// Objects excluded from the run (undefined attribute rows) carry `None`
/// instead of a region identifier.
///
/// # Examples
/// ```
/// use okrug_core::{RegionId, Regionalization};
///
/// let result = Regionalization::try_from_assignments(
///     vec![Some(RegionId::new(0)), Some(RegionId::new(1)), None],
///     3.5,
/// )
/// .unwrap();
/// assert_eq!(result.region_count(), 2);
/// assert_eq!(result.objective(), 3.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Regionalization {
    assignments: Vec<Option<RegionId>>,
    region_count: usize,
    objective: f64,
    spanning_forest: Option<SpanningForest>,
}

impl Regionalization {
    /// Attempts to build a result from per-object region assignments.
    ///
    /// Assigned identifiers must start at zero and be contiguous; `None`
    /// entries are ignored. An all-`None` or empty vector is accepted and
    /// yields `region_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousRegionIds::MissingZero`] when assignments exist
    /// but omit region `0`, and [`NonContiguousRegionIds::Gap`] when
    /// identifiers skip values.
    pub fn try_from_assignments(
        assignments: Vec<Option<RegionId>>,
        objective: f64,
    ) -> Result<Self, NonContiguousRegionIds> {
        let Some(max) = assignments.iter().flatten().map(|id| id.get()).max() else {
            return Ok(Self {
                assignments,
                region_count: 0,
                objective,
                spanning_forest: None,
            });
        };
        let mut seen = vec![false; max as usize + 1];
        for id in assignments.iter().flatten() {
            seen[id.get() as usize] = true;
        }
        if !seen[0] {
            return Err(NonContiguousRegionIds::MissingZero);
        }
        if seen.iter().any(|&present| !present) {
            return Err(NonContiguousRegionIds::Gap);
        }
        Ok(Self {
            assignments,
            region_count: max as usize + 1,
            objective,
            spanning_forest: None,
        })
    }

    /// Builds a result directly from sorted member lists.
    ///
    /// Region identifiers follow the order of `regions`; membership lists
    /// produced by the solvers are disjoint by construction.
    pub(crate) fn from_regions(regions: &[Vec<u32>], objects: usize, objective: f64) -> Self {
        let mut assignments = vec![None; objects];
        for (region, ids) in regions.iter().enumerate() {
            for &id in ids {
                assignments[id as usize] = Some(RegionId::new(region as u32));
            }
        }
        Self {
            assignments,
            region_count: regions.len(),
            objective,
            spanning_forest: None,
        }
    }

    /// Attaches the spanning forest the partition was cut from.
    pub(crate) fn with_spanning_forest(mut self, forest: SpanningForest) -> Self {
        self.spanning_forest = Some(forest);
        self
    }

    /// Returns the per-object assignments in object order.
    #[must_use]
    pub fn assignments(&self) -> &[Option<RegionId>] {
        &self.assignments
    }

    /// Counts how many regions exist within the assignments.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.region_count
    }

    /// Total within-region sum of squared deviations of the final partition.
    #[must_use]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Returns the spanning forest the regions were cut from, when the method
    /// that produced this result built one. Its edges carry the
    /// `(source, target, length)` triples of the minimum spanning forest.
    #[must_use]
    pub fn spanning_forest(&self) -> Option<&SpanningForest> {
        self.spanning_forest.as_ref()
    }

    /// Reconstructs the sorted member list of every region.
    #[must_use]
    pub fn regions(&self) -> Vec<Vec<u32>> {
        let mut regions = vec![Vec::new(); self.region_count];
        for (object, assigned) in self.assignments.iter().enumerate() {
            if let Some(id) = assigned {
                regions[id.get() as usize].push(object as u32);
            }
        }
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::{NonContiguousRegionIds, RegionId, Regionalization};

    #[test]
    fn empty_assignments_yield_zero_regions() {
        let result = Regionalization::try_from_assignments(Vec::new(), 0.0).unwrap();
        assert_eq!(result.region_count(), 0);
        assert!(result.regions().is_empty());
    }

    #[test]
    fn none_entries_do_not_count_towards_regions() {
        let result = Regionalization::try_from_assignments(
            vec![Some(RegionId::new(0)), None, Some(RegionId::new(0))],
            1.0,
        )
        .unwrap();
        assert_eq!(result.region_count(), 1);
        assert_eq!(result.regions(), vec![vec![0, 2]]);
    }

    #[test]
    fn missing_zero_is_rejected() {
        let err =
            Regionalization::try_from_assignments(vec![Some(RegionId::new(1))], 0.0).unwrap_err();
        assert_eq!(err, NonContiguousRegionIds::MissingZero);
    }

    #[test]
    fn gaps_are_rejected() {
        let err = Regionalization::try_from_assignments(
            vec![Some(RegionId::new(0)), Some(RegionId::new(2))],
            0.0,
        )
        .unwrap_err();
        assert_eq!(err, NonContiguousRegionIds::Gap);
    }

    #[test]
    fn from_regions_round_trips_membership() {
        let regions = vec![vec![0, 3], vec![1, 2]];
        let result = Regionalization::from_regions(&regions, 5, 2.0);
        assert_eq!(result.regions(), regions);
        assert_eq!(result.assignments()[4], None);
    }
}
