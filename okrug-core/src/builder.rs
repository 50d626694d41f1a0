//! Builder utilities for configuring regionalization runs.
//!
//! Exposes the method selection surface and builder validation used before
//! constructing [`Okrug`] instances.

use crate::data::DistanceMetric;
use crate::error::{OkrugError, Result};
use crate::floor::FloorConstraint;
use crate::maxp::MaxPParams;
use crate::okrug::Okrug;
use crate::redcap::{Linkage, Order};

/// Selects which regionalization algorithm [`Okrug::run`] executes.
///
/// # Examples
/// ```
/// use okrug_core::{Linkage, Method, Order};
///
/// let method = Method::Redcap {
///     linkage: Linkage::Complete,
///     order: Order::FullOrder,
/// };
/// assert!(matches!(method, Method::Redcap { .. }));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Method {
    /// Spanning-tree partitioning with a fixed region count.
    Skater,
    /// Constrained agglomerative clustering followed by tree partitioning.
    Redcap {
        /// Inter-cluster distance aggregation rule.
        linkage: Linkage,
        /// Whether distances are restricted to first-order contiguity edges.
        order: Order,
    },
    /// Floor-driven region growing; the region count is an output.
    MaxP,
}

impl Default for Method {
    fn default() -> Self {
        Self::Skater
    }
}

/// Configures and constructs [`Okrug`] instances.
///
/// # Examples
/// ```
/// use okrug_core::{Method, OkrugBuilder};
///
/// let okrug = OkrugBuilder::new()
///     .with_method(Method::Skater)
///     .with_target_regions(4)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(okrug.target_regions(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct OkrugBuilder {
    method: Method,
    metric: DistanceMetric,
    target_regions: usize,
    floor: Option<FloorConstraint>,
    seed: Option<u64>,
    maxp: MaxPParams,
}

impl Default for OkrugBuilder {
    fn default() -> Self {
        Self {
            method: Method::default(),
            metric: DistanceMetric::default(),
            target_regions: 2,
            floor: None,
            seed: None,
            maxp: MaxPParams::default(),
        }
    }
}

impl OkrugBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the regionalization method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns the configured method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Selects the dissimilarity metric applied to attribute rows.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Returns the configured metric.
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Overrides the requested region count for SKATER and REDCAP.
    ///
    /// Max-p ignores this value; its region count is floor-driven.
    #[must_use]
    pub fn with_target_regions(mut self, target: usize) -> Self {
        self.target_regions = target;
        self
    }

    /// Returns the configured region count.
    #[must_use]
    pub fn target_regions(&self) -> usize {
        self.target_regions
    }

    /// Attaches a floor constraint.
    ///
    /// Optional for SKATER and REDCAP, mandatory for max-p.
    #[must_use]
    pub fn with_floor(mut self, floor: FloorConstraint) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Seeds the random number generator for reproducible max-p runs.
    ///
    /// Unseeded runs draw entropy from the operating system.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the max-p tuning parameters.
    #[must_use]
    pub fn with_maxp_params(mut self, params: MaxPParams) -> Self {
        self.maxp = params;
        self
    }

    /// Validates the configuration and constructs an [`Okrug`] instance.
    ///
    /// # Errors
    /// Returns [`OkrugError::MissingFloor`] when max-p is selected without a
    /// floor constraint, and [`OkrugError::ZeroTargetRegions`] when SKATER or
    /// REDCAP is selected with a zero region count.
    pub fn build(self) -> Result<Okrug> {
        if matches!(self.method, Method::MaxP) && self.floor.is_none() {
            return Err(OkrugError::MissingFloor);
        }
        if !matches!(self.method, Method::MaxP) && self.target_regions == 0 {
            return Err(OkrugError::ZeroTargetRegions);
        }
        Ok(Okrug::new(
            self.method,
            self.metric,
            self.target_regions,
            self.floor,
            self.seed,
            self.maxp,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{Method, OkrugBuilder};
    use crate::error::OkrugError;
    use crate::floor::FloorConstraint;

    #[test]
    fn maxp_without_floor_is_rejected() {
        let err = OkrugBuilder::new()
            .with_method(Method::MaxP)
            .build()
            .unwrap_err();
        assert_eq!(err, OkrugError::MissingFloor);
        assert_eq!(err.code().as_str(), "OKRUG_MISSING_FLOOR");
    }

    #[test]
    fn maxp_with_floor_builds() {
        let floor = FloorConstraint::new(vec![1.0; 4], 2.0).unwrap();
        let okrug = OkrugBuilder::new()
            .with_method(Method::MaxP)
            .with_floor(floor)
            .build();
        assert!(okrug.is_ok());
    }

    #[test]
    fn zero_target_regions_is_rejected() {
        let err = OkrugBuilder::new().with_target_regions(0).build().unwrap_err();
        assert_eq!(err, OkrugError::ZeroTargetRegions);
        assert_eq!(err.code().as_str(), "OKRUG_ZERO_TARGET_REGIONS");
    }
}
