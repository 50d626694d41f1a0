//! Floor constraint: a minimum aggregate weight each region must reach.

use thiserror::Error;

/// Errors returned while constructing a floor constraint.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum FloorError {
    /// A floor weight was negative.
    #[error("floor weight at index {index} is negative ({weight})")]
    NegativeWeight {
        /// Index of the offending weight.
        index: usize,
        /// The negative value supplied.
        weight: f64,
    },
    /// A floor weight was NaN or infinite.
    #[error("floor weight at index {index} is not finite")]
    NonFiniteWeight {
        /// Index of the offending weight.
        index: usize,
    },
}

/// Per-object non-negative weights and a threshold each region must meet.
///
/// A region is feasible iff the sum of its members' weights is at least the
/// threshold. When no constraint is supplied, every region is trivially
/// feasible.
///
/// # Examples
/// ```
/// use okrug_core::FloorConstraint;
///
/// let floor = FloorConstraint::new(vec![1.0; 5], 3.0)?;
/// assert!(floor.satisfied([0, 1, 2].iter().copied()));
/// assert!(!floor.satisfied([0, 1].iter().copied()));
/// # Ok::<(), okrug_core::FloorError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FloorConstraint {
    weights: Vec<f64>,
    threshold: f64,
}

impl FloorConstraint {
    /// Builds a floor constraint, rejecting invalid weights immediately.
    ///
    /// # Errors
    /// Returns [`FloorError::NegativeWeight`] or
    /// [`FloorError::NonFiniteWeight`] for invalid entries.
    pub fn new(weights: Vec<f64>, threshold: f64) -> Result<Self, FloorError> {
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(FloorError::NonFiniteWeight { index });
            }
            if weight < 0.0 {
                return Err(FloorError::NegativeWeight { index, weight });
            }
        }
        Ok(Self { weights, threshold })
    }

    /// Returns the number of per-object weights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns whether the weight vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the feasibility threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sums the weights of the given object ids.
    #[must_use]
    pub fn weight_sum(&self, ids: impl IntoIterator<Item = u32>) -> f64 {
        ids.into_iter().map(|id| self.weights[id as usize]).sum()
    }

    /// Returns whether a region containing `ids` meets the threshold.
    #[must_use]
    pub fn satisfied(&self, ids: impl IntoIterator<Item = u32>) -> bool {
        self.weight_sum(ids) >= self.threshold
    }
}
