//! Attribute data and the pluggable distance metric.
//!
//! The attribute matrix is owned by the caller and borrowed read-only for the
//! duration of a run. Rows flagged undefined are excluded from dissimilarity
//! and objective computation and never form a standalone region.

use thiserror::Error;

/// Errors returned while validating attribute data.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DataError {
    /// A row had a different length from the first row.
    #[error("row {row} has {len} values but {expected} were expected")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Expected column count.
        expected: usize,
    },
    /// A value was NaN or infinite.
    #[error("value at row {row}, column {col} is not finite")]
    NonFinite {
        /// Row of the non-finite value.
        row: usize,
        /// Column of the non-finite value.
        col: usize,
    },
    /// The undefined-flag vector length did not match the row count.
    #[error("{flags} undefined flags were supplied for {rows} rows")]
    UndefinedLengthMismatch {
        /// Number of flags supplied.
        flags: usize,
        /// Number of rows in the matrix.
        rows: usize,
    },
}

/// An `n × m` matrix of real attributes (row = object, column = variable).
///
/// # Examples
/// ```
/// use okrug_core::AttributeMatrix;
///
/// let matrix = AttributeMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
/// assert_eq!(matrix.rows(), 2);
/// assert_eq!(matrix.cols(), 2);
/// assert_eq!(matrix.row(1), &[3.0, 4.0]);
/// # Ok::<(), okrug_core::DataError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeMatrix {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
    undefined: Vec<bool>,
}

impl AttributeMatrix {
    /// Builds a matrix from per-object rows.
    ///
    /// # Errors
    /// Returns [`DataError::RaggedRow`] when rows differ in length and
    /// [`DataError::NonFinite`] when a value is NaN or infinite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(row_count * cols);
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != cols {
                return Err(DataError::RaggedRow {
                    row,
                    len: data.len(),
                    expected: cols,
                });
            }
            for (col, value) in data.into_iter().enumerate() {
                if !value.is_finite() {
                    return Err(DataError::NonFinite { row, col });
                }
                values.push(value);
            }
        }
        Ok(Self {
            values,
            rows: row_count,
            cols,
            undefined: vec![false; row_count],
        })
    }

    /// Attaches per-row undefined flags.
    ///
    /// # Errors
    /// Returns [`DataError::UndefinedLengthMismatch`] when the flag vector
    /// length differs from the row count.
    pub fn with_undefined(mut self, flags: Vec<bool>) -> Result<Self, DataError> {
        if flags.len() != self.rows {
            return Err(DataError::UndefinedLengthMismatch {
                flags: flags.len(),
                rows: self.rows,
            });
        }
        self.undefined = flags;
        Ok(self)
    }

    /// Returns the number of rows (objects).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns (variables).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns row `i` as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Returns whether row `i` carries defined values.
    #[must_use]
    pub fn is_defined(&self, i: usize) -> bool {
        !self.undefined[i]
    }

    /// Returns the ids of all defined rows, ascending.
    #[must_use]
    pub fn defined_ids(&self) -> Vec<u32> {
        (0..self.rows as u32)
            .filter(|&i| self.is_defined(i as usize))
            .collect()
    }
}

/// Selectable pairwise distance policy, usable by all three algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance between attribute rows.
    #[default]
    Euclidean,
    /// Manhattan (L1) distance between attribute rows.
    Manhattan,
}

impl DistanceMetric {
    /// Computes the dissimilarity between rows `i` and `j`.
    #[must_use]
    pub fn dissimilarity(self, matrix: &AttributeMatrix, i: u32, j: u32) -> f64 {
        let left = matrix.row(i as usize);
        let right = matrix.row(j as usize);
        match self {
            Self::Euclidean => left
                .iter()
                .zip(right)
                .map(|(l, r)| (l - r) * (l - r))
                .sum::<f64>()
                .sqrt(),
            Self::Manhattan => left.iter().zip(right).map(|(l, r)| (l - r).abs()).sum(),
        }
    }

    /// Computes the distance between row `i` and an arbitrary point.
    ///
    /// Used when comparing an object against a region mean.
    #[must_use]
    pub fn distance_to_point(self, matrix: &AttributeMatrix, i: u32, point: &[f64]) -> f64 {
        let row = matrix.row(i as usize);
        match self {
            Self::Euclidean => row
                .iter()
                .zip(point)
                .map(|(l, r)| (l - r) * (l - r))
                .sum::<f64>()
                .sqrt(),
            Self::Manhattan => row.iter().zip(point).map(|(l, r)| (l - r).abs()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeMatrix, DataError, DistanceMetric};

    #[test]
    fn rejects_ragged_rows() {
        let result = AttributeMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            result,
            Err(DataError::RaggedRow {
                row: 1,
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        let result = AttributeMatrix::from_rows(vec![vec![1.0], vec![f64::NAN]]);
        assert_eq!(result, Err(DataError::NonFinite { row: 1, col: 0 }));
    }

    #[test]
    fn undefined_flags_must_match_rows() {
        let matrix = AttributeMatrix::from_rows(vec![vec![1.0]]).expect("valid");
        let result = matrix.with_undefined(vec![false, true]);
        assert_eq!(
            result,
            Err(DataError::UndefinedLengthMismatch { flags: 2, rows: 1 })
        );
    }

    #[test]
    fn metric_selection_changes_distances() {
        let matrix =
            AttributeMatrix::from_rows(vec![vec![0.0, 0.0], vec![3.0, 4.0]]).expect("valid");
        let euclid = DistanceMetric::Euclidean.dissimilarity(&matrix, 0, 1);
        let manhattan = DistanceMetric::Manhattan.dissimilarity(&matrix, 0, 1);
        assert!((euclid - 5.0).abs() < 1e-12);
        assert!((manhattan - 7.0).abs() < 1e-12);
    }
}
