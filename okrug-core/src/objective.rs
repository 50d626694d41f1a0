//! Sum-of-squared-deviations objective with concurrent memoization.
//!
//! The objective being minimised is the within-region heterogeneity: for each
//! attribute column, the sum of squared deviations from the column mean over
//! the region's members, summed across columns and divided by the column
//! count. Values are cached keyed by the exact (sorted) id set so repeated
//! evaluation of the same candidate subset during pruning is free. The cache
//! is a concurrent map written with insert-if-absent semantics, so parallel
//! workers scoring disjoint candidate ranges share it without extra locking.

use std::ops::Range;

use dashmap::DashMap;

use crate::data::AttributeMatrix;

/// Outcome of scoring a candidate split of an ordered id list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitMeasure {
    /// `ssd_whole − left_ssd − right_ssd`. Not guaranteed non-negative for
    /// arbitrary splits; callers compare candidates and keep the maximum.
    pub reduction: f64,
    /// SSD of the part before the split position.
    pub left_ssd: f64,
    /// SSD of the part at and after the split position.
    pub right_ssd: f64,
}

/// Computes and memoizes the SSD objective over id subsets.
pub struct ObjectiveFunction<'a> {
    matrix: &'a AttributeMatrix,
    cache: DashMap<Vec<u32>, f64>,
}

impl<'a> ObjectiveFunction<'a> {
    /// Creates an objective bound to an attribute matrix.
    #[must_use]
    pub fn new(matrix: &'a AttributeMatrix) -> Self {
        Self {
            matrix,
            cache: DashMap::new(),
        }
    }

    /// Returns the SSD of the subset `ids`.
    ///
    /// Undefined rows are skipped. Empty and singleton subsets score zero, so
    /// degenerate inputs degrade rather than producing NaN.
    #[must_use]
    pub fn ssd(&self, ids: &[u32]) -> f64 {
        let mut defined: Vec<u32> = ids
            .iter()
            .copied()
            .filter(|&id| self.matrix.is_defined(id as usize))
            .collect();
        defined.sort_unstable();
        defined.dedup();
        if defined.len() < 2 {
            return 0.0;
        }
        if let Some(hit) = self.cache.get(&defined) {
            return *hit;
        }
        let value = self.compute(&defined);
        self.cache.entry(defined).or_insert(value);
        value
    }

    /// Returns the SSD of a contiguous sub-range of an externally-ordered id
    /// list. This is the cache-friendly entry used by the split search.
    #[must_use]
    pub fn ssd_range(&self, ids: &[u32], range: Range<usize>) -> f64 {
        self.ssd(&ids[range])
    }

    /// Scores cutting the ordered list `ids` at `split_pos`.
    ///
    /// The caller must guard degenerate positions (`0` or `ids.len()`);
    /// those yield an empty half, which scores zero here rather than NaN.
    #[must_use]
    pub fn measure_split(&self, ssd_whole: f64, ids: &[u32], split_pos: usize) -> SplitMeasure {
        let left_ssd = self.ssd_range(ids, 0..split_pos);
        let right_ssd = self.ssd_range(ids, split_pos..ids.len());
        SplitMeasure {
            reduction: ssd_whole - left_ssd - right_ssd,
            left_ssd,
            right_ssd,
        }
    }

    fn compute(&self, ids: &[u32]) -> f64 {
        let cols = self.matrix.cols();
        if cols == 0 {
            return 0.0;
        }
        let n = ids.len() as f64;
        let mut total = 0.0;
        for col in 0..cols {
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            for &id in ids {
                let value = self.matrix.row(id as usize)[col];
                sum += value;
                sum_sq += value * value;
            }
            let mean = sum / n;
            total += sum_sq - n * mean * mean;
        }
        total / cols as f64
    }
}
