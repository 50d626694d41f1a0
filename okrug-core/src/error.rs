//! Error types for the okrug core library.
//!
//! Defines the error enums exposed by the public API, a convenient result
//! alias, and a macro that derives stable machine-readable error codes so
//! downstream logging and metrics surfaces do not have to match on display
//! strings.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

use crate::data::DataError;
use crate::graph::GraphError;
use crate::mst::MstError;

/// Error type produced when configuring or running a regionalization.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OkrugError {
    /// A zero region count was requested at configuration time.
    #[error("target region count must be at least 1")]
    ZeroTargetRegions,
    /// The target region count exceeded the number of defined objects.
    #[error("target region count {requested} is invalid for {objects} objects")]
    InvalidTargetRegions {
        /// Region count requested by the caller.
        requested: usize,
        /// Number of objects supplied.
        objects: usize,
    },
    /// The contiguity graph and the attribute matrix disagree on object count.
    #[error("contiguity graph has {graph_nodes} nodes but attribute matrix has {matrix_rows} rows")]
    GraphMatrixMismatch {
        /// Node count of the contiguity graph.
        graph_nodes: usize,
        /// Row count of the attribute matrix.
        matrix_rows: usize,
    },
    /// The floor weight vector length does not match the object count.
    #[error("floor constraint has {weights} weights but there are {objects} objects")]
    FloorLengthMismatch {
        /// Length of the floor weight vector.
        weights: usize,
        /// Number of objects supplied.
        objects: usize,
    },
    /// Max-p was requested without a floor constraint.
    #[error("max-p requires a floor constraint")]
    MissingFloor,
    /// Max-p construction could not find any floor-feasible solution.
    #[error("no floor-feasible initial solution found after {attempts} attempts")]
    InfeasibleFloor {
        /// Number of construction attempts made before giving up.
        attempts: usize,
    },
    /// The contiguity graph was rejected during validation.
    #[error("contiguity graph is invalid: {source}")]
    Graph {
        /// Underlying graph validation failure.
        #[source]
        source: GraphError,
    },
    /// The attribute matrix was rejected during validation.
    #[error("attribute matrix is invalid: {source}")]
    Data {
        /// Underlying attribute validation failure.
        #[source]
        source: DataError,
    },
    /// Spanning-forest construction failed.
    #[error("spanning forest construction failed: {source}")]
    Mst {
        /// Underlying spanning-forest failure.
        #[source]
        source: MstError,
    },
}

define_error_codes! {
    /// Stable codes describing [`OkrugError`] variants.
    enum OkrugErrorCode for OkrugError {
        /// A zero region count was requested at configuration time.
        ZeroTargetRegions => ZeroTargetRegions => "OKRUG_ZERO_TARGET_REGIONS",
        /// The target region count exceeded the number of defined objects.
        InvalidTargetRegions => InvalidTargetRegions { .. } => "OKRUG_INVALID_TARGET_REGIONS",
        /// The contiguity graph and the attribute matrix disagree on object count.
        GraphMatrixMismatch => GraphMatrixMismatch { .. } => "OKRUG_GRAPH_MATRIX_MISMATCH",
        /// The floor weight vector length does not match the object count.
        FloorLengthMismatch => FloorLengthMismatch { .. } => "OKRUG_FLOOR_LENGTH_MISMATCH",
        /// Max-p was requested without a floor constraint.
        MissingFloor => MissingFloor => "OKRUG_MISSING_FLOOR",
        /// Max-p construction could not find any floor-feasible solution.
        InfeasibleFloor => InfeasibleFloor { .. } => "OKRUG_INFEASIBLE_FLOOR",
        /// The contiguity graph was rejected during validation.
        Graph => Graph { .. } => "OKRUG_INVALID_GRAPH",
        /// The attribute matrix was rejected during validation.
        Data => Data { .. } => "OKRUG_INVALID_DATA",
        /// Spanning-forest construction failed.
        Mst => Mst { .. } => "OKRUG_MST_FAILED",
    }
}

impl From<GraphError> for OkrugError {
    fn from(source: GraphError) -> Self {
        Self::Graph { source }
    }
}

impl From<DataError> for OkrugError {
    fn from(source: DataError) -> Self {
        Self::Data { source }
    }
}

impl From<MstError> for OkrugError {
    fn from(source: MstError) -> Self {
        Self::Mst { source }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, OkrugError>;
