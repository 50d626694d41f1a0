//! Okrug core library: spatially constrained regionalization.
//!
//! Partitions the nodes of a contiguity graph into connected regions that
//! are homogeneous in attribute space, using SKATER spanning-tree
//! partitioning, the REDCAP family of constrained agglomerative methods, or
//! max-p region growing under a floor constraint.

mod builder;
mod data;
mod error;
mod floor;
mod graph;
mod maxp;
mod mst;
mod objective;
mod okrug;
mod partition;
mod redcap;
mod result;
mod skater;
mod union_find;

pub use crate::{
    builder::{Method, OkrugBuilder},
    data::{AttributeMatrix, DataError, DistanceMetric},
    error::{OkrugError, OkrugErrorCode, Result},
    floor::{FloorConstraint, FloorError},
    graph::{ContiguityGraph, GraphError},
    maxp::{LocalSearch, MAX_ATTEMPTS, MaxPParams},
    mst::{MstError, SpanningEdge, SpanningForest, build_spanning_forest},
    objective::{ObjectiveFunction, SplitMeasure},
    okrug::Okrug,
    redcap::{Linkage, Order},
    result::{NonContiguousRegionIds, RegionId, Regionalization},
};
