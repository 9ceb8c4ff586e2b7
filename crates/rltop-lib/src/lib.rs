//! Library behind `kubectl rltop`
//!
//! This crate provides:
//! - Exact parsing of Kubernetes resource quantities
//! - Aggregation of container requests and limits per pod and per node
//! - Joining of usage metrics, requests/limits and node capacity into rows
//! - Formatting, percentages and sorting of those rows
//! - A `kube`-backed data source and concurrent one-shot snapshots

pub mod aggregate;
pub mod combine;
pub mod error;
pub mod format;
pub mod models;
pub mod percent;
pub mod quantity;
pub mod snapshot;
pub mod sort;
pub mod source;

pub use error::{Result, RltopError};
pub use models::*;
pub use snapshot::{node_snapshot, pod_snapshot};
pub use sort::SortBy;
pub use source::{ClusterSource, KubeSource, NodeQuery, PodQuery};
