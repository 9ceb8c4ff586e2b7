//! Data sources feeding the aggregation core
//!
//! The three inputs (pod specifications, usage metrics and node capacity)
//! are fetched independently. [`ClusterSource`] is the seam between the
//! Kubernetes API and the pure aggregation code; [`KubeSource`] is the
//! implementation backed by a `kube::Client`.

mod cluster;
mod metrics;

pub use cluster::KubeSource;
pub use metrics::{ContainerMetrics, NodeMetrics, PodMetrics, Usage, METRICS_API_GROUP};

use crate::error::Result;
use crate::models::{NodeCapacity, ResourceTotals, UsageSample};
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

pub use async_trait::async_trait;

/// Filters for pod listings
#[derive(Debug, Clone, Default)]
pub struct PodQuery {
    /// `None` lists every namespace
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    /// Keep only these pod names; empty keeps all
    pub names: Vec<String>,
}

/// Filters for node listings
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub label_selector: Option<String>,
    /// Keep only these node names; empty keeps all
    pub names: Vec<String>,
}

/// Fetches the raw inputs of one snapshot
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Fail with [`crate::RltopError::MetricsApiUnavailable`] unless metrics.k8s.io is served
    async fn ensure_metrics_api(&self) -> Result<()>;

    /// Pod specifications matching the query
    async fn pods(&self, query: &PodQuery) -> Result<Vec<Pod>>;

    /// Pod usage matching the query, summed across containers
    async fn pod_usage(&self, query: &PodQuery) -> Result<Vec<UsageSample>>;

    /// Every pod in the cluster, used to total requests per node
    async fn scheduled_pods(&self) -> Result<Vec<Pod>>;

    /// Allocatable and capacity of the nodes matching the query, by node name
    async fn nodes(&self, query: &NodeQuery) -> Result<BTreeMap<String, NodeCapacity>>;

    /// Node usage matching the query
    async fn node_usage(&self, query: &NodeQuery) -> Result<Vec<UsageSample>>;
}

/// Allocatable and capacity figures of a node
pub fn node_capacity(node: &Node) -> NodeCapacity {
    let status = node.status.as_ref();
    let read = |list: Option<&BTreeMap<String, Quantity>>| {
        list.map(ResourceTotals::from_resource_list).unwrap_or_default()
    };
    NodeCapacity {
        allocatable: read(status.and_then(|s| s.allocatable.as_ref())),
        capacity: read(status.and_then(|s| s.capacity.as_ref())),
    }
}

/// Keep items whose name is listed; an empty list keeps everything
pub(crate) fn retain_named<T>(
    items: &mut Vec<T>,
    names: &[String],
    name_of: impl Fn(&T) -> Option<&str>,
) {
    if names.is_empty() {
        return;
    }
    items.retain(|item| name_of(item).is_some_and(|n| names.iter().any(|wanted| wanted == n)));
}
