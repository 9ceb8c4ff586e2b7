//! `metrics.k8s.io/v1beta1` resource types
//!
//! The metrics API is served by metrics-server as an aggregated API and is
//! not part of k8s-openapi, so the two list types are declared here.

use crate::models::{ResourceTotals, UsageSample};
use crate::quantity::ResourceKind;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

pub const METRICS_API_GROUP: &str = "metrics.k8s.io";

/// CPU and memory usage as reported by metrics-server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub cpu: Option<Quantity>,
    #[serde(default)]
    pub memory: Option<Quantity>,
}

impl Usage {
    pub fn totals(&self) -> ResourceTotals {
        let read = |kind: ResourceKind, q: &Option<Quantity>| q.as_ref().map_or(0, |q| kind.amount(q));
        ResourceTotals {
            cpu: read(ResourceKind::Cpu, &self.cpu),
            memory: read(ResourceKind::Memory, &self.memory),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodMetrics {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

impl PodMetrics {
    /// Usage summed across the pod's containers
    pub fn usage_sample(&self) -> UsageSample {
        UsageSample::pod(
            self.metadata.namespace.clone().unwrap_or_default(),
            self.metadata.name.clone().unwrap_or_default(),
            self.containers.iter().map(|c| c.usage.totals()).sum(),
        )
    }
}

impl k8s_openapi::Resource for PodMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = METRICS_API_GROUP;
    const KIND: &'static str = "PodMetrics";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "pods";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::Metadata for PodMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    pub usage: Usage,
}

impl NodeMetrics {
    pub fn usage_sample(&self) -> UsageSample {
        UsageSample::node(self.metadata.name.clone().unwrap_or_default(), self.usage.totals())
    }
}

impl k8s_openapi::Resource for NodeMetrics {
    const API_VERSION: &'static str = "metrics.k8s.io/v1beta1";
    const GROUP: &'static str = METRICS_API_GROUP;
    const KIND: &'static str = "NodeMetrics";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "nodes";
    type Scope = k8s_openapi::ClusterResourceScope;
}

impl k8s_openapi::Metadata for NodeMetrics {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_metrics_sums_containers() {
        let raw = serde_json::json!({
            "metadata": { "name": "web-7d9f", "namespace": "shop" },
            "timestamp": "2024-05-01T10:00:00Z",
            "window": "15s",
            "containers": [
                { "name": "app", "usage": { "cpu": "120m", "memory": "200Mi" } },
                { "name": "sidecar", "usage": { "cpu": "3512345n", "memory": "24Mi" } }
            ]
        });
        let metrics: PodMetrics = serde_json::from_value(raw).unwrap();

        let sample = metrics.usage_sample();
        assert_eq!(sample.name, "web-7d9f");
        assert_eq!(sample.namespace.as_deref(), Some("shop"));
        // 3512345n rounds up to 4m
        assert_eq!(sample.usage, ResourceTotals::new(124, 224 << 20));
    }

    #[test]
    fn test_node_metrics() {
        let raw = serde_json::json!({
            "metadata": { "name": "worker-1" },
            "timestamp": "2024-05-01T10:00:00Z",
            "window": "20s",
            "usage": { "cpu": "1500m", "memory": "3Gi" }
        });
        let metrics: NodeMetrics = serde_json::from_value(raw).unwrap();

        let sample = metrics.usage_sample();
        assert_eq!(sample.name, "worker-1");
        assert_eq!(sample.namespace, None);
        assert_eq!(sample.usage, ResourceTotals::new(1500, 3 << 30));
    }

    #[test]
    fn test_missing_usage_fields_are_zero() {
        let raw = serde_json::json!({
            "metadata": { "name": "worker-2" },
            "usage": {}
        });
        let metrics: NodeMetrics = serde_json::from_value(raw).unwrap();
        assert_eq!(metrics.usage_sample().usage, ResourceTotals::default());
    }
}
