//! Snapshot tests against an in-memory cluster
//!
//! These tests cover:
//! - Joining fetched pods, metrics and nodes into rows
//! - Error propagation from any fetch, including fail-fast behaviour

use super::*;
use crate::aggregate::test_support::{container, cpu_request_pod, pod};
use crate::error::RltopError;
use crate::format::{NOT_SET, UNKNOWN};
use crate::models::{NodeCapacity, ResourceTotals, UsageSample};
use crate::source::async_trait;
use k8s_openapi::api::core::v1::Pod;
use std::collections::BTreeMap;
use std::time::Duration;

/// Which fetch of the fake cluster misbehaves
#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    None,
    NoMetricsApi,
    FailPods,
    FailNodeUsage,
    /// Pod usage never completes while the pod listing fails
    HangUsageFailPods,
}

struct FakeCluster {
    pods: Vec<Pod>,
    pod_usage: Vec<UsageSample>,
    nodes: BTreeMap<String, NodeCapacity>,
    node_usage: Vec<UsageSample>,
    fault: Fault,
}

impl FakeCluster {
    fn new() -> Self {
        let pods = vec![
            pod(
                "default",
                "web",
                Some("node1"),
                vec![container((Some("250m"), Some("256Mi")), (Some("500m"), Some("512Mi")))],
                vec![],
            ),
            cpu_request_pod("batch", "node1", "750m"),
            pod(
                "default",
                "pending",
                None,
                vec![container((Some("100m"), Some("64Mi")), (None, None))],
                vec![],
            ),
            cpu_request_pod("cache", "node2", "1"),
        ];

        let pod_usage = vec![
            UsageSample::pod("default", "web", ResourceTotals::new(120, 300 << 20)),
            UsageSample::pod("default", "batch", ResourceTotals::new(900, 1 << 30)),
            UsageSample::pod("default", "cache", ResourceTotals::new(10, 40 << 20)),
        ];

        let nodes = BTreeMap::from([
            (
                "node1".to_string(),
                NodeCapacity {
                    allocatable: ResourceTotals::new(4000, 8 << 30),
                    capacity: ResourceTotals::new(4000, 16 << 30),
                },
            ),
            (
                "node2".to_string(),
                NodeCapacity {
                    allocatable: ResourceTotals::new(2000, 4 << 30),
                    capacity: ResourceTotals::new(2000, 4 << 30),
                },
            ),
        ]);

        let node_usage = vec![UsageSample::node("node1", ResourceTotals::new(2000, 2 << 30))];

        Self {
            pods,
            pod_usage,
            nodes,
            node_usage,
            fault: Fault::None,
        }
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }
}

fn api_error(context: &'static str) -> RltopError {
    RltopError::Kube {
        context,
        source: kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        }),
    }
}

#[async_trait]
impl ClusterSource for FakeCluster {
    async fn ensure_metrics_api(&self) -> Result<()> {
        match self.fault {
            Fault::NoMetricsApi => Err(RltopError::MetricsApiUnavailable),
            _ => Ok(()),
        }
    }

    async fn pods(&self, query: &PodQuery) -> Result<Vec<Pod>> {
        if matches!(self.fault, Fault::FailPods | Fault::HangUsageFailPods) {
            return Err(api_error("pods"));
        }
        // only `spec.nodeName=<node>` is understood as a field selector
        let node = query
            .field_selector
            .as_deref()
            .and_then(|f| f.strip_prefix("spec.nodeName="));
        Ok(self
            .pods
            .iter()
            .filter(|p| query.names.is_empty() || query.names.contains(p.metadata.name.as_ref().unwrap()))
            .filter(|p| node.is_none() || p.spec.as_ref().unwrap().node_name.as_deref() == node)
            .cloned()
            .collect())
    }

    async fn pod_usage(&self, query: &PodQuery) -> Result<Vec<UsageSample>> {
        if self.fault == Fault::HangUsageFailPods {
            std::future::pending::<()>().await;
        }
        Ok(self
            .pod_usage
            .iter()
            .filter(|s| query.names.is_empty() || query.names.contains(&s.name))
            .cloned()
            .collect())
    }

    async fn scheduled_pods(&self) -> Result<Vec<Pod>> {
        if self.fault == Fault::FailPods {
            return Err(api_error("pods"));
        }
        Ok(self.pods.clone())
    }

    async fn nodes(&self, query: &NodeQuery) -> Result<BTreeMap<String, NodeCapacity>> {
        Ok(self
            .nodes
            .iter()
            .filter(|(name, _)| query.names.is_empty() || query.names.contains(name))
            .map(|(name, capacity)| (name.clone(), *capacity))
            .collect())
    }

    async fn node_usage(&self, _query: &NodeQuery) -> Result<Vec<UsageSample>> {
        if self.fault == Fault::FailNodeUsage {
            return Err(api_error("node metrics"));
        }
        Ok(self.node_usage.clone())
    }
}

mod pod_snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn test_pod_rows() {
        let cluster = FakeCluster::new();
        let rows = pod_snapshot(&cluster, &PodQuery::default(), SortBy::Name)
            .await
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["batch", "cache", "pending", "web"]);

        let web = rows.iter().find(|r| r.name == "web").unwrap();
        assert_eq!(web.cpu_usage, "120m");
        assert_eq!(web.cpu_request, "250m");
        assert_eq!(web.cpu_limit, "500m");
        assert_eq!(web.memory_usage, "300.00Mi");
        assert_eq!(web.memory_request, "256.00Mi");
        assert_eq!(web.memory_limit, "512.00Mi");

        let batch = rows.iter().find(|r| r.name == "batch").unwrap();
        assert_eq!(batch.memory_usage, "1.00Gi");
        assert_eq!(batch.memory_request, NOT_SET);

        let pending = rows.iter().find(|r| r.name == "pending").unwrap();
        assert_eq!(pending.cpu_usage, UNKNOWN);
        assert_eq!(pending.memory_request, "64.00Mi");
    }

    #[tokio::test]
    async fn test_pod_rows_sorted_by_cpu() {
        let cluster = FakeCluster::new();
        let rows = pod_snapshot(&cluster, &PodQuery::default(), SortBy::Cpu)
            .await
            .unwrap();
        assert_eq!(rows[0].name, "batch");
        assert_eq!(rows.last().unwrap().name, "pending");
    }

    #[tokio::test]
    async fn test_pod_name_filter() {
        let cluster = FakeCluster::new();
        let query = PodQuery {
            names: vec!["web".to_string()],
            ..Default::default()
        };
        let rows = pod_snapshot(&cluster, &query, SortBy::Name).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "web");
    }

    #[tokio::test]
    async fn test_field_selector_excludes_usage_rows() {
        let cluster = FakeCluster::new();
        let query = PodQuery {
            field_selector: Some("spec.nodeName=node1".to_string()),
            ..Default::default()
        };
        let rows = pod_snapshot(&cluster, &query, SortBy::Name).await.unwrap();

        // cache runs on node2 and has usage, but the selector filtered it out
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["batch", "web"]);
        assert!(rows.iter().all(|r| r.cpu_request != NOT_SET));
    }

    #[tokio::test]
    async fn test_missing_metrics_api() {
        let cluster = FakeCluster::new().with_fault(Fault::NoMetricsApi);
        let err = pod_snapshot(&cluster, &PodQuery::default(), SortBy::Name)
            .await
            .unwrap_err();
        assert!(matches!(err, RltopError::MetricsApiUnavailable));
        assert!(err.to_string().contains("metrics-server"));
    }

    #[tokio::test]
    async fn test_fetch_error_is_propagated() {
        let cluster = FakeCluster::new().with_fault(Fault::FailPods);
        let err = pod_snapshot(&cluster, &PodQuery::default(), SortBy::Name)
            .await
            .unwrap_err();
        assert!(matches!(err, RltopError::Kube { context: "pods", .. }));
    }

    #[tokio::test]
    async fn test_first_error_does_not_wait_for_other_fetches() {
        let cluster = FakeCluster::new().with_fault(Fault::HangUsageFailPods);
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            pod_snapshot(&cluster, &PodQuery::default(), SortBy::Name),
        )
        .await
        .expect("snapshot should fail fast");
        assert!(result.is_err());
    }
}

mod node_snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn test_node_rows() {
        let cluster = FakeCluster::new();
        let rows = node_snapshot(
            &cluster,
            &NodeQuery::default(),
            CapacityBasis::Allocatable,
            SortBy::Name,
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);

        let node1 = &rows[0];
        assert_eq!(node1.name, "node1");
        assert_eq!(node1.cpu_usage, "2");
        assert_eq!(node1.cpu_percent, "50%");
        // web 250m + batch 750m; the unscheduled pod does not count
        assert_eq!(node1.cpu_request, "1");
        assert_eq!(node1.cpu_limit, "500m");
        assert_eq!(node1.memory_usage, "2.00Gi");
        assert_eq!(node1.memory_percent, "25%");
        assert_eq!(node1.memory_request, "0.25Gi");
        assert_eq!(node1.memory_limit, "0.50Gi");

        // node2 has pods but no metrics yet
        let node2 = &rows[1];
        assert_eq!(node2.name, "node2");
        assert_eq!(node2.cpu_usage, UNKNOWN);
        assert_eq!(node2.cpu_request, "1");
        assert_eq!(node2.memory_request, NOT_SET);
    }

    #[tokio::test]
    async fn test_capacity_basis() {
        let cluster = FakeCluster::new();
        let rows = node_snapshot(
            &cluster,
            &NodeQuery::default(),
            CapacityBasis::Capacity,
            SortBy::Name,
        )
        .await
        .unwrap();
        assert_eq!(rows[0].memory_percent, "13%");
    }

    #[tokio::test]
    async fn test_node_filter_limits_rows() {
        let cluster = FakeCluster::new();
        let query = NodeQuery {
            names: vec!["node1".to_string()],
            ..Default::default()
        };
        let rows = node_snapshot(&cluster, &query, CapacityBasis::Allocatable, SortBy::Name)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "node1");
    }

    #[tokio::test]
    async fn test_node_fetch_error() {
        let cluster = FakeCluster::new().with_fault(Fault::FailNodeUsage);
        let err = node_snapshot(
            &cluster,
            &NodeQuery::default(),
            CapacityBasis::Allocatable,
            SortBy::Name,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RltopError::Kube { context: "node metrics", .. }));
    }
}
