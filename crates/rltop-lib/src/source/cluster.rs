//! Kubernetes API backed [`ClusterSource`]

use super::{node_capacity, retain_named, ClusterSource, NodeQuery, PodQuery};
use super::metrics::{NodeMetrics, PodMetrics, METRICS_API_GROUP};
use crate::error::{Result, RltopError};
use crate::models::{NodeCapacity, UsageSample};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ListParams};
use kube::Client;
use std::collections::BTreeMap;
use tracing::debug;

/// Reads pods, nodes and metrics through a `kube::Client`
#[derive(Clone)]
pub struct KubeSource {
    client: Client,
}

impl KubeSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pod_api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

fn pod_list_params(query: &PodQuery) -> ListParams {
    let params = pod_metrics_list_params(query);
    match query.field_selector.as_deref() {
        Some(fields) => params.fields(fields),
        None => params,
    }
}

/// metrics-server only understands metadata field selectors, so pod field
/// selectors such as `status.phase` are applied to the pod listing and the
/// snapshot drops usage for pods that listing excluded
fn pod_metrics_list_params(query: &PodQuery) -> ListParams {
    match query.label_selector.as_deref() {
        Some(labels) => ListParams::default().labels(labels),
        None => ListParams::default(),
    }
}

fn node_list_params(query: &NodeQuery) -> ListParams {
    match query.label_selector.as_deref() {
        Some(labels) => ListParams::default().labels(labels),
        None => ListParams::default(),
    }
}

#[async_trait]
impl ClusterSource for KubeSource {
    async fn ensure_metrics_api(&self) -> Result<()> {
        let groups = self
            .client
            .list_api_groups()
            .await
            .map_err(RltopError::kube("API groups"))?;

        if groups.groups.iter().any(|g| g.name == METRICS_API_GROUP) {
            Ok(())
        } else {
            Err(RltopError::MetricsApiUnavailable)
        }
    }

    async fn pods(&self, query: &PodQuery) -> Result<Vec<Pod>> {
        let api: Api<Pod> = self.pod_api(query.namespace.as_deref());
        let mut pods = api
            .list(&pod_list_params(query))
            .await
            .map_err(RltopError::kube("pods"))?
            .items;

        retain_named(&mut pods, &query.names, |p| p.metadata.name.as_deref());
        debug!(count = pods.len(), "Fetched pods");
        Ok(pods)
    }

    async fn pod_usage(&self, query: &PodQuery) -> Result<Vec<UsageSample>> {
        let api: Api<PodMetrics> = self.pod_api(query.namespace.as_deref());
        let mut metrics = api
            .list(&pod_metrics_list_params(query))
            .await
            .map_err(RltopError::kube("pod metrics"))?
            .items;

        retain_named(&mut metrics, &query.names, |m| m.metadata.name.as_deref());
        debug!(count = metrics.len(), "Fetched pod metrics");
        Ok(metrics.iter().map(PodMetrics::usage_sample).collect())
    }

    async fn scheduled_pods(&self) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let pods = api
            .list(&ListParams::default())
            .await
            .map_err(RltopError::kube("pods"))?
            .items;

        debug!(count = pods.len(), "Fetched pods in all namespaces");
        Ok(pods)
    }

    async fn nodes(&self, query: &NodeQuery) -> Result<BTreeMap<String, NodeCapacity>> {
        let api: Api<Node> = Api::all(self.client.clone());
        let mut nodes = api
            .list(&node_list_params(query))
            .await
            .map_err(RltopError::kube("nodes"))?
            .items;

        retain_named(&mut nodes, &query.names, |n| n.metadata.name.as_deref());
        debug!(count = nodes.len(), "Fetched nodes");
        Ok(nodes
            .iter()
            .filter_map(|n| Some((n.metadata.name.clone()?, node_capacity(n))))
            .collect())
    }

    async fn node_usage(&self, query: &NodeQuery) -> Result<Vec<UsageSample>> {
        let api: Api<NodeMetrics> = Api::all(self.client.clone());
        let mut metrics = api
            .list(&node_list_params(query))
            .await
            .map_err(RltopError::kube("node metrics"))?
            .items;

        retain_named(&mut metrics, &query.names, |m| m.metadata.name.as_deref());
        debug!(count = metrics.len(), "Fetched node metrics");
        Ok(metrics.iter().map(NodeMetrics::usage_sample).collect())
    }
}
