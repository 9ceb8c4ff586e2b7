//! Reduction of pod specifications into per-pod and per-node request/limit totals
//!
//! Regular containers run concurrently, so their requests and limits add up.
//! Init containers run one at a time before them, so an init container only
//! matters when its request exceeds what the regular containers ask for.
//! Init-container limits are not folded in.

use crate::models::{PodKey, ResourceAggregate, ResourceTotals};
use k8s_openapi::api::core::v1::{Container, Pod};
use std::collections::BTreeMap;
use tracing::debug;

fn requests(container: &Container) -> ResourceTotals {
    container
        .resources
        .as_ref()
        .and_then(|r| r.requests.as_ref())
        .map(ResourceTotals::from_resource_list)
        .unwrap_or_default()
}

fn limits(container: &Container) -> ResourceTotals {
    container
        .resources
        .as_ref()
        .and_then(|r| r.limits.as_ref())
        .map(ResourceTotals::from_resource_list)
        .unwrap_or_default()
}

/// Running totals for one entity before the init-container rule is applied
#[derive(Debug, Default)]
struct Tally {
    requests: ResourceTotals,
    limits: ResourceTotals,
    init_peak: ResourceTotals,
}

impl Tally {
    fn add_pod(&mut self, pod: &Pod) {
        let Some(spec) = &pod.spec else {
            return;
        };

        for container in &spec.containers {
            self.requests = self.requests + requests(container);
            self.limits = self.limits + limits(container);
        }

        for container in spec.init_containers.iter().flatten() {
            self.init_peak = self.init_peak.max(requests(container));
        }
    }

    fn finish(self) -> ResourceAggregate {
        ResourceAggregate {
            requests: self.requests.max(self.init_peak),
            limits: self.limits,
        }
    }
}

/// Effective requests and limits of a single pod
pub fn aggregate_pod(pod: &Pod) -> ResourceAggregate {
    let mut tally = Tally::default();
    tally.add_pod(pod);
    tally.finish()
}

/// Per-pod aggregates keyed by namespace and name
pub fn aggregate_by_pod(pods: &[Pod]) -> BTreeMap<PodKey, ResourceAggregate> {
    pods.iter()
        .map(|pod| {
            let key = PodKey::new(
                pod.metadata.namespace.clone().unwrap_or_default(),
                pod.metadata.name.clone().unwrap_or_default(),
            );
            (key, aggregate_pod(pod))
        })
        .collect()
}

/// Per-node aggregates keyed by node name.
///
/// Pods without an assigned node are skipped. For each node the request is
/// `max(sum of regular-container requests, largest init-container request)`
/// per resource kind; limits are the sum of regular-container limits. Both
/// sum and max are order independent, so the pod order does not matter.
/// Nodes with no scheduled pods are absent from the result.
pub fn aggregate_by_node(pods: &[Pod]) -> BTreeMap<String, ResourceAggregate> {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    let mut unscheduled = 0usize;

    for pod in pods {
        let node = pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.as_deref())
            .filter(|n| !n.is_empty());

        match node {
            Some(node) => tallies.entry(node.to_string()).or_default().add_pod(pod),
            None => unscheduled += 1,
        }
    }

    debug!(
        nodes = tallies.len(),
        pods = pods.len(),
        unscheduled,
        "Aggregated pod resources by node"
    );

    tallies
        .into_iter()
        .map(|(node, tally)| (node, tally.finish()))
        .collect()
}
