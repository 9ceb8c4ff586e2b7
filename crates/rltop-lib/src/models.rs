//! Core data models shared by the aggregation and combination stages

use crate::quantity::ResourceKind;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Add;

/// CPU (milli-cores) and memory (bytes) totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub cpu: u64,
    pub memory: u64,
}

impl ResourceTotals {
    pub fn new(cpu: u64, memory: u64) -> Self {
        Self { cpu, memory }
    }

    /// Read `cpu` and `memory` out of a Kubernetes resource list.
    /// Missing entries count as zero.
    pub fn from_resource_list(list: &BTreeMap<String, Quantity>) -> Self {
        let read = |kind: ResourceKind| list.get(kind.key()).map_or(0, |q| kind.amount(q));
        Self {
            cpu: read(ResourceKind::Cpu),
            memory: read(ResourceKind::Memory),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
        }
    }

    /// Per-kind maximum
    pub fn max(self, other: Self) -> Self {
        Self {
            cpu: self.cpu.max(other.cpu),
            memory: self.memory.max(other.memory),
        }
    }
}

impl Add for ResourceTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cpu: self.cpu.saturating_add(other.cpu),
            memory: self.memory.saturating_add(other.memory),
        }
    }
}

impl std::iter::Sum for ResourceTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Declared requests and limits for one pod or node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAggregate {
    pub requests: ResourceTotals,
    pub limits: ResourceTotals,
}

/// Identity of a pod: namespace and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PodKey {
    pub namespace: String,
    pub name: String,
}

impl PodKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for PodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Point-in-time usage reading for one pod or node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSample {
    pub name: String,
    /// Set for pods, `None` for nodes
    pub namespace: Option<String>,
    pub usage: ResourceTotals,
}

impl UsageSample {
    pub fn pod(namespace: impl Into<String>, name: impl Into<String>, usage: ResourceTotals) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            usage,
        }
    }

    pub fn node(name: impl Into<String>, usage: ResourceTotals) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            usage,
        }
    }

    pub fn pod_key(&self) -> PodKey {
        PodKey::new(self.namespace.clone().unwrap_or_default(), self.name.clone())
    }
}

/// Which node figure percentages are computed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityBasis {
    #[default]
    Allocatable,
    Capacity,
}

/// A node's allocatable and capacity totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapacity {
    pub allocatable: ResourceTotals,
    pub capacity: ResourceTotals,
}

impl NodeCapacity {
    pub fn reference(&self, basis: CapacityBasis) -> &ResourceTotals {
        match basis {
            CapacityBasis::Allocatable => &self.allocatable,
            CapacityBasis::Capacity => &self.capacity,
        }
    }
}

/// One rendered row of the pod view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodRow {
    pub namespace: String,
    pub name: String,
    pub cpu_usage: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_usage: String,
    pub memory_request: String,
    pub memory_limit: String,
    /// Exact usage behind the display strings, `None` when metrics are missing
    #[serde(skip)]
    pub usage: Option<ResourceTotals>,
}

/// One rendered row of the node view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub name: String,
    pub cpu_usage: String,
    pub cpu_percent: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_usage: String,
    pub memory_percent: String,
    pub memory_request: String,
    pub memory_limit: String,
    #[serde(skip)]
    pub usage: Option<ResourceTotals>,
}
