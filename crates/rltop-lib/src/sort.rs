//! Row ordering for presentation

use crate::error::RltopError;
use crate::models::{NodeRow, PodRow, ResourceTotals};
use crate::quantity::ResourceKind;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::str::FromStr;

/// Field rows are sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Ascending by name
    #[default]
    Name,
    /// Descending by CPU usage
    Cpu,
    /// Descending by memory usage
    Memory,
}

impl FromStr for SortBy {
    type Err = RltopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "name" => Ok(SortBy::Name),
            "cpu" => Ok(SortBy::Cpu),
            "memory" => Ok(SortBy::Memory),
            _ => Err(RltopError::InvalidSortKey(s.to_string())),
        }
    }
}

impl SortBy {
    /// Usage magnitude for this key; missing usage counts as zero
    fn magnitude(self, usage: Option<ResourceTotals>) -> u64 {
        let kind = match self {
            SortBy::Name => return 0,
            SortBy::Cpu => ResourceKind::Cpu,
            SortBy::Memory => ResourceKind::Memory,
        };
        usage.unwrap_or_default().get(kind)
    }
}

pub fn sort_pod_rows(rows: &mut [PodRow], by: SortBy) {
    rows.sort_by(|a, b| {
        Reverse(by.magnitude(a.usage))
            .cmp(&Reverse(by.magnitude(b.usage)))
            .then_with(|| a.namespace.cmp(&b.namespace))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn sort_node_rows(rows: &mut [NodeRow], by: SortBy) {
    rows.sort_by(|a, b| {
        Reverse(by.magnitude(a.usage))
            .cmp(&Reverse(by.magnitude(b.usage)))
            .then_with(|| a.name.cmp(&b.name))
    });
}
