//! Joins usage samples, declared requests/limits and node capacity into display rows
//!
//! Every usage sample produces a row. Entities that have requests/limits
//! but no usage yet also produce a row, with usage shown as `<unknown>`.
//! Memory requests and limits are rendered in the unit of the row's memory
//! usage so the three memory columns read alike.

use crate::format::{
    format_cpu, format_memory, format_memory_in_unit, format_quantity, MemoryUnit, NOT_SET,
    UNKNOWN,
};
use crate::models::{
    CapacityBasis, NodeCapacity, NodeRow, PodKey, PodRow, ResourceAggregate, UsageSample,
};
use crate::percent::calculate_percentages;
use crate::quantity::ResourceKind;
use std::collections::{BTreeMap, HashSet};

/// Request and limit columns of a row
struct DeclaredColumns {
    cpu_request: String,
    cpu_limit: String,
    memory_request: String,
    memory_limit: String,
}

impl DeclaredColumns {
    fn render(aggregate: Option<&ResourceAggregate>, memory_unit: MemoryUnit) -> Self {
        match aggregate {
            Some(agg) => Self {
                cpu_request: format_quantity(agg.requests.cpu, ResourceKind::Cpu),
                cpu_limit: format_quantity(agg.limits.cpu, ResourceKind::Cpu),
                memory_request: format_memory_in_unit(agg.requests.memory, memory_unit),
                memory_limit: format_memory_in_unit(agg.limits.memory, memory_unit),
            },
            None => Self {
                cpu_request: NOT_SET.to_string(),
                cpu_limit: NOT_SET.to_string(),
                memory_request: NOT_SET.to_string(),
                memory_limit: NOT_SET.to_string(),
            },
        }
    }
}

/// Combine pod usage with per-pod aggregates, joined on namespace and name
pub fn combine_pods(
    usage: &[UsageSample],
    aggregates: &BTreeMap<PodKey, ResourceAggregate>,
) -> Vec<PodRow> {
    let mut rows = Vec::with_capacity(usage.len().max(aggregates.len()));
    let mut seen = HashSet::new();

    for sample in usage {
        let key = sample.pod_key();
        if !seen.insert(key.clone()) {
            continue;
        }

        let unit = MemoryUnit::for_bytes(sample.usage.memory);
        let declared = DeclaredColumns::render(aggregates.get(&key), unit);
        rows.push(PodRow {
            namespace: key.namespace,
            name: key.name,
            cpu_usage: format_cpu(sample.usage.cpu),
            cpu_request: declared.cpu_request,
            cpu_limit: declared.cpu_limit,
            memory_usage: format_memory(sample.usage.memory),
            memory_request: declared.memory_request,
            memory_limit: declared.memory_limit,
            usage: Some(sample.usage),
        });
    }

    for (key, aggregate) in aggregates {
        if seen.contains(key) {
            continue;
        }

        let declared = DeclaredColumns::render(Some(aggregate), MemoryUnit::default());
        rows.push(PodRow {
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            cpu_usage: UNKNOWN.to_string(),
            cpu_request: declared.cpu_request,
            cpu_limit: declared.cpu_limit,
            memory_usage: UNKNOWN.to_string(),
            memory_request: declared.memory_request,
            memory_limit: declared.memory_limit,
            usage: None,
        });
    }

    rows
}

/// Combine node usage with per-node aggregates and capacity, joined on node name.
///
/// When `capacities` is given, nodes that only appear in `aggregates` get a
/// row only if they are also in `capacities`; the capacity listing is the one
/// that honours the caller's node filters.
pub fn combine_nodes(
    usage: &[UsageSample],
    aggregates: &BTreeMap<String, ResourceAggregate>,
    capacities: Option<&BTreeMap<String, NodeCapacity>>,
    basis: CapacityBasis,
) -> Vec<NodeRow> {
    let mut rows = Vec::with_capacity(usage.len());
    let mut seen = HashSet::new();

    for sample in usage {
        if !seen.insert(sample.name.as_str()) {
            continue;
        }

        let reference = capacities
            .and_then(|c| c.get(&sample.name))
            .map(|node| node.reference(basis));
        let (cpu_percent, memory_percent) =
            calculate_percentages(reference, sample.usage.cpu, sample.usage.memory);

        let unit = MemoryUnit::for_bytes(sample.usage.memory);
        let declared = DeclaredColumns::render(aggregates.get(&sample.name), unit);
        rows.push(NodeRow {
            name: sample.name.clone(),
            cpu_usage: format_cpu(sample.usage.cpu),
            cpu_percent,
            cpu_request: declared.cpu_request,
            cpu_limit: declared.cpu_limit,
            memory_usage: format_memory(sample.usage.memory),
            memory_percent,
            memory_request: declared.memory_request,
            memory_limit: declared.memory_limit,
            usage: Some(sample.usage),
        });
    }

    for (name, aggregate) in aggregates {
        if seen.contains(name.as_str()) {
            continue;
        }
        if capacities.is_some_and(|c| !c.contains_key(name)) {
            continue;
        }

        let declared = DeclaredColumns::render(Some(aggregate), MemoryUnit::default());
        rows.push(NodeRow {
            name: name.clone(),
            cpu_usage: UNKNOWN.to_string(),
            cpu_percent: UNKNOWN.to_string(),
            cpu_request: declared.cpu_request,
            cpu_limit: declared.cpu_limit,
            memory_usage: UNKNOWN.to_string(),
            memory_percent: UNKNOWN.to_string(),
            memory_request: declared.memory_request,
            memory_limit: declared.memory_limit,
            usage: None,
        });
    }

    rows
}
