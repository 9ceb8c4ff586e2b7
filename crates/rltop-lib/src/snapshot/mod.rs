//! One-shot snapshots: concurrent fetch, then aggregate and combine
//!
//! The fetches of a snapshot are independent and run concurrently. The first
//! one to fail ends the snapshot with its error and the others are dropped;
//! nothing is retried.

use crate::aggregate::{aggregate_by_node, aggregate_by_pod};
use crate::combine::{combine_nodes, combine_pods};
use crate::error::Result;
use crate::models::{CapacityBasis, NodeRow, PodRow};
use std::collections::BTreeSet;
use crate::sort::{sort_node_rows, sort_pod_rows, SortBy};
use crate::source::{ClusterSource, NodeQuery, PodQuery};
use tracing::debug;

/// Usage, requests and limits for the pods matching `query`
pub async fn pod_snapshot<S>(source: &S, query: &PodQuery, sort_by: SortBy) -> Result<Vec<PodRow>>
where
    S: ClusterSource + ?Sized,
{
    source.ensure_metrics_api().await?;

    let (mut usage, pods) = tokio::try_join!(source.pod_usage(query), source.pods(query))?;

    let aggregates = aggregate_by_pod(&pods);
    if query.field_selector.is_some() {
        // usage is not field-selected; keep only pods the selector matched
        let listed: BTreeSet<_> = aggregates.keys().collect();
        usage.retain(|sample| listed.contains(&sample.pod_key()));
    }
    let mut rows = combine_pods(&usage, &aggregates);
    sort_pod_rows(&mut rows, sort_by);

    debug!(rows = rows.len(), samples = usage.len(), pods = pods.len(), "Built pod snapshot");
    Ok(rows)
}

/// Usage, percentages and the summed requests and limits of the pods on
/// each node matching `query`
pub async fn node_snapshot<S>(
    source: &S,
    query: &NodeQuery,
    basis: CapacityBasis,
    sort_by: SortBy,
) -> Result<Vec<NodeRow>>
where
    S: ClusterSource + ?Sized,
{
    source.ensure_metrics_api().await?;

    let (usage, pods, capacities) = tokio::try_join!(
        source.node_usage(query),
        source.scheduled_pods(),
        source.nodes(query)
    )?;

    let aggregates = aggregate_by_node(&pods);
    let mut rows = combine_nodes(&usage, &aggregates, Some(&capacities), basis);
    sort_node_rows(&mut rows, sort_by);

    debug!(rows = rows.len(), nodes = capacities.len(), ?basis, "Built node snapshot");
    Ok(rows)
}

#[cfg(test)]
mod tests;
