//! `kubectl rltop node`

use anyhow::{Context, Result};
use clap::Args;
use rltop_lib::{node_snapshot, CapacityBasis, ClusterSource, NodeQuery, SortBy};

use crate::config::Config;
use crate::output::{print_nodes, print_warning, OutputFormat, TableOptions};

#[derive(Args, Debug, Default)]
pub struct NodeArgs {
    /// Only show these nodes
    pub names: Vec<String>,

    /// Label selector (e.g. node-role.kubernetes.io/worker)
    #[arg(long, short = 'l')]
    pub selector: Option<String>,

    /// Compute percentages against node capacity instead of allocatable
    #[arg(long)]
    pub show_capacity: bool,

    /// Sort by cpu or memory usage (name when omitted)
    #[arg(long)]
    pub sort_by: Option<SortBy>,

    /// Do not print table headers
    #[arg(long)]
    pub no_headers: bool,
}

impl NodeArgs {
    fn query(&self) -> NodeQuery {
        NodeQuery {
            label_selector: self.selector.clone(),
            names: self.names.clone(),
        }
    }

    fn basis(&self, config: &Config) -> CapacityBasis {
        if self.show_capacity || config.show_capacity {
            CapacityBasis::Capacity
        } else {
            CapacityBasis::Allocatable
        }
    }
}

/// Show usage, percentages, and the summed requests and limits per node
pub async fn run<S: ClusterSource>(
    source: &S,
    args: NodeArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let sort_by = args.sort_by.or(config.sort_by).unwrap_or_default();

    let rows = node_snapshot(source, &args.query(), args.basis(config), sort_by)
        .await
        .context("Failed to collect node metrics")?;

    if rows.is_empty() {
        print_warning("No nodes found.");
        return Ok(());
    }

    let options = TableOptions {
        no_headers: args.no_headers || config.no_headers,
        show_namespace: false,
    };
    print_nodes(&rows, format, options)
}
