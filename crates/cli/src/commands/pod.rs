//! `kubectl rltop pod`

use anyhow::{Context, Result};
use clap::Args;
use rltop_lib::{pod_snapshot, ClusterSource, PodQuery, SortBy};

use crate::config::Config;
use crate::output::{print_pods, print_warning, OutputFormat, TableOptions};

#[derive(Args, Debug, Default)]
pub struct PodArgs {
    /// Only show these pods
    pub names: Vec<String>,

    /// Namespace to list pods from
    #[arg(long, short, conflicts_with = "all_namespaces")]
    pub namespace: Option<String>,

    /// List pods across all namespaces
    #[arg(long, short = 'A')]
    pub all_namespaces: bool,

    /// Label selector (e.g. app=web,tier!=cache)
    #[arg(long, short = 'l')]
    pub selector: Option<String>,

    /// Field selector (e.g. status.phase=Running)
    #[arg(long)]
    pub field_selector: Option<String>,

    /// Sort by cpu or memory usage (name when omitted)
    #[arg(long)]
    pub sort_by: Option<SortBy>,

    /// Do not print table headers
    #[arg(long)]
    pub no_headers: bool,
}

impl PodArgs {
    /// Build the pod query; `None` namespace lists every namespace
    fn query(&self, config: &Config) -> PodQuery {
        let namespace = if self.all_namespaces {
            None
        } else {
            self.namespace
                .clone()
                .or_else(|| config.default_namespace.clone())
        };

        PodQuery {
            namespace,
            label_selector: self.selector.clone(),
            field_selector: self.field_selector.clone(),
            names: self.names.clone(),
        }
    }
}

/// Show usage, requests and limits per pod
pub async fn run<S: ClusterSource>(
    source: &S,
    args: PodArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let query = args.query(config);
    let sort_by = args.sort_by.or(config.sort_by).unwrap_or_default();

    let rows = pod_snapshot(source, &query, sort_by)
        .await
        .context("Failed to collect pod metrics")?;

    if rows.is_empty() {
        match &query.namespace {
            Some(ns) => print_warning(&format!("No pods found in {} namespace.", ns)),
            None => print_warning("No pods found."),
        }
        return Ok(());
    }

    let options = TableOptions {
        no_headers: args.no_headers || config.no_headers,
        show_namespace: query.namespace.is_none(),
    };
    print_pods(&rows, format, options)
}
