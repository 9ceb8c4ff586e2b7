//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use rltop_lib::{NodeRow, PodRow};
use serde::{Deserialize, Serialize};
use tabled::{builder::Builder, settings::Style};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Table layout switches
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    pub no_headers: bool,
    /// Add a NAMESPACE column (pods listed across namespaces)
    pub show_namespace: bool,
}

const POD_HEADERS: [&str; 7] = [
    "NAME",
    "CPU(cores)",
    "CPU REQUEST",
    "CPU LIMIT",
    "MEMORY(bytes)",
    "MEMORY REQUEST",
    "MEMORY LIMIT",
];

const NODE_HEADERS: [&str; 9] = [
    "NAME",
    "CPU(cores)",
    "CPU%",
    "CPU REQUEST",
    "CPU LIMIT",
    "MEMORY(bytes)",
    "MEMORY%",
    "MEMORY REQUEST",
    "MEMORY LIMIT",
];

/// JSON document wrapping one snapshot
#[derive(Serialize)]
struct SnapshotDocument<'a, T> {
    kind: &'static str,
    generated_at: String,
    items: &'a [T],
}

fn to_json<T: Serialize>(kind: &'static str, items: &[T]) -> Result<String> {
    let document = SnapshotDocument {
        kind,
        generated_at: chrono::Utc::now().to_rfc3339(),
        items,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn render_table(headers: &[&str], records: Vec<Vec<String>>, no_headers: bool) -> String {
    let mut builder = Builder::default();
    if !no_headers {
        builder.push_record(headers.iter().map(|h| h.to_string()));
    }
    for record in records {
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

/// Render pod rows as a table
pub fn pod_table(rows: &[PodRow], options: TableOptions) -> String {
    let mut headers = Vec::with_capacity(POD_HEADERS.len() + 1);
    if options.show_namespace {
        headers.push("NAMESPACE");
    }
    headers.extend(POD_HEADERS);

    let records = rows
        .iter()
        .map(|r| {
            let mut record = Vec::with_capacity(headers.len());
            if options.show_namespace {
                record.push(r.namespace.clone());
            }
            record.extend([
                r.name.clone(),
                r.cpu_usage.clone(),
                r.cpu_request.clone(),
                r.cpu_limit.clone(),
                r.memory_usage.clone(),
                r.memory_request.clone(),
                r.memory_limit.clone(),
            ]);
            record
        })
        .collect();

    render_table(&headers, records, options.no_headers)
}

/// Render node rows as a table
pub fn node_table(rows: &[NodeRow], options: TableOptions) -> String {
    let records = rows
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.cpu_usage.clone(),
                r.cpu_percent.clone(),
                r.cpu_request.clone(),
                r.cpu_limit.clone(),
                r.memory_usage.clone(),
                r.memory_percent.clone(),
                r.memory_request.clone(),
                r.memory_limit.clone(),
            ]
        })
        .collect();

    render_table(&NODE_HEADERS, records, options.no_headers)
}

/// Print pod rows in the requested format
pub fn print_pods(rows: &[PodRow], format: OutputFormat, options: TableOptions) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", pod_table(rows, options)),
        OutputFormat::Json => println!("{}", to_json("PodList", rows)?),
    }
    Ok(())
}

/// Print node rows in the requested format
pub fn print_nodes(rows: &[NodeRow], format: OutputFormat, options: TableOptions) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", node_table(rows, options)),
        OutputFormat::Json => println!("{}", to_json("NodeList", rows)?),
    }
    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}
