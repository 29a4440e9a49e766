//! Result rendering for the command line: text for humans, JSON for tools.
//!
//! The two failure shapes stay distinct all the way out: an unreachable
//! destination is a normal result with a warning line, a negative cycle is
//! an error with no distances at all.

use std::collections::BTreeMap;

use bellman_core::{Graph, PathError, Route, ShortestPaths};
use serde::Serialize;
use serde_json::json;

use crate::settings::OutputFormat;

/// What the `run` subcommand asked to see.
#[derive(Debug, Clone, Copy)]
pub struct RunView<'a> {
    pub destination: Option<&'a str>,
    pub show_all: bool,
}

#[derive(Serialize)]
struct RunReport<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Route<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distances: Option<&'a BTreeMap<String, Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<&'a BTreeMap<String, Vec<String>>>,
    rounds: usize,
}

/// Render a successful query.
pub fn render_run(
    sp: &ShortestPaths,
    view: RunView<'_>,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let report = RunReport {
                source: sp.source(),
                destination: view.destination,
                route: view.destination.map(|d| sp.route(d)),
                distances: view.show_all.then(|| sp.distances()),
                paths: view.show_all.then(|| sp.paths()),
                rounds: sp.rounds(),
            };
            serde_json::to_string_pretty(&report)
        }
        OutputFormat::Text => Ok(render_run_text(sp, view)),
    }
}

fn render_run_text(sp: &ShortestPaths, view: RunView<'_>) -> String {
    let mut out = String::new();

    if let Some(dest) = view.destination {
        out.push_str(&route_line(sp.source(), dest, &sp.route(dest)));
        out.push('\n');
    }

    if view.show_all || view.destination.is_none() {
        if view.destination.is_some() {
            out.push('\n');
        }
        out.push_str(&distance_table(sp));
    }

    out
}

/// One-destination summary, e.g. `Shortest distance from A to B: 2`.
pub fn route_line(source: &str, destination: &str, route: &Route<'_>) -> String {
    match route {
        Route::Reachable { distance, path } => format!(
            "Shortest distance from {} to {}: {}\nPath: {}",
            source,
            destination,
            distance,
            path.join(" -> ")
        ),
        Route::Unreachable => format!("No path exists from {} to {}.", source, destination),
        Route::Unknown => format!("Node '{}' is not in the graph.", destination),
    }
}

/// Distance and path for every node, unreachable ones shown as `inf`.
fn distance_table(sp: &ShortestPaths) -> String {
    let mut out = String::new();
    let width = sp
        .distances()
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max("node".len());

    out.push_str(&format!("{:<width$}  {:>12}  path\n", "node", "distance", width = width));
    out.push_str(&format!("{:-<width$}  {:->12}  {:-<4}\n", "", "", "", width = width));
    for (node, dist) in sp.distances() {
        let path = sp
            .path(node)
            .map(|p| p.join(" -> "))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<width$}  {:>12}  {}\n",
            node,
            format_distance(*dist),
            path,
            width = width
        ));
    }
    out
}

/// Two-decimal distance, or `inf` when unreachable.
pub fn format_distance(dist: Option<f64>) -> String {
    match dist {
        Some(d) => format!("{:.2}", d),
        None => "inf".to_string(),
    }
}

/// Render a failed query.
pub fn render_error(err: &PathError, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format!("Error: {}", err)),
        OutputFormat::Json => {
            let value = match err {
                PathError::InvalidSource(node) => json!({
                    "error": "invalid_source",
                    "message": err.to_string(),
                    "source": node,
                }),
                PathError::NegativeCycle { origin, cycle } => json!({
                    "error": "negative_cycle",
                    "message": err.to_string(),
                    "source": origin,
                    "cycle": cycle,
                }),
                PathError::DistanceOverflow { origin, node } => json!({
                    "error": "distance_overflow",
                    "message": err.to_string(),
                    "source": origin,
                    "node": node,
                }),
            };
            serde_json::to_string_pretty(&value)
        }
    }
}

/// Node identifiers, one per line or as a JSON array.
pub fn render_nodes(graph: &Graph, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(graph.nodes().fold(String::new(), |mut out, n| {
            out.push_str(n);
            out.push('\n');
            out
        })),
        OutputFormat::Json => serde_json::to_string_pretty(&graph.nodes().collect::<Vec<_>>()),
    }
}

/// Size summary of a loaded graph.
pub fn render_info(graph: &Graph, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format!(
            "nodes:  {}\nedges:  {}\nmemory: ~{:.1}KB\n",
            graph.node_count(),
            graph.edge_count(),
            graph.memory_usage() as f64 / 1024.0
        )),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "memory_bytes": graph.memory_usage(),
        })),
    }
}
