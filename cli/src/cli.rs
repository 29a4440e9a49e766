use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::load::InputFormat;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "bellman")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Shortest paths with negative edge weights (Bellman-Ford)")]
#[command(long_about = r#"
Loads a directed weighted graph from a table with Source, Target and Weight
columns, then computes shortest paths from a chosen source node. Negative
weights are allowed; a negative cycle reachable from the source is reported
as an error.

EXAMPLES:
  # List the nodes of a graph
  bellman nodes routes.csv

  # Shortest path from A to D
  bellman run routes.csv --source A --destination D

  # Every distance from A, as JSON
  bellman run routes.json --source A --all --output json

ENVIRONMENT VARIABLES:
  BELLMAN_LOG        Log level (trace, debug, info, warn, error)
  BELLMAN_OUTPUT     Output format (text, json)
  BELLMAN_MAX_NODES  Node limit for loaded graphs
  BELLMAN_MAX_EDGES  Edge limit for loaded graphs
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List node identifiers of a graph
    Nodes {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show node count, edge count and approximate memory
    Info {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Compute shortest paths from a source node
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Source node
        #[arg(short, long)]
        source: String,

        /// Destination node to report distance and path for
        #[arg(short, long)]
        destination: Option<String>,

        /// Also print the distance and path of every node
        #[arg(short, long)]
        all: bool,
    },
}

/// Where the graph comes from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Edge table (.csv or .json)
    pub file: PathBuf,

    /// Input format; inferred from the file extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<InputFormat>,

    /// Extra node with no edges (repeatable)
    #[arg(short, long = "node", value_name = "NODE")]
    pub nodes: Vec<String>,
}
