//! bellman: command-line front end for bellman-core.
//!
//! Loads an edge table, runs a single-source query and prints the result.
//! Exit status is 0 on success (including an unreachable destination) and
//! 1 on any error, a negative cycle included.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use bellman_core::{shortest_paths, Route};
use clap::Parser;
use tracing::warn;

mod cli;
mod load;
mod report;
mod settings;

use cli::{Cli, Commands, InputArgs};
use report::RunView;
use settings::{OutputFormat, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();
    settings::init_logging(cli.settings.log_level);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = cli.settings;
    match cli.command {
        Commands::Nodes { input } => {
            let graph = load_input(&input, &settings)?;
            emit(&report::render_nodes(&graph, settings.output)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Info { input } => {
            let graph = load_input(&input, &settings)?;
            emit(&report::render_info(&graph, settings.output)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run {
            input,
            source,
            destination,
            all,
        } => {
            let graph = load_input(&input, &settings)?;

            if let Some(dest) = destination.as_deref() {
                if !graph.contains(dest) {
                    bail!("destination node '{}' not found in graph", dest);
                }
            }

            let sp = match shortest_paths(&graph, &source) {
                Ok(sp) => sp,
                Err(e) => {
                    let rendered = report::render_error(&e, settings.output)?;
                    match settings.output {
                        OutputFormat::Json => emit(&rendered),
                        OutputFormat::Text => eprintln!("{}", rendered),
                    }
                    return Ok(ExitCode::FAILURE);
                }
            };

            if let Some(dest) = destination.as_deref() {
                if sp.route(dest) == Route::Unreachable {
                    warn!(source = %source, destination = %dest, "destination unreachable");
                }
            }

            let view = RunView {
                destination: destination.as_deref(),
                show_all: all,
            };
            emit(&report::render_run(&sp, view, settings.output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_input(input: &InputArgs, settings: &Settings) -> Result<bellman_core::Graph> {
    load::load_graph(&input.file, input.format, &input.nodes, settings.limits())
        .with_context(|| format!("failed to load graph from {}", input.file.display()))
}

/// Print a rendered block to stdout with exactly one trailing newline.
fn emit(rendered: &str) {
    println!("{}", rendered.trim_end_matches('\n'));
}
