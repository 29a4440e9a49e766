use clap::{Args, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::load::Limits;

/// Default node cap. Bellman-Ford costs O(|V| * |E|), so graph size is the
/// only lever a caller has over query time.
pub const DEFAULT_MAX_NODES: u64 = 100_000;

pub const DEFAULT_MAX_EDGES: u64 = 2_000_000;

/// Global settings shared by every subcommand. Each one can also be set
/// from the environment.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Log level. RUST_LOG, when set, takes precedence.
    #[arg(short, long, env = "BELLMAN_LOG", global = true)]
    #[arg(value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Output format for results
    #[arg(short, long, env = "BELLMAN_OUTPUT", global = true)]
    #[arg(value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Refuse to query graphs with more nodes than this
    #[arg(long, env = "BELLMAN_MAX_NODES", global = true)]
    #[arg(default_value_t = DEFAULT_MAX_NODES, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_nodes: u64,

    /// Refuse to query graphs with more edges than this
    #[arg(long, env = "BELLMAN_MAX_EDGES", global = true)]
    #[arg(default_value_t = DEFAULT_MAX_EDGES, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_edges: u64,
}

impl Settings {
    pub fn limits(&self) -> Limits {
        Limits {
            max_nodes: usize::try_from(self.max_nodes).unwrap_or(usize::MAX),
            max_edges: usize::try_from(self.max_edges).unwrap_or(usize::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// clean for results.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
