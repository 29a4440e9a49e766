use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bellman_core::{EdgeRecord, Graph};
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Column names every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Source", "Target", "Weight"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input must contain columns: Source, Target, Weight (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("cannot infer input format from '{0}' (expected .csv or .json, or pass --format)")]
    UnsupportedFormat(String),

    #[error("graph has {actual} {what}, exceeding the limit of {limit}")]
    TooLarge {
        what: &'static str,
        actual: usize,
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Upper bounds on the loaded graph.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_nodes: usize,
    pub max_edges: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: usize::MAX,
            max_edges: usize::MAX,
        }
    }
}

/// Load a graph from `path`.
///
/// `format` overrides extension-based detection. `extra_nodes` are added as
/// (possibly isolated) nodes after the edges, so they can be queried even
/// when no row mentions them.
pub fn load_graph(
    path: &Path,
    format: Option<InputFormat>,
    extra_nodes: &[String],
    limits: Limits,
) -> Result<Graph, LoadError> {
    let start = Instant::now();
    let format = match format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let records = match format {
        InputFormat::Csv => read_csv(reader)?,
        InputFormat::Json => read_json(reader)?,
    };
    debug!(rows = records.len(), ?format, "parsed input rows");

    let mut graph: Graph = records.into_iter().collect();
    for node in extra_nodes {
        graph.add_node(node);
    }

    check_limits(&graph, limits)?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        load_time_ms = start.elapsed().as_secs_f64() * 1000.0,
        "graph loaded"
    );
    Ok(graph)
}

fn check_limits(graph: &Graph, limits: Limits) -> Result<(), LoadError> {
    if graph.node_count() > limits.max_nodes {
        return Err(LoadError::TooLarge {
            what: "nodes",
            actual: graph.node_count(),
            limit: limits.max_nodes,
        });
    }
    if graph.edge_count() > limits.max_edges {
        return Err(LoadError::TooLarge {
            what: "edges",
            actual: graph.edge_count(),
            limit: limits.max_edges,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// A CSV row before validation. Every field is optional so that a blank
/// cell surfaces as a row error with its row number instead of a csv error.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Source")]
    source: Option<String>,
    #[serde(rename = "Target")]
    target: Option<String>,
    #[serde(rename = "Weight")]
    weight: Option<String>,
}

/// Read edge rows from CSV with a header line. Extra columns are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<EdgeRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row_no = i + 1;
        let row = row?;
        let source = required_label(row.source, "Source", row_no)?;
        let target = required_label(row.target, "Target", row_no)?;
        let weight = match row.weight {
            Some(w) if !w.is_empty() => parse_weight(&w, row_no)?,
            _ => return Err(missing_field("Weight", row_no)),
        };
        records.push(EdgeRecord {
            source,
            target,
            weight,
        });
    }
    Ok(records)
}

fn required_label(value: Option<String>, column: &str, row: usize) -> Result<String, LoadError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(missing_field(column, row)),
    }
}

fn missing_field(column: &str, row: usize) -> LoadError {
    LoadError::InvalidRow {
        row,
        reason: format!("missing value for '{}'", column),
    }
}

fn parse_weight(raw: &str, row: usize) -> Result<f64, LoadError> {
    let weight: f64 = raw.trim().parse().map_err(|_| LoadError::InvalidRow {
        row,
        reason: format!("weight '{}' is not a number", raw),
    })?;
    finite_weight(weight, row)
}

fn finite_weight(weight: f64, row: usize) -> Result<f64, LoadError> {
    if weight.is_finite() {
        Ok(weight)
    } else {
        Err(LoadError::InvalidRow {
            row,
            reason: format!("weight {} is not finite", weight),
        })
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Read edge rows from a JSON array of `{"Source", "Target", "Weight"}`
/// objects. Node identifiers may be strings or numbers; weights may be
/// numbers or numeric strings.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<EdgeRecord>, LoadError> {
    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(reader)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let source = json_label(row.get("Source"), "Source", row_no)?;
        let target = json_label(row.get("Target"), "Target", row_no)?;
        let weight = match row.get("Weight") {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(w) => finite_weight(w, row_no)?,
                None => {
                    return Err(LoadError::InvalidRow {
                        row: row_no,
                        reason: format!("weight {} is not representable", n),
                    })
                }
            },
            Some(Value::String(s)) if !s.trim().is_empty() => parse_weight(s, row_no)?,
            Some(Value::Null) | None => return Err(missing_field("Weight", row_no)),
            Some(other) => {
                return Err(LoadError::InvalidRow {
                    row: row_no,
                    reason: format!("weight {} is not a number", other),
                })
            }
        };
        records.push(EdgeRecord {
            source,
            target,
            weight,
        });
    }
    Ok(records)
}

fn json_label(value: Option<&Value>, column: &str, row: usize) -> Result<String, LoadError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(missing_field(column, row)),
        Some(other) => Err(LoadError::InvalidRow {
            row,
            reason: format!("'{}' must be a string or number, got {}", column, other),
        }),
    }
}
