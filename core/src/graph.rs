use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Dense node index assigned at intern time. Indexes into every per-node Vec.
pub type NodeIndex = usize;

/// A directed, weighted edge in the adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub weight: f64,
}

/// A borrowed view of one edge, as yielded by [`Graph::edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub weight: f64,
}

/// One tabular row of input: source label, target label, weight.
///
/// Field names follow the spreadsheet schema (`Source`, `Target`, `Weight`),
/// so the same struct deserializes from CSV headers and JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Target")]
    pub target: String,
    #[serde(rename = "Weight")]
    pub weight: f64,
}

impl EdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// In-memory directed graph: outgoing adjacency lists + interned node labels.
///
/// Node labels are interned to a dense [`NodeIndex`] on first sight, so every
/// edge endpoint is always a member of the node set. Built once, then
/// borrowed immutably by queries.
#[derive(Debug, Clone)]
pub struct Graph {
    outgoing: Vec<Vec<Edge>>,
    labels: Vec<String>,
    label_index: HashMap<String, NodeIndex>,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            outgoing: Vec::new(),
            labels: Vec::new(),
            label_index: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            outgoing: Vec::with_capacity(node_count),
            labels: Vec::with_capacity(node_count),
            label_index: HashMap::with_capacity(node_count),
            edge_count: 0,
        }
    }

    /// Intern a node label, returning its index. Existing labels keep their index.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.label_index.get(label) {
            return idx;
        }
        let idx = self.labels.len();
        self.labels.push(label.to_string());
        self.label_index.insert(label.to_string(), idx);
        self.outgoing.push(Vec::new());
        idx
    }

    /// Add a directed edge `from -> to`, interning both endpoints if absent.
    ///
    /// Any finite weight is accepted, including zero and negative values.
    /// Parallel edges are kept as separate entries.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) {
        debug_assert!(weight.is_finite(), "edge weight must be finite");
        let u = self.add_node(from);
        let v = self.add_node(to);
        self.outgoing[u].push(Edge { target: v, weight });
        self.edge_count += 1;
    }

    /// Bulk load from edge records. This is the primary load path.
    pub fn load_edges<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        for rec in records {
            self.add_edge(&rec.source, &rec.target, rec.weight);
        }
    }

    /// Look up a node index by label.
    pub fn resolve(&self, label: &str) -> Option<NodeIndex> {
        self.label_index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.label_index.contains_key(label)
    }

    /// Label of an interned node. Panics on an index not issued by this graph.
    pub fn label(&self, idx: NodeIndex) -> &str {
        &self.labels[idx]
    }

    /// All node labels, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    /// Outgoing edges for a node.
    pub fn neighbors_out(&self, idx: NodeIndex) -> &[Edge] {
        self.outgoing.get(idx).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every edge in the graph. Order is unspecified.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.outgoing.iter().enumerate().flat_map(|(source, out)| {
            out.iter().map(move |e| EdgeRef {
                source,
                target: e.target,
                weight: e.weight,
            })
        })
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let label_bytes: usize = self.labels.iter().map(|l| l.capacity()).sum();
        // Each label is stored twice: in `labels` and as the index key.
        let nodes_mem = self.labels.len() * (2 * size_of::<String>() + size_of::<NodeIndex>() + 16)
            + 2 * label_bytes;
        let adjacency_mem = self.outgoing.len() * size_of::<Vec<Edge>>();
        let edges_mem: usize = self
            .outgoing
            .iter()
            .map(|v| v.capacity() * size_of::<Edge>())
            .sum();

        nodes_mem + adjacency_mem + edges_mem
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<EdgeRecord> for Graph {
    fn from_iter<I: IntoIterator<Item = EdgeRecord>>(iter: I) -> Self {
        let mut g = Graph::new();
        g.load_edges(iter);
        g
    }
}
