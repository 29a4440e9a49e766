use bellman_core::{Graph, PathError};
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: bellman-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  tree        Branching tree (deep paths, one round per level in the worst case)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  barbell     Two dense cliques connected by a thin bridge");
        println!("  negcycle    Random graph with one planted negative cycle");
        println!();
        println!("Default node_count: 20000");
        println!("Bellman-Ford is O(|V| * |E|); keep node_count modest.");
        return;
    }

    println!("bellman-bench");
    println!("=============");
    println!();

    let generators: Vec<(&str, fn(u64) -> Graph)> = match mode {
        "tree" => vec![("Branching tree", gen_tree)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        "negcycle" => vec![("Random + planted negative cycle", gen_negative_cycle)],
        "all" => vec![
            ("Branching tree", gen_tree as fn(u64) -> Graph),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("Random + planted negative cycle", gen_negative_cycle),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

fn run_benchmark(name: &str, generator: fn(u64) -> Graph, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let graph = generator(node_count);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s: {} nodes, {} edges, ~{:.1}MB",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );

    let t = Instant::now();
    let result = bellman_core::shortest_paths(&graph, &label(0));
    let elapsed = t.elapsed();

    match result {
        Ok(sp) => {
            let reachable = sp.paths().len();
            let longest = sp.paths().values().map(|p| p.len() - 1).max().unwrap_or(0);
            let far = label(graph.node_count() as u64 - 1);
            println!(
                "{:>10} {:>10} {:>10} {:>10}",
                "rounds", "reachable", "max hops", "time"
            );
            println!("{:->10} {:->10} {:->10} {:->10}", "", "", "", "");
            println!(
                "{:>10} {:>10} {:>10} {:>8.1}ms",
                sp.rounds(),
                reachable,
                longest,
                elapsed.as_secs_f64() * 1000.0
            );
            match sp.distance(&far) {
                Some(d) => println!(
                    "Distance {} → {}: {:.2} over {} hops",
                    label(0),
                    far,
                    d,
                    sp.path(&far).map(|p| p.len() - 1).unwrap_or(0)
                ),
                None => println!("Distance {} → {}: unreachable", label(0), far),
            }
        }
        Err(PathError::NegativeCycle { cycle, .. }) => println!(
            "Negative cycle of {} nodes detected in {:.1}ms",
            cycle.len(),
            elapsed.as_secs_f64() * 1000.0
        ),
        Err(e) => println!("Query failed: {}", e),
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn label(i: u64) -> String {
    format!("c_{}", i)
}

/// Node potentials for reweighting. An edge weight `base + p(u) - p(v)` with
/// `base >= 0` can be negative, but every cycle keeps its non-negative base
/// sum, so the generated graph never has a negative cycle.
struct Potentials(Vec<f64>);

impl Potentials {
    fn new(node_count: u64, rng: &mut FastRng) -> Self {
        Self((0..node_count).map(|_| rng.next_f64() * 20.0).collect())
    }

    fn add_edge(&self, graph: &mut Graph, rng: &mut FastRng, from: u64, to: u64) {
        let base = rng.next_f64() * 10.0;
        let w = base + self.0[from as usize] - self.0[to as usize];
        graph.add_edge(&label(from), &label(to), w);
    }
}

fn with_nodes(node_count: u64) -> Graph {
    let mut graph = Graph::with_capacity(node_count as usize);
    for i in 0..node_count {
        graph.add_node(&label(i));
    }
    graph
}

/// Branching tree: each node spawns `branching` children.
///
/// Children are added after parents, so edge iteration order follows the
/// tree and relaxation settles in very few rounds. Paths are log-depth.
fn gen_tree(node_count: u64) -> Graph {
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(42);
    let pot = Potentials::new(node_count, &mut rng);

    let branching = 3u64;
    for child in 1..node_count {
        let parent = (child - 1) / branching;
        pot.add_edge(&mut graph, &mut rng, parent, child);
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Each node connects to K forward neighbors on a ring; each edge is
/// rewired with probability p. High clustering, short path lengths.
fn gen_small_world(node_count: u64) -> Graph {
    let k = 4u64;
    let p = 0.05f64;
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(67890);
    let pot = Potentials::new(node_count, &mut rng);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let target = if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                if rewired != i {
                    rewired
                } else {
                    neighbor
                }
            } else {
                neighbor
            };
            pot.add_edge(&mut graph, &mut rng, i, target);
        }
    }

    graph
}

/// Erdos-Renyi: uniform random edges, ~5 per node on average.
fn gen_random(node_count: u64) -> Graph {
    let target_edges = node_count * 5;
    let mut graph = with_nodes(node_count);
    let mut rng = FastRng::new(54321);
    let pot = Potentials::new(node_count, &mut rng);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            pot.add_edge(&mut graph, &mut rng, from, to);
        }
    }

    graph
}

/// Barbell: two dense cliques joined by a chain of bridge nodes.
///
/// Every path between the halves goes through the bridge.
fn gen_barbell(node_count: u64) -> Graph {
    let bridge_len = 10u64.min(node_count / 2);
    let clique_size = (node_count - bridge_len) / 2;
    let mut graph = with_nodes(clique_size * 2 + bridge_len);
    let mut rng = FastRng::new(99999);
    let pot = Potentials::new(clique_size * 2 + bridge_len, &mut rng);

    let fan_out = 10u64.min(clique_size.saturating_sub(1));

    // Clique A: 0..clique_size
    for i in 0..clique_size {
        for _ in 0..fan_out {
            let target = rng.next(clique_size);
            if target != i {
                pot.add_edge(&mut graph, &mut rng, i, target);
            }
        }
    }

    // Bridge: chain from the last node of A to the first node of B
    let bridge_start = clique_size;
    for i in 0..bridge_len {
        let id = bridge_start + i;
        let prev = if i == 0 { clique_size.saturating_sub(1) } else { id - 1 };
        pot.add_edge(&mut graph, &mut rng, prev, id);
    }

    // Clique B: after the bridge
    let b_start = bridge_start + bridge_len;
    if clique_size > 0 {
        pot.add_edge(&mut graph, &mut rng, b_start - 1, b_start);
    }
    for i in 0..clique_size {
        for _ in 0..fan_out {
            let target = rng.next(clique_size);
            if target != i {
                pot.add_edge(&mut graph, &mut rng, b_start + i, b_start + target);
            }
        }
    }

    graph
}

/// Random graph plus a short cycle of negative total weight, wired to be
/// reachable from node 0. Measures the cost of a failing query.
fn gen_negative_cycle(node_count: u64) -> Graph {
    let mut graph = gen_random(node_count);
    if node_count < 4 {
        return graph;
    }

    let (a, b, c) = (node_count / 2, node_count / 2 + 1, node_count / 2 + 2);
    graph.add_edge(&label(0), &label(a), 1.0);
    graph.add_edge(&label(a), &label(b), -1.0);
    graph.add_edge(&label(b), &label(c), -1.0);
    graph.add_edge(&label(c), &label(a), -1.0);

    graph
}
