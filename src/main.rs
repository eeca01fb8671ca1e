use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glam::DVec3;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use techlib_graph::config::Config;
use techlib_graph::graph::{GraphBuilder, GraphSummary, connected, filter_graph, suggest};
use techlib_graph::manifest::load_manifest;
use techlib_graph::physics::{RepulsionSolverKind, layout};
use techlib_graph::snapshot::{read_graph, write_json};
use techlib_graph::{Classification, classify};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Log more (debug level). `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a graph from a manifest, lay it out and write it as JSON.
    Build {
        manifest: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        iterations: Option<usize>,
        /// Use the Barnes-Hut repulsion pass instead of the exact pairwise one.
        #[arg(long)]
        barnes_hut: bool,
        /// Grow node sizes with their connection count.
        #[arg(long)]
        refine_sizes: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the visible subgraph for a search text and tag/domain filters.
    Filter {
        graph: PathBuf,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "domain")]
        domains: Vec<String>,
    },
    /// Print the ids one edge away from a node, the node included.
    Connected { graph: PathBuf, node_id: String },
    /// Classify free-text labels.
    Classify {
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Move a node and save the graph.
    #[command(allow_negative_numbers = true)]
    Move {
        graph: PathBuf,
        node_id: String,
        x: f64,
        y: f64,
        z: f64,
        /// Defaults to overwriting the input graph.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print tag/domain option lists and per-kind counts.
    Summary { graph: PathBuf },
    /// Fuzzy-rank node labels against a query.
    Suggest {
        graph: PathBuf,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn init_tracing(verbose: u8) {
    let default_directive = if verbose > 0 {
        "techlib_graph=debug"
    } else {
        "techlib_graph=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Build {
            manifest,
            config,
            seed,
            iterations,
            barnes_hut,
            refine_sizes,
            output,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            if seed.is_some() {
                config.builder.seed = seed;
            }
            if let Some(iterations) = iterations {
                config.layout.iterations = iterations;
            }
            if barnes_hut && config.layout.repulsion_solver == RepulsionSolverKind::Pairwise {
                config.layout.repulsion_solver = RepulsionSolverKind::BarnesHut { theta: 0.72 };
            }
            config.validate()?;

            run_build(&manifest, &config, refine_sizes, output.as_deref())
        }
        Command::Filter {
            graph,
            search,
            tags,
            domains,
        } => {
            let graph = read_graph(&graph)?;
            let visible = filter_graph(&graph, &search, &tags, &domains);
            write_json(visible.as_ref(), None)
        }
        Command::Connected { graph, node_id } => {
            let graph = read_graph(&graph)?;
            if !graph.contains(&node_id) {
                warn!(id = %node_id, "node is not in the graph");
            }
            let mut related = connected(&graph, &node_id).into_iter().collect::<Vec<_>>();
            related.sort_unstable();
            write_json(&related, None)
        }
        Command::Classify { labels } => {
            let results = labels
                .iter()
                .map(|label| LabelClassification {
                    label,
                    classification: classify(label),
                })
                .collect::<Vec<_>>();
            write_json(&results, None)
        }
        Command::Move {
            graph: graph_path,
            node_id,
            x,
            y,
            z,
            output,
        } => {
            let mut graph = read_graph(&graph_path)?;
            graph
                .update_node_position(&node_id, DVec3::new(x, y, z))
                .with_context(|| format!("failed to move {node_id}"))?;
            write_json(&graph, Some(output.as_deref().unwrap_or(&graph_path)))
        }
        Command::Summary { graph } => {
            let graph = read_graph(&graph)?;
            write_json(&GraphSummary::of(&graph), None)
        }
        Command::Suggest {
            graph,
            query,
            limit,
        } => {
            let graph = read_graph(&graph)?;
            write_json(&suggest(&graph, &query, limit), None)
        }
    }
}

#[derive(serde::Serialize)]
struct LabelClassification<'a> {
    label: &'a str,
    #[serde(flatten)]
    classification: Classification,
}

fn run_build(
    manifest_path: &Path,
    config: &Config,
    refine_sizes: bool,
    output: Option<&Path>,
) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let report = GraphBuilder::new(&config.builder).build(&manifest.records);
    if report.skipped_records > 0 || report.duplicate_records > 0 {
        warn!(
            skipped = report.skipped_records,
            duplicates = report.duplicate_records,
            "some records did not become nodes"
        );
    }

    let mut graph = report.graph;
    let layout_report = layout(&mut graph, &config.layout);
    if refine_sizes {
        graph.refine_sizes();
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        iterations = layout_report.iterations_run,
        mean_edge_length = layout_report.mean_edge_length,
        "graph ready"
    );

    write_json(&graph, output)
}
