//! Knowledge-base graph engine: build, lay out and filter a resource graph.

pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod physics;
pub mod snapshot;
pub mod util;

pub use classify::{Classification, Classifier, classify, format_label};
pub use config::Config;
pub use error::GraphError;
pub use graph::{
    BuildReport, Edge, EdgeKind, Graph, GraphBuilder, Node, NodeKind, ViewState, build_graph,
    connected, filter_graph,
};
pub use manifest::{Manifest, ResourceRecord, load_manifest};
pub use physics::{LayoutConfig, LayoutReport, layout};
