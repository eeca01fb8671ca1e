mod build;
mod edit;
mod query;
mod summary;

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use build::{BuildReport, BuilderConfig, GraphBuilder, UNKNOWN_DOMAIN, build_graph};
pub use query::{Suggestion, ViewMode, ViewState, connected, filter_graph, suggest};
pub use summary::GraphSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Domain,
    Resource,
    Tag,
    Concept,
}

impl NodeKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Domain => "domain:",
            Self::Resource => "resource:",
            Self::Tag => "tag:",
            Self::Concept => "concept:",
        }
    }

    pub fn node_id(self, name: &str) -> String {
        format!("{}{name}", self.prefix())
    }

    /// Relative display size: domain > resource > tag.
    pub fn base_size(self) -> f64 {
        match self {
            Self::Domain => 2.0,
            Self::Resource => 1.2,
            Self::Tag => 0.8,
            Self::Concept => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Hierarchy,
    Tag,
    Reference,
    Category,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub position: DVec3,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

fn default_size() -> f64 {
    1.0
}

/// Directed for display, undirected for layout and connectivity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub strength: f64,
}

impl Edge {
    pub fn new(source: String, target: String, kind: EdgeKind, strength: f64) -> Self {
        Self {
            source,
            target,
            kind,
            strength,
        }
    }

    /// The endpoint opposite `id`, if `id` is one of this edge's endpoints.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct GraphParts {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<GraphParts> for Graph {
    fn from(parts: GraphParts) -> Self {
        Self::from_parts(parts.nodes, parts.edges)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "GraphParts")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a graph, keeping the first node for any repeated id. Edges are kept as given,
    /// dangling ones included; consumers skip them.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut graph = Self {
            nodes: Vec::with_capacity(nodes.len()),
            edges,
            index_by_id: HashMap::with_capacity(nodes.len()),
        };

        for node in nodes {
            if graph.contains(&node.id) {
                warn!(id = %node.id, "dropping node with duplicate id");
                continue;
            }
            graph.push_node(node);
        }

        graph
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    pub(crate) fn push_node(&mut self, node: Node) {
        self.index_by_id.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges whose endpoints both exist, as `(source_index, target_index, strength)`.
    pub fn resolved_edges(&self) -> Vec<(usize, usize, f64)> {
        let mut resolved = Vec::with_capacity(self.edges.len());
        let mut dangling = 0usize;

        for edge in &self.edges {
            match (self.index_of(&edge.source), self.index_of(&edge.target)) {
                (Some(source), Some(target)) => resolved.push((source, target, edge.strength)),
                _ => dangling += 1,
            }
        }

        if dangling > 0 {
            warn!(dangling, "skipping edges with missing endpoints");
        }

        resolved
    }

    pub fn positions(&self) -> Vec<DVec3> {
        self.nodes.iter().map(|node| node.position).collect()
    }
}
