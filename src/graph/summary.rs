use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{EdgeKind, Graph, NodeKind};

/// Option lists and counts a search/filter panel needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub tags: Vec<String>,
    pub domains: Vec<String>,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    pub resources_per_domain: BTreeMap<String, usize>,
}

impl GraphSummary {
    pub fn of(graph: &Graph) -> Self {
        let mut tags = BTreeSet::new();
        let mut domains = BTreeSet::new();
        let mut summary = Self::default();

        for node in graph.nodes() {
            *summary.nodes_by_kind.entry(node.kind).or_insert(0) += 1;

            if node.kind == NodeKind::Tag {
                tags.insert(node.label.clone());
            }

            if let Some(domain) = &node.metadata.domain {
                domains.insert(domain.clone());
                if node.kind == NodeKind::Resource {
                    *summary
                        .resources_per_domain
                        .entry(domain.clone())
                        .or_insert(0) += 1;
                }
            }
        }

        for edge in graph.edges() {
            *summary.edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }

        summary.tags = tags.into_iter().collect();
        summary.domains = domains.into_iter().collect();
        summary
    }
}
