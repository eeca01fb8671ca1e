use std::collections::HashSet;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::classify::{Classifier, format_label, palette};
use crate::error::GraphError;
use crate::manifest::ResourceRecord;

use super::{Edge, EdgeKind, Graph, Node, NodeKind, NodeMetadata};

/// Domain bucket for records that carry no domain.
pub const UNKNOWN_DOMAIN: &str = "unknown";

const HIERARCHY_STRENGTH: f64 = 1.0;
const TAG_STRENGTH: f64 = 0.5;
const DEFAULT_SPAWN_EXTENT: f64 = 20.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Fixed seed for initial placement; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Half-width of the cube initial positions are drawn from.
    pub spawn_extent: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            seed: None,
            spawn_extent: DEFAULT_SPAWN_EXTENT,
        }
    }
}

impl BuilderConfig {
    /// The spawn cube must have a positive, finite edge length (`2 * spawn_extent`).
    pub fn validate(&self) -> Result<(), GraphError> {
        let extent = self.spawn_extent;
        if extent > 0.0 && spans_finitely(extent) {
            return Ok(());
        }

        Err(GraphError::InvalidConfig(format!(
            "builder spawn_extent must be positive with a finite span, got {extent}"
        )))
    }
}

fn spans_finitely(extent: f64) -> bool {
    extent.is_finite() && (extent * 2.0).is_finite()
}

#[derive(Clone, Debug)]
pub struct BuildReport {
    pub graph: Graph,
    /// Records without a usable id.
    pub skipped_records: usize,
    /// Records whose id was already taken by an earlier record.
    pub duplicate_records: usize,
}

pub struct GraphBuilder {
    rng: StdRng,
    spawn_extent: f64,
    classifier: Classifier,
}

impl GraphBuilder {
    pub fn new(config: &BuilderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut spawn_extent = config.spawn_extent.abs();
        if !spans_finitely(spawn_extent) {
            warn!(
                spawn_extent = config.spawn_extent,
                fallback = DEFAULT_SPAWN_EXTENT,
                "unusable spawn extent, using the default"
            );
            spawn_extent = DEFAULT_SPAWN_EXTENT;
        }

        Self {
            rng,
            spawn_extent,
            classifier: Classifier::default(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(&BuilderConfig {
            seed: Some(seed),
            ..BuilderConfig::default()
        })
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    fn spawn_position(&mut self) -> DVec3 {
        let extent = self.spawn_extent;
        if extent == 0.0 {
            return DVec3::ZERO;
        }

        DVec3::new(
            self.rng.gen_range(-extent..=extent),
            self.rng.gen_range(-extent..=extent),
            self.rng.gen_range(-extent..=extent),
        )
    }

    fn entity_color(&self, domain: &str, label: &str) -> (String, String) {
        let classification = self.classifier.classify(label);
        let color = palette::domain_color(domain)
            .map(str::to_owned)
            .unwrap_or(classification.color);
        (color, classification.description)
    }

    /// Builds nodes and edges for `records`. Positions are random draws from the spawn cube;
    /// run the layout afterwards to arrange them.
    pub fn build(&mut self, records: &[ResourceRecord]) -> BuildReport {
        let mut skipped_records = 0usize;
        let mut duplicate_records = 0usize;
        let mut seen_ids = HashSet::new();
        let mut accepted = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let Some(id) = record.usable_id() else {
                warn!(
                    position,
                    title = record.title.as_deref().unwrap_or(""),
                    "skipping record without id"
                );
                skipped_records += 1;
                continue;
            };

            if !seen_ids.insert(id) {
                warn!(id, position, "ignoring duplicate record id, first record wins");
                duplicate_records += 1;
                continue;
            }

            accepted.push((id, record));
        }

        let mut graph = Graph::new();

        let mut domains = Vec::new();
        let mut seen_domains = HashSet::new();
        for &(_, record) in &accepted {
            let domain = record.domain_or_unknown();
            if seen_domains.insert(domain) {
                domains.push(domain);
            }
        }

        for domain in &domains {
            let position = self.spawn_position();
            let (color, category_description) = self.entity_color(domain, domain);
            graph.push_node(Node {
                id: NodeKind::Domain.node_id(domain),
                label: (*domain).to_owned(),
                kind: NodeKind::Domain,
                category: (*domain).to_owned(),
                position,
                color,
                size: NodeKind::Domain.base_size(),
                metadata: NodeMetadata {
                    domain: Some((*domain).to_owned()),
                    category_description: Some(category_description),
                    ..NodeMetadata::default()
                },
            });
        }
        debug!(domains = domains.len(), "created domain nodes");

        for &(id, record) in &accepted {
            let resource_id = NodeKind::Resource.node_id(id);
            let domain = record.domain_or_unknown();
            let raw_label = record
                .title
                .as_deref()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or(id);
            let label = format_label(raw_label);
            let original_label = (label != raw_label).then(|| raw_label.to_owned());

            let mut tags = Vec::with_capacity(record.tags.len());
            for tag in &record.tags {
                if !tag.trim().is_empty() && !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }

            let classification = self.classifier.classify(&label);
            let color = palette::domain_color(domain)
                .map(str::to_owned)
                .unwrap_or_else(|| classification.color.clone());
            let category = record
                .category
                .clone()
                .filter(|category| !category.is_empty())
                .unwrap_or_else(|| classification.category.clone());

            let position = self.spawn_position();
            graph.push_node(Node {
                id: resource_id.clone(),
                label,
                kind: NodeKind::Resource,
                category,
                position,
                color,
                size: NodeKind::Resource.base_size(),
                metadata: NodeMetadata {
                    path: record.path.clone(),
                    tags: tags.clone(),
                    description: record.description.clone(),
                    domain: Some(domain.to_owned()),
                    category_description: Some(classification.description),
                    original_label,
                    connection_count: None,
                },
            });
            graph.push_edge(Edge::new(
                NodeKind::Domain.node_id(domain),
                resource_id.clone(),
                EdgeKind::Hierarchy,
                HIERARCHY_STRENGTH,
            ));

            for tag in tags {
                let tag_id = NodeKind::Tag.node_id(&tag);
                if !graph.contains(&tag_id) {
                    let position = self.spawn_position();
                    graph.push_node(Node {
                        id: tag_id.clone(),
                        label: tag.clone(),
                        kind: NodeKind::Tag,
                        category: "tag".to_owned(),
                        position,
                        color: palette::TAG_ACCENT.to_owned(),
                        size: NodeKind::Tag.base_size(),
                        metadata: NodeMetadata {
                            tags: vec![tag],
                            ..NodeMetadata::default()
                        },
                    });
                }

                graph.push_edge(Edge::new(
                    resource_id.clone(),
                    tag_id,
                    EdgeKind::Tag,
                    TAG_STRENGTH,
                ));
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped_records,
            duplicate_records,
            "built graph"
        );

        BuildReport {
            graph,
            skipped_records,
            duplicate_records,
        }
    }
}

/// Builds a graph with the builtin classifier and default spawn cube.
pub fn build_graph(records: &[ResourceRecord], seed: Option<u64>) -> BuildReport {
    GraphBuilder::new(&BuilderConfig {
        seed,
        ..BuilderConfig::default()
    })
    .build(records)
}
