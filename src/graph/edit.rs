use std::collections::HashMap;

use glam::DVec3;
use tracing::debug;

use crate::error::GraphError;

use super::Graph;

const CONNECTION_BONUS_PER_EDGE: f64 = 0.1;
const CONNECTION_BONUS_CAP: f64 = 1.0;

impl Graph {
    /// Host-driven manual placement. Accepts any finite coordinates.
    pub fn update_node_position(&mut self, id: &str, position: DVec3) -> Result<(), GraphError> {
        if !position.is_finite() {
            return Err(GraphError::NonFinitePosition {
                id: id.to_owned(),
                x: position.x,
                y: position.y,
                z: position.z,
            });
        }

        let index = self
            .index_of(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_owned()))?;
        self.nodes_mut()[index].position = position;
        debug!(id, ?position, "moved node");
        Ok(())
    }

    /// Number of resolvable edges touching each node, keyed by node index.
    pub fn connection_counts(&self) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        for (source, target, _) in self.resolved_edges() {
            *counts.entry(source).or_insert(0) += 1;
            if target != source {
                *counts.entry(target).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Grows each node by 0.1 per connection (capped at +1.0) on top of its kind's base size
    /// and records the count in metadata. Only runs when called.
    pub fn refine_sizes(&mut self) {
        let counts = self.connection_counts();

        for (index, node) in self.nodes_mut().iter_mut().enumerate() {
            let count = counts.get(&index).copied().unwrap_or(0);
            let bonus = (count as f64 * CONNECTION_BONUS_PER_EDGE).min(CONNECTION_BONUS_CAP);
            node.size = node.kind.base_size() + bonus;
            node.metadata.connection_count = Some(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::node;
    use super::super::{Edge, EdgeKind, NodeKind};
    use super::*;

    fn pair() -> Graph {
        Graph::from_parts(
            vec![node(NodeKind::Domain, "d"), node(NodeKind::Resource, "r")],
            vec![Edge::new("domain:d".into(), "resource:r".into(), EdgeKind::Hierarchy, 1.0)],
        )
    }

    #[test]
    fn moves_existing_node() {
        let mut graph = pair();
        graph
            .update_node_position("resource:r", DVec3::new(1.5, -2.0, 3.25))
            .unwrap();
        assert_eq!(
            graph.node("resource:r").unwrap().position,
            DVec3::new(1.5, -2.0, 3.25)
        );
    }

    #[test]
    fn rejects_unknown_node_and_non_finite_positions() {
        let mut graph = pair();
        assert_eq!(
            graph.update_node_position("resource:nope", DVec3::ZERO),
            Err(GraphError::UnknownNode("resource:nope".into()))
        );
        assert!(matches!(
            graph.update_node_position("resource:r", DVec3::new(f64::NAN, 0.0, 0.0)),
            Err(GraphError::NonFinitePosition { .. })
        ));
        assert_eq!(graph.node("resource:r").unwrap().position, DVec3::ZERO);
    }

    #[test]
    fn refine_sizes_adds_capped_connection_bonus() {
        let mut nodes = vec![node(NodeKind::Tag, "hub")];
        let mut edges = Vec::new();
        for index in 0..15 {
            let leaf = node(NodeKind::Resource, &index.to_string());
            edges.push(Edge::new(leaf.id.clone(), "tag:hub".into(), EdgeKind::Tag, 0.5));
            nodes.push(leaf);
        }
        let mut graph = Graph::from_parts(nodes, edges);
        graph.refine_sizes();

        let hub = graph.node("tag:hub").unwrap();
        assert!((hub.size - 1.8).abs() < 1e-9);
        assert_eq!(hub.metadata.connection_count, Some(15));

        let leaf = graph.node("resource:0").unwrap();
        assert!((leaf.size - 1.3).abs() < 1e-9);
    }
}
