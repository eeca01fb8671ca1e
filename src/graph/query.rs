use std::borrow::Cow;
use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Graph, Node, NodeKind};

/// Visible subgraph for the given search text and filters.
///
/// With no search text and no filters the input graph is returned as is. Otherwise a node
/// survives when it matches the search (label or description, case-insensitive), shares at
/// least one tag with `tag_filters`, and belongs to one of `domain_filters`. Tag nodes are
/// exempt from the domain check. Edges survive only when both endpoints do.
pub fn filter_graph<'a, S>(
    graph: &'a Graph,
    search: &str,
    tag_filters: &[S],
    domain_filters: &[S],
) -> Cow<'a, Graph>
where
    S: AsRef<str>,
{
    if search.is_empty() && tag_filters.is_empty() && domain_filters.is_empty() {
        return Cow::Borrowed(graph);
    }

    let query = search.to_lowercase();
    let tags = tag_filters.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
    let domains = domain_filters
        .iter()
        .map(AsRef::as_ref)
        .collect::<HashSet<_>>();

    let nodes = graph
        .nodes()
        .iter()
        .filter(|node| {
            matches_search(node, &query)
                && matches_tags(node, &tags)
                && matches_domains(node, &domains)
        })
        .cloned()
        .collect::<Vec<_>>();

    let kept = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();
    let edges = graph
        .edges()
        .iter()
        .filter(|edge| kept.contains(edge.source.as_str()) && kept.contains(edge.target.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        of_nodes = graph.node_count(),
        "filtered graph"
    );

    Cow::Owned(Graph::from_parts(nodes, edges))
}

fn matches_search(node: &Node, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    node.label.to_lowercase().contains(query)
        || node
            .metadata
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(query))
}

fn matches_tags(node: &Node, tags: &HashSet<&str>) -> bool {
    tags.is_empty()
        || node
            .metadata
            .tags
            .iter()
            .any(|tag| tags.contains(tag.as_str()))
}

fn matches_domains(node: &Node, domains: &HashSet<&str>) -> bool {
    domains.is_empty()
        || node.kind == NodeKind::Tag
        || node
            .metadata
            .domain
            .as_deref()
            .is_some_and(|domain| domains.contains(domain))
}

/// `node_id` plus every node one edge away in either direction. Edges whose other end is not
/// in the graph are ignored.
pub fn connected<'a>(graph: &'a Graph, node_id: &'a str) -> HashSet<&'a str> {
    let mut related = HashSet::from([node_id]);

    for edge in graph.edges() {
        if let Some(other) = edge.other_end(node_id)
            && graph.contains(other)
        {
            related.insert(other);
        }
    }

    related
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "2d")]
    TwoD,
}

/// Interaction state owned by the host and passed in explicitly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub mode: ViewMode,
    pub selected: Option<String>,
    pub search: String,
    pub tag_filters: Vec<String>,
    pub domain_filters: Vec<String>,
}

impl ViewState {
    pub fn select(&mut self, node_id: Option<String>) {
        self.selected = node_id;
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        toggle(&mut self.tag_filters, tag);
    }

    pub fn toggle_domain(&mut self, domain: &str) {
        toggle(&mut self.domain_filters, domain);
    }

    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.tag_filters.clear();
        self.domain_filters.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty() || !self.tag_filters.is_empty() || !self.domain_filters.is_empty()
    }

    pub fn visible<'a>(&self, graph: &'a Graph) -> Cow<'a, Graph> {
        filter_graph(graph, &self.search, &self.tag_filters, &self.domain_filters)
    }

    /// Highlight set for the current selection; empty when nothing is selected.
    pub fn highlighted<'a>(&'a self, graph: &'a Graph) -> HashSet<&'a str> {
        match self.selected.as_deref() {
            Some(selected) => connected(graph, selected),
            None => HashSet::new(),
        }
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(position) = values.iter().position(|existing| existing == value) {
        values.remove(position);
    } else {
        values.push(value.to_owned());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Fuzzy-ranked node labels for search-as-you-type, best first.
pub fn suggest(graph: &Graph, query: &str, limit: usize) -> Vec<Suggestion> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut ranked = graph
        .nodes()
        .iter()
        .filter_map(|node| {
            fuzzy_match_score(&matcher, &node.label, query).map(|score| Suggestion {
                id: node.id.clone(),
                label: node.label.clone(),
                score,
            })
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::super::tests::node;
    use super::super::{Edge, EdgeKind, NodeMetadata};
    use super::*;

    const NONE: &[&str] = &[];

    fn sample() -> Graph {
        let mut web = node(NodeKind::Domain, "Web");
        web.metadata.domain = Some("Web".into());
        let mut cloud = node(NodeKind::Domain, "Cloud");
        cloud.metadata.domain = Some("Cloud".into());

        let mut react = node(NodeKind::Resource, "react-guide");
        react.label = "React Guide".into();
        react.metadata = NodeMetadata {
            tags: vec!["react".into(), "frontend".into()],
            domain: Some("Web".into()),
            description: Some("Hooks and components".into()),
            ..NodeMetadata::default()
        };
        let mut lambda = node(NodeKind::Resource, "lambda");
        lambda.metadata = NodeMetadata {
            tags: vec!["aws".into()],
            domain: Some("Cloud".into()),
            ..NodeMetadata::default()
        };

        let mut react_tag = node(NodeKind::Tag, "react");
        react_tag.metadata.tags = vec!["react".into()];
        let mut aws_tag = node(NodeKind::Tag, "aws");
        aws_tag.metadata.tags = vec!["aws".into()];

        Graph::from_parts(
            vec![web, cloud, react, lambda, react_tag, aws_tag],
            vec![
                Edge::new("domain:Web".into(), "resource:react-guide".into(), EdgeKind::Hierarchy, 1.0),
                Edge::new("domain:Cloud".into(), "resource:lambda".into(), EdgeKind::Hierarchy, 1.0),
                Edge::new("resource:react-guide".into(), "tag:react".into(), EdgeKind::Tag, 0.5),
                Edge::new("resource:lambda".into(), "tag:aws".into(), EdgeKind::Tag, 0.5),
                Edge::new("resource:lambda".into(), "tag:missing".into(), EdgeKind::Tag, 0.5),
            ],
        )
    }

    fn ids(graph: &Graph) -> Vec<&str> {
        graph.nodes().iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn empty_filters_borrow_the_input() {
        let graph = sample();
        let filtered = filter_graph(&graph, "", NONE, NONE);
        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert_eq!(*filtered, graph);
    }

    #[test]
    fn search_matches_label_or_description_ignoring_case() {
        let graph = sample();
        assert_eq!(ids(&filter_graph(&graph, "REACT", NONE, NONE)), vec![
            "resource:react-guide",
            "tag:react"
        ]);
        assert_eq!(ids(&filter_graph(&graph, "hooks", NONE, NONE)), vec![
            "resource:react-guide"
        ]);
    }

    #[test]
    fn tag_filter_keeps_nodes_sharing_a_tag() {
        let graph = sample();
        let filtered = filter_graph(&graph, "", &["aws"], NONE);
        assert_eq!(ids(&filtered), vec!["resource:lambda", "tag:aws"]);
        assert_eq!(filtered.edge_count(), 1);
    }

    #[test]
    fn domain_filter_exempts_tags() {
        let graph = sample();
        let filtered = filter_graph(&graph, "", NONE, &["Web"]);
        assert_eq!(ids(&filtered), vec![
            "domain:Web",
            "resource:react-guide",
            "tag:react",
            "tag:aws"
        ]);
        assert!(filtered.edges().iter().all(|edge| {
            filtered.contains(&edge.source) && filtered.contains(&edge.target)
        }));
    }

    #[test]
    fn filtering_never_touches_the_input() {
        let graph = sample();
        let before = graph.clone();
        let _ = filter_graph(&graph, "react", &["react"], &["Web"]);
        assert_eq!(graph, before);
    }

    #[test]
    fn connected_is_one_hop_in_both_directions() {
        let graph = sample();
        let mut around_lambda = connected(&graph, "resource:lambda")
            .into_iter()
            .collect::<Vec<_>>();
        around_lambda.sort_unstable();
        assert_eq!(around_lambda, vec!["domain:Cloud", "resource:lambda", "tag:aws"]);

        let around_cloud = connected(&graph, "domain:Cloud");
        assert!(around_cloud.contains("resource:lambda"));
        assert!(!around_cloud.contains("tag:aws"));
    }

    #[test]
    fn connected_for_unknown_node_is_just_itself() {
        let graph = sample();
        assert_eq!(connected(&graph, "tag:nope"), HashSet::from(["tag:nope"]));
    }

    #[test]
    fn view_state_toggles_and_resets() {
        let graph = sample();
        let mut state = ViewState::default();
        state.toggle_tag("aws");
        state.toggle_domain("Cloud");
        assert!(state.has_active_filters());
        assert_eq!(ids(&state.visible(&graph)), vec![
            "resource:lambda",
            "tag:aws"
        ]);

        state.toggle_tag("aws");
        assert!(state.tag_filters.is_empty());

        state.select(Some("tag:react".into()));
        assert!(state.highlighted(&graph).contains("resource:react-guide"));

        state.reset_filters();
        assert!(!state.has_active_filters());
        assert_eq!(state.selected.as_deref(), Some("tag:react"));
    }

    #[test]
    fn suggestions_rank_fuzzy_matches() {
        let graph = sample();
        let suggestions = suggest(&graph, "rct", 5);
        assert!(!suggestions.is_empty());
        assert!(suggestions.iter().all(|s| s.label.to_lowercase().contains('r')));
        assert!(suggest(&graph, "   ", 5).is_empty());
        assert_eq!(suggest(&graph, "a", 1).len(), 1);
    }
}
