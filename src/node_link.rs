//! Node-link document — portable serialization of a processed Mapper graph.
//!
//! The document is the exchange format consumed by external renderers and
//! analysis tools: a flat record list of nodes and links plus graph-level
//! attributes. It is mechanical and fully reversible — node, link, and
//! attribute data round-trip exactly ([`NodeLinkDocument::to_graph`] of
//! [`NodeLinkDocument::from_graph`] reproduces the input graph).
//!
//! Node records are emitted in sorted key order so that serializing the
//! same graph twice yields byte-identical documents.

use serde_json::Value;

use crate::graph::{AttrMap, MapperEdge, MapperGraph, MapperNode};

/// Node-link format version.
pub const NODE_LINK_VERSION: u16 = 1;

/// Serializable node/link snapshot of a [`MapperGraph`].
///
/// # Example
///
/// ```rust,ignore
/// use tcm_core::node_link::NodeLinkDocument;
///
/// let doc = NodeLinkDocument::from_graph(&graph);
/// let json = serde_json::to_string(&doc)?;
/// let restored: NodeLinkDocument = serde_json::from_str(&json)?;
/// assert_eq!(restored.to_graph(), graph);
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct NodeLinkDocument {
    /// Format version — always [`NODE_LINK_VERSION`] for new documents.
    #[serde(default = "default_version")]
    pub version: u16,
    /// Whether links are directed. Mapper graphs are undirected.
    #[serde(default)]
    pub directed: bool,
    /// Graph-level attributes.
    #[serde(default)]
    pub graph: AttrMap,
    /// Node records, in sorted key order.
    pub nodes: Vec<NodeRecord>,
    /// Link records.
    pub links: Vec<LinkRecord>,
}

fn default_version() -> u16 {
    NODE_LINK_VERSION
}

/// One serialized node: key, member time indices, and attributes.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct NodeRecord {
    /// Stable node key.
    pub id: String,
    /// Sorted member time indices.
    pub members: Vec<i64>,
    /// All remaining node attributes, flattened into the record.
    #[serde(flatten)]
    pub attrs: AttrMap,
}

/// One serialized link: endpoint keys and attributes.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct LinkRecord {
    /// Key of one endpoint.
    pub source: String,
    /// Key of the other endpoint.
    pub target: String,
    /// All remaining link attributes, flattened into the record.
    #[serde(flatten)]
    pub attrs: AttrMap,
}

impl NodeLinkDocument {
    /// Build a document from a graph, with nodes in sorted key order.
    pub fn from_graph(graph: &MapperGraph) -> Self {
        let nodes = graph
            .sorted_keys()
            .into_iter()
            .map(|key| {
                let node = &graph.nodes[key.as_str()];
                NodeRecord {
                    id: key,
                    members: node.members.clone(),
                    attrs: node.attrs.clone(),
                }
            })
            .collect();

        let links = graph
            .links
            .iter()
            .map(|edge| LinkRecord {
                source: edge.source.clone(),
                target: edge.target.clone(),
                attrs: edge.attrs.clone(),
            })
            .collect();

        Self {
            version: NODE_LINK_VERSION,
            directed: false,
            graph: graph.attrs.clone(),
            nodes,
            links,
        }
    }

    /// Rebuild the graph this document was produced from.
    pub fn to_graph(&self) -> MapperGraph {
        let mut graph = MapperGraph::new();
        graph.attrs = self.graph.clone();
        for record in &self.nodes {
            let mut node = MapperNode::new(record.members.iter().copied());
            node.attrs = record.attrs.clone();
            graph.nodes.insert(record.id.clone(), node);
        }
        for record in &self.links {
            let mut edge = MapperEdge::new(record.source.clone(), record.target.clone());
            edge.attrs = record.attrs.clone();
            graph.links.push(edge);
        }
        graph
    }

    /// Number of node records.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node record by key.
    pub fn find_node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|r| r.id == id)
    }

    /// Render the document as a [`serde_json::Value`].
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
