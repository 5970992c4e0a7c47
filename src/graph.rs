//! Canonical Mapper graph model and the input normalizer.
//!
//! A Mapper graph is a cluster graph over time-indexed observations: each
//! node owns the list of time indices clustered into it, and links connect
//! nodes that share members. Input arrives in one of three forms, modeled
//! explicitly by [`GraphSource`]:
//!
//! - an existing [`MapperGraph`] built in Rust (cloned, never mutated),
//! - a serialized node/link document ([`serde_json::Value`]),
//! - nothing at all (an empty graph).
//!
//! Normalization is deliberately permissive: missing keys default to empty
//! containers and malformed member entries are mapped out of the valid
//! domain rather than rejected. Validation happens later, at extraction
//! time (see [`crate::matrices::extract`]).

use hashbrown::HashMap;
use serde_json::Value;

/// Attribute bag attached to nodes, edges, and the graph itself.
///
/// Kept as an explicit mapping type — attribute names to JSON values —
/// rather than fixed struct fields, since annotations are caller-defined.
pub type AttrMap = HashMap<String, Value>;

/// Sentinel recorded by the normalizer for member entries that cannot be
/// read as an integer. Always outside the valid time-index domain, so the
/// extractor reports it as a schema mismatch instead of silently dropping it.
pub const UNRESOLVED_MEMBER: i64 = -1;

// ─── MapperNode / MapperEdge ────────────────────────────────────────────────

/// A single Mapper node: a cluster of member time indices plus attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapperNode {
    /// Sorted, de-duplicated member time indices.
    pub members: Vec<i64>,
    /// Arbitrary named attributes (color, group counts, ...).
    pub attrs: AttrMap,
}

impl MapperNode {
    /// Create a node from any member iterator; members are sorted and
    /// de-duplicated.
    pub fn new(members: impl IntoIterator<Item = i64>) -> Self {
        let mut members: Vec<i64> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self {
            members,
            attrs: AttrMap::new(),
        }
    }

    /// Whether `member` belongs to this node.
    pub fn contains(&self, member: i64) -> bool {
        self.members.binary_search(&member).is_ok()
    }
}

/// An undirected link between two node keys, with its own attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapperEdge {
    /// Key of one endpoint.
    pub source: String,
    /// Key of the other endpoint.
    pub target: String,
    /// Arbitrary named attributes.
    pub attrs: AttrMap,
}

impl MapperEdge {
    /// Create an edge with empty attributes.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attrs: AttrMap::new(),
        }
    }
}

// ─── MapperGraph ────────────────────────────────────────────────────────────

/// Canonical node/link representation of a Mapper graph.
///
/// Always has `nodes` and `links` containers, even when empty — downstream
/// stages never need to guard against missing structure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapperGraph {
    /// Nodes keyed by their stable string key.
    pub nodes: HashMap<String, MapperNode>,
    /// Undirected links between node keys.
    pub links: Vec<MapperEdge>,
    /// Graph-level attributes.
    pub attrs: AttrMap,
}

impl MapperGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a node with the given members.
    pub fn insert_node(&mut self, key: impl Into<String>, members: impl IntoIterator<Item = i64>) {
        self.nodes.insert(key.into(), MapperNode::new(members));
    }

    /// Insert an undirected link between two node keys.
    pub fn insert_edge(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.links.push(MapperEdge::new(source, target));
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// `true` when the graph has neither nodes nor links.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Node keys in sorted order.
    ///
    /// This is the deterministic node order used for all derived matrices.
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.nodes.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Re-sort and de-duplicate every node's member list in place.
    fn canonicalize_members(&mut self) {
        for node in self.nodes.values_mut() {
            node.members.sort_unstable();
            node.members.dedup();
        }
    }
}

// ─── GraphSource ────────────────────────────────────────────────────────────

/// The three graph input forms, resolved once at the normalizer boundary.
#[derive(Clone, Debug)]
pub enum GraphSource {
    /// A graph already built in memory. Normalization clones it.
    Existing(MapperGraph),
    /// A serialized node/link document.
    Serialized(Value),
    /// No input — normalizes to an empty graph.
    Empty,
}

impl GraphSource {
    /// Produce the canonical graph for this input.
    ///
    /// Never fails: malformed serialized input degrades to empty defaults,
    /// and member entries that cannot be read as integers are recorded as
    /// [`UNRESOLVED_MEMBER`] for the extractor to reject.
    pub fn normalize(&self) -> MapperGraph {
        match self {
            Self::Existing(graph) => {
                let mut graph = graph.clone();
                graph.canonicalize_members();
                graph
            }
            Self::Serialized(doc) => from_document(doc),
            Self::Empty => MapperGraph::new(),
        }
    }

    /// `true` for [`GraphSource::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

// ─── Serialized document parsing ────────────────────────────────────────────

/// Merge a serialized node/link document over the `{nodes: {}, links: {}}`
/// skeleton. Two node shapes are accepted (`id: [members]` and
/// `id: {members: [...], ...attrs}`, or a node-link record array), and two
/// link shapes (adjacency object `src: [targets]` and a record array of
/// `{source, target, ...attrs}`).
fn from_document(doc: &Value) -> MapperGraph {
    let mut graph = MapperGraph::new();
    let Some(obj) = doc.as_object() else {
        return graph;
    };

    if let Some(meta) = obj.get("graph").and_then(Value::as_object) {
        for (name, value) in meta {
            graph.attrs.insert(name.clone(), value.clone());
        }
    }

    match obj.get("nodes") {
        Some(Value::Object(entries)) => {
            for (key, entry) in entries {
                graph.nodes.insert(key.clone(), node_from_entry(entry));
            }
        }
        Some(Value::Array(records)) => {
            for record in records {
                let Some(rec) = record.as_object() else {
                    continue;
                };
                let Some(key) = rec.get("id").map(key_string) else {
                    continue;
                };
                let mut node = MapperNode::new(
                    rec.get("members")
                        .and_then(Value::as_array)
                        .map(|m| m.iter().map(member_value).collect::<Vec<i64>>())
                        .unwrap_or_default(),
                );
                for (name, value) in rec {
                    if name != "id" && name != "members" {
                        node.attrs.insert(name.clone(), value.clone());
                    }
                }
                graph.nodes.insert(key, node);
            }
        }
        _ => {}
    }

    match obj.get("links") {
        Some(Value::Object(adjacency)) => {
            for (source, targets) in adjacency {
                let Some(targets) = targets.as_array() else {
                    continue;
                };
                for target in targets {
                    graph.links.push(MapperEdge::new(source.clone(), key_string(target)));
                }
            }
        }
        Some(Value::Array(records)) => {
            for record in records {
                let Some(rec) = record.as_object() else {
                    continue;
                };
                let (Some(source), Some(target)) = (rec.get("source"), rec.get("target")) else {
                    continue;
                };
                let mut edge = MapperEdge::new(key_string(source), key_string(target));
                for (name, value) in rec {
                    if name != "source" && name != "target" {
                        edge.attrs.insert(name.clone(), value.clone());
                    }
                }
                graph.links.push(edge);
            }
        }
        _ => {}
    }

    graph
}

/// Parse one serialized node entry: either a bare member array or an object
/// carrying a `members` array plus attributes.
fn node_from_entry(entry: &Value) -> MapperNode {
    match entry {
        Value::Array(members) => MapperNode::new(members.iter().map(member_value)),
        Value::Object(fields) => {
            let mut node = MapperNode::new(
                fields
                    .get("members")
                    .and_then(Value::as_array)
                    .map(|m| m.iter().map(member_value).collect::<Vec<i64>>())
                    .unwrap_or_default(),
            );
            for (name, value) in fields {
                if name != "members" {
                    node.attrs.insert(name.clone(), value.clone());
                }
            }
            node
        }
        _ => MapperNode::default(),
    }
}

/// Read a member entry as an integer time index.
///
/// Integral floats are accepted (serialized pipelines often emit `2.0`);
/// anything else maps to [`UNRESOLVED_MEMBER`].
fn member_value(value: &Value) -> i64 {
    if let Some(n) = value.as_i64() {
        return n;
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            return f as i64;
        }
    }
    UNRESOLVED_MEMBER
}

/// Render a node key from a JSON value (string keys pass through, numeric
/// keys are rendered in decimal).
fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
