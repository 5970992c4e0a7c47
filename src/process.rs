//! Graph processing: time index derivation, node ordering, and metadata.
//!
//! [`process`] turns a canonical graph into the inputs the matrix extractor
//! needs: the ordered time index set, the deterministic node order, and a
//! graph augmented with caller-supplied attribute overrides and label
//! alignment metadata.

use hashbrown::HashMap;
use serde_json::{Map, Value};

use crate::graph::MapperGraph;

/// Attribute overrides for nodes: attribute name → {node key → value}.
///
/// Partial annotation is legal — nodes absent from the inner map simply
/// lack the attribute.
pub type NodeOverrides = HashMap<String, HashMap<String, Value>>;

/// Attribute overrides for edges: attribute name → {(source, target) → value}.
pub type EdgeOverrides = HashMap<String, HashMap<(String, String), Value>>;

/// Node attribute name under which label alignment counts are stored.
pub const GROUPS_ATTR: &str = "groups";

// ─── LabelSeq ───────────────────────────────────────────────────────────────

/// An externally supplied label sequence, used to fix the time index set.
///
/// Label values are carried along for node alignment but are never
/// interpreted beyond equality.
#[derive(Clone, Debug, PartialEq)]
pub enum LabelSeq {
    /// Plain ordered values; the time index set is `0..len-1`.
    Plain(Vec<Value>),
    /// Table-like rows carrying their own index ids.
    Indexed(Vec<(i64, Value)>),
}

impl LabelSeq {
    /// The ordered, de-duplicated time index set this sequence implies.
    pub fn index_ids(&self) -> Vec<i64> {
        match self {
            Self::Plain(values) => (0..values.len() as i64).collect(),
            Self::Indexed(rows) => {
                let mut ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            }
        }
    }

    /// Number of labeled rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(values) => values.len(),
            Self::Indexed(rows) => rows.len(),
        }
    }

    /// `true` when the sequence has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label value lookup by time index id.
    pub fn value_for(&self, id: i64) -> Option<&Value> {
        match self {
            Self::Plain(values) => usize::try_from(id).ok().and_then(|i| values.get(i)),
            Self::Indexed(rows) => rows.iter().find(|(row, _)| *row == id).map(|(_, v)| v),
        }
    }
}

// ─── ProcessOptions / Processed ─────────────────────────────────────────────

/// Caller-supplied metadata applied during processing.
#[derive(Clone, Debug, Default)]
pub struct ProcessOptions {
    /// Node attribute overrides, applied verbatim.
    pub node_data: NodeOverrides,
    /// Edge attribute overrides, applied verbatim. Endpoint pairs match in
    /// either order since links are undirected.
    pub edge_data: EdgeOverrides,
}

/// Output of [`process`]: the augmented graph plus derived orderings.
#[derive(Clone, Debug)]
pub struct Processed {
    /// The graph with overrides and label alignment applied.
    pub graph: MapperGraph,
    /// Sorted unique node keys — the column order of the membership matrix.
    pub node_ids: Vec<String>,
    /// Ordered unique time index set — the row order of the membership
    /// matrix and both axes of the temporal connectivity matrix.
    pub time_index: Vec<i64>,
}

// ─── process ────────────────────────────────────────────────────────────────

/// Process a canonical graph against an optional label sequence.
///
/// The time index set comes from the labels when supplied, otherwise from
/// the union of all member indices across nodes (restricted to the valid
/// non-negative domain — entries the normalizer could not resolve never
/// create rows). When labels carry values, each node whose members are
/// labeled gains a [`GROUPS_ATTR`] attribute mapping label value → member
/// count, aligning the sequence to node membership.
///
/// An empty graph with a non-empty label sequence is legal and yields zero
/// node ids with a non-trivial time index set.
pub fn process(
    mut graph: MapperGraph,
    labels: Option<&LabelSeq>,
    options: &ProcessOptions,
) -> Processed {
    let time_index = match labels {
        Some(seq) => seq.index_ids(),
        None => member_union(&graph),
    };

    if let Some(seq) = labels {
        align_groups(&mut graph, seq);
    }

    for (name, per_node) in &options.node_data {
        for (key, value) in per_node {
            if let Some(node) = graph.nodes.get_mut(key.as_str()) {
                node.attrs.insert(name.clone(), value.clone());
            }
        }
    }

    for (name, per_edge) in &options.edge_data {
        for edge in graph.links.iter_mut() {
            let forward = (edge.source.clone(), edge.target.clone());
            let reverse = (edge.target.clone(), edge.source.clone());
            if let Some(value) = per_edge.get(&forward).or_else(|| per_edge.get(&reverse)) {
                edge.attrs.insert(name.clone(), value.clone());
            }
        }
    }

    let node_ids = graph.sorted_keys();

    Processed {
        graph,
        node_ids,
        time_index,
    }
}

/// Sorted union of all member indices in the valid domain.
fn member_union(graph: &MapperGraph) -> Vec<i64> {
    let mut ids: Vec<i64> = graph
        .nodes
        .values()
        .flat_map(|node| node.members.iter().copied())
        .filter(|&m| m >= 0)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Attach per-node label counts under [`GROUPS_ATTR`].
fn align_groups(graph: &mut MapperGraph, labels: &LabelSeq) {
    for node in graph.nodes.values_mut() {
        let mut counts = Map::new();
        for &member in &node.members {
            if let Some(value) = labels.value_for(member) {
                let key = group_key(value);
                let count = counts.get(&key).and_then(Value::as_u64).unwrap_or(0);
                counts.insert(key, Value::from(count + 1));
            }
        }
        if !counts.is_empty() {
            node.attrs.insert(GROUPS_ATTR.into(), Value::Object(counts));
        }
    }
}

/// Render a label value as a group key (strings pass through unquoted).
fn group_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
