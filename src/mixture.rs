//! Mixture derivation — per-time-index connectivity sets from the TCM.
//!
//! A "mixture" is, for one time index, the set of time indices it shares at
//! least one Mapper node with. [`derive_mixtures`] reads them straight off
//! the temporal connectivity matrix; [`MemberGraph`] materializes the same
//! information as a secondary co-occurrence graph over time indices (not
//! nodes), ready for per-index annotation.

use crate::graph::AttrMap;
use crate::matrices::DenseMatrix;
use crate::process::LabelSeq;

/// Node attribute name for label values attached to member-graph entries.
pub const GROUP_ATTR: &str = "group";

/// For each TCM row, the ascending column positions with a non-zero entry.
///
/// A time index that belongs to at least one node always appears in its own
/// mixture (the TCM diagonal is non-zero there); one that belongs to no
/// node has an empty mixture. Pure function of the matrix, O(T²) total.
pub fn derive_mixtures(tcm: &DenseMatrix) -> Vec<Vec<usize>> {
    (0..tcm.rows())
        .map(|row| {
            tcm.row(row)
                .iter()
                .enumerate()
                .filter(|(_, &value)| value != 0)
                .map(|(col, _)| col)
                .collect()
        })
        .collect()
}

// ─── MemberGraph ────────────────────────────────────────────────────────────

/// Co-occurrence graph over time indices, derived from the TCM.
///
/// One entry per time index (in index-set order) with its own attribute
/// bag, plus an undirected edge for every strictly-upper-triangle non-zero
/// TCM entry. This is the node-aggregated counterpart the member
/// annotation operations mutate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberGraph {
    ids: Vec<i64>,
    attrs: Vec<AttrMap>,
    edges: Vec<(usize, usize)>,
}

impl MemberGraph {
    /// Build the member graph from a TCM and its time index set.
    ///
    /// When a label sequence is supplied, every labeled entry gains a
    /// [`GROUP_ATTR`] attribute carrying its label value.
    pub fn from_tcm(tcm: &DenseMatrix, ids: &[i64], labels: Option<&LabelSeq>) -> Self {
        let mut attrs = vec![AttrMap::new(); ids.len()];
        if let Some(seq) = labels {
            for (entry, &id) in attrs.iter_mut().zip(ids) {
                if let Some(value) = seq.value_for(id) {
                    entry.insert(GROUP_ATTR.into(), value.clone());
                }
            }
        }

        let mut edges = Vec::new();
        for s in 0..tcm.rows() {
            for u in (s + 1)..tcm.cols() {
                if tcm.get(s, u) != 0 {
                    edges.push((s, u));
                }
            }
        }

        Self {
            ids: ids.to_vec(),
            attrs,
            edges,
        }
    }

    /// Number of time-index entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` when the graph has no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The time index ids, in index-set order.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Undirected co-occurrence edges as (position, position) pairs.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Attribute bag of the entry at `position`.
    pub fn attrs(&self, position: usize) -> Option<&AttrMap> {
        self.attrs.get(position)
    }

    /// Mutable attribute bag of the entry at `position`.
    pub fn attrs_mut(&mut self, position: usize) -> Option<&mut AttrMap> {
        self.attrs.get_mut(position)
    }

    /// Position of a time index id within the graph, if present.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
