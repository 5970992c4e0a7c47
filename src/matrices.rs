//! Matrix extraction — the algorithmic core of the crate.
//!
//! [`extract`] walks a processed graph's nodes and member lists and builds
//! three dense matrices:
//!
//! - **A** — node adjacency, `N×N`, entry 1 iff a link exists,
//! - **M** — membership, `T×N`, entry 1 iff time index t belongs to node n,
//! - **TCM** — temporal connectivity, `T×T` = `M·Mᵀ`, entry (t₁,t₂)
//!   non-zero iff the two time indices share at least one node.
//!
//! Node order is the sorted key order, so repeated extraction over the same
//! input is bit-identical. The dominant cost is the TCM product,
//! O(T²·N) over contiguous membership rows.

use hashbrown::HashMap;

use crate::error::{TcmError, TcmResult};
use crate::graph::MapperGraph;

// ─── DenseMatrix ────────────────────────────────────────────────────────────

/// Dense row-major matrix of co-occurrence counts.
///
/// Entries are `u32` counts, but everywhere in this crate only their
/// zero/non-zero state is contractual. Rows are contiguous slices
/// (row stride = `cols`), which keeps the Gram product cache-friendly.
#[derive(Clone, PartialEq, Eq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl DenseMatrix {
    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at (row, col).
    ///
    /// # Panics
    /// Panics if the position is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        assert!(row < self.rows && col < self.cols, "index ({row},{col}) out of bounds");
        self.data[row * self.cols + col]
    }

    /// Set the entry at (row, col).
    ///
    /// # Panics
    /// Panics if the position is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        assert!(row < self.rows && col < self.cols, "index ({row},{col}) out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// One row as a contiguous slice.
    pub fn row(&self, row: usize) -> &[u32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy out as nested row vectors (test and display convenience).
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// `true` when every entry equals its transpose partner.
    pub fn is_symmetric(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows)
                .all(|r| (r..self.cols).all(|c| self.get(r, c) == self.get(c, r)))
    }
}

impl core::fmt::Debug for DenseMatrix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DenseMatrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

// ─── Extraction ─────────────────────────────────────────────────────────────

/// Options controlling matrix extraction.
#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    /// Clamp TCM entries to 0/1 instead of keeping co-occurrence counts.
    pub binarize: bool,
}

/// The three derived matrices, in one bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrices {
    /// Node adjacency, `N×N`.
    pub adjacency: DenseMatrix,
    /// Time × node membership indicator, `T×N`.
    pub membership: DenseMatrix,
    /// Temporal connectivity, `T×T`.
    pub tcm: DenseMatrix,
}

/// Extract adjacency, membership, and temporal connectivity matrices.
///
/// `index` is the ordered time index set giving the row order of M and both
/// axes of the TCM. Members absent from `index` are silently excluded —
/// this intentionally supports windowed re-extraction against a narrower
/// index. Members that could never resolve (negative, or marked unresolved
/// by the normalizer) and links naming unknown node keys fail with
/// [`TcmError::SchemaMismatch`].
///
/// The TCM diagonal at position t equals the number of nodes containing
/// that time index, so an index belonging to no node has an all-zero row
/// and column, diagonal included.
pub fn extract(
    graph: &MapperGraph,
    index: &[i64],
    options: &ExtractOptions,
) -> TcmResult<Matrices> {
    let node_order = graph.sorted_keys();
    let t_len = index.len();
    let n_len = node_order.len();

    let mut position: HashMap<i64, usize> = HashMap::with_capacity(t_len);
    for (pos, &id) in index.iter().enumerate() {
        position.entry(id).or_insert(pos);
    }

    let mut node_position: HashMap<&str, usize> = HashMap::with_capacity(n_len);
    for (pos, key) in node_order.iter().enumerate() {
        node_position.insert(key.as_str(), pos);
    }

    // M: binary presence of each member index in each node's column.
    let mut membership = DenseMatrix::zeros(t_len, n_len);
    for (col, key) in node_order.iter().enumerate() {
        let node = &graph.nodes[key.as_str()];
        for &member in &node.members {
            if member < 0 {
                return Err(TcmError::schema(
                    key.clone(),
                    format!("member index {member} is outside the resolvable domain"),
                ));
            }
            if let Some(&row) = position.get(&member) {
                membership.set(row, col, 1);
            }
        }
    }

    // A: both orientations of every link; self-loops only if explicit.
    let mut adjacency = DenseMatrix::zeros(n_len, n_len);
    for edge in &graph.links {
        let &i = node_position.get(edge.source.as_str()).ok_or_else(|| {
            TcmError::schema(edge.source.clone(), "link endpoint is not a node")
        })?;
        let &j = node_position.get(edge.target.as_str()).ok_or_else(|| {
            TcmError::schema(edge.target.clone(), "link endpoint is not a node")
        })?;
        adjacency.set(i, j, 1);
        adjacency.set(j, i, 1);
    }

    // TCM = M·Mᵀ over contiguous rows; symmetric by construction.
    let mut tcm = DenseMatrix::zeros(t_len, t_len);
    for s in 0..t_len {
        for u in s..t_len {
            let mut count: u32 = membership
                .row(s)
                .iter()
                .zip(membership.row(u))
                .map(|(a, b)| a * b)
                .sum();
            if options.binarize {
                count = count.min(1);
            }
            tcm.set(s, u, count);
            tcm.set(u, s, count);
        }
    }

    Ok(Matrices {
        adjacency,
        membership,
        tcm,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────
