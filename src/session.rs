//! Session facade — orchestrates the full pipeline and owns the results.
//!
//! A [`MapperSession`] runs normalize → process → extract → mixtures on
//! [`MapperSession::fit`] and keeps the complete result set as its current
//! state for repeated querying. [`MapperSession::transform`] re-runs only
//! extraction (and mixture derivation) against the stored processed graph,
//! optionally under a different time index set.
//!
//! State replacement is atomic: every field of [`FittedState`] comes from
//! the same pipeline run, swapped in with a single assignment only after
//! all stages succeed. A failed `fit` or `transform` leaves the previous
//! state untouched. The session itself is not reentrant — concurrent use
//! requires one session per logical analysis (or external locking).

use hashbrown::HashMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{TcmError, TcmResult};
use crate::graph::{GraphSource, MapperGraph};
use crate::matrices::{extract, DenseMatrix, ExtractOptions, Matrices};
use crate::mixture::{derive_mixtures, MemberGraph};
use crate::node_link::NodeLinkDocument;
use crate::process::{process, EdgeOverrides, LabelSeq, NodeOverrides, ProcessOptions};

// ─── Configuration ──────────────────────────────────────────────────────────

/// Session configuration with named, typed fields.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Clamp TCM entries to 0/1 instead of co-occurrence counts.
    pub binarize_tcm: bool,
    /// Also build the [`MemberGraph`] over time indices on fit/transform
    /// (required by [`MapperSession::annotate_members`]).
    pub build_member_graph: bool,
}

/// Inputs accompanying a graph on [`MapperSession::fit`].
#[derive(Clone, Debug, Default)]
pub struct FitOptions {
    /// Optional label sequence fixing the time index set.
    pub labels: Option<LabelSeq>,
    /// Node attribute overrides, applied during processing.
    pub node_data: NodeOverrides,
    /// Edge attribute overrides, applied during processing.
    pub edge_data: EdgeOverrides,
}

/// Annotation value shapes accepted by the annotate operations.
///
/// The key type is `String` for node annotation and `i64` (time index id)
/// for member annotation.
#[derive(Clone, Debug)]
pub enum Annotation<K> {
    /// One value broadcast to every entity.
    Scalar(Value),
    /// One value per entity in canonical order; the length must match the
    /// entity count exactly or the call fails with
    /// [`TcmError::AnnotationLength`].
    Sequence(Vec<Value>),
    /// Values for an explicit subset of entities. Unknown keys are ignored.
    ByKey(HashMap<K, Value>),
}

// ─── FittedState ────────────────────────────────────────────────────────────

/// The complete result bundle of one pipeline run.
#[derive(Clone, Debug)]
pub struct FittedState {
    /// The processed graph (annotations mutate this in place).
    pub graph: MapperGraph,
    /// Sorted unique node keys.
    pub node_ids: Vec<String>,
    /// The ordered time index set the matrices were extracted against.
    pub time_index: Vec<i64>,
    /// The label sequence supplied at fit time, if any.
    pub labels: Option<LabelSeq>,
    /// Node adjacency matrix.
    pub adjacency: DenseMatrix,
    /// Time × node membership matrix.
    pub membership: DenseMatrix,
    /// Temporal connectivity matrix.
    pub tcm: DenseMatrix,
    /// Per-time-index connectivity sets derived from the TCM.
    pub mixtures: Vec<Vec<usize>>,
    /// Member co-occurrence graph, when configured.
    pub member_graph: Option<MemberGraph>,
}

// ─── MapperSession ──────────────────────────────────────────────────────────

/// Facade over the graph→matrices pipeline, owning the fitted state.
#[derive(Debug, Default)]
pub struct MapperSession {
    config: SessionConfig,
    state: Option<FittedState>,
}

impl MapperSession {
    /// Create a session with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an explicit configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Pipeline ───────────────────────────────────────────────────────────

    /// Run the full pipeline and store the result bundle as current state.
    ///
    /// Any previously fitted state is discarded, but only once every stage
    /// has succeeded — a failing fit leaves the prior state in place.
    pub fn fit(&mut self, source: &GraphSource, options: FitOptions) -> TcmResult<&FittedState> {
        let graph = source.normalize();
        debug!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            "normalized mapper graph"
        );

        let process_options = ProcessOptions {
            node_data: options.node_data,
            edge_data: options.edge_data,
        };
        let processed = process(graph, options.labels.as_ref(), &process_options);

        let matrices = extract(
            &processed.graph,
            &processed.time_index,
            &self.extract_options(),
        )?;
        let mixtures = derive_mixtures(&matrices.tcm);
        let member_graph = self.config.build_member_graph.then(|| {
            MemberGraph::from_tcm(&matrices.tcm, &processed.time_index, options.labels.as_ref())
        });
        debug!(
            t = processed.time_index.len(),
            n = processed.node_ids.len(),
            "extracted temporal connectivity"
        );

        let Matrices {
            adjacency,
            membership,
            tcm,
        } = matrices;
        let next = FittedState {
            graph: processed.graph,
            node_ids: processed.node_ids,
            time_index: processed.time_index,
            labels: options.labels,
            adjacency,
            membership,
            tcm,
            mixtures,
            member_graph,
        };
        Ok(self.state.insert(next))
    }

    /// [`MapperSession::fit`], returning the temporal connectivity matrix.
    pub fn fit_transform(
        &mut self,
        source: &GraphSource,
        options: FitOptions,
    ) -> TcmResult<&DenseMatrix> {
        Ok(&self.fit(source, options)?.tcm)
    }

    /// Re-extract matrices from the stored processed graph.
    ///
    /// When `index` is supplied the matrices are rebuilt against that time
    /// index set (windowed re-extraction); otherwise the stored index is
    /// reused. Normalization and processing are not re-run. Fails with
    /// [`TcmError::NotFitted`] before the first successful fit; on any
    /// failure the previous state is restored unchanged.
    pub fn transform(&mut self, index: Option<&[i64]>) -> TcmResult<&DenseMatrix> {
        let current = self
            .state
            .take()
            .ok_or(TcmError::NotFitted("transform()"))?;

        let time_index = match index {
            Some(ids) => ids.to_vec(),
            None => current.time_index.clone(),
        };

        let matrices = match extract(&current.graph, &time_index, &self.extract_options()) {
            Ok(matrices) => matrices,
            Err(err) => {
                self.state = Some(current);
                return Err(err);
            }
        };
        let mixtures = derive_mixtures(&matrices.tcm);
        let member_graph = self
            .config
            .build_member_graph
            .then(|| MemberGraph::from_tcm(&matrices.tcm, &time_index, current.labels.as_ref()));
        debug!(
            t = time_index.len(),
            n = current.node_ids.len(),
            "re-extracted temporal connectivity"
        );

        let Matrices {
            adjacency,
            membership,
            tcm,
        } = matrices;
        let next = FittedState {
            graph: current.graph,
            node_ids: current.node_ids,
            time_index,
            labels: current.labels,
            adjacency,
            membership,
            tcm,
            mixtures,
            member_graph,
        };
        Ok(&self.state.insert(next).tcm)
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            binarize: self.config.binarize_tcm,
        }
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// The full fitted state, if any.
    pub fn state(&self) -> Option<&FittedState> {
        self.state.as_ref()
    }

    /// The stored processed graph.
    pub fn graph(&self) -> TcmResult<&MapperGraph> {
        self.fitted("graph()").map(|s| &s.graph)
    }

    /// Node adjacency matrix.
    pub fn adjacency(&self) -> TcmResult<&DenseMatrix> {
        self.fitted("adjacency()").map(|s| &s.adjacency)
    }

    /// Time × node membership matrix.
    pub fn membership(&self) -> TcmResult<&DenseMatrix> {
        self.fitted("membership()").map(|s| &s.membership)
    }

    /// Temporal connectivity matrix.
    pub fn tcm(&self) -> TcmResult<&DenseMatrix> {
        self.fitted("tcm()").map(|s| &s.tcm)
    }

    /// Per-time-index mixture sets.
    pub fn mixtures(&self) -> TcmResult<&[Vec<usize>]> {
        self.fitted("mixtures()").map(|s| s.mixtures.as_slice())
    }

    /// The time index set of the current state.
    pub fn time_index(&self) -> TcmResult<&[i64]> {
        self.fitted("time_index()").map(|s| s.time_index.as_slice())
    }

    /// Sorted node keys of the current state.
    pub fn node_ids(&self) -> TcmResult<&[String]> {
        self.fitted("node_ids()").map(|s| s.node_ids.as_slice())
    }

    /// The member co-occurrence graph.
    pub fn member_graph(&self) -> TcmResult<&MemberGraph> {
        self.fitted("member_graph()")?
            .member_graph
            .as_ref()
            .ok_or(TcmError::MemberGraphUnavailable)
    }

    /// Node-link serialization of the stored processed graph.
    pub fn node_link(&self) -> TcmResult<NodeLinkDocument> {
        self.fitted("node_link()")
            .map(|s| NodeLinkDocument::from_graph(&s.graph))
    }

    fn fitted(&self, op: &'static str) -> TcmResult<&FittedState> {
        self.state.as_ref().ok_or(TcmError::NotFitted(op))
    }

    // ── Annotation ─────────────────────────────────────────────────────────

    /// Set a node attribute from the given value shape.
    ///
    /// Sequences are assigned in sorted node-key order. Annotation mutates
    /// the stored graph in place; the matrices are structural and are not
    /// recomputed.
    pub fn annotate_nodes(&mut self, name: &str, values: Annotation<String>) -> TcmResult<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(TcmError::NotFitted("annotate_nodes()"))?;
        match values {
            Annotation::Scalar(value) => {
                for node in state.graph.nodes.values_mut() {
                    node.attrs.insert(name.to_string(), value.clone());
                }
            }
            Annotation::Sequence(values) => {
                if values.len() != state.node_ids.len() {
                    return Err(TcmError::AnnotationLength {
                        name: name.to_string(),
                        supplied: values.len(),
                        expected: state.node_ids.len(),
                    });
                }
                for (key, value) in state.node_ids.iter().zip(values) {
                    if let Some(node) = state.graph.nodes.get_mut(key.as_str()) {
                        node.attrs.insert(name.to_string(), value);
                    }
                }
            }
            Annotation::ByKey(entries) => {
                for (key, value) in entries {
                    if let Some(node) = state.graph.nodes.get_mut(key.as_str()) {
                        node.attrs.insert(name.to_string(), value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Set an attribute on member-graph entries (keyed by time index id).
    ///
    /// Requires [`SessionConfig::build_member_graph`].
    pub fn annotate_members(&mut self, name: &str, values: Annotation<i64>) -> TcmResult<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(TcmError::NotFitted("annotate_members()"))?;
        let member_graph = state
            .member_graph
            .as_mut()
            .ok_or(TcmError::MemberGraphUnavailable)?;
        match values {
            Annotation::Scalar(value) => {
                for position in 0..member_graph.len() {
                    if let Some(attrs) = member_graph.attrs_mut(position) {
                        attrs.insert(name.to_string(), value.clone());
                    }
                }
            }
            Annotation::Sequence(values) => {
                if values.len() != member_graph.len() {
                    return Err(TcmError::AnnotationLength {
                        name: name.to_string(),
                        supplied: values.len(),
                        expected: member_graph.len(),
                    });
                }
                for (position, value) in values.into_iter().enumerate() {
                    if let Some(attrs) = member_graph.attrs_mut(position) {
                        attrs.insert(name.to_string(), value);
                    }
                }
            }
            Annotation::ByKey(entries) => {
                for (id, value) in entries {
                    if let Some(position) = member_graph.position_of(id) {
                        if let Some(attrs) = member_graph.attrs_mut(position) {
                            attrs.insert(name.to_string(), value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Merge key/value pairs into the graph-level attributes.
    pub fn annotate_graph(
        &mut self,
        entries: impl IntoIterator<Item = (String, Value)>,
    ) -> TcmResult<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(TcmError::NotFitted("annotate_graph()"))?;
        for (name, value) in entries {
            state.graph.attrs.insert(name, value);
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
