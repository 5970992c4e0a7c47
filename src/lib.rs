//! # tcm-core
//!
//! Temporal connectivity matrices from Mapper graphs.
//!
//! A Mapper graph is a cluster graph over time-indexed observations: each
//! node is a cluster of time indices, and links connect clusters that share
//! members. This crate converts that representation into the dense
//! structures downstream analysis consumes:
//!
//! - **A** — node adjacency matrix (`N×N`),
//! - **M** — time × node membership matrix (`T×N`),
//! - **TCM** — temporal connectivity matrix (`T×T`), non-zero at (t₁,t₂)
//!   iff the two time indices co-occur in at least one shared node,
//! - **mixtures** — for each time index, the set of time indices it is
//!   connected to through the TCM.
//!
//! ## The pipeline
//!
//! ```text
//! GraphSource → normalize → process → extract → {A, M, TCM} → mixtures
//!      ↑                       ↑                                  ↓
//!  node/link document     LabelSeq, overrides               MemberGraph
//! ```
//!
//! [`MapperSession`] orchestrates the stages on `fit`, owns the complete
//! result bundle, and re-materializes matrices on `transform` without
//! re-parsing the graph.
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`graph`] | [`MapperGraph`], [`GraphSource`] | Canonical node/link model; permissive input normalization |
//! | [`process`] | [`LabelSeq`], [`process::Processed`] | Time index derivation, node ordering, attribute overrides |
//! | [`matrices`] | [`DenseMatrix`], [`matrices::extract`] | Adjacency, membership, and temporal connectivity extraction |
//! | [`mixture`] | [`MemberGraph`], [`mixture::derive_mixtures`] | Per-index connectivity sets and the member co-occurrence graph |
//! | [`session`] | [`MapperSession`], [`SessionConfig`] | Fit/transform facade owning the fitted state |
//! | [`node_link`] | [`NodeLinkDocument`] | Round-trippable node-link serialization |
//! | [`error`] | [`TcmError`] | Typed failure conditions |
//!
//! ## Example
//!
//! ```rust
//! use tcm_core::{FitOptions, GraphSource, MapperGraph, MapperSession};
//!
//! let mut graph = MapperGraph::new();
//! graph.insert_node("a", [0, 1, 2]);
//! graph.insert_node("b", [2, 3]);
//! graph.insert_edge("a", "b");
//!
//! let mut session = MapperSession::new();
//! session.fit(&GraphSource::Existing(graph), FitOptions::default())?;
//!
//! // time indices 0 and 2 share node "a"; 0 and 3 share nothing
//! let tcm = session.tcm()?;
//! assert_eq!(tcm.get(0, 2), 1);
//! assert_eq!(tcm.get(0, 3), 0);
//!
//! // index 3 is connected to {2, 3}
//! assert_eq!(session.mixtures()?[3], vec![2, 3]);
//! # Ok::<(), tcm_core::TcmError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod graph;
pub mod matrices;
pub mod mixture;
pub mod node_link;
pub mod process;
pub mod session;

pub use error::{TcmError, TcmResult};
pub use graph::{GraphSource, MapperEdge, MapperGraph, MapperNode};
pub use matrices::{DenseMatrix, Matrices};
pub use mixture::MemberGraph;
pub use node_link::NodeLinkDocument;
pub use process::LabelSeq;
pub use session::{Annotation, FitOptions, MapperSession, SessionConfig};
