//! Node-link document round-trip integration tests.
//!
//! Verifies that a processed Mapper graph can be serialized to a node-link
//! document, rendered to JSON, deserialized back, and that node, link, and
//! attribute data are preserved exactly — and that the normalizer accepts
//! the document as serialized input, closing the loop.

use serde_json::json;
use tcm_core::node_link::{NodeLinkDocument, NODE_LINK_VERSION};
use tcm_core::{Annotation, FitOptions, GraphSource, MapperGraph, MapperSession};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn sample_graph() -> MapperGraph {
    let mut graph = MapperGraph::new();
    graph.insert_node("cube0_cluster0", [0, 1, 2]);
    graph.insert_node("cube1_cluster0", [2, 3, 4]);
    graph.insert_node("cube2_cluster0", [4, 5]);
    graph.insert_edge("cube0_cluster0", "cube1_cluster0");
    graph.insert_edge("cube1_cluster0", "cube2_cluster0");
    graph
}

/// Fit a session and annotate it so the document carries attribute data.
fn fitted_session() -> MapperSession {
    let mut session = MapperSession::new();
    session
        .fit(&GraphSource::Existing(sample_graph()), FitOptions::default())
        .expect("fit sample graph");
    session
        .annotate_nodes("color", Annotation::Scalar(json!("#1f77b4")))
        .expect("annotate nodes");
    session
        .annotate_graph([("name".to_string(), json!("demo run"))])
        .expect("annotate graph");
    session
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn document_carries_version_and_shape() {
    let doc = fitted_session().node_link().expect("node-link document");
    assert_eq!(doc.version, NODE_LINK_VERSION);
    assert!(!doc.directed, "mapper graphs are undirected");
    assert_eq!(doc.node_count(), 3);
    assert_eq!(doc.links.len(), 2);
}

#[test]
fn json_round_trip_preserves_everything() {
    let original = fitted_session().node_link().expect("node-link document");

    let rendered = serde_json::to_string(&original).expect("serialize to JSON");
    let restored: NodeLinkDocument = serde_json::from_str(&rendered).expect("deserialize");

    assert_eq!(original, restored, "document mismatch after round-trip");

    for record in &original.nodes {
        let back = restored
            .find_node(&record.id)
            .unwrap_or_else(|| panic!("node `{}` missing after round-trip", record.id));
        assert_eq!(record.members, back.members, "members of `{}`", record.id);
        assert_eq!(
            back.attrs.get("color"),
            Some(&json!("#1f77b4")),
            "color of `{}`",
            record.id
        );
    }
    assert_eq!(restored.graph.get("name"), Some(&json!("demo run")));
}

#[test]
fn document_rebuilds_the_stored_graph() {
    let session = fitted_session();
    let doc = session.node_link().expect("node-link document");
    assert_eq!(&doc.to_graph(), session.graph().expect("stored graph"));
}

#[test]
fn normalizer_accepts_the_document_as_serialized_input() {
    let session = fitted_session();
    let doc = session.node_link().expect("node-link document");

    let reparsed = GraphSource::Serialized(doc.to_value()).normalize();
    assert_eq!(&reparsed, session.graph().expect("stored graph"));
}

#[test]
fn refit_from_document_reproduces_the_matrices() {
    let mut first = MapperSession::new();
    first
        .fit(&GraphSource::Existing(sample_graph()), FitOptions::default())
        .expect("first fit");
    let doc = first.node_link().expect("node-link document");

    let mut second = MapperSession::new();
    second
        .fit(&GraphSource::Serialized(doc.to_value()), FitOptions::default())
        .expect("refit from document");

    assert_eq!(first.tcm().expect("tcm"), second.tcm().expect("tcm"));
    assert_eq!(
        first.membership().expect("membership"),
        second.membership().expect("membership")
    );
    assert_eq!(
        first.mixtures().expect("mixtures"),
        second.mixtures().expect("mixtures")
    );
}

#[test]
fn empty_graph_document_round_trips() {
    let doc = NodeLinkDocument::from_graph(&MapperGraph::new());
    assert_eq!(doc.node_count(), 0);

    let rendered = serde_json::to_string(&doc).expect("serialize empty document");
    let restored: NodeLinkDocument = serde_json::from_str(&rendered).expect("deserialize");
    assert!(restored.to_graph().is_empty());
}
