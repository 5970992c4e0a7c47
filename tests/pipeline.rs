//! End-to-end pipeline properties over the session facade.
//!
//! Covers the contract of the graph→matrices transformation as a whole:
//! determinism, symmetry, the TCM diagonal rule, mixture/TCM consistency,
//! empty-graph degradation, the canonical two-node overlap scenario, and
//! atomic state replacement across refits.

use serde_json::json;
use tcm_core::{
    Annotation, FitOptions, GraphSource, LabelSeq, MapperGraph, MapperSession, SessionConfig,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Nodes a={0,1,2}, b={2,3}, edge (a,b); time index set 0..3.
fn two_node_source() -> GraphSource {
    let mut graph = MapperGraph::new();
    graph.insert_node("a", [0, 1, 2]);
    graph.insert_node("b", [2, 3]);
    graph.insert_edge("a", "b");
    GraphSource::Existing(graph)
}

/// A larger graph with an isolated time index (7 is in no node).
fn ring_source() -> GraphSource {
    let mut graph = MapperGraph::new();
    graph.insert_node("n0", [0, 1]);
    graph.insert_node("n1", [1, 2, 3]);
    graph.insert_node("n2", [3, 4, 5]);
    graph.insert_node("n3", [5, 6, 0]);
    graph.insert_edge("n0", "n1");
    graph.insert_edge("n1", "n2");
    graph.insert_edge("n2", "n3");
    graph.insert_edge("n3", "n0");
    GraphSource::Existing(graph)
}

fn ring_labels() -> LabelSeq {
    // eight rows: index 7 belongs to no node
    LabelSeq::Plain((0..8).map(|i| json!(i % 2)).collect())
}

fn fitted(source: &GraphSource, labels: Option<LabelSeq>) -> MapperSession {
    let mut session = MapperSession::new();
    let options = FitOptions {
        labels,
        ..FitOptions::default()
    };
    session.fit(source, options).expect("fit");
    session
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn extraction_is_deterministic_across_sessions() {
    let first = fitted(&ring_source(), Some(ring_labels()));
    let second = fitted(&ring_source(), Some(ring_labels()));

    assert_eq!(first.adjacency().unwrap(), second.adjacency().unwrap());
    assert_eq!(first.membership().unwrap(), second.membership().unwrap());
    assert_eq!(first.tcm().unwrap(), second.tcm().unwrap());
    assert_eq!(first.mixtures().unwrap(), second.mixtures().unwrap());
}

#[test]
fn adjacency_and_tcm_are_symmetric() {
    let session = fitted(&ring_source(), Some(ring_labels()));
    assert!(session.adjacency().unwrap().is_symmetric());
    assert!(session.tcm().unwrap().is_symmetric());
}

#[test]
fn tcm_diagonal_is_nonzero_iff_the_index_is_in_a_node() {
    let session = fitted(&ring_source(), Some(ring_labels()));
    let tcm = session.tcm().unwrap();
    let membership = session.membership().unwrap();

    for t in 0..tcm.rows() {
        let node_count: u32 = membership.row(t).iter().sum();
        assert_eq!(
            tcm.get(t, t) != 0,
            node_count != 0,
            "diagonal rule violated at index {t}"
        );
    }
    // index 7 in particular: all-zero row, diagonal included
    assert!(tcm.row(7).iter().all(|&v| v == 0));
    assert!(session.mixtures().unwrap()[7].is_empty());
}

#[test]
fn mixtures_and_tcm_agree_both_ways() {
    let session = fitted(&ring_source(), Some(ring_labels()));
    let tcm = session.tcm().unwrap();
    let mixtures = session.mixtures().unwrap();

    for t in 0..tcm.rows() {
        for u in 0..tcm.cols() {
            let in_mixture = mixtures[t].contains(&u);
            assert_eq!(in_mixture, tcm.get(t, u) != 0, "TCM[{t}][{u}]");
            assert_eq!(in_mixture, mixtures[u].contains(&t), "symmetry at ({t},{u})");
        }
    }
}

#[test]
fn empty_graph_degrades_to_zero_artifacts() {
    let labels = LabelSeq::Plain(vec![json!(0); 5]);
    let session = fitted(&GraphSource::Empty, Some(labels));

    let adjacency = session.adjacency().unwrap();
    let membership = session.membership().unwrap();
    let tcm = session.tcm().unwrap();

    assert_eq!((adjacency.rows(), adjacency.cols()), (0, 0));
    assert_eq!((membership.rows(), membership.cols()), (5, 0));
    assert_eq!((tcm.rows(), tcm.cols()), (5, 5));
    assert!(tcm.to_rows().iter().flatten().all(|&v| v == 0));
    assert!(session.mixtures().unwrap().iter().all(|m| m.is_empty()));
}

#[test]
fn two_node_scenario_yields_the_expected_artifacts() {
    let session = fitted(&two_node_source(), None);

    assert_eq!(
        session.membership().unwrap().to_rows(),
        vec![vec![1, 0], vec![1, 0], vec![1, 1], vec![0, 1]],
        "rows 0,1 → {{a}}, 2 → {{a,b}}, 3 → {{b}}"
    );
    assert_eq!(
        session.adjacency().unwrap().to_rows(),
        vec![vec![0, 1], vec![1, 0]]
    );
    assert_eq!(
        session.mixtures().unwrap(),
        &[vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2, 3], vec![2, 3]],
    );

    // connectivity pattern of the TCM (counts on the shared-index diagonal)
    let nonzero: Vec<Vec<u32>> = session
        .tcm()
        .unwrap()
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.min(1)).collect())
        .collect();
    assert_eq!(
        nonzero,
        vec![
            vec![1, 1, 1, 0],
            vec![1, 1, 1, 0],
            vec![1, 1, 1, 1],
            vec![0, 0, 1, 1],
        ],
    );
}

#[test]
fn binarized_session_stores_the_pattern_directly() {
    let config = SessionConfig {
        binarize_tcm: true,
        ..SessionConfig::default()
    };
    let mut session = MapperSession::with_config(config);
    session.fit(&two_node_source(), FitOptions::default()).unwrap();

    assert_eq!(
        session.tcm().unwrap().to_rows(),
        vec![
            vec![1, 1, 1, 0],
            vec![1, 1, 1, 0],
            vec![1, 1, 1, 1],
            vec![0, 0, 1, 1],
        ],
    );
}

#[test]
fn partial_annotation_leaves_other_nodes_without_the_key() {
    let mut session = fitted(&two_node_source(), None);
    let mut colors = hashbrown::HashMap::new();
    colors.insert("a".to_string(), json!("blue"));
    session
        .annotate_nodes("color", Annotation::ByKey(colors))
        .unwrap();

    let graph = session.graph().unwrap();
    assert_eq!(graph.nodes["a"].attrs.get("color"), Some(&json!("blue")));
    assert_eq!(graph.nodes["b"].attrs.get("color"), None, "absent, not null");
}

#[test]
fn refit_replaces_state_atomically() {
    let mut session = fitted(&two_node_source(), None);

    let mut other = MapperGraph::new();
    other.insert_node("p", [0, 1]);
    other.insert_node("q", [1, 2]);
    other.insert_node("r", [2]);
    other.insert_edge("p", "q");
    other.insert_edge("q", "r");
    session
        .fit(&GraphSource::Existing(other), FitOptions::default())
        .unwrap();

    // every stored field reflects the second graph
    let t = session.time_index().unwrap().len();
    assert_eq!(session.node_ids().unwrap(), &["p", "q", "r"]);
    assert_eq!(t, 3);
    assert_eq!(session.adjacency().unwrap().rows(), 3);
    assert_eq!(session.membership().unwrap().rows(), t);
    assert_eq!(session.membership().unwrap().cols(), 3);
    assert_eq!(session.tcm().unwrap().rows(), t);
    assert_eq!(session.mixtures().unwrap().len(), t);
    assert!(session.graph().unwrap().nodes.contains_key("p"));
    assert!(!session.graph().unwrap().nodes.contains_key("a"));
}

#[test]
fn transform_rematerializes_without_reprocessing() {
    let mut session = fitted(&ring_source(), Some(ring_labels()));
    let full = session.tcm().unwrap().clone();

    // windowed view over the middle of the sequence
    let windowed = session.transform(Some(&[2, 3, 4])).unwrap().clone();
    assert_eq!(windowed.rows(), 3);
    for (w, t) in (2..5).enumerate() {
        for (w2, t2) in (2..5).enumerate() {
            assert_eq!(
                windowed.get(w, w2) != 0,
                full.get(t, t2) != 0,
                "window ({w},{w2}) vs full ({t},{t2})"
            );
        }
    }

    // transforming back to the full index restores the original matrices
    let restored = session.transform(Some(&(0..8).collect::<Vec<i64>>())).unwrap();
    assert_eq!(restored, &full);
}

#[test]
fn member_graph_follows_the_configured_labels() {
    let config = SessionConfig {
        build_member_graph: true,
        ..SessionConfig::default()
    };
    let mut session = MapperSession::with_config(config);
    let options = FitOptions {
        labels: Some(ring_labels()),
        ..FitOptions::default()
    };
    session.fit(&ring_source(), options).unwrap();

    let member_graph = session.member_graph().unwrap();
    assert_eq!(member_graph.len(), 8);
    assert_eq!(
        member_graph.attrs(1).and_then(|a| a.get("group")),
        Some(&json!(1))
    );
    // co-occurrence edges agree with the TCM's upper triangle
    let tcm = session.tcm().unwrap();
    for &(s, u) in member_graph.edges() {
        assert!(s < u);
        assert_ne!(tcm.get(s, u), 0, "edge ({s},{u}) without TCM support");
    }
}
