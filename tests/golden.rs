//! Golden tests for the metrics kernel.
//!
//! These tests pin the worked examples end to end and verify that reports are
//! deterministic.

use gor_kernel::preflight::Preflight;
use gor_kernel::{
    compute_q2, compute_q4, AnchorTransition, Anchors, DocumentEvaluator, DocumentInput,
    MetricsConfig, NodeType, PipelineError, ReducedView, Skeleton, SkeletonEdge, SkeletonNode,
};
use serde_json::{json, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn chain_document() -> Value {
    json!({
        "document": {"id": "chain", "lang": "en"},
        "preregister": {"eval_mode": "union_k", "phi_preserve": ["normalize_case", "strip_punct"]},
        "log": {"seed": 42, "model_id": "tfidf-v1", "hash": "sha256:0f3a"},
        "skeleton": {
            "nodes": [
                {"id": "A", "type": "premise", "gist": "energy prices doubled",
                 "detail": "gas contracts were renegotiated during the winter"},
                {"id": "B", "type": "claim", "gist": "manufacturing output fell",
                 "detail": "smelters and glassworks idled their furnaces"},
                {"id": "C", "type": "evidence", "gist": "industrial index dropped",
                 "detail": "the index fell for three consecutive months"}
            ],
            "edges": [
                {"from": "A", "to": "B", "dep": "cause"},
                {"from": "B", "to": "C", "dep": "support"}
            ]
        },
        "anchors": {"transitions": [{"at": "A", "label": "setup"}]}
    })
}

fn branching_document() -> Value {
    //        root
    //       /    \
    //     mid    side
    //    /   \
    //  leaf1 leaf2(result)
    json!({
        "document": {"id": "branching", "lang": "en"},
        "preregister": {"eval_mode": "union_k", "phi_preserve": []},
        "log": {"seed": 7, "model_id": "m", "hash": "h", "prompt": "p"},
        "skeleton": {
            "nodes": [
                {"id": "root", "gist": "a new policy is proposed", "detail": "the ministry drafts a carbon levy"},
                {"id": "mid", "gist": "firms respond", "detail": "firms reprice and relocate"},
                {"id": "side", "gist": "households adapt", "detail": "rebates offset part of the cost"},
                {"id": "leaf1", "gist": "prices rise", "detail": "consumer prices rise modestly"},
                {"id": "leaf2", "type": "result", "gist": "emissions fall", "detail": "emissions fall by a tenth"}
            ],
            "edges": [
                {"from": "root", "to": "mid"}, {"from": "root", "to": "side"},
                {"from": "mid", "to": "leaf1"}, {"from": "mid", "to": "leaf2"},
                {"from": "leaf2", "to": "ghost"}
            ]
        },
        "anchors": {"transitions": [{"at": "mid"}, {"at": "missing"}, {"at": "mid"}]}
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Worked Examples
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chain_end_to_end() {
    let report = DocumentEvaluator::default().run(chain_document()).unwrap();
    let q2 = &report.metrics.q2;

    assert_eq!(q2.coverage, 1.0);
    assert_eq!(q2.details.raw_mean_path, 1.0);
    assert_eq!(q2.details.diameter, 2);
    assert!((q2.mean_path_norm - 0.5).abs() < 1e-12);
    assert!((q2.a_sa - 0.55).abs() < 1e-12);

    let q1 = &report.metrics.q1;
    assert!(q1.rho > 0.0 && q1.rho < 1.0);
    assert!((q1.distortion - (1.0 - q1.l_u)).abs() < 1e-12);
    assert!(q1.curve.iter().all(|(_, d)| (0.0..=1.0).contains(d)));

    // Detail adds new terms at A
    assert!(report.metrics.q3.v_ch > 0.0);
    assert_eq!(report.metrics.q3.num_transitions, 1);

    assert_eq!(report.eval.lang, "en");
    assert_eq!(report.log.model_id.as_deref(), Some("tfidf-v1"));
}

#[test]
fn test_branching_document() {
    let report = DocumentEvaluator::default().run(branching_document()).unwrap();
    let q2 = &report.metrics.q2;

    // V* = {root (root + branching), mid (branching), leaf2 (result)}
    assert_eq!(q2.details.num_key_nodes, 3);
    // mid anchored twice, "missing" unresolved
    assert_eq!(q2.details.num_anchors, 1);
    assert_eq!(q2.details.unresolved_anchors, 1);
    // mid covers itself and leaf2, not root
    assert!((q2.coverage - 2.0 / 3.0).abs() < 1e-12);

    let q4 = &report.metrics.q4;
    assert_eq!(q4.with_anchors, 1.0);
    assert!(q4.g_a > 0.0);
}

#[test]
fn test_serialized_report_shape() {
    let report = DocumentEvaluator::default().run(chain_document()).unwrap();
    let v = serde_json::to_value(&report).unwrap();

    assert_eq!(v["doc_id"], "chain");
    assert_eq!(v["eval"]["mode"], "union_k");
    assert_eq!(v["log"]["seed"], 42);
    for key in ["rho", "L_U", "D", "curve"] {
        assert!(v["metrics"]["Q1"].get(key).is_some(), "Q1.{key}");
    }
    for key in ["A_sa", "coverage", "mean_path", "details"] {
        assert!(v["metrics"]["Q2"].get(key).is_some(), "Q2.{key}");
    }
    for key in ["V_ch", "deltas", "num_transitions"] {
        assert!(v["metrics"]["Q3"].get(key).is_some(), "Q3.{key}");
    }
    for key in ["G_a", "baseline", "with_anchors"] {
        assert!(v["metrics"]["Q4"].get(key).is_some(), "Q4.{key}");
    }
}

#[test]
fn test_guidance_example() {
    // hub -> k1, hub -> k2 and a long tail far from both key nodes
    let mut nodes = vec![
        SkeletonNode::new("hub", NodeType::parse("step"), "", ""),
        SkeletonNode::new("k1", NodeType::Claim, "", ""),
        SkeletonNode::new("k2", NodeType::Result, "", ""),
    ];
    let mut edges = vec![SkeletonEdge::reference("hub", "k1"), SkeletonEdge::reference("hub", "k2")];
    let mut prev = "hub".to_string();
    for i in 0..6 {
        let id = format!("t{i}");
        nodes.push(SkeletonNode::new(id.clone(), NodeType::parse("step"), "", ""));
        edges.push(SkeletonEdge::reference(id.clone(), prev.clone()));
        prev = id;
    }
    let skeleton = Skeleton::new(nodes, edges);

    let q4 = compute_q4(&skeleton, &Anchors::at_nodes(["hub"]));
    assert!(q4.g_a > 0.0);
    assert!(q4.baseline > q4.with_anchors);

    assert_eq!(compute_q4(&skeleton, &Anchors::default()).g_a, 0.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_same_input_same_report_100_runs() {
    let evaluator = DocumentEvaluator::default();
    let first = evaluator.run(chain_document()).unwrap();
    let first_hash = first.report_hash();

    for _ in 0..100 {
        let again = evaluator.run(chain_document()).unwrap();
        assert_eq!(again, first);
        assert_eq!(again.report_hash(), first_hash);
    }
}

#[test]
fn test_config_change_changes_params_hash() {
    let base = DocumentEvaluator::default().run(chain_document()).unwrap();
    let reweighted = DocumentEvaluator::new(MetricsConfig::default().with_weights(0.5, 0.5))
        .run(chain_document())
        .unwrap();

    assert_ne!(base.eval.params_hash, reweighted.eval.params_hash);
    assert_eq!(base.eval.skeleton_hash, reweighted.eval.skeleton_hash);
    assert_ne!(base.report_hash(), reweighted.report_hash());
}

#[test]
fn test_skeleton_hash_ignores_node_order() {
    let doc = DocumentInput::from_value(chain_document()).unwrap();
    let mut reordered = doc.skeleton.clone();
    reordered.nodes.reverse();
    reordered.edges.reverse();
    assert_eq!(doc.skeleton.content_hash(), reordered.content_hash());
}

#[test]
fn test_reduced_view_is_configurable() {
    let gist_only = DocumentEvaluator::default().run(chain_document()).unwrap();
    let full = DocumentEvaluator::new(MetricsConfig::default().with_reduced_view(ReducedView::GistAndDetail))
        .run(chain_document())
        .unwrap();

    assert!(gist_only.metrics.q1.rho < full.metrics.q1.rho);
    assert_eq!(full.metrics.q1.rho, 1.0);
    assert!(full.metrics.q1.distortion.abs() < 1e-12);
    // Graph metrics do not depend on the view
    assert_eq!(gist_only.metrics.q2, full.metrics.q2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Degenerate Inputs and Gate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unresolved_anchor_handling() {
    let skeleton = DocumentInput::from_value(chain_document()).unwrap().skeleton;
    let anchors = Anchors::new(vec![
        AnchorTransition::at("A"),
        AnchorTransition::at("nowhere"),
        AnchorTransition::default(),
    ]);
    let with_noise = compute_q2(&skeleton, &anchors, &MetricsConfig::default());
    let clean = compute_q2(&skeleton, &Anchors::at_nodes(["A"]), &MetricsConfig::default());

    assert_eq!(with_noise.a_sa, clean.a_sa);
    assert_eq!(with_noise.details.unresolved_anchors, 2);
}

#[test]
fn test_empty_skeleton_does_not_fail() {
    let raw = json!({
        "document": {"id": "empty", "lang": "en"},
        "preregister": {"eval_mode": "union_k"},
        "log": {"seed": 1, "model_id": "m", "hash": "h"}
    });
    let report = DocumentEvaluator::default().run(raw).unwrap();

    assert_eq!(report.metrics.q1.l_u, 0.0);
    assert_eq!(report.metrics.q2.a_sa, 0.0);
    assert_eq!(report.metrics.q2.details.diameter, 1);
    assert_eq!(report.metrics.q3.v_ch, 0.0);
    assert_eq!(report.metrics.q4.g_a, 0.0);
}

#[test]
fn test_lenient_log_fields_end_to_end() {
    let strict = DocumentEvaluator::default().run(chain_document()).unwrap();

    let mut raw = chain_document();
    raw["log"]["seed"] = json!("42");
    raw["log"]["model_id"] = json!(3);
    let report = DocumentEvaluator::default().run(raw).unwrap();

    assert_eq!(report.log.seed, strict.log.seed);
    assert_eq!(report.log.model_id.as_deref(), Some("3"));
    assert_eq!(report.metrics, strict.metrics);
    assert_eq!(report.schema_version, gor_kernel::GOR_KERNEL_SCHEMA_VERSION);
}

#[test]
fn test_preflight_codes() {
    let cases: Vec<(&str, Box<dyn Fn(&mut Value)>)> = vec![
        ("E100", Box::new(|v: &mut Value| {
            v.as_object_mut().unwrap().remove("preregister");
        })),
        ("E110", Box::new(|v: &mut Value| v["preregister"]["eval_mode"] = json!("intersect_k"))),
        ("E120", Box::new(|v: &mut Value| v["preregister"]["phi_preserve"] = json!(["rewrite"]))),
        ("E130", Box::new(|v: &mut Value| {
            v["log"].as_object_mut().unwrap().remove("model_id");
        })),
        ("E140", Box::new(|v: &mut Value| v["skeleton"]["nodes"][0]["detail"] = json!("contact bob@corp.example.org"))),
    ];

    let evaluator = DocumentEvaluator::default().with_preflight(Preflight::new());
    for (code, mutate) in cases {
        let mut raw = chain_document();
        mutate(&mut raw);
        let err = evaluator.run(raw).unwrap_err();
        assert!(matches!(err, PipelineError::Preflight(_)));
        assert_eq!(err.code(), Some(code));
        assert!(err.to_string().starts_with(code));
    }
}

#[test]
fn test_japanese_document_without_analyzer() {
    let raw = json!({
        "document": {"id": "ja-doc", "lang": "ja"},
        "preregister": {"eval_mode": "union_k"},
        "log": {"seed": 42, "model_id": "m", "hash": "h"},
        "skeleton": {
            "nodes": [
                {"id": "n1", "type": "claim", "gist": "物価 が 上昇 した", "detail": "エネルギー 価格 が 倍増 した"},
                {"id": "n2", "gist": "賃金 は 停滞", "detail": "実質 賃金 は 低下 した"}
            ],
            "edges": [{"from": "n1", "to": "n2"}]
        },
        "anchors": {"transitions": [{"at": "n1"}]}
    });

    let report = DocumentEvaluator::default().run(raw).unwrap();
    assert_eq!(report.eval.lang, "ja");
    assert!(report.metrics.q1.l_u > 0.0);
    assert!(report.metrics.q3.v_ch > 0.0);
}
