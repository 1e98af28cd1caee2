//! End-to-end scenarios run against the public `Engine` API: small
//! hand-built fault trees with known closed-form answers, used to pin down
//! exact vs. rare-event vs. MCUB probability, minimal cut sets, clamping,
//! and CCF expansion.

use scram_core::error::{EngineError, Warning};
use scram_core::model::{
    Arg, ArgRef, BasicEvent, CcfGroup, CcfModel, Connective, Gate, Model, ProbabilityExpression,
};
use scram_core::probability::ProbabilityMethod;
use scram_core::{Engine, Settings};

fn basic_event(id: &str, p: f64) -> BasicEvent {
    BasicEvent {
        id: id.into(),
        probability: ProbabilityExpression::Constant(p),
    }
}

fn two_input_gate(connective: Connective, pa: f64, pb: f64) -> Model {
    Model {
        basic_events: vec![basic_event("a", pa), basic_event("b", pb)],
        house_events: vec![],
        gates: vec![Gate {
            id: "top".into(),
            connective,
            args: vec![
                Arg::positive(ArgRef::BasicEvent("a".into())),
                Arg::positive(ArgRef::BasicEvent("b".into())),
            ],
        }],
        ccf_groups: vec![],
        root: "top".into(),
    }
}

fn run(model: Model, method: ProbabilityMethod) -> scram_core::Report {
    let settings = Settings {
        probability_method: method,
        ..Settings::default()
    };
    let mut engine = Engine::new(model, settings).unwrap();
    engine.preprocess().unwrap();
    engine.compile().unwrap();
    engine.report().unwrap()
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn and_of_two_point_one_events_is_exactly_their_product() {
    let model = two_input_gate(Connective::And, 0.1, 0.1);

    let exact = run(model.clone(), ProbabilityMethod::Exact);
    assert_close(exact.final_probability().unwrap(), 0.01, 1e-9);

    let rare_event = run(model.clone(), ProbabilityMethod::RareEvent);
    assert_close(rare_event.final_probability().unwrap(), 0.01, 1e-9);

    let mcub = run(model, ProbabilityMethod::Mcub);
    assert_close(mcub.final_probability().unwrap(), 0.01, 1e-9);

    let products = exact.products.expect("AND is coherent, MOCUS always runs");
    assert_eq!(products.len(), 1);
    let mut members = products.products[0].members.clone();
    members.sort();
    assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn or_of_two_point_one_events_matches_inclusion_exclusion() {
    let model = two_input_gate(Connective::Or, 0.1, 0.1);

    let exact = run(model.clone(), ProbabilityMethod::Exact);
    assert_close(exact.final_probability().unwrap(), 0.19, 1e-9);
    assert!(exact.warnings.is_empty());

    let rare_event = run(model.clone(), ProbabilityMethod::RareEvent);
    assert_close(rare_event.final_probability().unwrap(), 0.2, 1e-9);
    assert!(rare_event.warnings.is_empty());

    let mcub = run(model, ProbabilityMethod::Mcub);
    assert_close(mcub.final_probability().unwrap(), 0.19, 1e-9);

    let mut cut_sets: Vec<Vec<String>> = exact
        .products
        .unwrap()
        .products
        .into_iter()
        .map(|p| p.members)
        .collect();
    cut_sets.sort();
    assert_eq!(cut_sets, vec![vec!["a".to_string()], vec!["b".to_string()]]);
}

#[test]
fn or_of_two_point_six_events_clamps_the_rare_event_overestimate() {
    let model = two_input_gate(Connective::Or, 0.6, 0.6);

    let exact = run(model.clone(), ProbabilityMethod::Exact);
    assert_close(exact.final_probability().unwrap(), 0.84, 1e-9);

    let rare_event = run(model, ProbabilityMethod::RareEvent);
    // Unclamped rare-event sum is 0.6 + 0.6 = 1.2; the reported series clamps
    // to 1.0 and records why.
    assert_close(rare_event.final_probability().unwrap(), 1.0, 1e-9);
    assert!(rare_event
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ApproximationClamped { raw_value } if (*raw_value - 1.2).abs() < 1e-9)));
}

#[test]
fn negation_of_a_single_event_is_its_complement() {
    let model = Model {
        basic_events: vec![basic_event("a", 0.3)],
        house_events: vec![],
        gates: vec![Gate {
            id: "top".into(),
            connective: Connective::Not,
            args: vec![Arg::positive(ArgRef::BasicEvent("a".into()))],
        }],
        ccf_groups: vec![],
        root: "top".into(),
    };

    let report = run(model, ProbabilityMethod::Exact);
    assert_close(report.final_probability().unwrap(), 0.7, 1e-9);

    // MOCUS still runs for a negated leaf (as opposed to a negated gate): the
    // one cut set is the negated pseudo-event itself.
    let products = report.products.expect("negated leaf is still MOCUS-eligible");
    assert_eq!(products.len(), 1);
    assert_eq!(products.products[0].members, vec!["¬a".to_string()]);
}

#[test]
fn ccf_beta_factor_group_matches_the_closed_form_expansion() {
    let q = 0.01;
    let beta = 0.1;
    let model = Model {
        basic_events: vec![basic_event("a", q), basic_event("b", q), basic_event("c", q)],
        house_events: vec![],
        gates: vec![Gate {
            id: "top".into(),
            connective: Connective::And,
            args: vec![
                Arg::positive(ArgRef::BasicEvent("a".into())),
                Arg::positive(ArgRef::BasicEvent("b".into())),
                Arg::positive(ArgRef::BasicEvent("c".into())),
            ],
        }],
        ccf_groups: vec![CcfGroup {
            id: "abc".into(),
            members: vec!["a".into(), "b".into(), "c".into()],
            model: CcfModel::BetaFactor { beta },
        }],
        root: "top".into(),
    };

    let report = run(model, ProbabilityMethod::Exact);
    // P ~= q*beta + (q*(1-beta))^3: the shared-cause term plus three
    // independent failures all occurring together.
    let expected = q * beta + (q * (1.0 - beta)).powi(3);
    assert_close(report.final_probability().unwrap(), expected, 1e-9);
}

#[test]
fn sil_histogram_buckets_a_constant_pfd_into_a_single_band() {
    // Constant basic events don't vary with mission time, so every bucket's
    // instantaneous PFD is the same product: 0.01 * 0.05 = 5e-4, squarely in
    // the SIL3 band [1e-4, 1e-3).
    let model = two_input_gate(Connective::And, 0.01, 0.05);
    let report = run(model, ProbabilityMethod::Exact);

    let histogram = report.sil_histogram.expect("sil_buckets defaults to 10");
    assert_eq!(histogram.total(), 10);
    assert_eq!(histogram.sil3, 10);
    assert_eq!(histogram.sil1, 0);
    assert_eq!(histogram.unclassified, 0);

    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::SimplifiedPfh { pfh } if *pfh > 0.0)));
}

#[test]
fn zero_sil_buckets_disables_the_histogram_and_pfh_warning() {
    let model = two_input_gate(Connective::And, 0.01, 0.05);
    let settings = Settings {
        probability_method: ProbabilityMethod::Exact,
        sil_buckets: 0,
        ..Settings::default()
    };
    let mut engine = Engine::new(model, settings).unwrap();
    engine.preprocess().unwrap();
    engine.compile().unwrap();
    let report = engine.report().unwrap();

    assert!(report.sil_histogram.is_none());
    assert!(!report.warnings.iter().any(|w| matches!(w, Warning::SimplifiedPfh { .. })));
}

#[test]
fn cancelling_before_preprocess_stops_the_engine() {
    let model = two_input_gate(Connective::And, 0.1, 0.1);
    let mut engine = Engine::new(model, Settings::default()).unwrap();
    engine.cancellation_token().cancel();

    let result = engine.preprocess();
    assert!(matches!(result, Err(EngineError::Cancelled(_))));
}
