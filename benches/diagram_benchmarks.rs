//! Benchmark suite for the BDD/ZBDD/MOCUS engines.
//!
//! Synthetic fault trees stand in for a file corpus: a chain of k-out-of-n
//! gates over basic events, scaled across a few sizes to show how diagram
//! construction and cut-set extraction scale with tree width.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scram_core::cancellation::Checkpoint;
use scram_core::mocus;
use scram_core::model::{Arg, ArgRef, BasicEvent, Connective, Gate, Model, ProbabilityExpression};
use scram_core::pdag::Pdag;
use scram_core::{bdd, probability};
use rustc_hash::FxHashMap;

/// A balanced tree of AND gates over `width` basic events per level,
/// `depth` levels deep: `width.pow(depth)` basic events total.
fn synthetic_model(width: usize, depth: usize) -> Model {
    let mut basic_events = Vec::new();
    let mut gates = Vec::new();
    let mut next_leaf = 0usize;

    fn build_level(
        width: usize,
        depth: usize,
        next_leaf: &mut usize,
        basic_events: &mut Vec<BasicEvent>,
        gates: &mut Vec<Gate>,
    ) -> Arg {
        if depth == 0 {
            let id = format!("e{next_leaf}");
            *next_leaf += 1;
            basic_events.push(BasicEvent {
                id: id.clone(),
                probability: ProbabilityExpression::Constant(0.01),
            });
            return Arg::positive(ArgRef::BasicEvent(id));
        }
        let gate_id = format!("g{}_{}_{}", depth, next_leaf, width);
        let args: Vec<Arg> = (0..width)
            .map(|_| build_level(width, depth - 1, next_leaf, basic_events, gates))
            .collect();
        gates.push(Gate {
            id: gate_id.clone(),
            connective: if depth % 2 == 0 { Connective::And } else { Connective::Or },
            args,
        });
        Arg::positive(ArgRef::Gate(gate_id))
    }

    let root_arg = build_level(width, depth, &mut next_leaf, &mut basic_events, &mut gates);
    let root = match &root_arg.reference {
        ArgRef::Gate(id) => id.clone(),
        _ => unreachable!("top level always produces a gate for depth > 0"),
    };

    Model {
        basic_events,
        house_events: Vec::new(),
        gates,
        ccf_groups: Vec::new(),
        root,
    }
}

fn probabilities(model: &Model) -> FxHashMap<String, f64> {
    model
        .basic_events
        .iter()
        .map(|be| (be.id.clone(), be.probability.evaluate(0.0)))
        .collect()
}

fn bench_bdd_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("bdd_compile");
    for (width, depth) in [(3, 2), (4, 3), (3, 4)] {
        let model = synthetic_model(width, depth);
        let pdag = Pdag::from_model(&model).unwrap();
        let n = model.basic_events.len();
        let label = format!("{width}x{depth}/{n}_events");

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("compile", &label), &pdag, |b, pdag| {
            b.iter(|| {
                let order = bdd::depth_first_order(black_box(pdag));
                let (mgr, root) = bdd::compile(pdag, order);
                black_box((mgr, root));
            });
        });
    }
    group.finish();
}

fn bench_exact_probability(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_probability");
    for (width, depth) in [(3, 2), (4, 3), (3, 4)] {
        let model = synthetic_model(width, depth);
        let pdag = Pdag::from_model(&model).unwrap();
        let order = bdd::depth_first_order(&pdag);
        let (mgr, root) = bdd::compile(&pdag, order);
        let probs = probabilities(&model);
        let n = model.basic_events.len();
        let label = format!("{width}x{depth}/{n}_events");

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            BenchmarkId::new("probability", &label),
            &(mgr, root, probs),
            |b, (mgr, root, probs)| {
                b.iter(|| {
                    let p = probability::calculate(
                        probability::ProbabilityMethod::Exact,
                        Some((mgr, *root)),
                        None,
                        black_box(probs),
                    )
                    .unwrap();
                    black_box(p);
                });
            },
        );
    }
    group.finish();
}

fn bench_mocus_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mocus_build");
    for (width, depth) in [(3, 2), (4, 3), (3, 4)] {
        let model = synthetic_model(width, depth);
        let pdag = Pdag::from_model(&model).unwrap();
        let n = model.basic_events.len();
        let label = format!("{width}x{depth}/{n}_events");

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("build", &label), &pdag, |b, pdag| {
            b.iter(|| {
                let order = bdd::depth_first_order(black_box(pdag));
                let result = mocus::build(pdag, order, &Checkpoint::none());
                black_box(result.ok());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_bdd_compile,
    bench_exact_probability,
    bench_mocus_build
);
criterion_main!(benches);
