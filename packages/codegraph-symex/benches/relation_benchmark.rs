//! Performance benchmarks for the relation algebra and method exploration
//!
//! - resolve_state over equality chains of growing length
//! - Full session analysis of a branching method

use codegraph_symex::shared::models::{
    CfgBuilder, Instruction, Literal, MethodSymbol, SemanticModel, Symbol, SymbolKind, Terminator,
};
use codegraph_symex::{
    AnalysisSession, BinaryRelation, CheckerDispatcher, ConstraintManager, EngineConfig,
    RelationKind, RelationLimits,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ============================================================================
// Relation Deduction
// ============================================================================

fn bench_equality_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_state_chain");

    for length in [4usize, 16, 64] {
        let mut manager = ConstraintManager::default();
        let values: Vec<_> = (0..length).map(|_| manager.create_symbolic_value()).collect();
        let known: Vec<BinaryRelation> = values
            .windows(2)
            .map(|pair| BinaryRelation::new(RelationKind::Equal, pair[0].clone(), pair[1].clone()))
            .collect();
        let tested = BinaryRelation::new(
            RelationKind::NotEqual,
            values[0].clone(),
            values[length - 1].clone(),
        );

        group.bench_with_input(BenchmarkId::from_parameter(length), &known, |b, known| {
            b.iter(|| black_box(tested.resolve_state(known, RelationLimits::default())));
        });
    }

    group.finish();
}

// ============================================================================
// Exploration
// ============================================================================

/// `boolean method(Object a, boolean b) { if (a == null) return true; if (b) return false; return b; }`
fn branching_model() -> SemanticModel {
    let mut model = SemanticModel::new();
    let mut method = MethodSymbol::new("com.acme.Bench#method(Ljava/lang/Object;Z)Z")
        .expect("valid signature");
    let a = model.add_symbol(Symbol::new("a", SymbolKind::Parameter, "java.lang.Object"));
    let b = model.add_symbol(Symbol::new("b", SymbolKind::Parameter, "boolean"));
    method.parameters = vec![a, b];

    let mut cfg = CfgBuilder::new();
    let test_a = cfg.block();
    let return_true = cfg.block();
    let test_b = cfg.block();
    let return_false = cfg.block();
    let return_b = cfg.block();

    cfg.push(test_a, Instruction::Load(a))
        .push(test_a, Instruction::Literal(Literal::Null))
        .push(test_a, Instruction::Compare(RelationKind::Equal))
        .terminate(
            test_a,
            Terminator::Branch {
                when_true: return_true,
                when_false: test_b,
            },
        );
    cfg.push(return_true, Instruction::Literal(Literal::Bool(true)))
        .terminate(return_true, Terminator::Return);
    cfg.push(test_b, Instruction::Load(b)).terminate(
        test_b,
        Terminator::Branch {
            when_true: return_false,
            when_false: return_b,
        },
    );
    cfg.push(return_false, Instruction::Literal(Literal::Bool(false)))
        .terminate(return_false, Terminator::Return);
    cfg.push(return_b, Instruction::Load(b))
        .terminate(return_b, Terminator::Return);

    method.body = Some(cfg.build(test_a));
    model.add_method(method);
    model
}

fn bench_session_analyze(c: &mut Criterion) {
    let model = branching_model();

    c.bench_function("session_analyze", |b| {
        b.iter(|| {
            let mut session =
                AnalysisSession::with_dispatcher(EngineConfig::default(), CheckerDispatcher::empty())
                    .expect("default config is valid");
            black_box(session.analyze(&model))
        });
    });
}

criterion_group!(benches, bench_equality_chain, bench_session_analyze);
criterion_main!(benches);
