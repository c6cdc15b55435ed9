use criterion::{criterion_group, criterion_main, Criterion, black_box};
use resqual::model::{
    AtomicHierarchy, HierarchyBuilder, ModelId, ResidueIndex, ResidueSite,
};
use resqual::report::build_store;
use resqual::theme::{color_for, label_for};
use resqual::picking::PickTarget;
use std::fmt::Write;

const CHAINS: [&str; 4] = ["A", "B", "C", "D"];

fn model(residues_per_chain: i32) -> AtomicHierarchy {
    let mut builder = HierarchyBuilder::new("1abc", 1);
    for (entity, chain) in CHAINS.iter().enumerate() {
        let entity_id = (entity + 1).to_string();
        for seq in 1..=residues_per_chain {
            let _ = builder.push(&ResidueSite {
                entity_id: &entity_id,
                label_asym_id: chain,
                auth_asym_id: chain,
                auth_seq_id: seq,
                ins_code: "",
                comp_id: "ALA",
            });
        }
    }
    builder.build()
}

fn score_payload(residues_per_chain: i32) -> String {
    let mut body = String::from("{\"emd-1\": [");
    for chain in CHAINS {
        for seq in 1..=residues_per_chain {
            let score = f64::from(seq % 100) / 100.0;
            let _ = write!(
                body,
                "{{\"type\": \"qscore\", \"chain\": \"{chain}\", \"position\": {seq}, \
                 \"score\": {score}, \"color\": \"#7ABABA\"}},"
            );
        }
    }
    let _ = body.pop();
    body.push_str("]}");
    body
}

fn build_store_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_store");

    for count in [100, 500, 2500].iter() {
        let model = model(*count);
        let body = score_payload(*count);
        group.bench_function(format!("{}_residues", count * 4), |b| {
            b.iter(|| black_box(build_store(&model, black_box(&body), None)))
        });
    }
    group.finish();
}

fn derivation_benchmark(c: &mut Criterion) {
    let model = model(500);
    let store = build_store(&model, &score_payload(500), None).ok();

    c.bench_function("color_for_all_residues", |b| {
        b.iter(|| {
            for i in 0..2000 {
                let _ = black_box(color_for(store.as_ref(), ResidueIndex(i)));
            }
        })
    });

    let target = PickTarget::Residue { model: ModelId(1), residue: ResidueIndex(42) };
    c.bench_function("label_for", |b| {
        b.iter(|| black_box(label_for(black_box(&target), store.as_ref(), true)))
    });
}

criterion_group!(benches, build_store_benchmark, derivation_benchmark);
criterion_main!(benches);
