use criterion::{black_box, criterion_group, criterion_main, Criterion};
use llama_bind::{ParameterStore, PredictConfig};

fn bench_apply_line(c: &mut Criterion) {
    let store = ParameterStore::default();
    c.bench_function("apply_line edit", |b| {
        b.iter(|| store.apply_line(black_box("seed=42 temp=0.5 top_k=40 top_p=0.9")))
    });
    c.bench_function("apply_line prose", |b| {
        b.iter(|| store.apply_line(black_box("Tell me a story about a frog")))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let store = ParameterStore::default();
    let base = PredictConfig::default();
    c.bench_function("resolve", |b| b.iter(|| store.resolve(black_box(&base))));
}

criterion_group!(benches, bench_apply_line, bench_resolve);
criterion_main!(benches);
