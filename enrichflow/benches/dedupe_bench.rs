//! Benchmarks for candidate deduplication.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use enrichflow::core::{CandidateContact, CompanySeed, ProviderId};
use enrichflow::stages::Deduplicator;

/// Three providers returning `per_provider` candidates each, half of them shared.
fn candidates(per_provider: usize) -> Vec<CandidateContact> {
    let seed = CompanySeed::new("Acme", "acme.com");
    ProviderId::LOOKUPS
        .iter()
        .flat_map(|provider| {
            let seed = &seed;
            (0..per_provider).map(move |n| {
                let local = if n % 2 == 0 {
                    format!("shared{n}")
                } else {
                    format!("{provider}{n}")
                };
                CandidateContact::new(*provider, seed)
                    .with_name(local.clone())
                    .with_email(format!("{local}@acme.com"))
            })
        })
        .collect()
}

fn dedupe_benchmark(c: &mut Criterion) {
    let deduplicator = Deduplicator::default();
    let mut group = c.benchmark_group("dedupe");
    for per_provider in [6, 50, 500] {
        let input = candidates(per_provider);
        group.bench_with_input(BenchmarkId::from_parameter(per_provider), &input, |b, input| {
            b.iter(|| deduplicator.dedupe(black_box(input.clone()), 5));
        });
    }
    group.finish();
}

criterion_group!(benches, dedupe_benchmark);
criterion_main!(benches);
