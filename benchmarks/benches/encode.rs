use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use obesity_risk::dataset::generate_survey;
use obesity_risk::{EncodingScheme, FeatureEncoder};

fn bench_encode_single(c: &mut Criterion) {
    let dataset = generate_survey(1, 42);
    let record = &dataset.records()[0];
    let input = record.to_input();

    for scheme in [EncodingScheme::Full, EncodingScheme::Screening] {
        let encoder = FeatureEncoder::new(scheme);
        c.bench_function(&format!("encode_record/{}", scheme), |b| {
            b.iter(|| black_box(encoder.encode(black_box(record))))
        });
        c.bench_function(&format!("encode_input/{}", scheme), |b| {
            b.iter(|| black_box(encoder.encode_input(black_box(&input))))
        });
    }
}

fn bench_encode_batch(c: &mut Criterion) {
    let encoder = FeatureEncoder::new(EncodingScheme::Full);
    for n in [100, 1000, 10000] {
        let dataset = generate_survey(n, 42);
        c.bench_with_input(BenchmarkId::new("encode_batch", n), &dataset, |b, ds| {
            b.iter(|| black_box(encoder.encode_batch(black_box(ds.records()))))
        });
    }
}

criterion_group!(benches, bench_encode_single, bench_encode_batch);
criterion_main!(benches);
