use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use obesity_risk::dataset::generate_survey;
use obesity_risk::model::{GradientBoostingClassifier, RandomForestClassifier};
use obesity_risk::{predict_from_input, train_model, EstimatorConfig, TrainOptions, TrainedModel};

/// Train a model once for prediction benchmarks
fn trained(estimator: EstimatorConfig) -> TrainedModel {
    let dataset = generate_survey(2100, 42);
    train_model(&dataset, &estimator, &TrainOptions::new())
        .expect("Failed to train model")
        .model
}

fn estimators() -> Vec<(&'static str, EstimatorConfig)> {
    vec![
        ("random_forest", RandomForestClassifier::new().into()),
        ("xgb_boosting", GradientBoostingClassifier::new().into()),
    ]
}

fn bench_predict_single(c: &mut Criterion) {
    let input = generate_survey(1, 7).records()[0].to_input();
    for (name, estimator) in estimators() {
        let model = trained(estimator);
        c.bench_function(&format!("predict_single/{}", name), |b| {
            b.iter(|| black_box(predict_from_input(&model, black_box(&input))))
        });
    }
}

fn bench_predict_batch(c: &mut Criterion) {
    for (name, estimator) in estimators() {
        let model = trained(estimator);
        for batch_size in [10, 100, 1000] {
            let batch = generate_survey(batch_size, 7);
            c.bench_with_input(
                BenchmarkId::new(format!("predict_batch/{}", name), batch_size),
                &batch,
                |b, batch| b.iter(|| black_box(model.predict_batch(black_box(batch.records())))),
            );
        }
    }
}

criterion_group!(benches, bench_predict_single, bench_predict_batch);
criterion_main!(benches);
