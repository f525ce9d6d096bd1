//! End-to-end obesity-level pipeline on a synthetic survey.
//!
//! Walks through what a deployment does:
//! - compare estimators with 5-fold cross-validation
//! - train the winner on a stratified 70/30 split and persist it
//! - load the artifact and serve predictions through a session
//!
//! Run with `RUST_LOG=info` to see the training log.

use obesity_risk::dataset::{generate_survey, InputMap, RawValue};
use obesity_risk::metrics::Metric;
use obesity_risk::model::{Classifier, EstimatorConfig, MaxFeatures};
use obesity_risk::trainer::search::{boosting_grid, forest_grid};
use obesity_risk::trainer::{grid_search, CrossValidationOptions};
use obesity_risk::{discover_model, load_model, train_model, PredictionSession, TrainOptions};
use std::error::Error;
use std::sync::Arc;

fn patient() -> InputMap {
    let answers: [(&str, RawValue); 16] = [
        ("Gender", "Male".into()),
        ("Age", 34.into()),
        ("Height", 1.78.into()),
        ("Weight", 112.into()),
        ("family_history", "yes".into()),
        ("FAVC", "yes".into()),
        ("FCVC", 2.into()),
        ("NCP", 3.into()),
        ("CAEC", "Frequently".into()),
        ("SMOKE", "no".into()),
        ("CH2O", 1.into()),
        ("SCC", "no".into()),
        ("FAF", 0.into()),
        ("TUE", 2.into()),
        ("CALC", "Sometimes".into()),
        ("MTRANS", "Automobile".into()),
    ];
    answers
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== Obesity Risk Pipeline Example ===\n");

    let dataset = generate_survey(700, 42);
    println!(
        "Dataset: {} samples, class counts {:?}\n",
        dataset.len(),
        dataset.class_counts()
    );

    // 1. Model selection
    println!("--- Cross-validated search ---\n");
    let mut candidates: Vec<EstimatorConfig> =
        forest_grid(&[50], &[None, Some(8)], &[MaxFeatures::Sqrt], 42);
    candidates.extend(boosting_grid(&[50], &[3, 6], &[0.3], 42));

    let search = grid_search(
        &dataset,
        &candidates,
        Metric::F1Weighted,
        &CrossValidationOptions::new(),
    )?;
    for (rank, candidate) in search.ranking.iter().enumerate() {
        println!(
            "{}. {:<14} f1_weighted {:.4} ± {:.4}",
            rank + 1,
            candidate.config.name(),
            candidate.mean,
            candidate.std
        );
    }

    // 2. Train and persist the best candidate
    println!("\n--- Training ---\n");
    let model_dir = std::env::temp_dir().join("obesity_risk_example_models");
    let options = TrainOptions::new()
        .persist(true)
        .model_dir(&model_dir)
        .model_name(format!("{}_model", search.best.name()));
    let outcome = train_model(&dataset, &search.best, &options)?;
    println!("{}", outcome.metrics.report);
    if let Some(path) = &outcome.artifact_path {
        println!("Saved to {}", path.display());
    }

    // 3. Serve
    println!("\n--- Inference ---\n");
    let model = Arc::new(load_model(discover_model(&model_dir)?)?);
    let mut session = PredictionSession::new(Arc::clone(&model));
    let result = session.predict(&patient(), "Paciente", "demo")?;
    println!("Predicted level: {}", result.label.display_name());
    println!("Confidence: {:.1}%", result.confidence() * 100.0);
    println!(
        "Probability of obesity: {:.1}%",
        result.obesity_probability() * 100.0
    );
    for warning in &result.warnings {
        println!("warning: {}", warning);
    }

    println!("\nHistory:");
    session.export_csv(std::io::stdout())?;

    std::fs::remove_dir_all(&model_dir).ok();
    Ok(())
}
