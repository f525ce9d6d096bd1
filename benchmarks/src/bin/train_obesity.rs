//! Train an obesity-level model from a JSON config.
//!
//! Prints the held-out metrics as JSON on stdout and, when the config sets
//! `persist`, writes the artifact to `<model_dir>/<model_name>.bin`.

use benchmarks::{load_or_generate, Timer, DEFAULT_SYNTHETIC_ROWS};
use obesity_risk::model::Classifier;
use obesity_risk::trainer::cross_validate;
use obesity_risk::{train_model, TrainingConfig};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut config_path: Option<PathBuf> = None;
    let mut dataset_path: Option<PathBuf> = None;
    let mut rows = DEFAULT_SYNTHETIC_ROWS;

    while !args.is_empty() {
        let a = args.remove(0);
        let mut value = || -> Result<String, String> {
            if args.is_empty() {
                return Err(format!("{} requires a value", a));
            }
            Ok(args.remove(0))
        };
        match a.as_str() {
            "--config" => config_path = Some(value()?.into()),
            "--data" => dataset_path = Some(value()?.into()),
            "--rows" => rows = value()?.parse()?,
            "--help" | "-h" => {
                eprintln!(
                    "Usage: train_obesity [--config FILE] [--data CSV] [--rows N]\n\
                     \n\
                     --config FILE  Training config JSON (defaults otherwise)\n\
                     --data CSV     Labeled survey CSV (overrides the config)\n\
                     --rows N       Synthetic rows when no CSV is given (default: {})\n",
                    DEFAULT_SYNTHETIC_ROWS
                );
                return Ok(());
            }
            other => return Err(format!("unknown argument '{}'", other).into()),
        }
    }

    let config = match &config_path {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };
    let dataset_path = dataset_path.or_else(|| config.dataset_path.clone());
    let dataset = load_or_generate(dataset_path.as_deref(), rows, config.seed)?;
    eprintln!(
        "Dataset: {} rows, estimator {}, scheme {}",
        dataset.len(),
        config.estimator.name(),
        config.scheme
    );

    if let Some(cv) = config.to_cv_options() {
        let result = cross_validate(&dataset, &config.estimator, &cv)?;
        eprintln!("Cross-validation ({} folds):\n{}", cv.n_folds, result);
    }

    let mut timer = Timer::new();
    timer.start();
    let outcome = train_model(&dataset, &config.estimator, &config.to_train_options())?;
    timer.stop();

    eprintln!("{}", outcome.metrics.report);
    eprintln!("Training time: {:.1} ms", timer.total_ms());
    if let Some(path) = &outcome.artifact_path {
        eprintln!("Model saved to {}", path.display());
    }
    println!("{}", outcome.metrics.to_json()?);
    Ok(())
}
