//! Predict the obesity level of one survey response.
//!
//! The input is a JSON object keyed by the dataset column names. The model is
//! either given with `--model` or discovered in `--model-dir`.

use benchmarks::{measure_latency, read_input_json};
use obesity_risk::{discover_model, load_model, predict_from_input};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut model_path: Option<PathBuf> = None;
    let mut model_dir = PathBuf::from("models");
    let mut input_path: Option<PathBuf> = None;
    let mut bench_runs = 0usize;

    while !args.is_empty() {
        let a = args.remove(0);
        let mut value = || -> Result<String, String> {
            if args.is_empty() {
                return Err(format!("{} requires a value", a));
            }
            Ok(args.remove(0))
        };
        match a.as_str() {
            "--model" => model_path = Some(value()?.into()),
            "--model-dir" => model_dir = value()?.into(),
            "--bench" => bench_runs = value()?.parse()?,
            "--help" | "-h" => {
                eprintln!(
                    "Usage: predict_obesity [--model FILE | --model-dir DIR] [--bench N] <input.json>\n\
                     \n\
                     --model FILE     Model artifact\n\
                     --model-dir DIR  Directory to pick an artifact from (default: models)\n\
                     --bench N        Also time N predictions\n"
                );
                return Ok(());
            }
            _ => input_path = Some(PathBuf::from(&a)),
        }
    }

    let Some(input_path) = input_path else {
        eprintln!("ERROR: Provide an input JSON file. Use --help for usage.");
        std::process::exit(2);
    };

    let model_path = match model_path {
        Some(path) => path,
        None => discover_model(&model_dir)?,
    };
    let model = load_model(&model_path)?;
    let input = read_input_json(&input_path)?;

    let result = predict_from_input(&model, &input)?;
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    eprintln!(
        "{}: {:.1}% (obesity probability {:.1}%)",
        result.label.display_name(),
        result.confidence() * 100.0,
        result.obesity_probability() * 100.0
    );

    if bench_runs > 0 {
        let stats = measure_latency(10, bench_runs, || predict_from_input(&model, &input));
        eprintln!(
            "Latency over {} runs: mean {:.3} ms, p95 {:.3} ms, max {:.3} ms",
            stats.runs, stats.mean_ms, stats.p95_ms, stats.max_ms
        );
    }
    Ok(())
}
