// Entry point listing the tooling binaries and benches.

fn main() {
    println!("obesity-risk benchmark and tooling suite");
    println!();
    println!("Binaries:");
    println!("  cargo run --release -p benchmarks --bin train_obesity -- [--config FILE] [--data CSV]");
    println!("  cargo run --release -p benchmarks --bin predict_obesity -- [--model FILE] <input.json>");
    println!();
    println!("Benchmarks:");
    println!("  cargo bench -p benchmarks --bench <benchmark_name>");
    println!();
    println!("Available benchmarks:");
    println!("  - encode: Feature encoding of single records and batches");
    println!("  - predict: Prediction latency and batch throughput per estimator");
    println!("  - train: Training time per estimator and dataset size");
}
