use std::time::{Duration, Instant};

/// Accumulating stopwatch.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Instant>,
    total: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Stop the timer and add the elapsed time to the total.
    pub fn stop(&mut self) -> Duration {
        match self.start.take() {
            Some(start) => {
                let elapsed = start.elapsed();
                self.total += elapsed;
                elapsed
            }
            None => Duration::ZERO,
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Latency summary in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyStats {
    pub runs: usize,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    pub min_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
}

impl LatencyStats {
    /// Summarize per-run times. Empty input gives all zeros.
    pub fn from_times(mut times: Vec<f64>) -> Self {
        let n = times.len();
        if n == 0 {
            return Self {
                runs: 0,
                mean_ms: 0.0,
                std_dev_ms: 0.0,
                min_ms: 0.0,
                median_ms: 0.0,
                p95_ms: 0.0,
                max_ms: 0.0,
            };
        }
        times.sort_by(f64::total_cmp);

        let mean = times.iter().sum::<f64>() / n as f64;
        let variance = times.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (times[n / 2 - 1] + times[n / 2]) / 2.0
        } else {
            times[n / 2]
        };
        let p95 = times[((n as f64 * 0.95) as usize).min(n - 1)];

        Self {
            runs: n,
            mean_ms: mean,
            std_dev_ms: variance.sqrt(),
            min_ms: times[0],
            median_ms: median,
            p95_ms: p95,
            max_ms: times[n - 1],
        }
    }
}

/// Time `iterations` calls of `f` after `warmup` untimed calls.
pub fn measure_latency<F, R>(warmup: usize, iterations: usize, mut f: F) -> LatencyStats
where
    F: FnMut() -> R,
{
    for _ in 0..warmup {
        std::hint::black_box(f());
    }
    let times = (0..iterations)
        .map(|_| {
            let start = Instant::now();
            std::hint::black_box(f());
            start.elapsed().as_secs_f64() * 1000.0
        })
        .collect();
    LatencyStats::from_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_accumulates() {
        let mut timer = Timer::new();
        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        let first = timer.stop();
        assert!(first.as_millis() >= 5);
        assert_eq!(timer.stop(), Duration::ZERO);
        assert!(timer.total_ms() >= 5.0);
    }

    #[test]
    fn test_latency_stats() {
        let stats = LatencyStats::from_times(vec![5.0, 1.0, 3.0, 2.0, 4.0]);
        assert_eq!(stats.runs, 5);
        assert!((stats.mean_ms - 3.0).abs() < 1e-9);
        assert!((stats.median_ms - 3.0).abs() < 1e-9);
        assert_eq!(stats.min_ms, 1.0);
        assert_eq!(stats.max_ms, 5.0);
        assert_eq!(stats.p95_ms, 5.0);
    }

    #[test]
    fn test_latency_stats_even_and_empty() {
        let stats = LatencyStats::from_times(vec![1.0, 2.0, 3.0, 4.0]);
        assert!((stats.median_ms - 2.5).abs() < 1e-9);
        assert_eq!(LatencyStats::from_times(Vec::new()).runs, 0);
    }

    #[test]
    fn test_measure_latency_runs() {
        let mut calls = 0;
        let stats = measure_latency(2, 10, || calls += 1);
        assert_eq!(calls, 12);
        assert_eq!(stats.runs, 10);
    }
}
