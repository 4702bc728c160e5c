use crate::data_gen::{InputGenerator, InputPattern};
use crate::heap::{MinHeap, OpCounters};
use crate::metrics::PerformanceTracker;
use crate::series::{Marker, Series, AFTER_LABEL, BEFORE_LABEL};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// How the heap is constructed before it is drained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStrategy {
    /// One `insert` per value (the unoptimized path)
    Incremental,
    /// O(n) heapify of the whole array
    Bulk,
}

impl BuildStrategy {
    pub fn all() -> &'static [BuildStrategy] {
        &[BuildStrategy::Incremental, BuildStrategy::Bulk]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuildStrategy::Incremental => "incremental",
            BuildStrategy::Bulk => "bulk",
        }
    }
}

/// Build a heap from `values` and extract every element, timing both phases
/// together. Counters and elapsed time land in `tracker`.
pub fn run_single(
    values: Vec<i32>,
    strategy: BuildStrategy,
    tracker: &mut PerformanceTracker,
) -> OpCounters {
    tracker.start_timer();
    let mut heap = match strategy {
        BuildStrategy::Incremental => MinHeap::from_incremental(values),
        BuildStrategy::Bulk => MinHeap::from_vec(values),
    };
    while heap.extract_min().is_some() {}
    tracker.stop_timer();

    let counters = heap.counters();
    tracker.absorb(counters);
    counters
}

/// Configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Input sizes to measure, in order
    pub sizes: Vec<usize>,
    /// Runs discarded before measuring
    pub warmup_iterations: usize,
    /// Runs averaged per result
    pub measurement_iterations: usize,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sizes: vec![100, 1_000, 10_000, 100_000],
            warmup_iterations: 1,
            measurement_iterations: 3,
            seed: 42,
        }
    }
}

/// Measurements for one (size, pattern, strategy) cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub input_size: usize,
    pub pattern: InputPattern,
    pub strategy: BuildStrategy,
    /// One entry per measurement iteration
    pub times_ns: Vec<u64>,
    /// Counters from the last measured run (identical across runs)
    pub counters: OpCounters,
}

impl SuiteResult {
    pub fn mean(&self) -> Duration {
        if self.times_ns.is_empty() {
            return Duration::ZERO;
        }
        let sum: u64 = self.times_ns.iter().sum();
        Duration::from_nanos(sum / self.times_ns.len() as u64)
    }

    pub fn min(&self) -> Duration {
        self.times_ns
            .iter()
            .min()
            .map(|&ns| Duration::from_nanos(ns))
            .unwrap_or(Duration::ZERO)
    }

    pub fn max(&self) -> Duration {
        self.times_ns
            .iter()
            .max()
            .map(|&ns| Duration::from_nanos(ns))
            .unwrap_or(Duration::ZERO)
    }
}

/// Run every size × pattern × strategy combination
pub fn run_suite(config: &BenchmarkConfig, verbose: bool) -> Result<SuiteResults> {
    if config.sizes.is_empty() {
        bail!("At least one input size is required");
    }
    if config.measurement_iterations == 0 {
        bail!("Measurement iterations must be at least 1");
    }

    let generator = InputGenerator::new(config.seed);
    let mut results = Vec::new();

    for &size in &config.sizes {
        if verbose {
            print!("  [n={}] Generating inputs... ", size);
            let _ = io::stdout().flush();
        }
        let gen_start = Instant::now();
        let inputs = generator.generate_all(size);
        if verbose {
            println!("done ({:.2?})", gen_start.elapsed());
        }

        for (pattern, values) in &inputs {
            for &strategy in BuildStrategy::all() {
                let mut tracker = PerformanceTracker::new("MinHeap");

                for _ in 0..config.warmup_iterations {
                    run_single(values.clone(), strategy, &mut tracker);
                }

                let mut times_ns = Vec::with_capacity(config.measurement_iterations);
                let mut counters = OpCounters::default();
                for _ in 0..config.measurement_iterations {
                    tracker.reset();
                    counters = run_single(values.clone(), strategy, &mut tracker);
                    times_ns.push(tracker.elapsed_nanos());
                }

                let result = SuiteResult {
                    input_size: size,
                    pattern: *pattern,
                    strategy,
                    times_ns,
                    counters,
                };

                if verbose {
                    println!(
                        "    {:<14} {:<12} mean {:>12.2?}  (min {:.2?}, max {:.2?})",
                        pattern.name(),
                        strategy.name(),
                        result.mean(),
                        result.min(),
                        result.max()
                    );
                }

                results.push(result);
            }
        }
    }

    Ok(SuiteResults::new(results))
}

/// All results of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    pub results: Vec<SuiteResult>,
}

impl SuiteResults {
    pub fn new(results: Vec<SuiteResult>) -> Self {
        Self { results }
    }

    /// Results grouped by input pattern
    pub fn by_pattern(&self) -> HashMap<InputPattern, Vec<&SuiteResult>> {
        let mut map: HashMap<InputPattern, Vec<&SuiteResult>> = HashMap::new();
        for result in &self.results {
            map.entry(result.pattern).or_default().push(result);
        }
        map
    }

    /// Mean times for one pattern and strategy, ordered by input size
    pub fn series_for(
        &self,
        pattern: InputPattern,
        strategy: BuildStrategy,
        label: &str,
        marker: Marker,
    ) -> Series {
        let mut cells: Vec<&SuiteResult> = self
            .results
            .iter()
            .filter(|r| r.pattern == pattern && r.strategy == strategy)
            .collect();
        cells.sort_by_key(|r| r.input_size);

        let sizes: Vec<u64> = cells.iter().map(|r| r.input_size as u64).collect();
        let times: Vec<f64> = cells.iter().map(|r| r.mean().as_nanos() as f64).collect();
        Series::from_pairs(label, marker, &sizes, &times)
    }

    /// Incremental build as "before", bulk build as "after"
    pub fn comparison(&self, pattern: InputPattern) -> [Series; 2] {
        [
            self.series_for(pattern, BuildStrategy::Incremental, BEFORE_LABEL, Marker::Circle),
            self.series_for(pattern, BuildStrategy::Bulk, AFTER_LABEL, Marker::Square),
        ]
    }
}

/// Print suite results to console
pub fn print_results(results: &SuiteResults) {
    println!("\n{:=<80}", "");
    println!("MinHeap Benchmark Results");
    println!("{:=<80}\n", "");

    let by_pattern = results.by_pattern();
    for &pattern in InputPattern::all() {
        let Some(cells) = by_pattern.get(&pattern) else {
            continue;
        };

        println!("Pattern: {}", pattern.name());
        println!("{:-<78}", "");
        println!(
            "  {:>8} {:<12} {:>12} {:>12} {:>12} {:>14}",
            "n", "Strategy", "Mean", "Min", "Compares", "Swaps"
        );

        for result in cells {
            println!(
                "  {:>8} {:<12} {:>12.2?} {:>12.2?} {:>12} {:>14}",
                result.input_size,
                result.strategy.name(),
                result.mean(),
                result.min(),
                result.counters.comparisons,
                result.counters.swaps
            );
        }
        println!();
    }
}
