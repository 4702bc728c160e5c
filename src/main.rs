use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use minheap_bench::benchmark::{print_results, run_single, run_suite, BenchmarkConfig, BuildStrategy};
use minheap_bench::chart::{self, ChartConfig};
use minheap_bench::data_gen::{InputGenerator, InputPattern};
use minheap_bench::metrics::PerformanceTracker;
use minheap_bench::series::load_data;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "minheap-bench")]
#[command(about = "MinHeap benchmarks and before/after optimization charts")]
struct Cli {
    /// Defaults to `plot` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the recorded before/after benchmark chart
    Plot {
        /// Output PNG path (its directory must already exist)
        #[arg(short, long, default_value = chart::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Raster resolution
        #[arg(long, default_value_t = chart::DEFAULT_DPI)]
        dpi: u32,

        /// Do not open the image after saving it
        #[arg(long, default_value = "false")]
        no_show: bool,
    },

    /// Build and drain one heap, appending the measurement to a CSV file
    Bench {
        /// Number of elements
        #[arg(short, long, default_value = "100000")]
        size: usize,

        /// Results file (header is written if the file is new)
        #[arg(short, long, default_value = "results.csv")]
        csv: PathBuf,

        /// Random seed for input generation
        #[arg(long, default_value = "1234")]
        seed: u64,

        /// Heap construction: bulk or incremental
        #[arg(long, default_value = "bulk")]
        strategy: String,
    },

    /// Average repeated runs over several sizes, patterns and strategies
    Suite {
        /// Comma-separated input sizes
        #[arg(long, value_delimiter = ',', default_values_t = [100usize, 1_000, 10_000, 100_000])]
        sizes: Vec<usize>,

        /// Random seed for input generation
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Warmup runs discarded per measurement
        #[arg(long, default_value = "1")]
        warmup: usize,

        /// Measured runs averaged per result
        #[arg(long, default_value = "3")]
        iterations: usize,

        /// Input pattern used for the measured chart
        #[arg(long, default_value = "random")]
        pattern: String,

        /// Render incremental vs bulk timings to this PNG
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Write all results as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print per-measurement progress
        #[arg(short, long, default_value = "false")]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            plot(Path::new(chart::DEFAULT_OUTPUT), chart::DEFAULT_DPI, true)?;
        }
        Some(Commands::Plot {
            output,
            dpi,
            no_show,
        }) => {
            plot(&output, dpi, !no_show)?;
        }
        Some(Commands::Bench {
            size,
            csv,
            seed,
            strategy,
        }) => {
            bench(size, &csv, seed, parse_strategy(&strategy)?)?;
        }
        Some(Commands::Suite {
            sizes,
            seed,
            warmup,
            iterations,
            pattern,
            chart,
            json,
            verbose,
        }) => {
            let config = BenchmarkConfig {
                sizes,
                warmup_iterations: warmup,
                measurement_iterations: iterations,
                seed,
            };
            suite(
                &config,
                parse_pattern(&pattern)?,
                chart.as_deref(),
                json.as_deref(),
                verbose,
            )?;
        }
    }

    Ok(())
}

fn parse_strategy(name: &str) -> Result<BuildStrategy> {
    match BuildStrategy::all().iter().find(|s| s.name() == name) {
        Some(strategy) => Ok(*strategy),
        None => bail!("Unknown strategy '{}', expected bulk or incremental", name),
    }
}

fn parse_pattern(name: &str) -> Result<InputPattern> {
    match InputPattern::from_name(name) {
        Some(pattern) => Ok(pattern),
        None => {
            let known: Vec<&str> = InputPattern::all().iter().map(|p| p.name()).collect();
            bail!("Unknown pattern '{}', expected one of {}", name, known.join(", "))
        }
    }
}

fn plot(output: &Path, dpi: u32, show: bool) -> Result<()> {
    let config = ChartConfig {
        dpi,
        ..ChartConfig::default()
    };
    chart::generate_chart(&load_data(), &config, output)?;

    if show {
        if let Err(e) = chart::show(output) {
            eprintln!("Warning: could not display {}: {:#}", output.display(), e);
        }
    }
    Ok(())
}

fn bench(size: usize, csv: &Path, seed: u64, strategy: BuildStrategy) -> Result<()> {
    let values = InputGenerator::new(seed).generate(InputPattern::Random, size);

    let mut tracker = PerformanceTracker::new("MinHeap");
    run_single(values, strategy, &mut tracker);
    tracker
        .append_csv(csv, size)
        .context("Failed to record benchmark result")?;

    let counters = tracker.counters();
    println!(
        "MinHeap ({}): n={}, time(ns)={}, time(ms)={}, comparisons={}, swaps={}, array_accesses={}, CSV={}",
        strategy.name(),
        size,
        tracker.elapsed_nanos(),
        tracker.elapsed_millis(),
        counters.comparisons,
        counters.swaps,
        counters.array_accesses,
        csv.display()
    );
    Ok(())
}

fn suite(
    config: &BenchmarkConfig,
    pattern: InputPattern,
    chart_path: Option<&Path>,
    json_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    println!("\nBenchmark Configuration:");
    println!("  Sizes: {:?}", config.sizes);
    println!("  Warmup iterations: {}", config.warmup_iterations);
    println!("  Measurement iterations: {}", config.measurement_iterations);
    println!("  Random seed: {}", config.seed);

    let results = run_suite(config, verbose)?;
    print_results(&results);

    if let Some(path) = json_path {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        println!("Generated: {}", path.display());
    }

    if let Some(path) = chart_path {
        let chart_config = ChartConfig {
            title: format!("MinHeap Benchmark: Incremental vs Bulk Build ({})", pattern.name()),
            ..ChartConfig::default()
        };
        chart::generate_chart(&results.comparison(pattern), &chart_config, path)?;
    }

    println!("\nBenchmark complete!");
    Ok(())
}
