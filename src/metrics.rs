use crate::heap::OpCounters;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

/// One CSV row of benchmark output.
///
/// Field order is the column order of the results file:
/// `algorithm,input_size,comparisons,swaps,array_accesses,time_ns,time_ms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub algorithm: String,
    pub input_size: usize,
    pub comparisons: u64,
    pub swaps: u64,
    pub array_accesses: u64,
    pub time_ns: u64,
    pub time_ms: u64,
}

/// Accumulates operation counts and wall-clock time for one algorithm
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    algorithm_name: String,
    counters: OpCounters,
    started: Option<Instant>,
    elapsed: Duration,
}

impl PerformanceTracker {
    pub fn new(algorithm_name: impl Into<String>) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            counters: OpCounters::default(),
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    pub fn add_comparisons(&mut self, n: u64) {
        self.counters.comparisons += n;
    }

    pub fn add_swaps(&mut self, n: u64) {
        self.counters.swaps += n;
    }

    pub fn add_array_accesses(&mut self, n: u64) {
        self.counters.array_accesses += n;
    }

    /// Fold a heap's counters into this tracker
    pub fn absorb(&mut self, counters: OpCounters) {
        self.counters += counters;
    }

    pub fn counters(&self) -> OpCounters {
        self.counters
    }

    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop the running timer. Does nothing if the timer was never started.
    pub fn stop_timer(&mut self) {
        if let Some(start) = self.started.take() {
            self.elapsed = start.elapsed();
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_nanos(&self) -> u64 {
        self.elapsed.as_nanos() as u64
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn reset(&mut self) {
        self.counters = OpCounters::default();
        self.started = None;
        self.elapsed = Duration::ZERO;
    }

    pub fn record(&self, input_size: usize) -> BenchmarkRecord {
        BenchmarkRecord {
            algorithm: self.algorithm_name.clone(),
            input_size,
            comparisons: self.counters.comparisons,
            swaps: self.counters.swaps,
            array_accesses: self.counters.array_accesses,
            time_ns: self.elapsed_nanos(),
            time_ms: self.elapsed_millis(),
        }
    }

    /// Append this run to a CSV file, writing the header if the file is new.
    pub fn append_csv(&self, path: &Path, input_size: usize) -> Result<()> {
        append_record(path, &self.record(input_size))
    }
}

/// Append a single record to `path`. The header is written only when the file
/// does not exist yet (or is empty).
pub fn append_record(path: &Path, record: &BenchmarkRecord) -> Result<()> {
    let needs_header = std::fs::metadata(path)
        .map(|m| m.len() == 0)
        .unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open results file {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(record)
        .with_context(|| format!("Failed to write record to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Read every record back from a results file
pub fn read_records(path: &Path) -> Result<Vec<BenchmarkRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open results file {}", path.display()))?;
    let mut records = Vec::new();
    for row in reader.deserialize::<BenchmarkRecord>() {
        records.push(row.with_context(|| format!("Malformed row in {}", path.display()))?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counters_accumulate() {
        let mut tracker = PerformanceTracker::new("MinHeap");
        tracker.add_comparisons(3);
        tracker.add_swaps(2);
        tracker.add_array_accesses(5);
        tracker.absorb(OpCounters {
            comparisons: 1,
            swaps: 1,
            array_accesses: 1,
        });

        let counters = tracker.counters();
        assert_eq!(counters.comparisons, 4);
        assert_eq!(counters.swaps, 3);
        assert_eq!(counters.array_accesses, 6);

        tracker.reset();
        assert_eq!(tracker.counters(), OpCounters::default());
        assert_eq!(tracker.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_timer() {
        let mut tracker = PerformanceTracker::new("MinHeap");
        tracker.stop_timer();
        assert_eq!(tracker.elapsed_nanos(), 0);

        tracker.start_timer();
        std::thread::sleep(Duration::from_millis(2));
        tracker.stop_timer();
        assert!(tracker.elapsed() >= Duration::from_millis(2));
        assert_eq!(tracker.elapsed_millis(), tracker.elapsed().as_millis() as u64);
    }

    #[test]
    fn test_csv_header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");

        let mut tracker = PerformanceTracker::new("MinHeap");
        tracker.add_comparisons(10);
        tracker.append_csv(&path, 100).unwrap();
        tracker.append_csv(&path, 1000).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "algorithm,input_size,comparisons,swaps,array_accesses,time_ns,time_ms"
        );
        assert!(lines[1].starts_with("MinHeap,100,10,"));
        assert!(lines[2].starts_with("MinHeap,1000,10,"));

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].input_size, 1000);
    }

    #[test]
    fn test_csv_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.csv");
        let tracker = PerformanceTracker::new("MinHeap");
        let err = tracker.append_csv(&path, 1).unwrap_err();
        assert!(err.to_string().contains("Failed to open results file"));
    }
}
