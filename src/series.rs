use serde::{Deserialize, Serialize};

/// Input sizes shared by both literal series
pub const INPUT_SIZES: [u64; 4] = [100, 1_000, 10_000, 100_000];

/// Timings measured before the bulk-build optimization (ns)
pub const BEFORE_TIMES_NS: [f64; 4] = [594_292.0, 1_800_250.0, 5_269_209.0, 35_045_545.0];

/// Timings measured after the bulk-build optimization (ns)
pub const AFTER_TIMES_NS: [f64; 4] = [551_875.0, 1_209_583.0, 4_396_750.0, 24_082_167.0];

pub const BEFORE_LABEL: &str = "Before Optimization";
pub const AFTER_LABEL: &str = "After Optimization";

/// Point glyph drawn at each sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    Circle,
    Square,
}

/// A single (input size, time) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub input_size: u64,
    pub time_ns: f64,
}

/// One labeled line on the chart.
///
/// Input sizes are expected to be strictly increasing; nothing enforces it
/// when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub marker: Marker,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(label: impl Into<String>, marker: Marker, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            marker,
            points,
        }
    }

    /// Pair up sizes and times. Extra entries on either side are dropped.
    pub fn from_pairs(
        label: impl Into<String>,
        marker: Marker,
        sizes: &[u64],
        times_ns: &[f64],
    ) -> Self {
        let points = sizes
            .iter()
            .zip(times_ns)
            .map(|(&input_size, &time_ns)| Point {
                input_size,
                time_ns,
            })
            .collect();
        Self::new(label, marker, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn input_sizes(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.input_size).collect()
    }

    pub fn times_ns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time_ns).collect()
    }

    /// Points as `(x, y)` pairs in chart coordinates
    pub fn coords(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.input_size as f64, p.time_ns))
            .collect()
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].input_size < w[1].input_size)
    }

    /// True when every point of `self` is no slower than the matching point of
    /// `baseline`. Series of different lengths or sizes never qualify.
    pub fn is_non_regressive_against(&self, baseline: &Series) -> bool {
        self.len() == baseline.len()
            && self
                .points
                .iter()
                .zip(&baseline.points)
                .all(|(a, b)| a.input_size == b.input_size && a.time_ns <= b.time_ns)
    }
}

pub fn before_optimization() -> Series {
    Series::from_pairs(BEFORE_LABEL, Marker::Circle, &INPUT_SIZES, &BEFORE_TIMES_NS)
}

pub fn after_optimization() -> Series {
    Series::from_pairs(AFTER_LABEL, Marker::Square, &INPUT_SIZES, &AFTER_TIMES_NS)
}

/// The two recorded series, before first
pub fn load_data() -> [Series; 2] {
    [before_optimization(), after_optimization()]
}
