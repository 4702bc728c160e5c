pub mod benchmark;
pub mod chart;
pub mod data_gen;
pub mod heap;
pub mod metrics;
pub mod series;

pub use heap::{MinHeap, OpCounters};
pub use series::{Marker, Series};
