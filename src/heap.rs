use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Operation counts collected while a heap is being manipulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCounters {
    pub comparisons: u64,
    pub swaps: u64,
    pub array_accesses: u64,
}

impl AddAssign for OpCounters {
    fn add_assign(&mut self, other: Self) {
        self.comparisons += other.comparisons;
        self.swaps += other.swaps;
        self.array_accesses += other.array_accesses;
    }
}

/// Array-backed binary min-heap that counts the work it does.
///
/// Capacity doubles when the backing storage is full.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    data: Vec<T>,
    capacity: usize,
    counters: OpCounters,
}

impl<T: Ord> MinHeap<T> {
    /// Create an empty heap. A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            counters: OpCounters::default(),
        }
    }

    /// Bulk build in O(n) by sifting down every parent, last to first.
    pub fn from_vec(values: Vec<T>) -> Self {
        let capacity = values.len().max(1);
        let mut heap = Self {
            data: values,
            capacity,
            counters: OpCounters::default(),
        };
        heap.build_heap();
        heap
    }

    /// Build by inserting values one at a time (O(n log n)).
    pub fn from_incremental(values: Vec<T>) -> Self {
        let mut heap = Self::with_capacity(values.len());
        for value in values {
            heap.insert(value);
        }
        heap
    }

    fn build_heap(&mut self) {
        if self.data.len() < 2 {
            return;
        }
        for i in (0..=parent(self.data.len() - 1)).rev() {
            self.sift_down(i);
        }
    }

    pub fn insert(&mut self, value: T) {
        self.ensure_capacity();
        self.data.push(value);
        self.counters.array_accesses += 1;
        let last = self.data.len() - 1;
        self.sift_up(last);
    }

    /// Remove and return the smallest element, or `None` if the heap is empty.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let min = self.data.swap_remove(0);
        self.counters.array_accesses += 1;
        self.counters.swaps += 1;
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    /// Smallest element without removing it. Counts as one array access.
    pub fn peek(&mut self) -> Option<&T> {
        if self.data.is_empty() {
            return None;
        }
        self.counters.array_accesses += 1;
        self.data.first()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn counters(&self) -> OpCounters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = OpCounters::default();
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            self.counters.comparisons += 1;
            if self.data[i] >= self.data[p] {
                break;
            }
            self.swap(i, p);
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;

            if left < len {
                self.counters.comparisons += 1;
                if self.data[left] < self.data[smallest] {
                    smallest = left;
                }
            }
            if right < len {
                self.counters.comparisons += 1;
                if self.data[right] < self.data[smallest] {
                    smallest = right;
                }
            }

            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
        self.counters.array_accesses += 1;
        self.counters.swaps += 1;
    }

    fn ensure_capacity(&mut self) {
        if self.data.len() == self.capacity {
            self.capacity *= 2;
            self.data.reserve_exact(self.capacity - self.data.len());
        }
    }
}

fn parent(i: usize) -> usize {
    (i.saturating_sub(1)) / 2
}
