//! Timing statistics for sweep reports.
//!
//! Collects build and check durations and summarizes them as min, average,
//! max and a coarse distribution over decades of wall-clock time.

use std::time::Duration;

const BUCKET_LABELS: [&str; 6] = ["<1ms", "<10ms", "<100ms", "<1s", "<10s", ">=10s"];

/// Accumulates durations in nanoseconds.
pub struct TimingStats {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
    pub count: u64,
    pub buckets: [u64; 6],
}

impl TimingStats {
    /// Creates an empty tracker; min starts at u64::MAX so the first
    /// measurement becomes the minimum.
    pub fn new() -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            sum: 0,
            count: 0,
            buckets: [0; 6],
        }
    }

    pub fn update(&mut self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.min = self.min.min(nanos);
        self.max = self.max.max(nanos);
        self.sum = self.sum.saturating_add(nanos);
        self.count += 1;

        // decade buckets starting at 1 ms
        let mut idx = 0;
        let mut bound = 1_000_000u64;
        while idx < 5 && nanos >= bound {
            idx += 1;
            bound *= 10;
        }
        self.buckets[idx] += 1;
    }

    /// Average in nanoseconds, 0.0 when empty.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self, label: &str) {
        println!("\n{} ({} runs)", label, self.count);
        if self.count == 0 {
            return;
        }

        println!("Min:   {:.4} s", self.min as f64 / 1e9);
        println!("Avg:   {:.4} s", self.avg() / 1e9);
        println!("Max:   {:.4} s", self.max as f64 / 1e9);

        println!("Distribution:");
        for (label, &count) in BUCKET_LABELS.iter().zip(&self.buckets) {
            if count > 0 {
                println!("[{:>6}]: {}", label, count);
            }
        }
    }
}
