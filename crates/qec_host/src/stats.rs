//! Latency statistics for decode benchmarks.
//!
//! Collects per-shot decode latencies and reports min, max, mean and a
//! coarse histogram. Partial statistics from worker threads are merged, so a
//! rayon `fold`/`reduce` can build one report without locking.

use serde::Serialize;

const BUCKETS: usize = 20;

/// Width of one histogram bucket in nanoseconds.
const BUCKET_NANOS: u64 = 10_000;

/// Running latency summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
    pub count: u64,
    pub buckets: [u64; BUCKETS],
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyStats {
    /// Empty tracker; `min` starts at `u64::MAX` so the first sample wins.
    pub fn new() -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            sum: 0,
            count: 0,
            buckets: [0; BUCKETS],
        }
    }

    /// Records one latency in nanoseconds. Samples beyond the last bucket
    /// land in it.
    pub fn update(&mut self, nanos: u64) {
        self.min = self.min.min(nanos);
        self.max = self.max.max(nanos);
        self.sum += nanos;
        self.count += 1;

        let idx = ((nanos / BUCKET_NANOS) as usize).min(BUCKETS - 1);
        self.buckets[idx] += 1;
    }

    /// Combines two partial trackers.
    pub fn merge(mut self, other: &LatencyStats) -> LatencyStats {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
        for (a, b) in self.buckets.iter_mut().zip(&other.buckets) {
            *a += b;
        }
        self
    }

    /// Mean latency in nanoseconds, 0 when empty.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self) {
        println!("\nLatency (decode only)");
        println!("Count: {}", self.count);
        if self.count == 0 {
            return;
        }

        let avg_ns = self.avg();
        if avg_ns < 1000.0 {
            println!("Min:   {:.2} ns", self.min as f64);
            println!("Avg:   {:.2} ns", avg_ns);
            println!("Max:   {:.2} ns", self.max as f64);
        } else {
            println!("Min:   {:.2} us", self.min as f64 / 1000.0);
            println!("Avg:   {:.2} us", avg_ns / 1000.0);
            println!("Max:   {:.2} us", self.max as f64 / 1000.0);
        }

        println!("Distribution (10us buckets):");
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let open = if i == BUCKETS - 1 { "+" } else { " " };
                println!("[{:3}-{:3}{} us]: {}", i * 10, (i + 1) * 10, open, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_extremes_and_buckets() {
        let mut stats = LatencyStats::new();
        for nanos in [500, 15_000, 1_000_000] {
            stats.update(nanos);
        }
        assert_eq!(stats.min, 500);
        assert_eq!(stats.max, 1_000_000);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.buckets[0], 1);
        assert_eq!(stats.buckets[1], 1);
        assert_eq!(stats.buckets[BUCKETS - 1], 1);
    }

    #[test]
    fn merging_matches_sequential_updates() {
        let samples = [3_000, 42_000, 7, 250_000, 19_999];
        let mut whole = LatencyStats::new();
        samples.iter().for_each(|&s| whole.update(s));

        let (left, right) = samples.split_at(2);
        let mut a = LatencyStats::new();
        let mut b = LatencyStats::new();
        left.iter().for_each(|&s| a.update(s));
        right.iter().for_each(|&s| b.update(s));
        assert_eq!(a.merge(&b), whole);
    }

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(LatencyStats::default().avg(), 0.0);
    }
}
