//! Named wall-clock timings with min/median/max reporting, for profiling work that runs once per
//! game tick.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Accumulated measurements for one timing name. Times are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingStats {
    pub min: f64,
    pub max: f64,
    pub total: f64,
    pub average: f64,
    pub events: usize,
    /// Tick on which `max` was recorded.
    pub max_tick: u64,
    /// Raw samples in nanoseconds since the last call to `Timings::value`.
    samples: Vec<u64>,
}

/// Snapshot of a timing, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingSummary {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub max_tick: u64,
}

#[derive(Debug, Default)]
pub struct Timings {
    started: Option<Instant>,
    last_ms: f64,
    stats: HashMap<String, TimingStats>,
}

impl TimingStats {
    fn reset(&mut self) {
        self.min = 0.;
        self.max = 0.;
        self.total = 0.;
        self.average = 0.;
        self.events = 0;
    }

    fn record(&mut self, elapsed: Duration, tick: u64) {
        let ms = as_millis_f64(elapsed);

        self.total += ms;
        self.samples.push(elapsed.as_nanos() as u64);
        self.events += 1;
        self.average = self.total / self.events as f64;

        if self.events == 1 || ms > self.max {
            self.max = ms;
            self.max_tick = tick;
        }
        if ms < self.min || self.min <= 0. {
            self.min = ms;
        }
    }
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the stopwatch. Only one measurement runs at a time; starting again restarts it.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stops the stopwatch and returns the elapsed time. If `store` is set the time is recorded
    /// under `name`. If `display` is set it is logged together with the previously displayed
    /// time.
    pub fn complete(&mut self, name: &str, store: bool, display: bool, tick: u64) -> Duration {
        let elapsed = self
            .started
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default();

        if store {
            self.record(name, elapsed, tick);
        }

        if display {
            let ms = as_millis_f64(elapsed);
            log::info!("[{}] ms:{} last-ms:{}", name, ms as f32, self.last_ms as f32);
            self.last_ms = ms;
        }

        elapsed
    }

    /// Records a measurement taken elsewhere.
    pub fn record(&mut self, name: &str, elapsed: Duration, tick: u64) {
        self.stats
            .entry(name.to_string())
            .or_insert_with(TimingStats::default)
            .record(elapsed, tick);
    }

    pub fn stats(&self, name: &str) -> Option<&TimingStats> {
        self.stats.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.stats.keys().map(|name| name.as_str())
    }

    /// Summarises the samples recorded under `name` since the last call, then discards them.
    /// Min and max keep accumulating until `clean`. Unknown names or names without fresh samples
    /// give an all-zero summary.
    pub fn value(&mut self, name: &str) -> TimingSummary {
        let stats = match self.stats.get_mut(name) {
            Some(stats) if !stats.samples.is_empty() => stats,
            _ => return TimingSummary::default(),
        };

        let median_ns = median(&mut stats.samples);
        stats.samples.clear();

        TimingSummary {
            min: stats.min,
            max: stats.max,
            median: median_ns / 1_000_000.,
            max_tick: stats.max_tick,
        }
    }

    /// Resets the accumulated statistics of every name but keeps the names.
    pub fn clean(&mut self) {
        for stats in self.stats.values_mut() {
            stats.reset();
        }
    }

    /// Forgets every name.
    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.
}

/// Median of integer samples. For an even count this is the mean of the middle two, rounded
/// down to an integer.
pub fn median(samples: &mut [u64]) -> f64 {
    if samples.is_empty() {
        return 0.;
    }

    samples.sort_unstable();
    let count = samples.len();

    if count % 2 == 0 {
        let a = samples[count / 2 - 1];
        let b = samples[count / 2];
        (a / 2 + b / 2 + (a % 2 + b % 2) / 2) as f64
    } else {
        samples[count / 2] as f64
    }
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} : {:.1} : {:.1}", self.min, self.median, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), 0.);
        assert_eq!(median(&mut [5, 1, 3]), 3.);
        assert_eq!(median(&mut [4, 1, 3, 2]), 2.);
        assert_eq!(median(&mut [7, 8]), 7.);
        assert_eq!(median(&mut [u64::MAX, u64::MAX]), u64::MAX as f64);
    }

    #[test]
    fn test_record_and_value() {
        let mut timings = Timings::new();
        timings.record("sphere", ms(4), 10);
        timings.record("sphere", ms(2), 11);
        timings.record("sphere", ms(9), 12);

        let stats = timings.stats("sphere").unwrap();
        assert_eq!(stats.events, 3);
        assert_eq!(stats.max_tick, 12);
        assert!((stats.average - 5.).abs() < 1e-9);

        let summary = timings.value("sphere");
        assert!((summary.min - 2.).abs() < 1e-9);
        assert!((summary.max - 9.).abs() < 1e-9);
        assert!((summary.median - 4.).abs() < 1e-9);
        assert_eq!(summary.max_tick, 12);
        assert_eq!(summary.to_string(), "2.0 : 4.0 : 9.0");

        // samples are drained by value()
        assert_eq!(timings.value("sphere"), TimingSummary::default());
        assert_eq!(timings.value("missing"), TimingSummary::default());
    }

    #[test]
    fn test_clean_and_clear() {
        let mut timings = Timings::new();
        timings.record("line", ms(3), 1);
        timings.clean();

        let stats = timings.stats("line").unwrap();
        assert_eq!(stats.events, 0);
        assert_eq!(stats.max, 0.);

        timings.record("line", ms(6), 2);
        assert_eq!(timings.stats("line").unwrap().min, 6.);
        assert_eq!(timings.names().collect::<Vec<_>>(), vec!["line"]);

        timings.clear();
        assert!(timings.stats("line").is_none());
    }

    #[test]
    fn test_complete_without_start() {
        let mut timings = Timings::new();
        assert_eq!(timings.complete("idle", true, false, 0), Duration::from_secs(0));
        assert_eq!(timings.stats("idle").unwrap().events, 1);

        timings.start();
        timings.complete("busy", false, true, 0);
        assert!(timings.stats("busy").is_none());
    }
}
