use std::hint::black_box;
use std::ops::RangeInclusive;
use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::utils::{calculate_throughput, mean_f64, median_f64, variance_f64};
use crate::catalog::{Catalog, Strategy};
use crate::config::{BenchConfig, TimeUnit};
use crate::lines::consume_lines;
use crate::workload::Workload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Repetition(u32),
    Mean,
    Median,
}

impl RunKind {
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, RunKind::Repetition(_))
    }

    pub fn label(&self) -> String {
        match self {
            RunKind::Repetition(r) => format!("rep{}", r),
            RunKind::Mean => "mean".to_string(),
            RunKind::Median => "median".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub size: usize,
    pub threads: usize,
    pub kind: RunKind,
    pub iterations: u64,
    /// Wall time per iteration, in `time_unit`.
    pub time: f64,
    pub time_unit: TimeUnit,
    pub bytes_per_second: f64,
    /// Sample variance of `time` across repetitions; zero for single runs.
    pub variance: f64,
    /// Bytes consumed by one pass; identical for every correct strategy.
    pub checksum: usize,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub strategy: Strategy,
    pub size_range: Option<RangeInclusive<u64>>,
}

struct Sample {
    iterations: u64,
    elapsed: Duration,
    checksum: usize,
}

/// Runs each registered strategy over synthetic workloads, or over a fixed
/// input buffer when one is attached.
pub struct Harness<'a> {
    config: BenchConfig,
    registrations: Vec<Registration>,
    input: Option<&'a [u8]>,
}

impl<'a> Harness<'a> {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            input: None,
        }
    }

    /// Benchmarks `input` instead of generated text; the size range is ignored.
    pub fn with_input(mut self, input: &'a [u8]) -> Self {
        self.input = Some(input);
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: Strategy,
        size_range: Option<RangeInclusive<u64>>,
    ) -> &mut Self {
        self.registrations.push(Registration {
            name: name.into(),
            strategy,
            size_range,
        });
        self
    }

    pub fn register_all(&mut self, catalog: &Catalog) -> &mut Self {
        for strategy in catalog.supported() {
            self.register(strategy.name(), strategy, None);
        }
        self
    }

    fn sizes_for(&self, reg: &Registration) -> Vec<usize> {
        if let Some(input) = self.input {
            return vec![input.len()];
        }
        match &reg.size_range {
            Some(range) => {
                let mut config = self.config.clone();
                config.value_range.start = *range.start();
                config.value_range.limit = *range.end();
                config.sizes()
            }
            None => self.config.sizes(),
        }
    }

    pub fn run(&self) -> Vec<Measurement> {
        let threads = self.config.thread_counts();
        let mut results = Vec::new();

        let mut sizes: Vec<usize> = self
            .registrations
            .iter()
            .flat_map(|r| self.sizes_for(r))
            .collect();
        sizes.sort_unstable();
        sizes.dedup();

        // One workload per size, shared by every registration that uses it.
        for size in sizes {
            let workload = match self.input {
                Some(_) => None,
                None => Some(Workload::from_config(&self.config, size)),
            };
            let data: &[u8] = match (&workload, self.input) {
                (Some(w), _) => w.as_bytes(),
                (None, Some(input)) => input,
                (None, None) => &[],
            };

            for reg in &self.registrations {
                if !self.sizes_for(reg).contains(&size) {
                    continue;
                }
                for &t in &threads {
                    info!(strategy = %reg.name, size, threads = t, "running benchmark");
                    results.extend(self.measure_all(reg, data, t));
                }
            }
        }
        results
    }

    fn measure_all(&self, reg: &Registration, data: &[u8], threads: usize) -> Vec<Measurement> {
        let unit = self.config.time_unit;
        let repetitions = self.config.repetitions();

        self.warmup(reg, data, threads);

        let mut rows = Vec::with_capacity(repetitions as usize + 2);
        for rep in 0..repetitions {
            let sample = self.sample(reg, data, threads);
            let per_iter =
                Duration::from_secs_f64(sample.elapsed.as_secs_f64() / sample.iterations.max(1) as f64);
            debug!(
                strategy = %reg.name,
                rep,
                iterations = sample.iterations,
                elapsed_us = sample.elapsed.as_micros() as u64,
                "sample"
            );
            rows.push(Measurement {
                name: reg.name.clone(),
                size: data.len(),
                threads,
                kind: RunKind::Repetition(rep),
                iterations: sample.iterations,
                time: unit.convert(per_iter),
                time_unit: unit,
                bytes_per_second: calculate_throughput(
                    (data.len() * threads) as u64,
                    per_iter,
                ),
                variance: 0.0,
                checksum: sample.checksum,
            });
        }

        if repetitions > 1 {
            let mut times: Vec<f64> = rows.iter().map(|m| m.time).collect();
            let mut rates: Vec<f64> = rows.iter().map(|m| m.bytes_per_second).collect();
            let variance = variance_f64(&times);
            let iterations: u64 = rows.iter().map(|m| m.iterations).sum();
            let checksum = rows[0].checksum;

            let aggregate = |kind, time, rate| Measurement {
                name: reg.name.clone(),
                size: data.len(),
                threads,
                kind,
                iterations,
                time,
                time_unit: unit,
                bytes_per_second: rate,
                variance,
                checksum,
            };
            let mean = aggregate(RunKind::Mean, mean_f64(&times), mean_f64(&rates));
            let median = aggregate(
                RunKind::Median,
                median_f64(&mut times),
                median_f64(&mut rates),
            );

            if self.config.report_aggregates_only.unwrap_or(false) {
                rows.clear();
            }
            rows.push(mean);
            rows.push(median);
        }
        rows
    }

    fn warmup(&self, reg: &Registration, data: &[u8], threads: usize) {
        let budget = self.config.min_warmup_time();
        if budget.is_zero() {
            return;
        }
        let start = Instant::now();
        while start.elapsed() < budget {
            run_pass(data, self.config.separator, &reg.strategy, threads);
        }
    }

    fn sample(&self, reg: &Registration, data: &[u8], threads: usize) -> Sample {
        let separator = self.config.separator;
        let mut iterations = 0u64;
        let mut checksum = 0;
        let start = Instant::now();

        match self.config.iterations {
            Some(n) => {
                for _ in 0..n {
                    checksum = run_pass(data, separator, &reg.strategy, threads);
                    iterations += 1;
                }
            }
            None => {
                let min_time = self.config.min_time();
                loop {
                    checksum = run_pass(data, separator, &reg.strategy, threads);
                    iterations += 1;
                    if start.elapsed() >= min_time {
                        break;
                    }
                }
            }
        }

        Sample {
            iterations,
            elapsed: start.elapsed(),
            checksum,
        }
    }
}

/// One timed unit of work: every thread consumes the whole buffer.
fn run_pass(data: &[u8], separator: u8, strategy: &Strategy, threads: usize) -> usize {
    run_workers(threads, || black_box(consume_lines(black_box(data), separator, strategy)))
}

/// Runs `work` on `threads` scoped threads and returns the largest result.
/// A panicking worker panics the caller.
fn run_workers<F>(threads: usize, work: F) -> usize
where
    F: Fn() -> usize + Sync,
{
    if threads <= 1 {
        return work();
    }
    let work = &work;
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads).map(|_| s.spawn(work)).collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .fold(0, |acc, consumed| acc.max(consumed))
    })
}

/// Groups results by `(size, threads)` and returns every group whose
/// strategies disagree on the checksum.
pub fn find_mismatches(results: &[Measurement]) -> Vec<(usize, usize, Vec<&Measurement>)> {
    let mut keys: Vec<(usize, usize)> = results.iter().map(|m| (m.size, m.threads)).collect();
    keys.sort_unstable();
    keys.dedup();

    keys.into_iter()
        .filter_map(|(size, threads)| {
            let group: Vec<&Measurement> = results
                .iter()
                .filter(|m| m.size == size && m.threads == threads)
                .collect();
            let expected = group.first()?.checksum;
            if group.iter().all(|m| m.checksum == expected) {
                None
            } else {
                Some((size, threads, group))
            }
        })
        .collect()
}
