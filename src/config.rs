use std::fs;
use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ScanError};
use crate::workload::DEFAULT_SEPARATOR;

pub const DEFAULT_CONFIG_FILE: &str = "bench_config.json";
pub const DEFAULT_SCHEMA_FILE: &str = "bench_config_schema.json";
pub const DEFAULT_RANGE_MULTIPLIER: u64 = 8;
pub const DEFAULT_MIN_TIME_SECS: f64 = 0.5;
pub const DEFAULT_LINE_SIZE: usize = 131;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "nanosecond")]
    Ns,
    #[serde(alias = "microsecond")]
    Us,
    #[default]
    #[serde(alias = "millisecond")]
    Ms,
    #[serde(alias = "second")]
    S,
}

impl TimeUnit {
    pub fn convert(self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        match self {
            TimeUnit::Ns => secs * 1e9,
            TimeUnit::Us => secs * 1e6,
            TimeUnit::Ms => secs * 1e3,
            TimeUnit::S => secs,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }
}

/// Buffer sizes to benchmark, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValueRange {
    pub start: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            start: 1 << 20,
            limit: 1 << 30,
            step: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThreadRange {
    pub min_threads: usize,
    pub max_threads: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride: Option<usize>,
}

/// Parameters for a benchmark run. Every field has a default, and fields
/// missing from a JSON file take it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BenchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub time_unit: TimeUnit,
    pub value_range: ValueRange,
    /// Extra `[start, limit]` size ranges, expanded like `value_range`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range_list: Option<Vec<(u64, u64)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_multiplier: Option<u64>,
    /// Seconds each measurement keeps iterating when `iterations` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_warmup_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_aggregates_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_aggregates_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_range: Option<ThreadRange>,
    pub line_size: usize,
    pub clip_size: usize,
    pub seed: u64,
    pub separator: u8,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            name: None,
            time_unit: TimeUnit::Ms,
            value_range: ValueRange::default(),
            value_range_list: None,
            range_multiplier: None,
            min_time: None,
            min_warmup_time: None,
            iterations: None,
            repetitions: None,
            report_aggregates_only: None,
            display_aggregates_only: None,
            threads: None,
            thread_range: None,
            line_size: DEFAULT_LINE_SIZE,
            clip_size: 0,
            seed: DEFAULT_SEED,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

/// Loads the config at `path`, or falls back to defaults when the file does
/// not exist. Any other failure is returned.
pub fn init<P: AsRef<Path>>(path: P) -> Result<BenchConfig> {
    match BenchConfig::load(&path) {
        Err(ScanError::ConfigNotFound(p)) => {
            info!(path = %p.display(), "no config file, using defaults");
            Ok(BenchConfig::default())
        }
        other => other,
    }
}

impl BenchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScanError::ConfigNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "loaded benchmark config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "wrote benchmark config");
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON Schema describing the config file format.
    pub fn schema_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(BenchConfig))?)
    }

    pub fn save_schema<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::schema_json()?)?;
        info!(path = %path.display(), "wrote config schema");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> { Err(ScanError::InvalidConfig { reason }) };
        let ValueRange { start, limit, step } = self.value_range;

        if start == 0 {
            return invalid("value_range.start must be positive".into());
        }
        if start > limit {
            return invalid(format!(
                "value_range.start ({start}) exceeds value_range.limit ({limit})"
            ));
        }
        if step == Some(0) {
            return invalid("value_range.step must be positive".into());
        }
        for &(lo, hi) in self.value_range_list.iter().flatten() {
            if lo == 0 || lo > hi {
                return invalid(format!("value_range_list entry [{lo}, {hi}] is empty or starts at zero"));
            }
        }
        if let Some(m) = self.range_multiplier
            && m < 2
        {
            return invalid(format!("range_multiplier must be at least 2, got {m}"));
        }
        for (field, value) in [("min_time", self.min_time), ("min_warmup_time", self.min_warmup_time)] {
            if let Some(v) = value
                && !(v.is_finite() && v >= 0.0)
            {
                return invalid(format!("{field} must be a non-negative number, got {v}"));
            }
        }
        if self.iterations == Some(0) {
            return invalid("iterations must be positive".into());
        }
        if self.repetitions == Some(0) {
            return invalid("repetitions must be positive".into());
        }
        if self.threads == Some(0) {
            return invalid("threads must be positive".into());
        }
        if let Some(tr) = self.thread_range {
            if tr.min_threads == 0 || tr.min_threads > tr.max_threads {
                return invalid(format!(
                    "thread_range {}..={} is empty or starts at zero",
                    tr.min_threads, tr.max_threads
                ));
            }
            if tr.stride == Some(0) {
                return invalid("thread_range.stride must be positive".into());
            }
        }
        Ok(())
    }

    /// Buffer sizes: `start`, every power of the multiplier strictly between
    /// `start` and `limit`, then `limit`; or `start..=limit` by `step`.
    /// Ranges from `value_range_list` are added with the multiplier rule and
    /// the result is sorted without duplicates.
    pub fn sizes(&self) -> Vec<usize> {
        let ValueRange { start, limit, step } = self.value_range;
        let mult = self
            .range_multiplier
            .unwrap_or(DEFAULT_RANGE_MULTIPLIER)
            .max(2);

        let mut sizes = match step {
            Some(step) => (start..=limit)
                .step_by(step.max(1) as usize)
                .map(|s| s as usize)
                .collect(),
            None => expand_range(start, limit, mult),
        };
        let Some(list) = &self.value_range_list else {
            return sizes;
        };
        for &(lo, hi) in list {
            sizes.extend(expand_range(lo, hi, mult));
        }
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }

    /// Thread counts: a fixed count, a doubling range, or a dense range.
    pub fn thread_counts(&self) -> Vec<usize> {
        match self.thread_range {
            Some(ThreadRange {
                min_threads,
                max_threads,
                stride: Some(stride),
            }) => (min_threads..=max_threads).step_by(stride.max(1)).collect(),
            Some(ThreadRange {
                min_threads,
                max_threads,
                stride: None,
            }) => {
                let mut counts = Vec::new();
                let mut t = min_threads.max(1);
                while t < max_threads {
                    counts.push(t);
                    t *= 2;
                }
                counts.push(max_threads);
                counts
            }
            None => vec![self.threads.unwrap_or(1)],
        }
    }

    pub fn min_time(&self) -> Duration {
        Duration::from_secs_f64(self.min_time.unwrap_or(DEFAULT_MIN_TIME_SECS))
    }

    pub fn min_warmup_time(&self) -> Duration {
        Duration::from_secs_f64(self.min_warmup_time.unwrap_or(0.0))
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions.unwrap_or(1).max(1)
    }

    pub fn with_value_range(mut self, start: u64, limit: u64) -> Self {
        self.value_range = ValueRange {
            start,
            limit,
            step: None,
        };
        self
    }

    pub fn with_dense_range(mut self, start: u64, limit: u64, step: u64) -> Self {
        self.value_range = ValueRange {
            start,
            limit,
            step: Some(step),
        };
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_line_size(mut self, line_size: usize) -> Self {
        self.line_size = line_size;
        self
    }

    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_min_time(mut self, secs: f64) -> Self {
        self.min_time = Some(secs);
        self
    }
}

fn expand_range(start: u64, limit: u64, mult: u64) -> Vec<usize> {
    let mut sizes = vec![start as usize];
    let mut p: u64 = 1;
    while p < limit {
        if p > start {
            sizes.push(p as usize);
        }
        p = p.saturating_mul(mult);
    }
    if limit > start {
        sizes.push(limit as usize);
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_is_one_mib_to_one_gib() {
        let config = BenchConfig::default();
        assert_eq!(config.value_range.start, 1 << 20);
        assert_eq!(config.value_range.limit, 1 << 30);
        assert_eq!(config.time_unit, TimeUnit::Ms);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = BenchConfig::from_json(r#"{ "iterations": 3, "time_unit": "us" }"#).unwrap();
        assert_eq!(config.iterations, Some(3));
        assert_eq!(config.time_unit, TimeUnit::Us);
        assert_eq!(config.line_size, DEFAULT_LINE_SIZE);
        assert_eq!(config.value_range, ValueRange::default());
    }

    #[test]
    fn test_unset_optionals_are_not_written() {
        let json = BenchConfig::default().to_json_pretty().unwrap();
        assert!(!json.contains("iterations"));
        assert!(!json.contains("thread_range"));
        assert!(json.contains("value_range"));
    }

    #[test]
    fn test_power_range_sizes() {
        let config = BenchConfig::default().with_value_range(1 << 20, 1 << 30);
        assert_eq!(
            config.sizes(),
            vec![1 << 20, 1 << 21, 1 << 24, 1 << 27, 1 << 30]
        );

        let mut config = BenchConfig::default().with_value_range(10, 100);
        config.range_multiplier = Some(2);
        assert_eq!(config.sizes(), vec![10, 16, 32, 64, 100]);

        let config = BenchConfig::default().with_value_range(64, 64);
        assert_eq!(config.sizes(), vec![64]);
    }

    #[test]
    fn test_range_list_adds_sizes() {
        let config = BenchConfig::from_json(
            r#"{
                "value_range": { "start": 64, "limit": 512 },
                "value_range_list": [[100, 100], [256, 4096]]
            }"#,
        )
        .unwrap();
        assert_eq!(config.value_range_list, Some(vec![(100, 100), (256, 4096)]));
        assert_eq!(config.sizes(), vec![64, 100, 256, 512, 4096]);
    }

    #[test]
    fn test_schema_names_every_field() {
        let schema = BenchConfig::schema_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&schema).unwrap();
        let props = parsed["properties"].as_object().unwrap();
        for field in ["time_unit", "value_range", "value_range_list", "thread_range", "line_size"] {
            assert!(props.contains_key(field), "{field}");
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SCHEMA_FILE);
        BenchConfig::save_schema(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), schema);
    }

    #[test]
    fn test_dense_range_sizes() {
        let config = BenchConfig::default().with_dense_range(0x10, 0x40, 0x10);
        assert_eq!(config.sizes(), vec![0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn test_thread_counts() {
        assert_eq!(BenchConfig::default().thread_counts(), vec![1]);
        assert_eq!(BenchConfig::default().with_threads(4).thread_counts(), vec![4]);

        let mut config = BenchConfig::default();
        config.thread_range = Some(ThreadRange {
            min_threads: 1,
            max_threads: 6,
            stride: None,
        });
        assert_eq!(config.thread_counts(), vec![1, 2, 4, 6]);

        config.thread_range = Some(ThreadRange {
            min_threads: 1,
            max_threads: 6,
            stride: Some(2),
        });
        assert_eq!(config.thread_counts(), vec![1, 3, 5]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            r#"{ "value_range": { "start": 0, "limit": 10 } }"#,
            r#"{ "value_range": { "start": 20, "limit": 10 } }"#,
            r#"{ "value_range": { "start": 1, "limit": 10, "step": 0 } }"#,
            r#"{ "range_multiplier": 1 }"#,
            r#"{ "iterations": 0 }"#,
            r#"{ "min_time": -1.0 }"#,
            r#"{ "thread_range": { "min_threads": 4, "max_threads": 2 } }"#,
            r#"{ "value_range_list": [[0, 64]] }"#,
            r#"{ "value_range_list": [[128, 64]] }"#,
        ];
        for json in bad {
            let err = BenchConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ScanError::InvalidConfig { .. }), "{json}: {err}");
        }
    }

    #[test]
    fn test_time_unit_conversion() {
        let d = Duration::from_millis(3);
        assert!((TimeUnit::Us.convert(d) - 3000.0).abs() < 1e-6);
        assert!((TimeUnit::S.convert(d) - 0.003).abs() < 1e-12);
        assert_eq!(TimeUnit::Ns.suffix(), "ns");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let config = BenchConfig::default().with_iterations(7).with_line_size(80);
        config.save(&path).unwrap();
        assert_eq!(BenchConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_init_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = init(dir.path().join("missing.json")).unwrap();
        assert_eq!(config, BenchConfig::default());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(init(&bad), Err(ScanError::Json(_))));
    }
}
