pub mod check;
pub mod config;
pub mod harness;
pub mod shell;
pub mod utils;


pub use check::{CheckOutcome, CheckReport, cross_validate};
pub use config::{CliArgs, Mode, OutputFormat, build_cli, log_level, parse_cli_args};
pub use harness::{Harness, Measurement, Registration, RunKind, find_mismatches};
pub use shell::{Shell, ShellCommand};
pub use utils::calculate_throughput;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::BenchConfig;
use crate::mmap::MappedBuffer;
use crate::simd::SimdInfo;
use crate::workload::Workload;
use utils::{format_bytes, format_rate};

pub fn run_mode(args: &CliArgs, config: BenchConfig) -> Result<()> {
    let catalog = Catalog::global();
    match args.mode {
        Mode::List => write_catalog(catalog, &mut io::stdout().lock())?,
        Mode::Info => write_simd_info(&catalog.capabilities(), &mut io::stdout().lock())?,
        Mode::Shell => {
            let mut shell = Shell::new(args.config_path.clone(), config, catalog);
            shell.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Mode::Check => run_check(args, &config, catalog)?,
        Mode::Run => run_benchmarks(args, config, catalog)?,
    }
    Ok(())
}

/// Builds a harness with either every supported strategy or the named ones.
pub fn build_harness<'a>(
    config: BenchConfig,
    catalog: &Catalog,
    names: &[String],
) -> Result<Harness<'a>> {
    let mut harness = Harness::new(config);
    if names.is_empty() {
        harness.register_all(catalog);
    } else {
        for name in names {
            let strategy = catalog
                .resolve_name(name)
                .with_context(|| format!("cannot benchmark '{}'", name))?;
            harness.register(strategy.name(), strategy, None);
        }
    }
    Ok(harness)
}

fn run_benchmarks(args: &CliArgs, config: BenchConfig, catalog: &Catalog) -> Result<()> {
    let mapped = match &args.input {
        Some(path) => Some(
            MappedBuffer::open(path)
                .with_context(|| format!("failed to map {}", path.display()))?,
        ),
        None => None,
    };

    let mut harness = build_harness(config.clone(), catalog, &args.strategies)?;
    if let Some(buf) = &mapped {
        info!(path = %buf.path().display(), bytes = buf.len(), "benchmarking mapped input");
        harness = harness.with_input(buf.as_bytes());
    }

    eprintln!(
        "Running {} strategies on {} ({})",
        harness.registrations().len(),
        catalog.capabilities().best_available(),
        config.name.as_deref().unwrap_or("bytescan"),
    );
    let results = harness.run();
    print_results(&results, args.output_format, &config)?;
    Ok(())
}

fn run_check(args: &CliArgs, config: &BenchConfig, catalog: &Catalog) -> Result<()> {
    let mapped;
    let generated;
    let data: &[u8] = match &args.input {
        Some(path) => {
            mapped = MappedBuffer::open(path)
                .with_context(|| format!("failed to map {}", path.display()))?;
            mapped.as_bytes()
        }
        None => {
            generated = Workload::from_config(config, config.value_range.start as usize);
            generated.as_bytes()
        }
    };

    let report = cross_validate(catalog, data, config.separator);
    let mut out = io::stdout().lock();
    writeln!(out, "=== Cross-validation ({} bytes) ===", data.len())?;
    for outcome in &report.outcomes {
        let status = if outcome.passed(report.expected_consumed) {
            "ok"
        } else {
            "FAIL"
        };
        writeln!(
            out,
            "{:<32} {:>6}  consumed {}",
            outcome.strategy.name(),
            status,
            outcome.consumed
        )?;
    }

    let failed: Vec<_> = report.failures().map(|o| o.strategy.name()).collect();
    if !failed.is_empty() {
        bail!("strategies disagree with scalar: {}", failed.join(", "));
    }
    writeln!(
        out,
        "\n✓ {} strategies agree with scalar",
        report.outcomes.len()
    )?;
    Ok(())
}

pub fn write_catalog<W: Write>(catalog: &Catalog, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:<32} {:<8} {:>6} {:>7} {:>9} {:>10}",
        "Strategy", "Tier", "Width", "Unroll", "Prefetch", "Supported"
    )?;
    writeln!(out, "{}", "-".repeat(77))?;
    for id in catalog.ids() {
        let d = id.descriptor();
        let prefetch = d
            .prefetch
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<32} {:<8} {:>6} {:>7} {:>9} {:>10}",
            d.name,
            d.level.to_string(),
            d.width,
            format!("{}x", d.unroll),
            prefetch,
            if catalog.is_supported(id) { "yes" } else { "no" }
        )?;
    }
    writeln!(out, "\nDefault: {}", catalog.best().name())
}

pub fn write_simd_info<W: Write>(info: &SimdInfo, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== SIMD Capabilities ===")?;
    writeln!(out, "  SSE2:    {}", info.sse2)?;
    writeln!(out, "  AVX2:    {}", info.avx2)?;
    writeln!(out, "  AVX-512: {}", info.avx512)?;
    writeln!(out, "  Best:    {}", info.best_available())?;
    writeln!(out, "  Width:   {} bytes", info.register_width())
}

pub fn print_results(
    results: &[Measurement],
    format: OutputFormat,
    config: &BenchConfig,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => write_human(results, config, &mut io::stdout().lock()),
        OutputFormat::Json => {
            let mut file = OpenOptions::new()
                .append(true)
                .create(true)
                .open("results.json")?;
            write_json(results, config, &mut file)
        }
        OutputFormat::Csv => {
            let mut file = OpenOptions::new()
                .append(true)
                .create(true)
                .open("results.csv")?;
            let header = file.metadata()?.len() == 0;
            write_csv(results, header, &mut file)
        }
    }
}

pub fn write_human<W: Write>(
    results: &[Measurement],
    config: &BenchConfig,
    out: &mut W,
) -> io::Result<()> {
    let unit = config.time_unit.suffix();
    let hide_reps = config.display_aggregates_only.unwrap_or(false);

    writeln!(out, "\n=== Summary ===")?;
    writeln!(
        out,
        "{:<48} {:>14} {:>12} {:>14} {:>12}",
        "Benchmark",
        format!("Time ({})", unit),
        "Iterations",
        "Throughput",
        "Variance"
    )?;
    writeln!(out, "{}", "-".repeat(104))?;

    for m in results {
        if hide_reps && !m.kind.is_aggregate() {
            continue;
        }
        let mut label = format!("{}/{}", m.name, format_bytes(m.size));
        if m.threads > 1 {
            label.push_str(&format!("/threads:{}", m.threads));
        }
        if m.kind.is_aggregate() || config.repetitions() > 1 {
            label.push('_');
            label.push_str(&m.kind.label());
        }
        writeln!(
            out,
            "{:<48} {:>14.4} {:>12} {:>14} {:>12.4}",
            label,
            m.time,
            m.iterations,
            format_rate(m.bytes_per_second),
            m.variance
        )?;
    }

    if let Some(best) = results
        .iter()
        .max_by(|a, b| a.bytes_per_second.total_cmp(&b.bytes_per_second))
    {
        writeln!(
            out,
            "\nBest throughput: {} @ {}",
            best.name,
            format_rate(best.bytes_per_second)
        )?;
    }

    let mismatches = find_mismatches(results);
    if mismatches.is_empty() {
        if !results.is_empty() {
            writeln!(out, "\n✓ All strategies consumed the same bytes consistently")?;
        }
    } else {
        writeln!(out, "\n Warning: checksum mismatches detected!")?;
        for (size, threads, group) in mismatches {
            writeln!(out, "  size {} threads {}:", size, threads)?;
            for m in group {
                writeln!(out, "    {}: {} bytes", m.name, m.checksum)?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    name: Option<&'a str>,
    simd: String,
    results: &'a [Measurement],
}

pub fn write_json<W: Write>(
    results: &[Measurement],
    config: &BenchConfig,
    out: &mut W,
) -> io::Result<()> {
    let report = JsonReport {
        name: config.name.as_deref(),
        simd: Catalog::global().capabilities().best_available().to_string(),
        results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

pub fn write_csv<W: Write>(results: &[Measurement], header: bool, out: &mut W) -> io::Result<()> {
    if header {
        writeln!(
            out,
            "name,size,threads,kind,iterations,time,time_unit,bytes_per_second,variance,checksum"
        )?;
    }
    for m in results {
        writeln!(
            out,
            "{},{},{},{},{},{:.6},{},{:.2},{:.6},{}",
            m.name,
            m.size,
            m.threads,
            m.kind.label(),
            m.iterations,
            m.time,
            m.time_unit.suffix(),
            m.bytes_per_second,
            m.variance,
            m.checksum
        )?;
    }
    Ok(())
}
